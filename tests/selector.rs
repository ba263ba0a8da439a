// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use html5construct::selector::AttrOperation;
use html5construct::{
    Attribute, CompoundSelector, ConstructionSite, Document, LocalName, Selector, SimpleSelector,
    Tag, WhitespaceMode,
};

fn tag(name: &str, attrs: &[(&str, &str)]) -> Tag {
    Tag::with_attrs(
        LocalName::from(name),
        attrs.iter().map(|&(k, v)| Attribute::new(k, v)).collect(),
    )
}

// <ul id=list>
//   <li class=item>one
//   <li class="item last" data-kind=x-y>two
// </ul>
// <p>text<input type=CHECKBOX>
fn document() -> Document {
    let mut site = ConstructionSite::new(Default::default());
    site.insert_html_html_start_tag_before_html(tag("html", &[]));
    site.insert_html_body_element(tag("body", &[]));
    site.insert_html_element(tag("ul", &[("id", "list")]));
    site.insert_html_element(tag("li", &[("class", "item")]));
    site.insert_text_node("one", WhitespaceMode::NotAllWhitespace);
    site.generate_implied_end_tags();
    site.insert_html_element(tag("li", &[("class", "item last"), ("data-kind", "x-y")]));
    site.insert_text_node("two", WhitespaceMode::NotAllWhitespace);
    site.pop_until_popped(&LocalName::from("ul"));
    site.insert_html_element(tag("p", &[]));
    site.insert_text_node("text", WhitespaceMode::NotAllWhitespace);
    site.insert_self_closing_html_element(tag("input", &[("type", "CHECKBOX")]));
    site.finished_parsing();
    site.finish().unwrap()
}

fn names(doc: &Document, selector: CompoundSelector) -> Vec<String> {
    Selector::new(selector)
        .select_all(doc, doc.document_node())
        .into_iter()
        .map(|node| doc.element(node).unwrap().name.local.to_string())
        .collect()
}

fn local(name: &str) -> SimpleSelector {
    SimpleSelector::LocalName(LocalName::from(name))
}

fn compound(simple: Vec<SimpleSelector>) -> CompoundSelector {
    CompoundSelector::new(simple)
}

#[test]
fn selects_in_document_order() {
    let doc = document();
    assert_eq!(
        names(&doc, compound(vec![SimpleSelector::Universal])),
        vec!["html", "body", "ul", "li", "li", "p", "input"]
    );
    assert_eq!(
        names(&doc, compound(vec![SimpleSelector::Class("item".into())])),
        vec!["li", "li"]
    );
}

#[test]
fn combinators_over_a_parsed_tree() {
    let doc = document();

    let items_in_list = compound(vec![local("li")])
        .child_of(compound(vec![SimpleSelector::Id("list".into())]));
    assert_eq!(names(&doc, items_in_list).len(), 2);

    let second_item = compound(vec![local("li")]).next_sibling_of(compound(vec![local("li")]));
    assert_eq!(names(&doc, second_item).len(), 1);

    let p_after_list = compound(vec![local("p")]).later_sibling_of(compound(vec![local("ul")]));
    assert_eq!(names(&doc, p_after_list), vec!["p"]);

    let input_in_body = compound(vec![local("input")]).descendant_of(compound(vec![local("body")]));
    assert_eq!(names(&doc, input_in_body), vec!["input"]);

    let input_in_ul = compound(vec![local("input")]).descendant_of(compound(vec![local("ul")]));
    assert!(names(&doc, input_in_ul).is_empty());
}

#[test]
fn attribute_and_structural_selectors() {
    let doc = document();

    let checkbox = compound(vec![SimpleSelector::Attribute(
        LocalName::from("type"),
        AttrOperation::Equals("checkbox".into()),
    )]);
    assert_eq!(names(&doc, checkbox), vec!["input"]);

    let dashed = compound(vec![SimpleSelector::Attribute(
        LocalName::from("data-kind"),
        AttrOperation::DashMatch("x".into()),
    )]);
    assert_eq!(names(&doc, dashed), vec!["li"]);

    let last = compound(vec![
        local("li"),
        SimpleSelector::LastChild,
        SimpleSelector::Negation(vec![SimpleSelector::FirstChild]),
    ]);
    assert_eq!(names(&doc, last), vec!["li"]);

    assert_eq!(names(&doc, compound(vec![SimpleSelector::Empty])), vec!["input"]);
    assert_eq!(names(&doc, compound(vec![SimpleSelector::Root])), vec!["html"]);
}

#[test]
fn matches_reports_a_bool() {
    let doc = document();
    let html = doc.first_child(doc.document_node()).unwrap();
    let selector = Selector::new(compound(vec![SimpleSelector::Root]));
    assert!(selector.matches(&doc, html));
    assert!(!selector.matches(&doc, doc.document_node()));
}
