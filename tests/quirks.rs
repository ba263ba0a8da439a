// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use html5construct::construction::ConstructionSiteOpts;
use html5construct::tendril::StrTendril;
use html5construct::{ConstructionSite, Doctype, LimitedQuirks, NoQuirks, Quirks, QuirksMode};

fn doctype(name: &str, public_id: Option<&str>, system_id: Option<&str>) -> Doctype {
    Doctype {
        name: Some(StrTendril::from_slice(name)),
        public_id: public_id.map(StrTendril::from_slice),
        system_id: system_id.map(StrTendril::from_slice),
        force_quirks: false,
    }
}

fn mode_for(doctype: Doctype) -> QuirksMode {
    let mut site = ConstructionSite::new(Default::default());
    site.insert_doctype(doctype);
    site.execute_queued_tasks();
    let mode = site.quirks_mode();
    assert_eq!(site.document().unwrap().quirks_mode(), mode);
    mode
}

macro_rules! quirks_test {
    ($name:ident, $mode:expr, $doctype_name:expr, $public:expr, $system:expr) => {
        #[test]
        fn $name() {
            assert_eq!(mode_for(doctype($doctype_name, $public, $system)), $mode);
        }
    };
}

quirks_test!(html5, NoQuirks, "html", None, None);
quirks_test!(name_is_case_insensitive, NoQuirks, "HTML", None, None);
quirks_test!(other_name, Quirks, "htmlx", None, None);
quirks_test!(
    exact_public_id,
    Quirks,
    "html",
    Some("-//W3O//DTD W3 HTML Strict 3.0//EN//"),
    None
);
quirks_test!(
    exact_system_id,
    Quirks,
    "html",
    None,
    Some("http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd")
);
quirks_test!(
    quirky_prefix_any_case,
    Quirks,
    "html",
    Some("-//w3c//DTD HTML 3.2 Final//EN"),
    None
);
quirks_test!(
    xhtml_transitional,
    LimitedQuirks,
    "html",
    Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
    Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd")
);
quirks_test!(
    html4_transitional_without_system_id,
    Quirks,
    "html",
    Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
    None
);
quirks_test!(
    html4_transitional_with_system_id,
    LimitedQuirks,
    "html",
    Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
    Some("http://www.w3.org/TR/html4/loose.dtd")
);
quirks_test!(
    html4_strict,
    NoQuirks,
    "html",
    Some("-//W3C//DTD HTML 4.01//EN"),
    Some("http://www.w3.org/TR/html4/strict.dtd")
);

#[test]
fn force_quirks_wins() {
    let mut forced = doctype("html", None, None);
    forced.force_quirks = true;
    assert_eq!(mode_for(forced), Quirks);
}

#[test]
fn missing_doctype_means_quirks() {
    let mut site = ConstructionSite::new(Default::default());
    site.set_default_compatibility_mode();
    assert!(site.in_quirks_mode());

    let mut fragment = ConstructionSite::new_fragment(Default::default());
    fragment.set_default_compatibility_mode();
    assert!(!fragment.in_quirks_mode());
}

#[test]
fn fragments_keep_the_context_mode() {
    let opts = ConstructionSiteOpts {
        quirks_mode: LimitedQuirks,
        ..Default::default()
    };
    let mut site = ConstructionSite::new_fragment(opts);
    site.insert_doctype(doctype("html", Some("-//IETF//DTD HTML//EN"), None));
    assert_eq!(site.quirks_mode(), LimitedQuirks);
}

#[test]
fn bad_doctypes_are_parse_errors() {
    let mut site = ConstructionSite::new(Default::default());
    site.insert_doctype(doctype("html", None, None));
    assert!(site.document().unwrap().errors.is_empty());

    let mut site = ConstructionSite::new(Default::default());
    site.insert_doctype(doctype("html", Some("-//IETF//DTD HTML//EN"), None));
    assert_eq!(site.document().unwrap().errors.len(), 1);
}

#[test]
fn locked_document_mode_is_not_overwritten() {
    let mut site = ConstructionSite::new(Default::default());
    site.document_mut().unwrap().lock_quirks_mode();
    site.insert_doctype(doctype("html", Some("-//IETF//DTD HTML//EN"), None));
    assert!(site.in_quirks_mode());
    assert_eq!(site.document().unwrap().quirks_mode(), NoQuirks);
}

#[test]
fn compatibility_mode_is_settled_once() {
    let mut site = ConstructionSite::new(Default::default());
    site.insert_doctype(doctype("html", None, None));
    assert_eq!(site.quirks_mode(), NoQuirks);

    site.insert_doctype(doctype("html", Some("-//W3C//DTD HTML 3.2//EN"), None));
    site.set_default_compatibility_mode();
    site.set_compatibility_mode(Quirks);
    assert_eq!(site.quirks_mode(), NoQuirks);

    let doc = site.document().unwrap();
    assert_eq!(doc.quirks_mode(), NoQuirks);
    assert!(doc.is_quirks_mode_locked());
    // Bad DOCTYPE, then a DOCTYPE after the mode was set.
    assert_eq!(doc.errors.len(), 2);
}

#[test]
fn missing_doctype_mode_survives_a_later_doctype() {
    let mut site = ConstructionSite::new(Default::default());
    site.set_default_compatibility_mode();
    site.insert_doctype(doctype("html", None, None));
    assert!(site.in_quirks_mode());
    assert_eq!(site.document().unwrap().quirks_mode(), Quirks);
}

#[test]
fn doctype_node_is_attached_to_the_document() {
    let mut site = ConstructionSite::new(Default::default());
    site.insert_doctype(doctype(
        "html",
        Some("-//W3C//DTD HTML 4.01//EN"),
        Some("http://www.w3.org/TR/html4/strict.dtd"),
    ));
    site.execute_queued_tasks();
    let doc = site.document().unwrap();
    assert_eq!(
        html5construct::dom::dump::dump_document(doc),
        "| <!DOCTYPE html \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">\n"
    );
}
