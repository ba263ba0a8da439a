// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The stack of open elements.

use std::fmt;
use std::rc::Rc;

use super::tag_sets::*;
use crate::dom::NodeId;
use crate::interface::{Attribute, ExpandedName, QualName};
use crate::LocalName;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Element,
    DocumentFragment,
}

/// An entry on the stack of open elements, shared with the list of active
/// formatting elements.
///
/// Keeps the name and attributes the element was *created* with, which is
/// what reconstruction clones from.
pub struct StackItem {
    node: NodeId,
    name: QualName,
    attrs: Vec<Attribute>,
    kind: ItemKind,
}

impl StackItem {
    pub fn for_element(node: NodeId, name: QualName, attrs: Vec<Attribute>) -> Rc<StackItem> {
        Rc::new(StackItem {
            node,
            name,
            attrs,
            kind: ItemKind::Element,
        })
    }

    pub fn for_fragment(node: NodeId) -> Rc<StackItem> {
        Rc::new(StackItem {
            node,
            name: QualName::new(None, ns!(), LocalName::from("")),
            attrs: vec![],
            kind: ItemKind::DocumentFragment,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &QualName {
        &self.name
    }

    pub fn expanded(&self) -> ExpandedName {
        self.name.expanded()
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_element(&self) -> bool {
        self.kind == ItemKind::Element
    }

    pub fn is_document_fragment(&self) -> bool {
        self.kind == ItemKind::DocumentFragment
    }

    /// Is this an HTML element with the given local name?
    pub fn is_html(&self, local: &LocalName) -> bool {
        self.is_element() && self.name.ns == ns!(html) && self.name.local == *local
    }

    pub fn causes_foster_parenting(&self) -> bool {
        self.is_element() && causes_foster_parenting(self.expanded())
    }

    /// Same name, namespace and attribute set, ignoring attribute order.
    pub fn matches_for_noahs_ark(&self, other: &StackItem) -> bool {
        if self.name.ns != other.name.ns
            || self.name.local != other.name.local
            || self.attrs.len() != other.attrs.len()
        {
            return false;
        }
        self.attrs.iter().all(|a| other.attrs.contains(a))
    }
}

impl fmt::Debug for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ItemKind::Element => write!(f, "<{:?}>{:?}", self.name, self.node),
            ItemKind::DocumentFragment => write!(f, "#fragment{:?}", self.node),
        }
    }
}

/// The stack of open elements, with cached handles on the root, `<html>`,
/// `<head>` and `<body>` entries.
#[derive(Default)]
pub struct OpenElements {
    items: Vec<Rc<StackItem>>,
    root: Option<NodeId>,
    html: Option<NodeId>,
    head: Option<Rc<StackItem>>,
    body: Option<NodeId>,
}

impl OpenElements {
    pub fn new() -> OpenElements {
        OpenElements::default()
    }

    // Pushing

    pub fn push_root_node(&mut self, item: Rc<StackItem>) {
        debug_assert!(self.items.is_empty());
        self.root = Some(item.node());
        self.items.push(item);
    }

    pub fn push_html_html_element(&mut self, item: Rc<StackItem>) {
        debug_assert!(self.html.is_none());
        self.html = Some(item.node());
        self.push_root_node(item);
    }

    pub fn push_html_head_element(&mut self, item: Rc<StackItem>) {
        debug_assert!(self.head.is_none());
        self.head = Some(item.clone());
        self.items.push(item);
    }

    pub fn push_html_body_element(&mut self, item: Rc<StackItem>) {
        debug_assert!(self.body.is_none());
        self.body = Some(item.node());
        self.items.push(item);
    }

    pub fn push(&mut self, item: Rc<StackItem>) {
        self.items.push(item);
    }

    /// Insert `item` directly above the entry for `below`.
    pub fn insert_above(&mut self, item: Rc<StackItem>, below: NodeId) -> bool {
        match self.find(below) {
            Some(i) => {
                self.items.insert(i + 1, item);
                true
            },
            None => false,
        }
    }

    // Popping

    fn forget(&mut self, item: &StackItem) {
        let node = item.node();
        if self.html == Some(node) {
            self.html = None;
        }
        if self.head.as_ref().map(|h| h.node()) == Some(node) {
            self.head = None;
        }
        if self.body == Some(node) {
            self.body = None;
        }
        if self.root == Some(node) {
            self.root = None;
        }
    }

    pub fn pop(&mut self) -> Option<Rc<StackItem>> {
        let item = self.items.pop()?;
        self.forget(&item);
        Some(item)
    }

    pub fn pop_html_head_element(&mut self) -> Option<Rc<StackItem>> {
        match self.top() {
            Some(top) if Some(top.node()) == self.head.as_ref().map(|h| h.node()) => self.pop(),
            _ => None,
        }
    }

    pub fn pop_html_body_element(&mut self) -> Option<Rc<StackItem>> {
        match self.top() {
            Some(top) if Some(top.node()) == self.body => self.pop(),
            _ => None,
        }
    }

    /// Pop until an HTML element named `local` is on top; it stays on the stack.
    pub fn pop_until(&mut self, local: &LocalName) -> Vec<Rc<StackItem>> {
        let mut popped = vec![];
        while let Some(top) = self.top() {
            if top.is_html(local) {
                break;
            }
            popped.extend(self.pop());
        }
        popped
    }

    /// Pop up to and including the topmost HTML element named `local`.
    pub fn pop_until_popped(&mut self, local: &LocalName) -> Vec<Rc<StackItem>> {
        let mut popped = self.pop_until(local);
        popped.extend(self.pop());
        popped
    }

    /// Pop up to and including `node`.
    pub fn pop_until_node_popped(&mut self, node: NodeId) -> Vec<Rc<StackItem>> {
        let mut popped = vec![];
        if !self.contains(node) {
            return popped;
        }
        while let Some(item) = self.pop() {
            let done = item.node() == node;
            popped.push(item);
            if done {
                break;
            }
        }
        popped
    }

    /// Pop every entry, topmost first.
    pub fn pop_all(&mut self) -> Vec<Rc<StackItem>> {
        let mut popped = vec![];
        while let Some(item) = self.pop() {
            popped.push(item);
        }
        popped
    }

    pub fn remove(&mut self, node: NodeId) -> Option<Rc<StackItem>> {
        let i = self.find(node)?;
        let item = self.items.remove(i);
        self.forget(&item);
        Some(item)
    }

    /// Replace the entry for `old` with `new`, keeping its position.
    pub fn replace(&mut self, old: NodeId, new: Rc<StackItem>) -> bool {
        let i = match self.find(old) {
            Some(i) => i,
            None => return false,
        };
        let previous = std::mem::replace(&mut self.items[i], new);
        if self.head.as_ref().map(|h| h.node()) == Some(previous.node()) {
            self.head = Some(self.items[i].clone());
        }
        true
    }

    // Queries

    pub fn top(&self) -> Option<&Rc<StackItem>> {
        self.items.last()
    }

    pub fn top_node(&self) -> Option<NodeId> {
        self.top().map(|t| t.node())
    }

    pub fn one_below_top(&self) -> Option<&Rc<StackItem>> {
        let len = self.items.len();
        if len < 2 {
            return None;
        }
        self.items.get(len - 2)
    }

    /// Index of `node` from the bottom of the stack.
    pub fn find(&self, node: NodeId) -> Option<usize> {
        self.items.iter().rposition(|item| item.node() == node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.find(node).is_some()
    }

    /// The topmost HTML element named `local`, with its index.
    pub fn topmost(&self, local: &LocalName) -> Option<(usize, &Rc<StackItem>)> {
        self.items
            .iter()
            .enumerate()
            .rev()
            .find(|(_, item)| item.is_html(local))
    }

    fn in_specific_scope<TagSet, Pred>(&self, scope: TagSet, pred: Pred) -> bool
    where
        TagSet: Fn(ExpandedName) -> bool,
        Pred: Fn(&StackItem) -> bool,
    {
        for item in self.items.iter().rev() {
            if pred(item) {
                return true;
            }
            if item.is_element() && scope(item.expanded()) {
                return false;
            }
        }
        false
    }

    pub fn in_scope(&self, local: &LocalName) -> bool {
        self.in_specific_scope(default_scope, |item| item.is_html(local))
    }

    pub fn node_in_scope(&self, node: NodeId) -> bool {
        self.in_specific_scope(default_scope, |item| item.node() == node)
    }

    pub fn in_button_scope(&self, local: &LocalName) -> bool {
        self.in_specific_scope(button_scope, |item| item.is_html(local))
    }

    pub fn in_list_item_scope(&self, local: &LocalName) -> bool {
        self.in_specific_scope(list_item_scope, |item| item.is_html(local))
    }

    pub fn in_table_scope(&self, local: &LocalName) -> bool {
        self.in_specific_scope(table_scope, |item| item.is_html(local))
    }

    pub fn in_select_scope(&self, local: &LocalName) -> bool {
        self.in_specific_scope(select_scope, |item| item.is_html(local))
    }

    pub fn has_only_one_element(&self) -> bool {
        self.items.len() == 1
    }

    pub fn second_element_is_html_body_element(&self) -> bool {
        self.items.len() >= 2 && Some(self.items[1].node()) == self.body
    }

    pub fn has_template_in_html_scope(&self) -> bool {
        self.in_scope(&local_name!("template"))
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.root
    }

    pub fn html_element(&self) -> Option<NodeId> {
        self.html
    }

    pub fn head_stack_item(&self) -> Option<&Rc<StackItem>> {
        self.head.as_ref()
    }

    pub fn body_element(&self) -> Option<NodeId> {
        self.body
    }

    pub fn stack_depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<Rc<StackItem>> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a OpenElements {
    type IntoIter = std::slice::Iter<'a, Rc<StackItem>>;
    type Item = &'a Rc<StackItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Debug for OpenElements {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{OpenElements, StackItem};
    use crate::dom::Document;
    use crate::interface::QualName;
    use std::rc::Rc;

    fn item(doc: &mut Document, local: &str) -> Rc<StackItem> {
        let name = QualName::html(local.into());
        let node = doc.create_element(name.clone(), vec![]);
        StackItem::for_element(node, name, vec![])
    }

    fn stack_of(doc: &mut Document, names: &[&str]) -> OpenElements {
        let mut stack = OpenElements::new();
        let html = item(doc, names[0]);
        stack.push_html_html_element(html);
        for name in &names[1..] {
            let item = item(doc, name);
            match *name {
                "head" => stack.push_html_head_element(item),
                "body" => stack.push_html_body_element(item),
                _ => stack.push(item),
            }
        }
        stack
    }

    #[test]
    fn tracks_special_elements() {
        let mut doc = Document::new();
        let mut stack = stack_of(&mut doc, &["html", "head"]);
        assert!(stack.head_stack_item().is_some());
        assert!(stack.pop_html_head_element().is_some());
        assert!(stack.head_stack_item().is_none());

        let body = item(&mut doc, "body");
        stack.push_html_body_element(body.clone());
        assert!(stack.second_element_is_html_body_element());
        assert_eq!(stack.body_element(), Some(body.node()));
        stack.pop();
        assert_eq!(stack.body_element(), None);
        assert!(stack.has_only_one_element());
        assert!(stack.html_element().is_some());
    }

    #[test]
    fn scoped_queries() {
        let mut doc = Document::new();
        let stack = stack_of(&mut doc, &["html", "body", "p", "table", "tbody", "tr", "td", "b"]);

        assert!(stack.in_scope(&local_name!("b")));
        assert!(stack.in_scope(&local_name!("td")));
        assert!(!stack.in_scope(&local_name!("p")));
        assert!(stack.in_table_scope(&local_name!("td")));
        assert!(!stack.in_table_scope(&local_name!("body")));
        assert!(!stack.in_button_scope(&local_name!("p")));

        let (index, table) = stack.topmost(&local_name!("table")).unwrap();
        assert_eq!(index, 3);
        assert!(table.causes_foster_parenting());
        assert_eq!(stack.stack_depth(), 8);
    }

    #[test]
    fn select_scope_only_sees_through_options() {
        let mut doc = Document::new();
        let stack = stack_of(&mut doc, &["html", "body", "select", "optgroup", "option"]);
        assert!(stack.in_select_scope(&local_name!("select")));

        let stack = stack_of(&mut doc, &["html", "body", "select", "div"]);
        assert!(!stack.in_select_scope(&local_name!("select")));
    }

    #[test]
    fn pop_until_popped_stops_at_named_element() {
        let mut doc = Document::new();
        let mut stack = stack_of(&mut doc, &["html", "body", "ul", "li", "p", "b"]);
        let popped = stack.pop_until_popped(&local_name!("li"));
        assert_eq!(popped.len(), 3);
        assert!(popped[2].is_html(&local_name!("li")));
        assert!(stack.top().unwrap().is_html(&local_name!("ul")));

        let popped = stack.pop_until(&local_name!("body"));
        assert_eq!(popped.len(), 1);
        assert_eq!(stack.pop_all().len(), 2);
        assert!(stack.is_empty());
        assert!(stack.html_element().is_none());
    }

    #[test]
    fn replace_and_insert_above() {
        let mut doc = Document::new();
        let mut stack = stack_of(&mut doc, &["html", "body", "b"]);
        let b = stack.top().unwrap().node();
        let i = item(&mut doc, "i");
        assert!(stack.replace(b, i.clone()));
        assert!(!stack.contains(b));
        assert_eq!(stack.top_node(), Some(i.node()));

        let u = item(&mut doc, "u");
        let body = stack.body_element().unwrap();
        assert!(stack.insert_above(u.clone(), body));
        assert_eq!(stack.one_below_top().unwrap().node(), u.node());
        assert!(stack.remove(u.node()).is_some());
        assert_eq!(stack.stack_depth(), 3);
    }

    #[test]
    fn noahs_ark_ignores_attribute_order() {
        use crate::interface::Attribute;
        let mut doc = Document::new();
        let name = QualName::html(local_name!("b"));
        let first = doc.create_element(name.clone(), vec![]);
        let second = doc.create_element(name.clone(), vec![]);
        let a = StackItem::for_element(
            first,
            name.clone(),
            vec![Attribute::new("id", "1"), Attribute::new("class", "x")],
        );
        let b = StackItem::for_element(
            second,
            name.clone(),
            vec![Attribute::new("class", "x"), Attribute::new("id", "1")],
        );
        let c = StackItem::for_element(second, name, vec![Attribute::new("id", "1")]);
        assert!(a.matches_for_noahs_ark(&b));
        assert!(!a.matches_for_noahs_ark(&c));
    }
}
