// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An arena-backed DOM.
//!
//! Every node lives in one `Vec` owned by the [`Document`] and is addressed
//! by a [`NodeId`]. Children are owned top-down through the parent's child
//! list; the parent link is navigation only. Destroying a node leaves a
//! tombstone behind, so a stale `NodeId` held by the construction site (or
//! by reentrant script) never dangles: it just stops being [alive].
//!
//! [alive]: Document::is_alive

use std::borrow::Cow;
use std::fmt;

use crate::interface::{Attribute, ExpandedName, QualName, QuirksMode};
use crate::tendril::StrTendril;

pub mod dump;

/// A handle to a node in a [`Document`] arena.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parser bookkeeping carried on an element.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ElementFlags {
    /// A `<form>` inserted where a form was already open.
    pub form_demoted: bool,
    /// Scripts: created by the parser rather than by script.
    pub parser_inserted: bool,
    /// Scripts: must never run (set for fragment parses).
    pub already_started: bool,
    /// The parser has popped this element, or it was self-closing.
    pub finished_parsing_children: bool,
    /// The element was inserted into a connected tree.
    pub attached: bool,
}

#[derive(Clone, Debug)]
pub struct ElementData {
    pub name: QualName,
    pub attrs: Vec<Attribute>,
    /// For HTML `<template>` elements, the document fragment holding the contents.
    pub template_contents: Option<NodeId>,
    /// The form this element was associated with during parsing.
    pub form_owner: Option<NodeId>,
    pub flags: ElementFlags,
}

impl ElementData {
    pub fn expanded_name(&self) -> ExpandedName {
        self.name.expanded()
    }

    pub fn attr(&self, local: &str) -> Option<&StrTendril> {
        self.attrs
            .iter()
            .find(|a| a.name.ns == ns!() && &*a.name.local == local)
            .map(|a| &a.value)
    }
}

/// The different kinds of nodes in the DOM.
#[derive(Clone, Debug)]
pub enum NodeData {
    /// The `Document` itself - the root node of an HTML document.
    Document,

    /// A fragment: the root of a fragment parse or a template's contents.
    DocumentFragment,

    /// A `DOCTYPE` with name, public id, and system id.
    Doctype {
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    },

    /// A text node.
    Text { contents: StrTendril },

    /// A comment.
    Comment { contents: StrTendril },

    /// An element with attributes.
    Element(ElementData),
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    alive: bool,
    pub data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Node {
        Node {
            parent: None,
            children: vec![],
            alive: true,
            data,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match self.data {
            NodeData::Element(ref elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    /// Can this node hold children?
    fn is_container(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document | NodeData::DocumentFragment | NodeData::Element(_)
        )
    }
}

/// A document being built: the node arena plus the per-document state the
/// parser establishes.
pub struct Document {
    nodes: Vec<Node>,
    quirks_mode: QuirksMode,
    quirks_mode_locked: bool,
    finished: bool,

    /// Parse errors, in the order they were reported.
    pub errors: Vec<Cow<'static, str>>,
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("quirks_mode", &self.quirks_mode)
            .field("errors", &self.errors)
            .finish()
    }
}

impl Document {
    /// A document containing only its `Document` node.
    pub fn new() -> Document {
        Document {
            nodes: vec![Node::new(NodeData::Document)],
            quirks_mode: QuirksMode::NoQuirks,
            quirks_mode_locked: false,
            finished: false,
            errors: vec![],
        }
    }

    /// The `Document` node.
    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    // Creation

    fn new_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached element. HTML `<template>` elements get an empty
    /// contents fragment.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let template_contents = if name.expanded() == expanded_name!(html "template") {
            Some(self.create_fragment())
        } else {
            None
        };
        self.new_node(NodeData::Element(ElementData {
            name,
            attrs,
            template_contents,
            form_owner: None,
            flags: ElementFlags::default(),
        }))
    }

    pub fn create_text(&mut self, contents: StrTendril) -> NodeId {
        self.new_node(NodeData::Text { contents })
    }

    pub fn create_comment(&mut self, contents: StrTendril) -> NodeId {
        self.new_node(NodeData::Comment { contents })
    }

    pub fn create_doctype(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) -> NodeId {
        self.new_node(NodeData::Doctype {
            name,
            public_id,
            system_id,
        })
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.new_node(NodeData::DocumentFragment)
    }

    // Access

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes[id.0].as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes[id.0].data {
            NodeData::Element(ref mut elem) => Some(elem),
            _ => None,
        }
    }

    pub fn elem_name(&self, id: NodeId) -> Option<ExpandedName> {
        self.element(id).map(ElementData::expanded_name)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn template_contents(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|e| e.template_contents)
    }

    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&StrTendril> {
        self.element(id).and_then(|e| e.attr(local))
    }

    pub fn text(&self, id: NodeId) -> Option<&StrTendril> {
        match self.nodes[id.0].data {
            NodeData::Text { ref contents } => Some(contents),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Navigation

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes[id.0].alive
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.first().cloned()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].children.last().cloned()
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let i = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == id)?;
        Some((parent, i))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, i) = self.index_in_parent(id)?;
        i.checked_sub(1).map(|i| self.nodes[parent.0].children[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, i) = self.index_in_parent(id)?;
        self.nodes[parent.0].children.get(i + 1).cloned()
    }

    /// Ancestors of `id`, nearest first, not including `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Number of ancestors.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Is `id` in the tree rooted at the `Document` node?
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.document_node() || self.ancestors(id).any(|a| a == self.document_node())
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Can `child` be inserted under `parent` without breaking the tree?
    fn can_insert(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_alive(parent)
            && self.is_alive(child)
            && self.nodes[parent.0].is_container()
            && child != self.document_node()
            && !self.is_inclusive_ancestor(child, parent)
    }

    // Mutation

    /// Append `child` as the last child of `parent`, removing it from its
    /// previous parent first. Returns `false` (and changes nothing) when the
    /// insertion would be invalid: a dead node, a non-container parent, or
    /// a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_insert(parent, child) {
            return false;
        }
        self.remove_from_parent(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Insert `child` under `parent` immediately before `sibling`.
    ///
    /// Returns `false` when `sibling` is no longer a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, sibling: NodeId) -> bool {
        if child == sibling
            || self.parent(sibling) != Some(parent)
            || !self.can_insert(parent, child)
        {
            return false;
        }
        self.remove_from_parent(child);
        let i = match self.nodes[parent.0].children.iter().position(|&c| c == sibling) {
            Some(i) => i,
            None => return false,
        };
        self.nodes[parent.0].children.insert(i, child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Detach `id` from its parent, if any.
    pub fn remove_from_parent(&mut self, id: NodeId) {
        if let Some((parent, i)) = self.index_in_parent(id) {
            self.nodes[parent.0].children.remove(i);
        }
        self.nodes[id.0].parent = None;
    }

    /// Remove `id` from the tree and kill it and its subtree. The handles
    /// stay valid; [`Document::is_alive`] reports `false` for them.
    pub fn destroy(&mut self, id: NodeId) {
        if id == self.document_node() {
            return;
        }
        self.remove_from_parent(id);
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let node = &mut self.nodes[next.0];
            node.alive = false;
            node.parent = None;
            pending.extend(node.children.drain(..));
            if let NodeData::Element(ElementData {
                template_contents: Some(contents),
                ..
            }) = node.data
            {
                pending.push(contents);
            }
        }
    }

    /// Move all children of `node` to the end of `new_parent`'s children.
    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        if self.is_inclusive_ancestor(node, new_parent) || !self.can_insert(new_parent, node) {
            return;
        }
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for &child in children.iter() {
            self.nodes[child.0].parent = Some(new_parent);
        }
        self.nodes[new_parent.0].children.extend(children);
    }

    /// Add each attribute whose name is not already present on `target`.
    /// Existing values are never overwritten.
    pub fn add_attrs_if_missing(&mut self, target: NodeId, attrs: Vec<Attribute>) {
        let elem = match self.element_mut(target) {
            Some(elem) => elem,
            None => return,
        };
        for attr in attrs {
            if !elem.attrs.iter().any(|a| a.name == attr.name) {
                elem.attrs.push(attr);
            }
        }
    }

    /// Append `text` to the text node `id`.
    pub fn append_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.nodes[id.0].data {
            NodeData::Text { ref mut contents } => {
                contents.push_slice(text);
                true
            },
            _ => false,
        }
    }

    pub fn finish_parsing_children(&mut self, id: NodeId) {
        if let Some(elem) = self.element_mut(id) {
            elem.flags.finished_parsing_children = true;
        }
    }

    pub fn mark_attached(&mut self, id: NodeId) {
        if let Some(elem) = self.element_mut(id) {
            elem.flags.attached = true;
        }
    }

    // Document state

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Set the compatibility mode unless it has been locked.
    pub fn set_quirks_mode(&mut self, mode: QuirksMode) -> bool {
        if self.quirks_mode_locked {
            return false;
        }
        self.quirks_mode = mode;
        true
    }

    /// Freeze the compatibility mode; later `set_quirks_mode` calls are ignored.
    pub fn lock_quirks_mode(&mut self) {
        self.quirks_mode_locked = true;
    }

    pub fn is_quirks_mode_locked(&self) -> bool {
        self.quirks_mode_locked
    }

    pub fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.errors.push(msg);
    }

    pub fn finish_parsing(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::interface::{Attribute, QualName};
    use crate::tendril::StrTendril;

    fn elem(doc: &mut Document, name: &str) -> super::NodeId {
        doc.create_element(QualName::html(name.into()), vec![])
    }

    #[test]
    fn append_and_insert_before() {
        let mut doc = Document::new();
        let root = doc.document_node();
        let html = elem(&mut doc, "html");
        let a = elem(&mut doc, "a");
        let b = elem(&mut doc, "b");

        assert!(doc.append_child(root, html));
        assert!(doc.append_child(html, b));
        assert!(doc.insert_before(html, a, b));
        assert_eq!(doc.children(html), &[a, b]);
        assert_eq!(doc.previous_sibling(b), Some(a));
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.depth(a), 2);
        assert!(doc.is_connected(a));
    }

    #[test]
    fn refuses_cycles_and_stale_siblings() {
        let mut doc = Document::new();
        let outer = elem(&mut doc, "div");
        let inner = elem(&mut doc, "span");
        let other = elem(&mut doc, "p");
        assert!(doc.append_child(outer, inner));
        assert!(!doc.append_child(inner, outer));
        assert!(!doc.insert_before(outer, other, other));
        assert!(!doc.insert_before(inner, other, outer));
        assert!(doc.parent(other).is_none());
    }

    #[test]
    fn destroy_leaves_tombstones() {
        let mut doc = Document::new();
        let root = doc.document_node();
        let div = elem(&mut doc, "div");
        let text = doc.create_text(StrTendril::from_slice("x"));
        doc.append_child(root, div);
        doc.append_child(div, text);

        doc.destroy(div);
        assert!(!doc.is_alive(div));
        assert!(!doc.is_alive(text));
        assert!(doc.children(root).is_empty());
        assert!(!doc.append_child(root, div));
    }

    #[test]
    fn template_gets_contents_fragment() {
        let mut doc = Document::new();
        let template = elem(&mut doc, "template");
        let contents = doc.template_contents(template).unwrap();
        assert!(doc.parent(contents).is_none());
        doc.destroy(template);
        assert!(!doc.is_alive(contents));
    }

    #[test]
    fn attrs_first_write_wins() {
        let mut doc = Document::new();
        let body = doc.create_element(
            QualName::html(local_name!("body")),
            vec![Attribute::new("class", "a")],
        );
        doc.add_attrs_if_missing(
            body,
            vec![Attribute::new("class", "b"), Attribute::new("id", "c")],
        );
        assert_eq!(doc.attribute(body, "class").map(|v| &**v), Some("a"));
        assert_eq!(doc.attribute(body, "id").map(|v| &**v), Some("c"));
    }

    #[test]
    fn locked_quirks_mode_is_sticky() {
        use crate::interface::QuirksMode::*;
        let mut doc = Document::new();
        assert!(doc.set_quirks_mode(Quirks));
        doc.lock_quirks_mode();
        assert!(!doc.set_quirks_mode(NoQuirks));
        assert_eq!(doc.quirks_mode(), Quirks);
    }
}
