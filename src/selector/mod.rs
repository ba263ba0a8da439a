// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Selector matching against the parsed tree.
//!
//! Selectors are built in code; there is no CSS parser. Matching runs right
//! to left and reports one of four results at every combinator, so that a
//! failed sibling or ancestor walk can stop early instead of retrying from
//! every starting point.

use phf::phf_set;

use crate::dom::{Document, NodeData, NodeId};
use crate::interface::Quirks;
use crate::LocalName;

/// The outcome of matching a selector suffix against one element.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum SelectorMatch {
    Matches,
    /// This element fails; another candidate may still match.
    FailsLocally,
    /// No earlier sibling can match either.
    FailsAllSiblings,
    /// No candidate further along the walk can match.
    FailsCompletely,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    LaterSibling,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum AttrOperation {
    /// `[attr]`
    Exists,
    /// `[attr=value]`
    Equals(String),
    /// `[attr~=value]`
    Includes(String),
    /// `[attr|=value]`
    DashMatch(String),
    /// `[attr^=value]`
    Prefix(String),
    /// `[attr$=value]`
    Suffix(String),
    /// `[attr*=value]`
    Substring(String),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum SimpleSelector {
    LocalName(LocalName),
    Universal,
    Id(String),
    Class(String),
    Attribute(LocalName, AttrOperation),
    /// Matches unless every inner selector matches.
    Negation(Vec<SimpleSelector>),
    FirstChild,
    LastChild,
    Empty,
    Root,
}

/// A sequence of simple selectors, linked to the compound on its left.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CompoundSelector {
    pub simple_selectors: Vec<SimpleSelector>,
    pub next: Option<(Box<CompoundSelector>, Combinator)>,
}

impl CompoundSelector {
    pub fn new(simple_selectors: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector {
            simple_selectors,
            next: None,
        }
    }

    fn with_next(mut self, combinator: Combinator, left: CompoundSelector) -> CompoundSelector {
        self.next = Some((Box::new(left), combinator));
        self
    }

    /// `left self`
    pub fn descendant_of(self, left: CompoundSelector) -> CompoundSelector {
        self.with_next(Combinator::Descendant, left)
    }

    /// `left > self`
    pub fn child_of(self, left: CompoundSelector) -> CompoundSelector {
        self.with_next(Combinator::Child, left)
    }

    /// `left + self`
    pub fn next_sibling_of(self, left: CompoundSelector) -> CompoundSelector {
        self.with_next(Combinator::NextSibling, left)
    }

    /// `left ~ self`
    pub fn later_sibling_of(self, left: CompoundSelector) -> CompoundSelector {
        self.with_next(Combinator::LaterSibling, left)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Selector {
    pub compound_selectors: CompoundSelector,
}

impl Selector {
    pub fn new(compound_selectors: CompoundSelector) -> Selector {
        Selector { compound_selectors }
    }

    pub fn matches(&self, document: &Document, element: NodeId) -> bool {
        document.is_element(element)
            && SelectorChecker::new(document).match_compound(&self.compound_selectors, element)
                == SelectorMatch::Matches
    }

    /// Elements under `root` (not `root` itself) that match, in document order.
    pub fn select_all(&self, document: &Document, root: NodeId) -> Vec<NodeId> {
        let checker = SelectorChecker::new(document);
        let mut found = vec![];
        let mut pending: Vec<NodeId> = document.children(root).iter().rev().cloned().collect();
        while let Some(node) = pending.pop() {
            if document.is_element(node)
                && checker.match_compound(&self.compound_selectors, node) == SelectorMatch::Matches
            {
                found.push(node);
            }
            pending.extend(document.children(node).iter().rev().cloned());
        }
        found
    }
}

// Attribute values of HTML elements compared ASCII-case-insensitively.
static CASE_INSENSITIVE_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    "accept", "accept-charset", "align", "alink", "axis", "bgcolor", "charset",
    "checked", "clear", "codetype", "color", "compact", "declare", "defer", "dir",
    "direction", "disabled", "enctype", "face", "frame", "hreflang", "http-equiv",
    "lang", "language", "link", "media", "method", "multiple", "nohref", "noresize",
    "noshade", "nowrap", "readonly", "rel", "rev", "rules", "scope", "scrolling",
    "selected", "shape", "target", "text", "type", "valign", "valuetype", "vlink",
};

static WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0C'];

fn equals(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn starts_with(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    haystack
        .get(..needle.len())
        .map_or(false, |start| equals(start, needle, case_insensitive))
}

fn ends_with(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    haystack.len() >= needle.len()
        && haystack
            .get(haystack.len() - needle.len()..)
            .map_or(false, |end| equals(end, needle, case_insensitive))
}

fn contains(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    } else {
        haystack.contains(needle)
    }
}

struct SelectorChecker<'a> {
    document: &'a Document,
    quirks: bool,
}

impl<'a> SelectorChecker<'a> {
    fn new(document: &'a Document) -> SelectorChecker<'a> {
        SelectorChecker {
            document,
            quirks: document.quirks_mode() == Quirks,
        }
    }

    fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.document
            .parent(node)
            .filter(|&parent| self.document.is_element(parent))
    }

    fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.document.previous_sibling(node);
        while let Some(sibling) = current {
            if self.document.is_element(sibling) {
                return Some(sibling);
            }
            current = self.document.previous_sibling(sibling);
        }
        None
    }

    fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.document.next_sibling(node);
        while let Some(sibling) = current {
            if self.document.is_element(sibling) {
                return Some(sibling);
            }
            current = self.document.next_sibling(sibling);
        }
        None
    }

    fn match_compound(&self, selector: &CompoundSelector, element: NodeId) -> SelectorMatch {
        if !selector
            .simple_selectors
            .iter()
            .all(|simple| self.match_simple(simple, element))
        {
            return SelectorMatch::FailsLocally;
        }

        let (next, combinator) = match selector.next {
            None => return SelectorMatch::Matches,
            Some((ref next, combinator)) => (&**next, combinator),
        };

        match combinator {
            Combinator::Descendant => {
                let mut ancestor = self.parent_element(element);
                while let Some(candidate) = ancestor {
                    match self.match_compound(next, candidate) {
                        result @ SelectorMatch::Matches | result @ SelectorMatch::FailsCompletely => {
                            return result
                        },
                        _ => (),
                    }
                    ancestor = self.parent_element(candidate);
                }
                SelectorMatch::FailsCompletely
            },
            Combinator::Child => match self.parent_element(element) {
                Some(parent) => self.match_compound(next, parent),
                None => SelectorMatch::FailsCompletely,
            },
            Combinator::NextSibling => match self.previous_element_sibling(element) {
                Some(previous) => self.match_compound(next, previous),
                None => SelectorMatch::FailsAllSiblings,
            },
            Combinator::LaterSibling => {
                let mut sibling = self.previous_element_sibling(element);
                while let Some(candidate) = sibling {
                    match self.match_compound(next, candidate) {
                        SelectorMatch::FailsLocally => (),
                        result => return result,
                    }
                    sibling = self.previous_element_sibling(candidate);
                }
                SelectorMatch::FailsAllSiblings
            },
        }
    }

    fn match_simple(&self, selector: &SimpleSelector, element: NodeId) -> bool {
        let elem = match self.document.element(element) {
            Some(elem) => elem,
            None => return false,
        };
        let is_html = elem.name.ns == ns!(html);

        match *selector {
            SimpleSelector::Universal => true,
            SimpleSelector::LocalName(ref name) => {
                equals(&elem.name.local, name, is_html)
            },
            SimpleSelector::Id(ref id) => elem
                .attr("id")
                .map_or(false, |value| equals(value, id, self.quirks)),
            SimpleSelector::Class(ref class) => elem.attr("class").map_or(false, |value| {
                value
                    .split(WHITESPACE)
                    .any(|c| !c.is_empty() && equals(c, class, self.quirks))
            }),
            SimpleSelector::Attribute(ref name, ref operation) => {
                let attr = elem.attrs.iter().find(|attr| {
                    attr.name.ns == ns!() && equals(&attr.name.local, name, is_html)
                });
                let value = match attr {
                    Some(attr) => &*attr.value,
                    None => return false,
                };
                let case_insensitive = is_html
                    && CASE_INSENSITIVE_ATTRIBUTES.contains(&*name.to_ascii_lowercase());
                match *operation {
                    AttrOperation::Exists => true,
                    AttrOperation::Equals(ref v) => equals(value, v, case_insensitive),
                    AttrOperation::Includes(ref v) => {
                        !v.is_empty()
                            && !v.contains(WHITESPACE)
                            && value.split(WHITESPACE).any(|w| equals(w, v, case_insensitive))
                    },
                    AttrOperation::DashMatch(ref v) => {
                        equals(value, v, case_insensitive)
                            || (starts_with(value, v, case_insensitive)
                                && value[v.len()..].starts_with('-'))
                    },
                    AttrOperation::Prefix(ref v) => {
                        !v.is_empty() && starts_with(value, v, case_insensitive)
                    },
                    AttrOperation::Suffix(ref v) => {
                        !v.is_empty() && ends_with(value, v, case_insensitive)
                    },
                    AttrOperation::Substring(ref v) => {
                        !v.is_empty() && contains(value, v, case_insensitive)
                    },
                }
            },
            SimpleSelector::Negation(ref negated) => {
                !negated.iter().all(|s| self.match_simple(s, element))
            },
            SimpleSelector::FirstChild => {
                self.document.parent(element).is_some()
                    && self.previous_element_sibling(element).is_none()
            },
            SimpleSelector::LastChild => {
                self.document.parent(element).is_some()
                    && self.next_element_sibling(element).is_none()
            },
            SimpleSelector::Empty => self.document.children(element).iter().all(|&child| {
                match *self.document.data(child) {
                    NodeData::Element(_) => false,
                    NodeData::Text { ref contents } => contents.is_empty(),
                    _ => true,
                }
            }),
            SimpleSelector::Root => self.document.parent(element) == Some(self.document.document_node()),
        }
    }
}
