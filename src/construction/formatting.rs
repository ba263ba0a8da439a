// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The list of active formatting elements.

use std::rc::Rc;

use super::stack::{OpenElements, StackItem};
use crate::dom::NodeId;
use crate::LocalName;

/// Identical entries allowed after the last marker.
const NOAHS_ARK_CAPACITY: usize = 3;

#[derive(Debug, Clone)]
pub enum FormatEntry {
    Element(Rc<StackItem>),
    Marker,
}

impl FormatEntry {
    pub fn is_marker(&self) -> bool {
        matches!(*self, FormatEntry::Marker)
    }

    pub fn item(&self) -> Option<&Rc<StackItem>> {
        match *self {
            FormatEntry::Element(ref item) => Some(item),
            FormatEntry::Marker => None,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.item().map(|item| item.node())
    }
}

/// Where [`ActiveFormattingElements::swap_to`] puts the new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bookmark {
    /// Replace the entry for this node in place.
    Replace(NodeId),
    /// Insert after the entry for this node, then drop the old entry.
    InsertAfter(NodeId),
}

impl Bookmark {
    pub fn move_to_after(&mut self, node: NodeId) {
        *self = Bookmark::InsertAfter(node);
    }
}

#[derive(Debug, Default)]
pub struct ActiveFormattingElements {
    entries: Vec<FormatEntry>,
}

impl ActiveFormattingElements {
    pub fn new() -> ActiveFormattingElements {
        ActiveFormattingElements::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&FormatEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<FormatEntry> {
        self.entries.iter()
    }

    pub fn find_index(&self, node: NodeId) -> Option<usize> {
        self.entries.iter().rposition(|e| e.node() == Some(node))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.find_index(node).is_some()
    }

    /// The last element named `local` after the last marker.
    pub fn closest_element_in_scope_with_name(&self, local: &LocalName) -> Option<&Rc<StackItem>> {
        self.entries
            .iter()
            .rev()
            .take_while(|e| !e.is_marker())
            .filter_map(FormatEntry::item)
            .find(|item| item.is_html(local))
    }

    pub fn append(&mut self, item: Rc<StackItem>) {
        self.ensure_noahs_ark_condition(&item);
        self.entries.push(FormatEntry::Element(item));
    }

    pub fn append_marker(&mut self) {
        self.entries.push(FormatEntry::Marker);
    }

    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.find_index(node) {
            Some(i) => {
                self.entries.remove(i);
                true
            },
            None => false,
        }
    }

    pub fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry.is_marker() {
                break;
            }
        }
    }

    pub fn bookmark_for(&self, node: NodeId) -> Bookmark {
        debug_assert!(self.contains(node));
        Bookmark::Replace(node)
    }

    /// Swap the entry for `old` to `new`, at the position `bookmark` names.
    pub fn swap_to(&mut self, old: NodeId, new: Rc<StackItem>, bookmark: Bookmark) {
        debug_assert!(!self.contains(new.node()));
        match bookmark {
            Bookmark::Replace(mark) => {
                if let Some(i) = self.find_index(mark) {
                    self.entries[i] = FormatEntry::Element(new);
                }
            },
            Bookmark::InsertAfter(mark) => {
                let i = match self.find_index(mark) {
                    Some(i) => i + 1,
                    None => self.entries.len(),
                };
                self.entries.insert(i, FormatEntry::Element(new));
                self.remove(old);
            },
        }
    }

    /// Replace the element entry at `index`.
    pub fn replace_at(&mut self, index: usize, item: Rc<StackItem>) {
        debug_assert!(!self.entries[index].is_marker());
        self.entries[index] = FormatEntry::Element(item);
    }

    /// The start of the run of entries at the end of the list whose elements
    /// are not on the stack of open elements. `None` when there is nothing to
    /// reconstruct.
    pub fn first_unopen_index(&self, open_elems: &OpenElements) -> Option<usize> {
        let len = self.entries.len();
        let mut index = len;
        while index > 0 {
            index -= 1;
            let open = match self.entries[index] {
                FormatEntry::Marker => true,
                FormatEntry::Element(ref item) => open_elems.contains(item.node()),
            };
            if open {
                let first = index + 1;
                return if first < len { Some(first) } else { None };
            }
        }
        if len == 0 {
            None
        } else {
            Some(0)
        }
    }

    fn ensure_noahs_ark_condition(&mut self, new: &StackItem) {
        let matching: Vec<NodeId> = self
            .entries
            .iter()
            .rev()
            .take_while(|e| !e.is_marker())
            .filter_map(FormatEntry::item)
            .filter(|item| item.matches_for_noahs_ark(new))
            .map(|item| item.node())
            .collect();

        if matching.len() >= NOAHS_ARK_CAPACITY {
            let earliest = matching[NOAHS_ARK_CAPACITY - 1];
            debug!("Noah's Ark clause drops {:?}", earliest);
            self.remove(earliest);
        }
    }
}
