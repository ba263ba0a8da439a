// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The token data handed to the construction site.
//!
//! Tokens are produced and classified upstream; the construction site only
//! reads their names, attributes and flags.

use crate::interface::Attribute;
use crate::tendril::StrTendril;
use crate::LocalName;

pub use self::TagKind::{EndTag, StartTag};

/// A `DOCTYPE` token.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Doctype {
    pub name: Option<StrTendril>,
    pub public_id: Option<StrTendril>,
    pub system_id: Option<StrTendril>,
    pub force_quirks: bool,
}

impl Doctype {
    pub fn new() -> Doctype {
        Doctype::default()
    }
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A tag token.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub kind: TagKind,
    pub name: LocalName,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

impl Tag {
    /// A start tag with no attributes.
    pub fn start(name: LocalName) -> Tag {
        Tag {
            kind: StartTag,
            name,
            self_closing: false,
            attrs: vec![],
        }
    }

    pub fn with_attrs(name: LocalName, attrs: Vec<Attribute>) -> Tag {
        Tag {
            attrs,
            ..Tag::start(name)
        }
    }

    pub fn self_closing(mut self) -> Tag {
        self.self_closing = true;
        self
    }

    /// Are the tags equivalent when we don't care about attribute order?
    /// Also ignores the self-closing flag.
    pub fn equiv_modulo_attr_order(&self, other: &Tag) -> bool {
        if self.kind != other.kind || self.name != other.name {
            return false;
        }

        let mut self_attrs = self.attrs.clone();
        let mut other_attrs = other.attrs.clone();
        self_attrs.sort();
        other_attrs.sort();

        self_attrs == other_attrs
    }

    pub fn get_attr(&self, local: &str) -> Option<&StrTendril> {
        self.attrs
            .iter()
            .find(|a| a.name.ns == ns!() && &*a.name.local == local)
            .map(|a| &a.value)
    }
}

#[cfg(test)]
mod tests {
    use super::Tag;
    use crate::interface::Attribute;

    #[test]
    fn attr_order_does_not_matter_for_equivalence() {
        let a = Tag::with_attrs(
            local_name!("b"),
            vec![Attribute::new("id", "x"), Attribute::new("class", "y")],
        );
        let b = Tag::with_attrs(
            local_name!("b"),
            vec![Attribute::new("class", "y"), Attribute::new("id", "x")],
        );
        assert!(a.equiv_modulo_attr_order(&b));
        assert!(!a.equiv_modulo_attr_order(&Tag::start(local_name!("b"))));
        assert_eq!(a.get_attr("class").map(|v| &**v), Some("y"));
    }
}
