// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Names, attributes and document modes shared by the DOM, the
//! construction site and the selector checker.

use std::fmt;

use crate::tendril::StrTendril;
use crate::{LocalName, Namespace, Prefix};

pub use self::QuirksMode::{LimitedQuirks, NoQuirks, Quirks};

/// A document's compatibility mode, selected from its DOCTYPE.
///
/// See the [quirks mode article](https://quirks.spec.whatwg.org/).
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug, Default)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    #[default]
    NoQuirks,
}

/// A borrowed view of an element or attribute name: namespace plus local name.
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct ExpandedName<'a> {
    pub ns: &'a Namespace,
    pub local: &'a LocalName,
}

impl<'a> fmt::Debug for ExpandedName<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ns.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}:{}", self.ns, self.local)
        }
    }
}

/// Build an [`ExpandedName`] from a namespace shorthand and a local name.
///
/// Usable as a pattern:
///
/// ```ignore
/// match name {
///     expanded_name!(html "table") => ...,
///     _ => ...,
/// }
/// ```
#[macro_export]
macro_rules! expanded_name {
    ("", $local: tt) => {
        $crate::interface::ExpandedName {
            ns: &ns!(),
            local: &local_name!($local),
        }
    };
    ($ns: ident $local: tt) => {
        $crate::interface::ExpandedName {
            ns: &ns!($ns),
            local: &local_name!($local),
        }
    };
}

/// A fully qualified name: optional prefix, namespace and local name.
///
/// Element names produced by the construction site always have no prefix;
/// attributes adjusted for foreign content (`xlink:href`) carry one.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct QualName {
    pub prefix: Option<Prefix>,
    pub ns: Namespace,
    pub local: LocalName,
}

impl QualName {
    #[inline]
    pub fn new(prefix: Option<Prefix>, ns: Namespace, local: LocalName) -> QualName {
        QualName { prefix, ns, local }
    }

    /// An element name in the HTML namespace.
    #[inline]
    pub fn html(local: LocalName) -> QualName {
        QualName::new(None, ns!(html), local)
    }

    /// An attribute name in the null namespace.
    #[inline]
    pub fn attr(local: LocalName) -> QualName {
        QualName::new(None, ns!(), local)
    }

    #[inline]
    pub fn expanded(&self) -> ExpandedName {
        ExpandedName {
            ns: &self.ns,
            local: &self.local,
        }
    }
}

impl fmt::Debug for QualName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{:?}", prefix, self.expanded()),
            None => write!(f, "{:?}", self.expanded()),
        }
    }
}

/// A tag attribute.
///
/// The namespace on the attribute name is almost always `ns!()`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub struct Attribute {
    pub name: QualName,
    pub value: StrTendril,
}

impl Attribute {
    /// An attribute in the null namespace.
    pub fn new(local: &str, value: &str) -> Attribute {
        Attribute {
            name: QualName::attr(LocalName::from(local)),
            value: StrTendril::from_slice(value),
        }
    }
}
