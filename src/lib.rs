// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The HTML5 tree construction site.
//!
//! This crate sits between an HTML tree-builder state machine and the DOM.
//! The state machine classifies each token and calls one operation on a
//! [`ConstructionSite`]; the site decides where the resulting node lands
//! (current node, foster parent, or a shallower ancestor when the tree is
//! pathologically deep), keeps the stack of open elements and the list of
//! active formatting elements, determines the document's quirks mode, and
//! queues the actual insertions so that synchronous script run by an
//! insertion cannot corrupt work that is still pending.
//!
//! [`ConstructionSite`]: construction::ConstructionSite

#[macro_use]
extern crate log;
#[macro_use]
extern crate mac;

extern crate phf;
extern crate string_cache;
pub extern crate tendril;

include!(concat!(env!("OUT_DIR"), "/generated.rs"));

#[macro_use]
pub mod interface;

pub mod construction;
pub mod dom;
pub mod selector;
pub mod tokens;

pub use construction::{
    ConstructionSite, ConstructionSiteOpts, ParserContentPolicy, ScriptContext, ScriptHost,
    WhitespaceMode,
};
pub use dom::{Document, NodeId};
pub use interface::{Attribute, ExpandedName, LimitedQuirks, NoQuirks, QualName, Quirks, QuirksMode};
pub use selector::{CompoundSelector, Selector, SelectorMatch, SimpleSelector};
pub use tokens::{Doctype, EndTag, StartTag, Tag, TagKind};
