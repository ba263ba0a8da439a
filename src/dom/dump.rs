// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The html5lib test-suite tree format.
//!
//! ```text
//! | <!DOCTYPE html>
//! | <html>
//! |   <head>
//! |   <body>
//! |     class="x"
//! |     "text"
//! ```

use std::iter::repeat;

use super::{Document, NodeData, NodeId};

/// Dump the children of `root` (not `root` itself).
pub fn dump_children(doc: &Document, root: NodeId) -> String {
    let mut buf = String::new();
    for &child in doc.children(root) {
        dump_node(doc, &mut buf, 1, child);
    }
    buf
}

/// Dump the whole document.
pub fn dump_document(doc: &Document) -> String {
    dump_children(doc, doc.document_node())
}

fn push_indent(buf: &mut String, indent: usize) {
    buf.push('|');
    buf.extend(repeat(' ').take(indent));
}

fn dump_node(doc: &Document, buf: &mut String, indent: usize, id: NodeId) {
    push_indent(buf, indent);

    match doc.data(id) {
        NodeData::Document | NodeData::DocumentFragment => buf.push_str("#fragment\n"),

        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            buf.push_str("<!DOCTYPE ");
            buf.push_str(name);
            if !public_id.is_empty() || !system_id.is_empty() {
                buf.push_str(&format!(" \"{}\" \"{}\"", public_id, system_id));
            }
            buf.push_str(">\n");
        },

        NodeData::Text { contents } => {
            buf.push('"');
            buf.push_str(contents);
            buf.push_str("\"\n");
        },

        NodeData::Comment { contents } => {
            buf.push_str("<!-- ");
            buf.push_str(contents);
            buf.push_str(" -->\n");
        },

        NodeData::Element(elem) => {
            buf.push('<');
            match elem.name.ns {
                ns!(svg) => buf.push_str("svg "),
                ns!(mathml) => buf.push_str("math "),
                _ => (),
            }
            buf.push_str(&elem.name.local);
            buf.push_str(">\n");

            let mut attrs = elem.attrs.clone();
            attrs.sort_by(|x, y| x.name.local.cmp(&y.name.local));
            for attr in attrs {
                push_indent(buf, indent + 2);
                match attr.name.ns {
                    ns!(xlink) => buf.push_str("xlink "),
                    ns!(xml) => buf.push_str("xml "),
                    ns!(xmlns) => buf.push_str("xmlns "),
                    _ => (),
                }
                buf.push_str(&format!("{}=\"{}\"\n", attr.name.local, attr.value));
            }
        },
    }

    for &child in doc.children(id) {
        dump_node(doc, buf, indent + 2, child);
    }

    if let Some(contents) = doc.template_contents(id) {
        push_indent(buf, indent + 2);
        buf.push_str("content\n");
        for &child in doc.children(contents) {
            dump_node(doc, buf, indent + 4, child);
        }
    }
}
