// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Whether the parser may produce script-bearing content.

use phf::phf_set;

use crate::interface::Attribute;

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum ParserContentPolicy {
    /// Scripts and event handlers are kept.
    #[default]
    AllowScriptingContent,
    /// Scripts are never attached; event handler, `srcdoc` and
    /// `javascript:` URL attributes are dropped.
    DisallowScriptingContent,
    /// Like `AllowScriptingContent`, but scripts are not marked parser-inserted,
    /// so they may run when inserted elsewhere later.
    AllowScriptingContentAndDoNotMarkAlreadyStarted,
}

impl ParserContentPolicy {
    pub fn scripting_content_is_allowed(self) -> bool {
        self != ParserContentPolicy::DisallowScriptingContent
    }
}

static URL_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    "action",
    "background",
    "cite",
    "codebase",
    "data",
    "formaction",
    "href",
    "longdesc",
    "ping",
    "poster",
    "src",
    "usemap",
};

fn is_javascript_url(value: &str) -> bool {
    let value: String = value
        .trim_matches(|c: char| c.is_ascii_whitespace())
        .chars()
        .filter(|&c| c != '\t' && c != '\n' && c != '\r')
        .collect();
    value
        .get(..11)
        .map(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        .unwrap_or(false)
}

/// Event handlers, `srcdoc`, and URL attributes holding `javascript:` URLs.
pub fn is_scripting_attribute(attr: &Attribute) -> bool {
    let local: &str = &attr.name.local;
    if attr.name.ns == ns!() && local.len() > 2 && local[..2].eq_ignore_ascii_case("on") {
        return true;
    }
    if attr.name.ns == ns!() && local == "srcdoc" {
        return true;
    }
    let is_url = match attr.name.ns {
        ns!() => URL_ATTRIBUTES.contains(local),
        ns!(xlink) => local == "href",
        _ => false,
    };
    is_url && is_javascript_url(&attr.value)
}

/// Drop the attributes `policy` forbids.
pub fn filter_attributes(policy: ParserContentPolicy, attrs: &mut Vec<Attribute>) {
    if policy.scripting_content_is_allowed() {
        return;
    }
    let before = attrs.len();
    attrs.retain(|attr| !is_scripting_attribute(attr));
    if attrs.len() != before {
        debug!("stripped {} scripting attribute(s)", before - attrs.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::QualName;
    use crate::tendril::StrTendril;

    #[test]
    fn strips_only_when_disallowed() {
        let attrs = vec![
            Attribute::new("onclick", "go()"),
            Attribute::new("href", "  JavaScript:go()"),
            Attribute::new("src", "java\tscript:go()"),
            Attribute::new("srcdoc", "<p>"),
            Attribute::new("href", "https://example.com/"),
            Attribute::new("title", "javascript:"),
            Attribute::new("on", "x"),
        ];

        let mut allowed = attrs.clone();
        filter_attributes(ParserContentPolicy::AllowScriptingContent, &mut allowed);
        assert_eq!(allowed.len(), attrs.len());

        let mut stripped = attrs;
        filter_attributes(ParserContentPolicy::DisallowScriptingContent, &mut stripped);
        let names: Vec<&str> = stripped.iter().map(|a| &*a.name.local).collect();
        assert_eq!(names, vec!["href", "title", "on"]);
    }

    #[test]
    fn xlink_href() {
        let attr = Attribute {
            name: QualName::new(Some(namespace_prefix!("xlink")), ns!(xlink), local_name!("href")),
            value: StrTendril::from_slice("javascript:void(0)"),
        };
        assert!(is_scripting_attribute(&attr));
    }
}
