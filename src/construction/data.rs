// Copyright 2014-2017 The html5construct Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! DOCTYPE classification: which compatibility mode a DOCTYPE selects, and
//! whether it is a conforming one.

use phf::phf_set;

use crate::interface::{LimitedQuirks, NoQuirks, Quirks, QuirksMode};
use crate::tokens::Doctype;

// These should all be lowercase, for ASCII-case-insensitive matching.
static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

static QUIRKY_PUBLIC_MATCHES: phf::Set<&'static str> = phf_set! {
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
};

static QUIRKY_SYSTEM_MATCHES: phf::Set<&'static str> = phf_set! {
    "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd",
};

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// A condition on a DOCTYPE. Identifiers are compared ASCII-case-insensitively;
/// a missing identifier compares as the empty string.
#[derive(Debug, Clone, Copy)]
pub enum DoctypeTest {
    /// The name is anything but `html`.
    NameIsNotHtml,
    PublicIdIs(&'static phf::Set<&'static str>),
    SystemIdIs(&'static phf::Set<&'static str>),
    PublicIdStartsWith(&'static [&'static str]),
    /// Public id prefix match, and the system id is empty.
    PublicIdStartsWithNoSystemId(&'static [&'static str]),
    /// Public id prefix match, and the system id is not empty.
    PublicIdStartsWithSystemId(&'static [&'static str]),
}

/// One row of a classification table: the first row whose test passes
/// decides the mode.
#[derive(Debug, Clone, Copy)]
pub struct QuirksRule {
    pub test: DoctypeTest,
    pub mode: QuirksMode,
}

/// The quirks-mode determination table for `<!DOCTYPE>`.
pub static QUIRKS_RULES: &[QuirksRule] = &[
    QuirksRule {
        test: DoctypeTest::NameIsNotHtml,
        mode: Quirks,
    },
    QuirksRule {
        test: DoctypeTest::PublicIdIs(&QUIRKY_PUBLIC_MATCHES),
        mode: Quirks,
    },
    QuirksRule {
        test: DoctypeTest::SystemIdIs(&QUIRKY_SYSTEM_MATCHES),
        mode: Quirks,
    },
    QuirksRule {
        test: DoctypeTest::PublicIdStartsWith(QUIRKY_PUBLIC_PREFIXES),
        mode: Quirks,
    },
    QuirksRule {
        test: DoctypeTest::PublicIdStartsWith(LIMITED_QUIRKY_PUBLIC_PREFIXES),
        mode: LimitedQuirks,
    },
    QuirksRule {
        test: DoctypeTest::PublicIdStartsWithNoSystemId(HTML4_PUBLIC_PREFIXES),
        mode: Quirks,
    },
    QuirksRule {
        test: DoctypeTest::PublicIdStartsWithSystemId(HTML4_PUBLIC_PREFIXES),
        mode: LimitedQuirks,
    },
];

fn starts_with_any(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().any(|prefix| needle.starts_with(prefix))
}

impl DoctypeTest {
    fn passes(&self, name: &str, public_id: &str, system_id: &str) -> bool {
        match *self {
            DoctypeTest::NameIsNotHtml => name != "html",
            DoctypeTest::PublicIdIs(set) => set.contains(public_id),
            DoctypeTest::SystemIdIs(set) => set.contains(system_id),
            DoctypeTest::PublicIdStartsWith(prefixes) => starts_with_any(prefixes, public_id),
            DoctypeTest::PublicIdStartsWithNoSystemId(prefixes) => {
                system_id.is_empty() && starts_with_any(prefixes, public_id)
            },
            DoctypeTest::PublicIdStartsWithSystemId(prefixes) => {
                !system_id.is_empty() && starts_with_any(prefixes, public_id)
            },
        }
    }
}

fn lowercase(s: &Option<crate::tendril::StrTendril>) -> String {
    s.as_ref()
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classify `doctype` by the first passing row of `rules`; `NoQuirks` when
/// none passes. The force-quirks flag is not consulted.
pub fn classify_doctype_with(doctype: &Doctype, rules: &[QuirksRule]) -> QuirksMode {
    let name = lowercase(&doctype.name);
    let public_id = lowercase(&doctype.public_id);
    let system_id = lowercase(&doctype.system_id);

    rules
        .iter()
        .find(|rule| rule.test.passes(&name, &public_id, &system_id))
        .map(|rule| rule.mode)
        .unwrap_or(NoQuirks)
}

/// Classify `doctype` with [`QUIRKS_RULES`].
pub fn classify_doctype(doctype: &Doctype) -> QuirksMode {
    classify_doctype_with(doctype, QUIRKS_RULES)
}

/// Is this one of the DOCTYPEs a conforming document may use?
pub fn is_conforming_doctype(doctype: &Doctype) -> bool {
    fn equal(s: &Option<crate::tendril::StrTendril>, b: &str) -> bool {
        s.as_ref().map(|s| &**s == b).unwrap_or(b.is_empty())
    }

    let name = &doctype.name;
    let public = &doctype.public_id;
    let system = &doctype.system_id;
    let has_system_id = system.is_some();

    if !equal(name, "html") {
        false
    } else if public.is_none() {
        !has_system_id || equal(system, "about:legacy-compat")
    } else if equal(public, "-//W3C//DTD HTML 4.0//EN") {
        !has_system_id || equal(system, "http://www.w3.org/TR/REC-html40/strict.dtd")
    } else if equal(public, "-//W3C//DTD HTML 4.01//EN") {
        !has_system_id || equal(system, "http://www.w3.org/TR/html4/strict.dtd")
    } else if equal(public, "-//W3C//DTD XHTML 1.0 Strict//EN") {
        equal(system, "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")
    } else if equal(public, "-//W3C//DTD XHTML 1.1//EN") {
        equal(system, "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(name: &str, public_id: Option<&str>, system_id: Option<&str>) -> Doctype {
        Doctype {
            name: Some(name.into()),
            public_id: public_id.map(Into::into),
            system_id: system_id.map(Into::into),
            force_quirks: false,
        }
    }

    #[test]
    fn html5_doctype_is_no_quirks() {
        let dt = doctype("html", None, None);
        assert_eq!(classify_doctype(&dt), NoQuirks);
        assert!(is_conforming_doctype(&dt));
    }

    #[test]
    fn name_is_case_insensitive() {
        assert_eq!(classify_doctype(&doctype("HTML", None, None)), NoQuirks);
        assert_eq!(classify_doctype(&doctype("svg", None, None)), Quirks);
        assert!(!is_conforming_doctype(&doctype("HTML", None, None)));
    }

    #[test]
    fn exact_public_and_system_matches() {
        assert_eq!(classify_doctype(&doctype("html", Some("HTML"), None)), Quirks);
        assert_eq!(classify_doctype(&doctype("html", Some("HTML "), None)), NoQuirks);
        let ibm = "http://www.IBM.com/data/dtd/v11/ibmxhtml1-transitional.dtd";
        assert_eq!(classify_doctype(&doctype("html", None, Some(ibm))), Quirks);
    }

    #[test]
    fn html401_depends_on_system_id() {
        let public = "-//W3C//DTD HTML 4.01 Transitional//EN";
        assert_eq!(classify_doctype(&doctype("html", Some(public), None)), Quirks);
        assert_eq!(classify_doctype(&doctype("html", Some(public), Some(""))), Quirks);
        assert_eq!(
            classify_doctype(&doctype(
                "html",
                Some(public),
                Some("http://www.w3.org/TR/html4/loose.dtd")
            )),
            LimitedQuirks
        );
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        let public = "-//W3C//DTD XHTML 1.0 Transitional//EN";
        let system = "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd";
        assert_eq!(classify_doctype(&doctype("html", Some(public), Some(system))), LimitedQuirks);
        assert_eq!(classify_doctype(&doctype("html", Some(public), None)), LimitedQuirks);
    }

    #[test]
    fn every_quirky_prefix_is_quirks() {
        for prefix in QUIRKY_PUBLIC_PREFIXES {
            let public = format!("{}EN", prefix.to_ascii_uppercase());
            assert_eq!(
                classify_doctype(&doctype("html", Some(&public), Some("x"))),
                Quirks,
                "{}",
                public
            );
        }
    }

    #[test]
    fn custom_table() {
        static ONLY_NAME: &[QuirksRule] = &[QuirksRule {
            test: DoctypeTest::NameIsNotHtml,
            mode: LimitedQuirks,
        }];
        let dt = doctype("html", Some("html"), None);
        assert_eq!(classify_doctype_with(&dt, ONLY_NAME), NoQuirks);
        assert_eq!(classify_doctype_with(&doctype("x", None, None), ONLY_NAME), LimitedQuirks);
    }
}
