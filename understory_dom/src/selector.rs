// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple element selectors.
//!
//! This module intentionally starts small: a selector is a comma-separated
//! list of compound selectors, each a single-element predicate (no combinators).
//!
//! Supported parts: `*`, `tag`, `#id`, `.class`, `[attr]` and `[attr=value]`
//! (value optionally quoted).

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::tree::Document;
use crate::types::NodeId;

/// Errors produced while parsing a [`Selector`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// The selector (or one of its comma-separated parts) was empty.
    #[error("empty selector")]
    Empty,
    /// A character that is not part of the supported grammar.
    #[error("unexpected `{found}` at byte {at} in selector")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset into the source.
        at: usize,
    },
    /// An attribute selector was not closed with `]`.
    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

/// An attribute predicate inside a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// A single-element predicate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches<L>(&self, doc: &Document<L>, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if let Some(t) = &self.tag
            && !t.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attribute(node, "id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.value, doc.attribute(node, &a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }
}

/// A parsed selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    parts: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut parts = Vec::new();
        let mut offset = 0;
        for raw in source.split(',') {
            let lead = raw.len() - raw.trim_start().len();
            parts.push(parse_compound(raw.trim(), offset + lead)?);
            offset += raw.len() + 1;
        }
        Ok(Self {
            source: source.trim().to_string(),
            parts,
        })
    }

    /// Whether `node` matches any part of the list.
    pub fn matches<L>(&self, doc: &Document<L>, node: NodeId) -> bool {
        self.parts.iter().any(|p| p.matches(doc, node))
    }

    /// The selector text as given to [`Selector::parse`] (trimmed).
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(src: &str, base: usize) -> Result<Compound, SelectorError> {
    if src.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut out = Compound::default();
    let bytes: Vec<(usize, char)> = src.char_indices().collect();
    let mut i = 0;

    let take_ident = |i: &mut usize| -> String {
        let mut s = String::new();
        while *i < bytes.len() && is_ident(bytes[*i].1) {
            s.push(bytes[*i].1);
            *i += 1;
        }
        s
    };

    if bytes[0].1 == '*' {
        i = 1;
    } else if is_ident(bytes[0].1) {
        out.tag = Some(take_ident(&mut i));
    }

    while i < bytes.len() {
        let (at, c) = bytes[i];
        match c {
            '#' | '.' => {
                i += 1;
                let name = take_ident(&mut i);
                if name.is_empty() {
                    return Err(SelectorError::Unexpected {
                        found: c,
                        at: base + at,
                    });
                }
                if c == '#' {
                    out.id = Some(name);
                } else {
                    out.classes.push(name);
                }
            }
            '[' => {
                i += 1;
                let name = take_ident(&mut i);
                if name.is_empty() {
                    return Err(SelectorError::Unexpected {
                        found: c,
                        at: base + at,
                    });
                }
                let mut value = None;
                if i < bytes.len() && bytes[i].1 == '=' {
                    i += 1;
                    let mut v = String::new();
                    while i < bytes.len() && bytes[i].1 != ']' {
                        v.push(bytes[i].1);
                        i += 1;
                    }
                    let v = v.trim().trim_matches(|q| q == '"' || q == '\'');
                    value = Some(v.to_string());
                }
                if i >= bytes.len() || bytes[i].1 != ']' {
                    return Err(SelectorError::UnterminatedAttribute);
                }
                i += 1;
                out.attrs.push(AttrMatch { name, value });
            }
            _ => {
                return Err(SelectorError::Unexpected {
                    found: c,
                    at: base + at,
                });
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_parts_must_all_match() {
        let mut doc: Document = Document::new();
        let li = doc.create_element("li");
        doc.set_attribute(li, "class", "item active");
        doc.set_attribute(li, "data-kind", "file");

        assert!(Selector::parse(".item").unwrap().matches(&doc, li));
        assert!(Selector::parse("li.item.active").unwrap().matches(&doc, li));
        assert!(Selector::parse("[data-kind]").unwrap().matches(&doc, li));
        assert!(Selector::parse("[data-kind=\"file\"]").unwrap().matches(&doc, li));
        assert!(!Selector::parse("[data-kind=dir]").unwrap().matches(&doc, li));
        assert!(!Selector::parse("div.item").unwrap().matches(&doc, li));
        assert!(Selector::parse("div, .active").unwrap().matches(&doc, li));
        assert!(Selector::parse("*").unwrap().matches(&doc, li));
    }

    #[test]
    fn id_selector_reads_id_attribute() {
        let mut doc: Document = Document::new();
        let n = doc.create_element("button");
        doc.set_attribute(n, "id", "save");
        assert!(Selector::parse("#save").unwrap().matches(&doc, n));
        assert!(!Selector::parse("#load").unwrap().matches(&doc, n));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse(".a,"), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("[x"),
            Err(SelectorError::UnterminatedAttribute)
        );
        assert_eq!(
            Selector::parse(".a > .b"),
            Err(SelectorError::Unexpected { found: ' ', at: 2 })
        );
    }
}
