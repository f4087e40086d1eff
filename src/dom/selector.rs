//! A small CSS selector engine covering what GitHub's markup needs:
//! type, class, id, and attribute selectors (`=`, `^=`, `$=`, `*=`),
//! descendant and child combinators, and comma-separated lists.

use crate::dom::document::{Document, NodeId};
use crate::types::errors::PageError;

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq)]
struct AttrCondition {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// `parts[0]` is leftmost; each combinator links a part to its predecessor.
    parts: Vec<(Combinator, Compound)>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, PageError> {
        let invalid = || PageError::InvalidSelector(input.to_string());
        let mut alternatives = Vec::new();
        for part in split_top_level(input, ',') {
            let complex = parse_complex(part).ok_or_else(invalid)?;
            alternatives.push(complex);
        }
        if alternatives.is_empty() {
            return Err(invalid());
        }
        Ok(Self { alternatives })
    }

    /// True when element `id` matches any alternative of the list.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(doc, id, complex.parts.len() - 1))
    }
}

impl Complex {
    fn matches_at(&self, doc: &Document, id: NodeId, idx: usize) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(doc, id) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent(id)
                .map(|p| self.matches_at(doc, p, idx - 1))
                .unwrap_or(false),
            Combinator::Descendant => {
                let mut current = doc.parent(id);
                while let Some(ancestor) = current {
                    if self.matches_at(doc, ancestor, idx - 1) {
                        return true;
                    }
                    current = doc.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some(el) = doc.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if el.tag != *tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if doc.attr(id, "id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(id, c)) {
            return false;
        }
        self.attrs.iter().all(|cond| {
            let Some(value) = doc.attr(id, &cond.name) else {
                return false;
            };
            match &cond.op {
                AttrOp::Exists => true,
                AttrOp::Equals(v) => value == v,
                AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
                AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
                AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            }
        })
    }
}

/// Splits on `sep` outside of brackets and quotes.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_complex(input: &str) -> Option<Complex> {
    let chars: Vec<char> = input.trim().chars().collect();
    if chars.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    let mut pos = 0;
    let mut combinator = Combinator::Descendant;
    loop {
        let (compound, next) = parse_compound(&chars, pos)?;
        parts.push((combinator, compound));
        pos = next;

        let mut saw_space = false;
        while pos < chars.len() && chars[pos].is_whitespace() {
            saw_space = true;
            pos += 1;
        }
        if pos >= chars.len() {
            break;
        }
        if chars[pos] == '>' {
            combinator = Combinator::Child;
            pos += 1;
            while pos < chars.len() && chars[pos].is_whitespace() {
                pos += 1;
            }
        } else if saw_space {
            combinator = Combinator::Descendant;
        } else {
            return None;
        }
    }
    Some(Complex { parts })
}

fn parse_ident(chars: &[char], mut pos: usize) -> Option<(String, usize)> {
    let start = pos;
    while pos < chars.len() && is_ident_char(chars[pos]) {
        pos += 1;
    }
    if pos == start {
        return None;
    }
    Some((chars[start..pos].iter().collect(), pos))
}

fn parse_compound(chars: &[char], mut pos: usize) -> Option<(Compound, usize)> {
    let mut compound = Compound::default();
    let start = pos;

    if pos < chars.len() && chars[pos] == '*' {
        pos += 1;
    } else if pos < chars.len() && is_ident_char(chars[pos]) {
        let (tag, next) = parse_ident(chars, pos)?;
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                let (class, next) = parse_ident(chars, pos + 1)?;
                compound.classes.push(class);
                pos = next;
            }
            '#' => {
                let (id, next) = parse_ident(chars, pos + 1)?;
                compound.id = Some(id);
                pos = next;
            }
            '[' => {
                let (cond, next) = parse_attr(chars, pos + 1)?;
                compound.attrs.push(cond);
                pos = next;
            }
            _ => break,
        }
    }

    if pos == start {
        return None;
    }
    Some((compound, pos))
}

fn parse_attr(chars: &[char], pos: usize) -> Option<(AttrCondition, usize)> {
    let skip_ws = |mut p: usize| {
        while p < chars.len() && chars[p].is_whitespace() {
            p += 1;
        }
        p
    };

    let pos = skip_ws(pos);
    let (name, pos) = parse_ident(chars, pos)?;
    let name = name.to_ascii_lowercase();
    let mut pos = skip_ws(pos);

    if chars.get(pos) == Some(&']') {
        return Some((AttrCondition { name, op: AttrOp::Exists }, pos + 1));
    }

    let op_char = *chars.get(pos)?;
    let make: fn(String) -> AttrOp = match op_char {
        '=' => AttrOp::Equals,
        '^' => AttrOp::Prefix,
        '$' => AttrOp::Suffix,
        '*' => AttrOp::Contains,
        _ => return None,
    };
    pos += 1;
    if op_char != '=' {
        if chars.get(pos) != Some(&'=') {
            return None;
        }
        pos += 1;
    }
    pos = skip_ws(pos);

    let value: String;
    match chars.get(pos) {
        Some(&q) if q == '\'' || q == '"' => {
            let start = pos + 1;
            let end = start + chars[start..].iter().position(|c| *c == q)?;
            value = chars[start..end].iter().collect();
            pos = end + 1;
        }
        Some(_) => {
            let start = pos;
            while pos < chars.len() && chars[pos] != ']' && !chars[pos].is_whitespace() {
                pos += 1;
            }
            value = chars[start..pos].iter().collect();
        }
        None => return None,
    }

    pos = skip_ws(pos);
    if chars.get(pos) != Some(&']') {
        return None;
    }
    Some((AttrCondition { name, op: make(value) }, pos + 1))
}
