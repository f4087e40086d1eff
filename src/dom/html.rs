//! Lenient HTML parsing into a [`Document`] and serialization back to markup.
//!
//! Handles what saved GitHub pages contain: nested elements, quoted and bare
//! attributes, void elements, comments, a doctype, and raw-text elements
//! (`script`, `style`, `textarea`, `title`). Misnested end tags close up to the
//! nearest open element with the same name; unmatched end tags are dropped.
//! Omitted end tags are implied the way browsers imply them: a new `li`, `dt`,
//! `dd`, `tr`, `td`, `th`, `option` or block element closes the open one.

use crate::dom::document::{Document, NodeData, NodeId};
use crate::types::errors::PageError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Open elements a start tag closes implicitly. The search walks down the
/// stack of open elements and gives up at the first `stops_at` element.
struct ImpliedEnd {
    closes: &'static [&'static str],
    stops_at: &'static [&'static str],
}

const BUTTON_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

/// Sectioning and container elements that keep an outer list item open.
const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "article", "aside", "blockquote", "body", "button", "caption", "details",
    "dialog", "dl", "fieldset", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "html", "main", "marquee", "menu", "nav", "object", "ol", "section",
    "select", "table", "td", "template", "th", "ul",
];

const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

const CLOSE_P: ImpliedEnd = ImpliedEnd {
    closes: &["p"],
    stops_at: BUTTON_SCOPE,
};

/// Start tags that end an open paragraph.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section",
    "summary", "table", "ul",
];

fn implied_ends(tag: &str) -> &'static [ImpliedEnd] {
    const LI: &[ImpliedEnd] = &[
        ImpliedEnd {
            closes: &["li"],
            stops_at: LIST_ITEM_SCOPE,
        },
        CLOSE_P,
    ];
    const DT_DD: &[ImpliedEnd] = &[
        ImpliedEnd {
            closes: &["dt", "dd"],
            stops_at: LIST_ITEM_SCOPE,
        },
        CLOSE_P,
    ];
    const OPTION: &[ImpliedEnd] = &[ImpliedEnd {
        closes: &["option"],
        stops_at: &["datalist", "html", "optgroup", "select"],
    }];
    const OPTGROUP: &[ImpliedEnd] = &[ImpliedEnd {
        closes: &["option", "optgroup"],
        stops_at: &["datalist", "html", "select"],
    }];
    const SECTION: &[ImpliedEnd] = &[ImpliedEnd {
        closes: &["thead", "tbody", "tfoot"],
        stops_at: TABLE_SCOPE,
    }];
    const ROW: &[ImpliedEnd] = &[ImpliedEnd {
        closes: &["tr"],
        stops_at: TABLE_SCOPE,
    }];
    const CELL: &[ImpliedEnd] = &[ImpliedEnd {
        closes: &["td", "th"],
        stops_at: &["html", "table", "template", "tr"],
    }];
    const BLOCK: &[ImpliedEnd] = &[CLOSE_P];

    match tag {
        "li" => LI,
        "dt" | "dd" => DT_DD,
        "option" => OPTION,
        "optgroup" => OPTGROUP,
        "thead" | "tbody" | "tfoot" => SECTION,
        "tr" => ROW,
        "td" | "th" => CELL,
        _ if BLOCK_ELEMENTS.contains(&tag) => BLOCK,
        _ => &[],
    }
}

/// Pops the open elements whose end tag `tag` implies. `stack[0]` is the
/// insertion parent and is never popped.
fn close_implied(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    for rule in implied_ends(tag) {
        for pos in (1..stack.len()).rev() {
            let Some(open) = doc.tag(stack[pos]) else {
                break;
            };
            if rule.closes.contains(&open) {
                stack.truncate(pos);
                break;
            }
            if rule.stops_at.contains(&open) {
                break;
            }
        }
    }
}

/// Parses a complete page.
pub fn parse_document(html: &str) -> Document {
    let mut doc = Document::new();
    // The root always exists, so appending under it cannot fail.
    let _ = parse_into(&mut doc, Document::ROOT, html);
    doc
}

/// Parses `html` and appends the resulting nodes under `parent`.
///
/// Returns the ids of the top-level nodes that were appended.
pub fn parse_fragment_into(
    doc: &mut Document,
    parent: NodeId,
    html: &str,
) -> Result<Vec<NodeId>, PageError> {
    if doc.data(parent).is_none() {
        return Err(PageError::NodeNotFound(parent));
    }
    parse_into(doc, parent, html)
}

fn parse_into(doc: &mut Document, parent: NodeId, html: &str) -> Result<Vec<NodeId>, PageError> {
    let mut top_level = Vec::new();
    let mut stack: Vec<NodeId> = vec![parent];
    let mut rest = html;

    let mut append = |doc: &mut Document, stack: &Vec<NodeId>, node: NodeId| -> Result<(), PageError> {
        let target = *stack.last().unwrap_or(&parent);
        if target == parent {
            top_level.push(node);
        }
        doc.append_child(target, node)
    };

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let (comment, remaining) = match after.find("-->") {
                Some(end) => (&after[..end], &after[end + 3..]),
                None => (after, ""),
            };
            let node = doc.create_comment(comment);
            append(doc, &stack, node)?;
            rest = remaining;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').unwrap_or(rest.len());
            let inner = rest.get(2..end).unwrap_or("").trim();
            let is_doctype = rest.starts_with("<!")
                && inner
                    .get(..7)
                    .map(|p| p.eq_ignore_ascii_case("doctype"))
                    .unwrap_or(false);
            if is_doctype {
                let node = doc.create_doctype(inner[7..].trim());
                append(doc, &stack, node)?;
            }
            rest = rest.get(end + 1..).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("</") {
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            if let Some(pos) = stack
                .iter()
                .rposition(|id| *id != parent && doc.tag(*id) == Some(name.as_str()))
            {
                stack.truncate(pos);
            }
            rest = &after[(end + 1).min(after.len())..];
        } else if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (tag, attrs, self_closing, remaining) = parse_start_tag(&rest[1..]);
            close_implied(doc, &mut stack, &tag);
            let node = doc.create_element(&tag);
            for (name, value) in &attrs {
                doc.set_attr(node, name, value)?;
            }
            append(doc, &stack, node)?;
            rest = remaining;

            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) && !self_closing {
                let close = format!("</{}", tag);
                let end = find_ignore_case(rest, &close).unwrap_or(rest.len());
                let raw = &rest[..end];
                if !raw.is_empty() {
                    let text = if tag == "textarea" || tag == "title" {
                        decode_entities(raw)
                    } else {
                        raw.to_string()
                    };
                    let text_node = doc.create_text(&text);
                    doc.append_child(node, text_node)?;
                }
                rest = &rest[end..];
                if let Some(gt) = rest.find('>') {
                    rest = &rest[gt + 1..];
                }
            } else if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                stack.push(node);
            }
        } else {
            // Always consume the first char so a stray '<' cannot stall the loop.
            let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            let end = rest[first..].find('<').map(|i| i + first).unwrap_or(rest.len());
            let node = doc.create_text(&decode_entities(&rest[..end]));
            append(doc, &stack, node)?;
            rest = &rest[end..];
        }
    }
    Ok(top_level)
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    lower.find(&needle.to_ascii_lowercase())
}

type StartTag<'a> = (String, Vec<(String, String)>, bool, &'a str);

/// Parses from just after `<` to just after the closing `>`.
fn parse_start_tag(input: &str) -> StartTag<'_> {
    let bytes = input.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' && bytes[pos] != b'/' {
        pos += 1;
    }
    let tag = input[..pos].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            return (tag, attrs, self_closing, "");
        }
        match bytes[pos] {
            b'>' => return (tag, attrs, self_closing, &input[pos + 1..]),
            b'/' => {
                self_closing = true;
                pos += 1;
                continue;
            }
            _ => {}
        }
        self_closing = false;

        let name_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let name = input[name_start..pos].to_ascii_lowercase();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut value = String::new();
        if pos < bytes.len() && bytes[pos] == b'=' {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < bytes.len() && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                let start = pos + 1;
                let end = input[start..]
                    .bytes()
                    .position(|b| b == quote)
                    .map(|i| start + i)
                    .unwrap_or(bytes.len());
                value = decode_entities(&input[start..end]);
                pos = (end + 1).min(bytes.len());
            } else {
                let start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                    pos += 1;
                }
                value = decode_entities(&input[start..pos]);
            }
        }
        if !name.is_empty() && !attrs.iter().any(|(k, _): &(String, String)| *k == name) {
            attrs.push((name, value));
        }
    }
}

/// Decodes the named entities that matter for text and attributes, plus numeric ones.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let semi = rest.find(';').filter(|i| *i <= 10);
        let decoded = semi.and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Serializes the whole document.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(Document::ROOT) {
        write_node(doc, *child, &mut out);
    }
    out
}

/// Serializes one node and its subtree.
pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(data) = doc.data(id) else {
        return;
    };
    match data {
        NodeData::Document => {
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
        }
        NodeData::Doctype(text) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(text);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            let raw_parent = doc
                .parent(id)
                .and_then(|p| doc.tag(p))
                .map(|t| t == "script" || t == "style")
                .unwrap_or(false);
            if raw_parent {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}
