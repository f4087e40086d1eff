//! Tests for the document model: tree mutation, selectors, and HTML round trips.

use reviewbadge::dom::html::{outer_html, parse_document, parse_fragment_into, to_html};
use reviewbadge::dom::{Document, Selector};
use reviewbadge::types::errors::PageError;

const LIST_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Pull requests</title></head>
<body>
  <div id="issue_1" class="js-issue-row">
    <a class="Link--primary" data-hovercard-type="pull_request" href="/octo-org/octo-repo/pull/1">Fix &amp; ship</a>
  </div>
  <div id="issue_2" class="js-issue-row">
    <a href="/octo-org/octo-repo/pull/2">Second</a>
  </div>
  <div id="sidebar"><a href="/octo-org/octo-repo/issues/9">Issue</a></div>
</body></html>"#;

#[test]
fn test_parse_builds_expected_tree() {
    let doc = parse_document(LIST_PAGE);
    let head = doc.head().unwrap();
    let body = doc.body().unwrap();
    assert_eq!(doc.tag(head), Some("head"));
    assert_eq!(doc.tag(body), Some("body"));

    let title = doc.find_by_tag("title").unwrap();
    assert_eq!(doc.text_content(title), "Pull requests");

    let links = doc.select(Document::ROOT, "a").unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(doc.text_content(links[0]), "Fix & ship");
    assert_eq!(doc.attr(links[0], "data-hovercard-type"), Some("pull_request"));
}

#[test]
fn test_attribute_operators() {
    let doc = parse_document(LIST_PAGE);
    assert_eq!(doc.select(Document::ROOT, "[id^='issue_']").unwrap().len(), 2);
    assert_eq!(doc.select(Document::ROOT, "a[href*='/pull/']").unwrap().len(), 2);
    assert_eq!(doc.select(Document::ROOT, "a[href$='/9']").unwrap().len(), 1);
    assert_eq!(
        doc.select(Document::ROOT, "a[data-hovercard-type=\"pull_request\"]").unwrap().len(),
        1
    );
    assert!(doc.select(Document::ROOT, "[id^='']").unwrap().is_empty());
}

#[test]
fn test_combinators_and_lists() {
    let doc = parse_document(
        r#"<h1 class="gh-header-title"><span><bdi class="js-issue-title">T</bdi></span></h1><bdi>x</bdi>"#,
    );
    assert_eq!(doc.select(Document::ROOT, "h1.gh-header-title bdi").unwrap().len(), 1);
    assert!(doc.select(Document::ROOT, "h1.gh-header-title > bdi").unwrap().is_empty());
    assert_eq!(doc.select(Document::ROOT, "h1 > span > bdi").unwrap().len(), 1);
    assert_eq!(doc.select(Document::ROOT, "h1, bdi").unwrap().len(), 3);
}

#[test]
fn test_query_scope_excludes_itself() {
    let doc = parse_document(r#"<div class="row"><div class="row"></div></div>"#);
    let sel = Selector::parse(".row").unwrap();
    let outer = doc.query_selector(Document::ROOT, &sel).unwrap();
    let inner = doc.query_selector(outer, &sel).unwrap();
    assert_ne!(outer, inner);
    assert!(doc.query_selector(inner, &sel).is_none());
}

#[test]
fn test_invalid_selector_is_rejected() {
    assert!(matches!(Selector::parse("a["), Err(PageError::InvalidSelector(_))));
    assert!(matches!(Selector::parse(""), Err(PageError::InvalidSelector(_))));
}

#[test]
fn test_removed_nodes_are_disconnected_for_good() {
    let mut doc = parse_document(LIST_PAGE);
    let row = doc.select(Document::ROOT, "#issue_1").unwrap()[0];
    let link = doc.select(row, "a").unwrap()[0];
    assert!(doc.is_connected(link));

    doc.remove(row).unwrap();
    assert!(!doc.is_connected(row));
    assert!(!doc.is_connected(link));
    assert!(doc.data(link).is_none());

    // Fresh nodes never reuse a removed id.
    let span = doc.create_element("span");
    assert_ne!(span, row);
    assert_ne!(span, link);
    assert!(matches!(doc.set_attr(link, "class", "x"), Err(PageError::NodeNotFound(_))));
}

#[test]
fn test_detached_element_is_not_connected() {
    let mut doc = Document::new();
    let span = doc.create_element("span");
    assert!(!doc.is_connected(span));
    doc.append_child(Document::ROOT, span).unwrap();
    assert!(doc.is_connected(span));
}

#[test]
fn test_append_rejects_cycles() {
    let mut doc = Document::new();
    let outer = doc.create_element("div");
    let inner = doc.create_element("div");
    doc.append_child(Document::ROOT, outer).unwrap();
    doc.append_child(outer, inner).unwrap();
    assert!(matches!(doc.append_child(inner, outer), Err(PageError::HierarchyError(_))));
    assert!(matches!(doc.append_child(outer, outer), Err(PageError::HierarchyError(_))));
    assert!(matches!(doc.remove(Document::ROOT), Err(PageError::HierarchyError(_))));
}

#[test]
fn test_append_moves_node() {
    let mut doc = Document::new();
    let a = doc.create_element("a");
    let b = doc.create_element("b");
    let child = doc.create_element("i");
    doc.append_child(Document::ROOT, a).unwrap();
    doc.append_child(Document::ROOT, b).unwrap();
    doc.append_child(a, child).unwrap();
    doc.append_child(b, child).unwrap();
    assert!(doc.children(a).is_empty());
    assert_eq!(doc.children(b), &[child]);
    assert_eq!(doc.parent(child), Some(b));
}

#[test]
fn test_set_text_replaces_children() {
    let mut doc = parse_document("<span>old <b>bold</b></span>");
    let span = doc.find_by_tag("span").unwrap();
    let bold = doc.find_by_tag("b").unwrap();
    doc.set_text(span, "new").unwrap();
    assert_eq!(doc.text_content(span), "new");
    assert!(!doc.is_connected(bold));
}

#[test]
fn test_attributes_set_and_remove() {
    let mut doc = parse_document(r#"<span title="t" class="a b"></span>"#);
    let span = doc.find_by_tag("span").unwrap();
    assert!(doc.has_class(span, "b"));
    doc.set_attr(span, "TITLE", "changed").unwrap();
    assert_eq!(doc.attr(span, "title"), Some("changed"));
    doc.remove_attr(span, "title").unwrap();
    assert_eq!(doc.attr(span, "title"), None);
}

#[tokio::test]
async fn test_mutations_notify_subscribers() {
    let mut doc = Document::new();
    let mut rx = doc.subscribe();
    let before = doc.mutation_count();

    let div = doc.create_element("div");
    assert_eq!(doc.mutation_count(), before, "creating a detached node is not a mutation");
    doc.append_child(Document::ROOT, div).unwrap();

    assert!(rx.has_changed().unwrap());
    rx.changed().await.unwrap();
    assert!(doc.mutation_count() > before);

    doc.set_attr(div, "class", "x").unwrap();
    assert!(!rx.has_changed().unwrap(), "attribute changes are not childList mutations");
}

#[test]
fn test_fragment_parse_appends_under_parent() {
    let mut doc = parse_document("<ul id=\"list\"></ul>");
    let list = doc.select(Document::ROOT, "#list").unwrap()[0];
    let added = parse_fragment_into(&mut doc, list, "<li>a</li><li>b</li>").unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(doc.children(list), added.as_slice());
    assert_eq!(outer_html(&doc, list), "<ul id=\"list\"><li>a</li><li>b</li></ul>");
}

#[test]
fn test_fragment_parse_into_missing_parent_fails() {
    let mut doc = Document::new();
    assert!(matches!(
        parse_fragment_into(&mut doc, 999, "<p></p>"),
        Err(PageError::NodeNotFound(999))
    ));
}

#[test]
fn test_serialization_escapes_and_keeps_raw_text() {
    let doc = parse_document(
        r#"<p title="a &quot;q&quot;">1 &lt; 2</p><style>.a > .b { color: red; }</style><br>"#,
    );
    let html = to_html(&doc);
    assert!(html.contains("<p title=\"a &quot;q&quot;\">1 &lt; 2</p>"));
    assert!(html.contains("<style>.a > .b { color: red; }</style>"));
    assert!(html.contains("<br>"));
    assert!(!html.contains("</br>"));
}

#[test]
fn test_parser_tolerates_broken_markup() {
    let doc = parse_document("<div><span>open <a href=x>link</div> trailing < text");
    let html = to_html(&doc);
    assert!(html.contains("link"));
    assert!(html.contains("trailing"));
}

// ─── Omitted end tags ───

#[test]
fn test_list_items_without_end_tags_are_siblings() {
    let doc = parse_document(
        r#"<ul id="list"><li class="row" id="a"><a href="/o/r/pull/1">One</a><li class="row" id="b"><p>Two<p>Three</ul>"#,
    );
    let list = doc.select(Document::ROOT, "#list").unwrap()[0];
    let rows = doc.select(Document::ROOT, "li.row").unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(doc.parent(*row), Some(list));
    }
    assert!(doc.select(rows[0], "p").unwrap().is_empty());
    assert_eq!(doc.select(rows[1], "p").unwrap().len(), 2);
    assert!(doc.select(Document::ROOT, "p p").unwrap().is_empty());
}

#[test]
fn test_nested_list_keeps_outer_item_open() {
    let doc = parse_document(r#"<ul><li id="outer">Outer<ul><li id="inner">Inner</ul><li id="next">Next</ul>"#);
    let outer = doc.select(Document::ROOT, "#outer").unwrap()[0];
    let inner = doc.select(Document::ROOT, "#inner").unwrap()[0];
    let next = doc.select(Document::ROOT, "#next").unwrap()[0];
    assert!(doc.select(outer, "#inner").unwrap().contains(&inner));
    assert_eq!(doc.parent(next), doc.parent(outer));
}

#[test]
fn test_table_rows_and_cells_close_implicitly() {
    let doc = parse_document("<table><tr><td>a<td>b<tr><td>c</table><p>after");
    assert_eq!(doc.select(Document::ROOT, "tr").unwrap().len(), 2);
    assert!(doc.select(Document::ROOT, "tr tr").unwrap().is_empty());
    assert!(doc.select(Document::ROOT, "td td").unwrap().is_empty());
    let rows = doc.select(Document::ROOT, "tr").unwrap();
    assert_eq!(doc.select(rows[0], "td").unwrap().len(), 2);
    assert!(doc.select(Document::ROOT, "table p").unwrap().is_empty());
}

#[test]
fn test_block_start_tag_ends_open_paragraph() {
    let doc = parse_document("<p>intro<div id=\"box\">box</div>");
    assert_eq!(doc.select(Document::ROOT, "#box").unwrap().len(), 1);
    assert!(doc.select(Document::ROOT, "p #box").unwrap().is_empty());
    assert_eq!(to_html(&doc), "<p>intro</p><div id=\"box\">box</div>");
}
