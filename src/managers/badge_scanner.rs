//! Badge Scanner for ReviewBadge.
//!
//! Finds pull request references on the page, attaches one placeholder badge
//! per container, and resolves each badge in its own task.

use std::sync::{Mutex, MutexGuard, OnceLock};

use tokio::task::JoinHandle;

use crate::dom::document::{Document, NodeId, SharedDocument};
use crate::dom::selector::Selector;
use crate::services::badge_renderer;
use crate::services::status_resolver::StatusResolver;
use crate::types::badge::{BadgeView, BADGE_CLASS};
use crate::types::errors::PageError;
use crate::types::page::PageContext;
use crate::types::pull_request::PrReference;
use crate::types::settings::DisplayMode;

/// Locks a shared document, recovering the data if a holder panicked.
pub fn lock_document(doc: &SharedDocument) -> MutexGuard<'_, Document> {
    doc.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct PageSelectors {
    badge: Selector,
    notification_row: Selector,
    notification_link: Selector,
    notification_title: Selector,
    pr_titles: Vec<Selector>,
    list_item: Selector,
    list_link_hovercard: Selector,
    list_link_href: Selector,
}

fn page_selectors() -> &'static PageSelectors {
    static SELECTORS: OnceLock<PageSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let sel = |s: &str| Selector::parse(s).expect("built-in selector is valid");
        PageSelectors {
            badge: sel(&format!(".{}", BADGE_CLASS)),
            notification_row: sel(".notifications-list-item"),
            notification_link: sel("a.notification-list-item-link"),
            notification_title: sel(".markdown-title"),
            pr_titles: vec![
                sel(".gh-header-title .js-issue-title"),
                sel(".gh-header-title .markdown-title"),
                sel("h1.gh-header-title bdi"),
            ],
            list_item: sel("[id^='issue_']"),
            list_link_hovercard: sel("a[data-hovercard-type='pull_request']"),
            list_link_href: sel("a[href*='/pull/']"),
        }
    })
}

/// A container that should receive a badge for `pr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub target: NodeId,
    pub pr: PrReference,
}

/// True when `node` already holds a badge somewhere in its subtree.
pub fn has_badge(doc: &Document, node: NodeId) -> bool {
    doc.query_selector(node, &page_selectors().badge).is_some()
}

fn notification_candidates(doc: &Document, out: &mut Vec<Candidate>) {
    let s = page_selectors();
    for row in doc.query_selector_all(Document::ROOT, &s.notification_row) {
        if has_badge(doc, row) {
            continue;
        }
        let Some(link) = doc.query_selector(row, &s.notification_link) else {
            continue;
        };
        let Some(pr) = doc.attr(link, "href").and_then(PrReference::from_href) else {
            continue;
        };
        let Some(title) = doc.query_selector(row, &s.notification_title) else {
            continue;
        };
        out.push(Candidate { target: title, pr });
    }
}

fn pr_page_candidates(doc: &Document, page: &PageContext, out: &mut Vec<Candidate>) {
    let Some(pr) = PrReference::from_href(&page.path) else {
        return;
    };
    let title = page_selectors()
        .pr_titles
        .iter()
        .find_map(|sel| doc.query_selector(Document::ROOT, sel));
    if let Some(title) = title {
        if !has_badge(doc, title) {
            out.push(Candidate { target: title, pr });
        }
    }
}

fn pr_list_candidates(doc: &Document, out: &mut Vec<Candidate>) {
    let s = page_selectors();
    for item in doc.query_selector_all(Document::ROOT, &s.list_item) {
        if has_badge(doc, item) {
            continue;
        }
        let link = doc
            .query_selector(item, &s.list_link_hovercard)
            .or_else(|| doc.query_selector(item, &s.list_link_href));
        let Some(link) = link else {
            continue;
        };
        let Some(pr) = doc.attr(link, "href").and_then(PrReference::from_href) else {
            continue;
        };
        out.push(Candidate { target: link, pr });
    }
}

/// Every container on the page that still needs a badge.
///
/// A pure function of the current document; calling it again after the
/// placeholders are attached yields nothing new.
pub fn find_candidates(doc: &Document, page: &PageContext) -> Vec<Candidate> {
    let mut out = Vec::new();
    if page.is_notifications {
        notification_candidates(doc, &mut out);
    }
    if page.is_pr_page {
        pr_page_candidates(doc, page, &mut out);
    }
    if page.is_pr_list {
        pr_list_candidates(doc, &mut out);
    }
    out
}

/// Writes a view onto an existing badge element.
pub fn apply_view(doc: &mut Document, badge: NodeId, view: &BadgeView) -> Result<(), PageError> {
    doc.set_attr(badge, "class", &view.class_attr())?;
    if view.title.is_empty() {
        doc.remove_attr(badge, "title")?;
    } else {
        doc.set_attr(badge, "title", &view.title)?;
    }
    doc.set_text(badge, &view.text)
}

/// Reads back every badge currently in the document, in document order.
pub fn badge_views(doc: &Document) -> Vec<BadgeView> {
    doc.query_selector_all(Document::ROOT, &page_selectors().badge)
        .into_iter()
        .map(|id| BadgeView {
            text: doc.text_content(id),
            title: doc.attr(id, "title").unwrap_or_default().to_string(),
            classes: doc
                .attr(id, "class")
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// Appends a loading badge to `target` unless it already holds one.
///
/// Returns the new badge, or `None` when the target was already annotated.
pub fn attach_placeholder(doc: &mut Document, target: NodeId) -> Result<Option<NodeId>, PageError> {
    if has_badge(doc, target) {
        return Ok(None);
    }
    let badge = doc.create_element("span");
    apply_view(doc, badge, &badge_renderer::loading())?;
    doc.append_child(target, badge)?;
    Ok(Some(badge))
}

/// A resolution in flight for one badge.
#[derive(Debug)]
pub struct BadgeTask {
    pub badge: NodeId,
    pub pr: PrReference,
    handle: JoinHandle<()>,
}

impl BadgeTask {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn into_handle(self) -> JoinHandle<()> {
        self.handle
    }
}

/// Attaches badges and owns the handles of their resolution tasks.
pub struct BadgeScanner {
    resolver: StatusResolver,
    mode: DisplayMode,
    tasks: Vec<BadgeTask>,
}

impl BadgeScanner {
    pub fn new(resolver: StatusResolver, mode: DisplayMode) -> Self {
        Self {
            resolver,
            mode,
            tasks: Vec::new(),
        }
    }

    /// Scans the document once. Must run inside a tokio runtime.
    ///
    /// Candidate lookup and placeholder insertion happen under one document
    /// lock, so concurrent scans cannot double-attach. Returns the number of
    /// badges attached by this pass.
    pub fn scan(&mut self, doc: &SharedDocument, page: &PageContext) -> Result<usize, PageError> {
        self.prune(doc);

        let count = {
            let mut guard = lock_document(doc);
            let candidates = find_candidates(&guard, page);
            self.attach_locked(&mut guard, doc, candidates)
        };
        if count > 0 {
            log::debug!("attached {} badge(s) on {}", count, page.path);
        }
        Ok(count)
    }

    /// Attaches a placeholder to each candidate and starts its resolution.
    ///
    /// A candidate whose target cannot take a badge is skipped; badges
    /// attached before it keep their tasks. Must run inside a tokio runtime.
    pub fn attach(&mut self, doc: &SharedDocument, candidates: Vec<Candidate>) -> usize {
        let mut guard = lock_document(doc);
        self.attach_locked(&mut guard, doc, candidates)
    }

    fn attach_locked(
        &mut self,
        guard: &mut Document,
        doc: &SharedDocument,
        candidates: Vec<Candidate>,
    ) -> usize {
        let mut count = 0;
        for candidate in candidates {
            let badge = match attach_placeholder(guard, candidate.target) {
                Ok(Some(badge)) => badge,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("could not attach badge for {}: {}", candidate.pr, err);
                    continue;
                }
            };
            // The task locks the document itself, so it waits until this pass releases it.
            let task = self.spawn_resolution(doc, badge, candidate.pr);
            self.tasks.push(task);
            count += 1;
        }
        count
    }

    fn spawn_resolution(&self, doc: &SharedDocument, badge: NodeId, pr: PrReference) -> BadgeTask {
        let resolver = self.resolver.clone();
        let mode = self.mode;
        let doc = doc.clone();
        let task_pr = pr.clone();

        let handle = tokio::spawn(async move {
            let view = match resolver.resolve(&task_pr).await {
                Ok(status) => badge_renderer::render(status, mode),
                Err(err) => {
                    log::warn!("review status for {} failed: {}", task_pr, err);
                    badge_renderer::error(&err.to_string())
                }
            };

            let mut guard = lock_document(&doc);
            if !guard.is_connected(badge) {
                log::debug!("badge for {} left the page before resolving", task_pr);
                return;
            }
            if let Err(err) = apply_view(&mut guard, badge, &view) {
                log::warn!("could not update badge for {}: {}", task_pr, err);
            }
        });

        BadgeTask { badge, pr, handle }
    }

    /// Forgets tasks that finished or whose badge is gone. Dropping a handle
    /// detaches the task; it is never awaited or aborted here.
    pub fn prune(&mut self, doc: &SharedDocument) {
        let guard = lock_document(doc);
        self.tasks
            .retain(|task| !task.is_finished() && guard.is_connected(task.badge));
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Hands over every tracked task so a caller can await them outside the lock.
    pub fn take_tasks(&mut self) -> Vec<BadgeTask> {
        std::mem::take(&mut self.tasks)
    }
}

/// Awaits all badge tasks of a shared scanner, including ones spawned while waiting.
pub async fn settle(scanner: &Mutex<BadgeScanner>) {
    loop {
        let tasks = scanner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take_tasks();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            let pr = task.pr.clone();
            if let Err(err) = task.into_handle().await {
                log::warn!("badge task for {} did not complete: {}", pr, err);
            }
        }
    }
}
