//! Page Session for ReviewBadge.
//!
//! Ties one page load together: the scope gate, stylesheet injection, the
//! initial scan, and the mutation observer that keeps annotating content the
//! host adds later.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::dom::document::{Document, SharedDocument};
use crate::dom::html;
use crate::managers::badge_scanner::{self, lock_document, BadgeScanner};
use crate::managers::observer::{self, RESCAN_DELAY};
use crate::services::badge_renderer::{STYLESHEET, STYLESHEET_ID};
use crate::services::github_client::ReviewSource;
use crate::services::page_classifier;
use crate::services::status_resolver::StatusResolver;
use crate::types::errors::PageError;
use crate::types::page::PageContext;
use crate::types::settings::ReviewBadgeSettings;

/// Adds the badge stylesheet to the head (or body, or root) unless present.
///
/// Returns `true` when a style element was inserted.
pub fn inject_stylesheet(doc: &mut Document) -> Result<bool, PageError> {
    let already = doc
        .descendants(Document::ROOT)
        .into_iter()
        .any(|id| doc.attr(id, "id") == Some(STYLESHEET_ID));
    if already {
        return Ok(false);
    }

    let parent = doc.head().or_else(|| doc.body()).unwrap_or(Document::ROOT);
    let style = doc.create_element("style");
    doc.set_attr(style, "id", STYLESHEET_ID)?;
    doc.set_text(style, STYLESHEET)?;
    doc.append_child(parent, style)?;
    Ok(true)
}

fn run_scan(scanner: &Mutex<BadgeScanner>, document: &SharedDocument, context: &PageContext) {
    let mut scanner = scanner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(e) = scanner.scan(document, context) {
        log::warn!("scan of {} failed: {}", context.path, e);
    }
}

/// An annotated page. Dropping the session stops the observer; badge tasks
/// already in flight still finish and check liveness before writing.
pub struct PageSession {
    context: PageContext,
    document: SharedDocument,
    scanner: Arc<Mutex<BadgeScanner>>,
    observer: JoinHandle<()>,
}

impl PageSession {
    /// Starts annotating `document` as the page at `url`.
    ///
    /// Returns `Ok(None)` without touching the document when the scope gate
    /// rejects the page or the token or username is missing. Must run inside a
    /// tokio runtime.
    pub fn open(
        settings: &ReviewBadgeSettings,
        source: Arc<dyn ReviewSource>,
        url: &str,
        document: SharedDocument,
    ) -> Result<Option<Self>, PageError> {
        let context = page_classifier::classify(url)?;
        if !page_classifier::should_run(&context, settings.scope) {
            log::debug!("{} is outside scope {}", context.path, settings.scope);
            return Ok(None);
        }
        if !settings.is_configured() {
            log::debug!("token or username not set, leaving {} alone", context.path);
            return Ok(None);
        }

        let mutations = {
            let mut doc = lock_document(&document);
            inject_stylesheet(&mut doc)?;
            doc.subscribe()
        };

        let resolver = StatusResolver::new(source, &settings.username);
        let scanner = Arc::new(Mutex::new(BadgeScanner::new(resolver, settings.display_mode)));
        run_scan(&scanner, &document, &context);

        let observer = {
            let scanner = Arc::clone(&scanner);
            let document = Arc::clone(&document);
            let context = context.clone();
            observer::spawn_observer(mutations, RESCAN_DELAY, move || {
                run_scan(&scanner, &document, &context);
            })
        };

        log::info!("annotating {}", context.path);
        Ok(Some(Self {
            context,
            document,
            scanner,
            observer,
        }))
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Runs a scan now instead of waiting for the observer.
    pub fn rescan(&self) -> Result<usize, PageError> {
        let mut scanner = self.scanner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        scanner.scan(&self.document, &self.context)
    }

    /// Shared handle to the scanner, for awaiting its tasks without borrowing the session.
    pub fn scanner(&self) -> Arc<Mutex<BadgeScanner>> {
        Arc::clone(&self.scanner)
    }

    pub fn pending_tasks(&self) -> usize {
        self.scanner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pending_tasks()
    }

    /// Waits for every badge attached so far to resolve.
    pub async fn settle(&self) {
        badge_scanner::settle(&self.scanner).await;
    }

    /// Serializes the current document.
    pub fn snapshot(&self) -> String {
        html::to_html(&lock_document(&self.document))
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.observer.abort();
    }
}
