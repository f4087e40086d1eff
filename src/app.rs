//! App Core for ReviewBadge.
//!
//! Holds the settings engine, the review source, and the currently loaded page.
//! Configuration commands persist through the engine and reload the page so the
//! scope gate is evaluated again.

use std::sync::{Arc, Mutex};

use crate::dom::document::{Document, SharedDocument};
use crate::dom::html;
use crate::dom::selector::Selector;
use crate::managers::badge_scanner::{self, lock_document, BadgeScanner};
use crate::managers::page_session::PageSession;
use crate::services::github_client::{GitHubClient, GitHubClientConfig, ReviewSource};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::badge::BadgeView;
use crate::types::command::{CommandOutcome, ConfigCommand};
use crate::types::errors::{CommandError, GitHubError, PageError};
use crate::types::settings::ReviewBadgeSettings;

/// A page handed over by the host, kept so it can be reloaded from source.
struct LoadedPage {
    url: String,
    source_html: String,
    document: SharedDocument,
}

/// Central application struct.
pub struct App {
    pub settings_engine: SettingsEngine,
    api_base: String,
    source: Arc<dyn ReviewSource>,
    /// Set when the source was injected; token changes then leave it alone.
    fixed_source: bool,
    page: Option<LoadedPage>,
    session: Option<PageSession>,
}

fn build_client(api_base: &str, token: &str) -> Result<GitHubClient, GitHubError> {
    GitHubClient::new(GitHubClientConfig {
        base_url: api_base.to_string(),
        token: token.to_string(),
        ..GitHubClientConfig::default()
    })
}

impl App {
    /// Loads settings and builds a GitHub client for them.
    ///
    /// `config_path` overrides the settings file; `api_base` overrides the
    /// GitHub API root.
    pub fn new(
        config_path: Option<String>,
        api_base: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings_engine = SettingsEngine::open(config_path)?;
        let api_base = api_base.unwrap_or_else(|| GitHubClientConfig::default().base_url);
        let client = match build_client(&api_base, &settings_engine.get_settings().token) {
            Ok(client) => client,
            Err(e) => {
                log::warn!("stored token unusable ({}), continuing without it", e);
                build_client(&api_base, "")?
            }
        };

        Ok(Self {
            settings_engine,
            api_base,
            source: Arc::new(client),
            fixed_source: false,
            page: None,
            session: None,
        })
    }

    /// Uses `source` for every resolution instead of a GitHub client.
    pub fn with_source(settings_engine: SettingsEngine, source: Arc<dyn ReviewSource>) -> Self {
        Self {
            settings_engine,
            api_base: GitHubClientConfig::default().base_url,
            source,
            fixed_source: true,
            page: None,
            session: None,
        }
    }

    pub fn settings(&self) -> &ReviewBadgeSettings {
        self.settings_engine.get_settings()
    }

    // ─── Configuration ───

    /// Runs a configuration command. A change persists immediately and, if a
    /// page is loaded, reloads it.
    pub fn execute(&mut self, command: ConfigCommand) -> Result<CommandOutcome, CommandError> {
        log::debug!("command: {}", command);
        let changed = match &command {
            ConfigCommand::SetToken(token) => {
                // Only a token that can be sent as a header reaches the file.
                GitHubClient::default_headers(token.trim())
                    .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
                self.settings_engine.set_token(token)?
            }
            ConfigCommand::SetUsername(name) => self.settings_engine.set_username(name)?,
            ConfigCommand::SetDisplayMode(mode) => {
                self.settings_engine.set_display_mode(*mode)?;
                true
            }
            ConfigCommand::SetScope(scope) => {
                self.settings_engine.set_scope(*scope)?;
                true
            }
        };

        if changed && matches!(command, ConfigCommand::SetToken(_)) && !self.fixed_source {
            let client = build_client(&self.api_base, &self.settings().token)
                .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
            self.source = Arc::new(client);
        }

        let outcome = CommandOutcome::from_changed(changed);
        if outcome.reload_required && self.page.is_some() {
            if let Err(e) = self.reload_page() {
                log::warn!("reload after {} failed: {}", command.name(), e);
            }
        }
        Ok(outcome)
    }

    // ─── Page lifecycle ───

    /// Loads a page, replacing any previous one. Returns whether badges are
    /// being attached, i.e. the page passed the gate and settings are complete.
    pub fn open_page(&mut self, url: &str, page_html: &str) -> Result<bool, PageError> {
        self.close_page();
        let document = html::parse_document(page_html).into_shared();
        self.session = PageSession::open(
            self.settings(),
            Arc::clone(&self.source),
            url,
            Arc::clone(&document),
        )?;
        self.page = Some(LoadedPage {
            url: url.to_string(),
            source_html: page_html.to_string(),
            document,
        });
        Ok(self.session.is_some())
    }

    /// Discards the current document and loads the page again from its source.
    pub fn reload_page(&mut self) -> Result<bool, PageError> {
        let (url, source_html) = match &self.page {
            Some(page) => (page.url.clone(), page.source_html.clone()),
            None => return Err(PageError::NoSession),
        };
        self.open_page(&url, &source_html)
    }

    /// Drops the page. In-flight badge tasks finish against the detached document.
    pub fn close_page(&mut self) {
        self.session = None;
        self.page = None;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PageSession> {
        self.session.as_ref()
    }

    fn document(&self) -> Result<&SharedDocument, PageError> {
        self.page
            .as_ref()
            .map(|page| &page.document)
            .ok_or(PageError::NoSession)
    }

    /// Host-side mutation: parses `fragment` and appends it to the first
    /// element matching `selector`. Returns the number of top-level nodes added.
    pub fn append_html(&self, selector: &str, fragment: &str) -> Result<usize, PageError> {
        let parsed = Selector::parse(selector)?;
        let document = self.document()?;
        let mut doc = lock_document(document);
        let parent = doc
            .query_selector(Document::ROOT, &parsed)
            .ok_or_else(|| PageError::NoMatch(selector.to_string()))?;
        Ok(html::parse_fragment_into(&mut doc, parent, fragment)?.len())
    }

    /// Host-side mutation: removes every element matching `selector`.
    pub fn remove_matching(&self, selector: &str) -> Result<usize, PageError> {
        let selector = Selector::parse(selector)?;
        let document = self.document()?;
        let mut doc = lock_document(document);
        let matches = doc.query_selector_all(Document::ROOT, &selector);
        let mut removed = 0;
        for id in matches {
            // A match nested in an earlier removed match is already gone.
            if doc.is_connected(id) {
                doc.remove(id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn snapshot(&self) -> Result<String, PageError> {
        let document = self.document()?;
        Ok(html::to_html(&lock_document(document)))
    }

    pub fn badges(&self) -> Result<Vec<BadgeView>, PageError> {
        let document = self.document()?;
        Ok(badge_scanner::badge_views(&lock_document(document)))
    }

    /// Scanner of the active session, for awaiting its tasks outside the app lock.
    pub fn scanner(&self) -> Option<Arc<Mutex<BadgeScanner>>> {
        self.session.as_ref().map(PageSession::scanner)
    }

    /// Waits until every badge on the active page has resolved.
    pub async fn settle(&self) {
        if let Some(session) = &self.session {
            session.settle().await;
        }
    }
}
