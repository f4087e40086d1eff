use std::fmt;

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === GitHubError ===

/// Errors raised while fetching review data from GitHub.
///
/// The `Display` text is what a badge shows as its error tooltip.
#[derive(Debug, Clone, PartialEq)]
pub enum GitHubError {
    /// The request never produced an HTTP response.
    NetworkError(String),
    /// GitHub answered with something other than 200.
    ApiError { status: u16, path: String },
    /// The response body was not the expected JSON.
    ParseError(String),
    /// The HTTP client could not be constructed.
    ClientError(String),
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubError::NetworkError(msg) => write!(f, "GitHub network error: {}", msg),
            GitHubError::ApiError { status, path } => write!(f, "API {}: {}", status, path),
            GitHubError::ParseError(msg) => write!(f, "GitHub response parse error: {}", msg),
            GitHubError::ClientError(msg) => write!(f, "GitHub client error: {}", msg),
        }
    }
}

impl std::error::Error for GitHubError {}

// === PageError ===

/// Errors related to the host page: URLs, selectors, and document nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum PageError {
    /// The page URL could not be understood.
    InvalidUrl(String),
    /// A CSS selector could not be parsed.
    InvalidSelector(String),
    /// The node does not exist in the document (never created or removed).
    NodeNotFound(usize),
    /// The operation would make a node its own ancestor.
    HierarchyError(usize),
    /// No element matched the selector.
    NoMatch(String),
    /// No page is currently open.
    NoSession,
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::InvalidUrl(url) => write!(f, "Invalid page URL: {}", url),
            PageError::InvalidSelector(sel) => write!(f, "Invalid selector: {}", sel),
            PageError::NodeNotFound(id) => write!(f, "Node not found: {}", id),
            PageError::HierarchyError(id) => {
                write!(f, "Node {} cannot be inserted into its own subtree", id)
            }
            PageError::NoMatch(sel) => write!(f, "No element matches {}", sel),
            PageError::NoSession => write!(f, "No page is open"),
        }
    }
}

impl std::error::Error for PageError {}

// === CommandError ===

/// Errors from user-invoked configuration commands.
#[derive(Debug)]
pub enum CommandError {
    /// The command name is not recognized.
    UnknownCommand(String),
    /// An argument was missing or not one of the accepted values.
    InvalidArgument(String),
    /// Persisting the change failed.
    Settings(SettingsError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(name) => write!(f, "Unknown command: {}", name),
            CommandError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CommandError::Settings(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Settings(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        CommandError::Settings(err)
    }
}
