// ReviewBadge host document model
// The element tree the scanner reads and writes, with selector queries and HTML I/O.

pub mod document;
pub mod html;
pub mod selector;

pub use document::{Document, NodeData, NodeId, SharedDocument};
pub use selector::Selector;
