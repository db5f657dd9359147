//! Core domain library for Quill (document model, ruler, search, storage, export).

/// AI writing assistant with template-based generation.
pub mod assistant;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Block document model, editing surface, and HTML/Markdown conversion.
pub mod document;
/// Core error types.
pub mod error;
/// PDF, DOCX, Markdown and HTML export.
pub mod export;
/// Undo/redo over document states.
pub mod history;
/// Heading outline extraction.
pub mod outline;
/// Paper size, orientation and margins.
pub mod page;
/// Ruler coordinate and drag model.
pub mod ruler;
/// Find/replace match scanning.
pub mod search;
/// Single-snapshot persistence.
pub mod storage;

pub use config::Config;
pub use document::Document;
pub use error::CoreError;
pub use storage::SnapshotStore;
