//! Root crate facade for the Quill word processor.
//!
//! Re-exports the document core so downstream code and the integration tests
//! can depend on `quill` alone. The desktop shell is behind the `gui` feature.

pub use quill_core::{
    assistant, config, constants, document, error, export, history, outline, page, ruler,
    search, storage, Config, CoreError, Document, SnapshotStore,
};

#[cfg(feature = "gui")]
pub use quill_gui::run;
