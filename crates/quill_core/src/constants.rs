//! Shared constants used across Quill crates.

/// Reference resolution for ruler and page geometry.
pub const PIXELS_PER_INCH: f64 = 96.0;

/// Granularity that margins and tab stops snap to, in inches.
pub const SNAP_INCREMENT_INCHES: f64 = 0.25;
/// Smallest margin a ruler drag may produce, in inches.
pub const MIN_MARGIN_INCHES: f64 = 0.25;
/// Narrowest content band a margin drag may leave, in inches.
pub const MIN_CONTENT_WIDTH_INCHES: f64 = 1.0;
/// Matching tolerance for tab-stop removal and deduplication, in inches.
pub const TAB_STOP_TOLERANCE_INCHES: f64 = 0.05;

/// Zoom range accepted by the ruler and canvas, in percent.
pub const MIN_ZOOM_PERCENT: f64 = 50.0;
/// Upper zoom bound, in percent.
pub const MAX_ZOOM_PERCENT: f64 = 200.0;
/// Zoom presets offered by the view menu.
pub const ZOOM_PRESETS: [f64; 7] = [50.0, 75.0, 90.0, 100.0, 125.0, 150.0, 200.0];
/// Default zoom in percent.
pub const DEFAULT_ZOOM_PERCENT: f64 = 100.0;

/// Default page margins in inches.
pub const DEFAULT_MARGIN_INCHES: f64 = 1.0;

/// Storage key holding the single document snapshot.
pub const SNAPSHOT_KEY: &str = "quill.document";

/// Default autosave interval in milliseconds.
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 2_000;
/// Default delay between revealed assistant chunks in milliseconds.
pub const DEFAULT_ASSISTANT_REVEAL_MS: u64 = 35;

/// Fallback file stem for exports with a blank title.
pub const DEFAULT_EXPORT_STEM: &str = "untitled-document";
/// Title given to fresh documents.
pub const DEFAULT_DOCUMENT_TITLE: &str = "Untitled document";
