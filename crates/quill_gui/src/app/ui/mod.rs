//! UI panel modules extracted from the main app update loop.

/// Assistant side panel.
pub(super) mod assistant_panel;
/// Paper canvas with one text widget per segment.
pub(super) mod canvas;
/// Page setup and insert dialogs.
pub(super) mod dialogs;
/// Find/replace bar.
pub(super) mod find_bar;
/// Menu bar and formatting toolbar.
pub(super) mod menus;
/// Heading outline panel.
pub(super) mod outline;
/// Margin and tab-stop ruler.
pub(super) mod ruler;
/// Keyboard shortcut help window.
pub(super) mod shortcut_help;
/// Bottom status bar content.
pub(super) mod status_bar;
/// Editable title and save indicator.
pub(super) mod title_bar;
/// Transient toast notifications.
pub(super) mod toasts;
