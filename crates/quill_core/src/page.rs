//! Page setup: paper size, orientation and margins.

use crate::constants::{DEFAULT_MARGIN_INCHES, MIN_CONTENT_WIDTH_INCHES, MIN_MARGIN_INCHES};
use crate::ruler::clamp_lenient;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaperSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PaperSize {
    pub const ALL: [PaperSize; 3] = [PaperSize::Letter, PaperSize::A4, PaperSize::Legal];

    /// Portrait width and height in inches.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::A4 => (8.27, 11.69),
            PaperSize::Legal => (8.5, 14.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaperSize::Letter => "Letter (8.5\" x 11\")",
            PaperSize::A4 => "A4 (8.27\" x 11.69\")",
            PaperSize::Legal => "Legal (8.5\" x 14\")",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Margins in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: DEFAULT_MARGIN_INCHES,
            right: DEFAULT_MARGIN_INCHES,
            bottom: DEFAULT_MARGIN_INCHES,
            left: DEFAULT_MARGIN_INCHES,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageSetup {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub margins: Margins,
}

impl PageSetup {
    pub fn page_width(&self) -> f64 {
        let (width, height) = self.paper.dimensions();
        match self.orientation {
            Orientation::Portrait => width,
            Orientation::Landscape => height,
        }
    }

    pub fn page_height(&self) -> f64 {
        let (width, height) = self.paper.dimensions();
        match self.orientation {
            Orientation::Portrait => height,
            Orientation::Landscape => width,
        }
    }

    /// Clamp margins so each is at least the minimum and at least one inch of
    /// content remains in both directions.
    pub fn normalized(mut self) -> Self {
        let (left, right) = clamp_pair(self.margins.left, self.margins.right, self.page_width());
        let (top, bottom) = clamp_pair(self.margins.top, self.margins.bottom, self.page_height());
        self.margins = Margins {
            top,
            right,
            bottom,
            left,
        };
        self
    }

    /// CSS `@page` rule used when printing.
    pub fn css_page_rule(&self) -> String {
        format!(
            "@page {{ size: {}in {}in; margin: {}in {}in {}in {}in; }}",
            self.page_width(),
            self.page_height(),
            self.margins.top,
            self.margins.right,
            self.margins.bottom,
            self.margins.left
        )
    }
}

fn clamp_pair(first: f64, second: f64, extent: f64) -> (f64, f64) {
    let first = clamp_lenient(
        first,
        MIN_MARGIN_INCHES,
        extent - MIN_MARGIN_INCHES - MIN_CONTENT_WIDTH_INCHES,
    );
    let second = clamp_lenient(
        second,
        MIN_MARGIN_INCHES,
        extent - first - MIN_CONTENT_WIDTH_INCHES,
    );
    (first, second)
}

/// Parse a length typed into the page setup dialog. Accepts an optional
/// `in` or `"` suffix; anything unparseable becomes 0.
pub fn parse_inches(input: &str) -> f64 {
    let trimmed = input.trim();
    let number = trimmed
        .strip_suffix("in")
        .or_else(|| trimmed.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Editable text form of a [`PageSetup`], as held by the dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSetupDraft {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl PageSetupDraft {
    pub fn from_setup(setup: &PageSetup) -> Self {
        Self {
            paper: setup.paper,
            orientation: setup.orientation,
            top: setup.margins.top.to_string(),
            right: setup.margins.right.to_string(),
            bottom: setup.margins.bottom.to_string(),
            left: setup.margins.left.to_string(),
        }
    }

    /// Parse the fields leniently and clamp the result.
    pub fn apply(&self) -> PageSetup {
        PageSetup {
            paper: self.paper,
            orientation: self.orientation,
            margins: Margins {
                top: parse_inches(&self.top),
                right: parse_inches(&self.right),
                bottom: parse_inches(&self.bottom),
                left: parse_inches(&self.left),
            },
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inches_falls_back_to_zero() {
        assert_eq!(parse_inches("1.25"), 1.25);
        assert_eq!(parse_inches(" 2in "), 2.0);
        assert_eq!(parse_inches("0.5\""), 0.5);
        assert_eq!(parse_inches("abc"), 0.0);
        assert_eq!(parse_inches(""), 0.0);
        assert_eq!(parse_inches("inf"), 0.0);
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let setup = PageSetup {
            paper: PaperSize::Legal,
            orientation: Orientation::Landscape,
            ..PageSetup::default()
        };
        assert_eq!(setup.page_width(), 14.0);
        assert_eq!(setup.page_height(), 8.5);
    }

    #[test]
    fn draft_with_invalid_fields_is_clamped_to_minimum() {
        let mut draft = PageSetupDraft::from_setup(&PageSetup::default());
        draft.left = "oops".to_string();
        draft.right = "100".to_string();
        let setup = draft.apply();
        assert_eq!(setup.margins.left, MIN_MARGIN_INCHES);
        assert!((setup.margins.right - (8.5 - MIN_MARGIN_INCHES - 1.0)).abs() < 1e-9);
        assert_eq!(setup.margins.top, 1.0);
    }

    #[test]
    fn css_rule_includes_size_and_margins() {
        let rule = PageSetup::default().css_page_rule();
        assert_eq!(rule, "@page { size: 8.5in 11in; margin: 1in 1in 1in 1in; }");
    }
}
