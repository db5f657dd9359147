//! Styled run storage and range operations on a single text block.

use super::surface::{Mark, StyleChange};

/// Inline formatting carried by a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub highlight: bool,
    /// CSS color, usually `#rrggbb`.
    pub color: Option<String>,
    pub font_family: Option<String>,
    /// Point size.
    pub font_size: Option<u16>,
    pub link: Option<String>,
}

impl RunStyle {
    pub fn has_mark(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strike => self.strike,
            Mark::Code => self.code,
            Mark::Highlight => self.highlight,
        }
    }

    pub fn set_mark(&mut self, mark: Mark, on: bool) {
        let slot = match mark {
            Mark::Bold => &mut self.bold,
            Mark::Italic => &mut self.italic,
            Mark::Underline => &mut self.underline,
            Mark::Strike => &mut self.strike,
            Mark::Code => &mut self.code,
            Mark::Highlight => &mut self.highlight,
        };
        *slot = on;
    }

    pub fn is_plain(&self) -> bool {
        *self == RunStyle::default()
    }

    pub(crate) fn apply(&mut self, change: &StyleChange) {
        match change {
            StyleChange::Mark(mark, on) => self.set_mark(*mark, *on),
            StyleChange::Color(color) => self.color = color.clone(),
            StyleChange::FontFamily(family) => self.font_family = family.clone(),
            StyleChange::FontSize(size) => self.font_size = *size,
            StyleChange::Link(link) => self.link = link.clone(),
            StyleChange::ClearFormatting => *self = RunStyle::default(),
        }
    }
}

/// A stretch of text sharing one style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

pub(crate) fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

pub(crate) fn runs_text(runs: &[Run]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

pub(crate) fn runs_len(runs: &[Run]) -> usize {
    runs.iter().map(|run| run.text.chars().count()).sum()
}

/// Split so that a run boundary falls at `at`; returns the index of the first
/// run starting at or after `at`.
fn split_at(runs: &mut Vec<Run>, at: usize) -> usize {
    let mut offset = 0;
    let mut index = 0;
    while index < runs.len() {
        let len = runs[index].text.chars().count();
        if at == offset {
            return index;
        }
        if at < offset + len {
            let byte = char_to_byte(&runs[index].text, at - offset);
            let tail = runs[index].text.split_off(byte);
            let style = runs[index].style.clone();
            runs.insert(index + 1, Run { text: tail, style });
            return index + 1;
        }
        offset += len;
        index += 1;
    }
    runs.len()
}

/// Style a character typed at `at` should inherit.
pub(crate) fn style_at(runs: &[Run], at: usize) -> RunStyle {
    let mut offset = 0;
    let mut last = None;
    for run in runs {
        let len = run.text.chars().count();
        if len == 0 {
            continue;
        }
        if at > offset && at <= offset + len {
            return run.style.clone();
        }
        if last.is_none() && at <= offset {
            return run.style.clone();
        }
        last = Some(&run.style);
        offset += len;
    }
    last.cloned().unwrap_or_default()
}

/// Replace `from..to` (char offsets within the block) with `text`. The new
/// text takes the style of the first replaced char, or of the char before a
/// caret.
pub(crate) fn replace_range(runs: &mut Vec<Run>, from: usize, to: usize, text: &str) {
    let style = if from < to {
        style_at(runs, from + 1)
    } else {
        style_at(runs, from)
    };
    let start = split_at(runs, from);
    let end = split_at(runs, to);
    runs.drain(start..end);
    if !text.is_empty() {
        runs.insert(start, Run::styled(text, style));
    }
    normalize(runs);
}

/// Apply `change` to every run covering `from..to`.
pub(crate) fn restyle_range(runs: &mut Vec<Run>, from: usize, to: usize, change: &StyleChange) {
    if from >= to {
        return;
    }
    let start = split_at(runs, from);
    let end = split_at(runs, to);
    for run in &mut runs[start..end] {
        run.style.apply(change);
    }
    normalize(runs);
}

/// Whether every char in `from..to` carries `mark`. Empty ranges look at the
/// style a typed char would inherit.
pub(crate) fn range_has_mark(runs: &[Run], from: usize, to: usize, mark: Mark) -> bool {
    if from >= to {
        return style_at(runs, from).has_mark(mark);
    }
    let mut offset = 0;
    for run in runs {
        let len = run.text.chars().count();
        let run_end = offset + len;
        if run_end > from && offset < to && !run.style.has_mark(mark) {
            return false;
        }
        offset = run_end;
    }
    true
}

/// Split runs at `at`, returning the tail.
pub(crate) fn split_off(runs: &mut Vec<Run>, at: usize) -> Vec<Run> {
    let index = split_at(runs, at);
    let mut tail = runs.split_off(index);
    normalize(runs);
    normalize(&mut tail);
    tail
}

/// Drop empty runs and merge neighbours with identical styles.
pub(crate) fn normalize(runs: &mut Vec<Run>) {
    runs.retain(|run| !run.text.is_empty());
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        match merged.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    *runs = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> RunStyle {
        RunStyle {
            bold: true,
            ..RunStyle::default()
        }
    }

    #[test]
    fn replace_inherits_style_of_preceding_char() {
        let mut runs = vec![Run::styled("Hello", bold()), Run::plain(" world")];
        replace_range(&mut runs, 5, 5, "!!");
        assert_eq!(
            runs,
            vec![Run::styled("Hello!!", bold()), Run::plain(" world")]
        );
    }

    #[test]
    fn replace_across_runs_removes_middle() {
        let mut runs = vec![
            Run::plain("ab"),
            Run::styled("cd", bold()),
            Run::plain("ef"),
        ];
        replace_range(&mut runs, 1, 5, "");
        assert_eq!(runs, vec![Run::plain("af")]);
    }

    #[test]
    fn restyle_splits_and_merges() {
        let mut runs = vec![Run::plain("one two three")];
        restyle_range(&mut runs, 4, 7, &StyleChange::Mark(Mark::Bold, true));
        assert_eq!(
            runs,
            vec![
                Run::plain("one "),
                Run::styled("two", bold()),
                Run::plain(" three"),
            ]
        );
        restyle_range(&mut runs, 0, 13, &StyleChange::Mark(Mark::Bold, false));
        assert_eq!(runs, vec![Run::plain("one two three")]);
    }

    #[test]
    fn range_has_mark_requires_every_char() {
        let runs = vec![Run::styled("ab", bold()), Run::plain("cd")];
        assert!(range_has_mark(&runs, 0, 2, Mark::Bold));
        assert!(!range_has_mark(&runs, 1, 3, Mark::Bold));
        assert!(range_has_mark(&runs, 1, 1, Mark::Bold));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let mut runs = vec![Run::plain("héllo wörld")];
        restyle_range(&mut runs, 1, 2, &StyleChange::Mark(Mark::Italic, true));
        assert_eq!(runs[1].text, "é");
        replace_range(&mut runs, 7, 8, "o");
        assert_eq!(runs_text(&runs), "héllo world");
    }

    #[test]
    fn split_off_returns_tail_runs() {
        let mut runs = vec![Run::styled("head", bold()), Run::plain("tail")];
        let tail = split_off(&mut runs, 2);
        assert_eq!(runs, vec![Run::styled("he", bold())]);
        assert_eq!(tail, vec![Run::styled("ad", bold()), Run::plain("tail")]);
    }
}
