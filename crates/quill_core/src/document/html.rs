//! HTML serialization of documents and a tolerant HTML reader.
//!
//! The writer emits the fragment stored in snapshots and fed to exporters.
//! The reader accepts that fragment back, plus the loose markup typical of
//! pasted or hand-written HTML: unclosed tags, stray text between blocks,
//! entities, and inline `style` attributes.

use super::runs::{normalize, Run, RunStyle};
use super::{Alignment, Block, Document, TableBlock, TextBlock, TextKind};

/// Serialize `document` as an HTML fragment.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    let mut open_list: Option<TextKind> = None;
    for block in document.blocks() {
        let list_kind = match block {
            Block::Text(text)
                if matches!(text.kind, TextKind::BulletItem | TextKind::OrderedItem) =>
            {
                Some(text.kind)
            }
            _ => None,
        };
        if open_list != list_kind {
            if let Some(kind) = open_list {
                out.push_str(list_tag(kind).1);
            }
            if let Some(kind) = list_kind {
                out.push_str(list_tag(kind).0);
            }
            open_list = list_kind;
        }
        match block {
            Block::Text(text) => write_text_block(&mut out, text),
            Block::Rule => out.push_str("<hr>"),
            Block::Table(table) => write_table(&mut out, table),
        }
    }
    if let Some(kind) = open_list {
        out.push_str(list_tag(kind).1);
    }
    out
}

fn list_tag(kind: TextKind) -> (&'static str, &'static str) {
    match kind {
        TextKind::OrderedItem => ("<ol>", "</ol>"),
        _ => ("<ul>", "</ul>"),
    }
}

/// Block `style` attribute: alignment, plus `pre-wrap` when the text holds
/// whitespace a browser (or [`from_html`]) would otherwise collapse.
fn block_style(block: &TextBlock) -> String {
    let mut decls = Vec::new();
    if block.align != Alignment::Left {
        decls.push(format!("text-align:{}", block.align.css()));
    }
    let text = block.text();
    if text.starts_with(' ') || text.ends_with(' ') || has_collapsible_whitespace(&text) {
        decls.push("white-space:pre-wrap".to_string());
    }
    if decls.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", decls.join(";"))
    }
}

/// Tabs, doubled spaces, and spaces touching a line break.
fn has_collapsible_whitespace(text: &str) -> bool {
    let mut previous = None;
    for ch in text.chars() {
        let space = ch.is_whitespace() && ch != '\u{a0}' && ch != '\n';
        if space && (ch != ' ' || previous.is_some_and(char::is_whitespace)) {
            return true;
        }
        if ch == '\n' && previous == Some(' ') {
            return true;
        }
        previous = Some(ch);
    }
    false
}

fn write_text_block(out: &mut String, block: &TextBlock) {
    let align = block_style(block);
    match block.kind {
        TextKind::Paragraph => {
            out.push_str(&format!("<p{}>", align));
            write_runs(out, &block.runs);
            out.push_str("</p>");
        }
        TextKind::Heading(level) => {
            out.push_str(&format!("<h{}{}>", level, align));
            write_runs(out, &block.runs);
            out.push_str(&format!("</h{}>", level));
        }
        TextKind::BulletItem | TextKind::OrderedItem => {
            out.push_str(&format!("<li{}>", align));
            write_runs(out, &block.runs);
            out.push_str("</li>");
        }
        TextKind::Quote => {
            out.push_str(&format!("<blockquote><p{}>", align));
            write_runs(out, &block.runs);
            out.push_str("</p></blockquote>");
        }
        TextKind::CodeBlock => {
            out.push_str("<pre><code>");
            for run in &block.runs {
                out.push_str(&escape_text(&run.text));
            }
            out.push_str("</code></pre>");
        }
    }
}

fn write_table(out: &mut String, table: &TableBlock) {
    out.push_str("<table><tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&escape_text(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_runs(out: &mut String, runs: &[Run]) {
    for run in runs {
        let style = &run.style;
        let mut closers: Vec<&str> = Vec::new();
        if let Some(href) = &style.link {
            out.push_str(&format!("<a href=\"{}\">", escape_attr(href)));
            closers.push("</a>");
        }
        let css = inline_css(style);
        if !css.is_empty() {
            out.push_str(&format!("<span style=\"{}\">", escape_attr(&css)));
            closers.push("</span>");
        }
        for (on, open, close) in [
            (style.bold, "<strong>", "</strong>"),
            (style.italic, "<em>", "</em>"),
            (style.underline, "<u>", "</u>"),
            (style.strike, "<s>", "</s>"),
            (style.highlight, "<mark>", "</mark>"),
            (style.code, "<code>", "</code>"),
        ] {
            if on {
                out.push_str(open);
                closers.push(close);
            }
        }
        out.push_str(&escape_text(&run.text).replace('\n', "<br>"));
        for close in closers.iter().rev() {
            out.push_str(close);
        }
    }
}

fn inline_css(style: &RunStyle) -> String {
    let mut parts = Vec::new();
    if let Some(color) = &style.color {
        parts.push(format!("color:{}", color));
    }
    if let Some(family) = &style.font_family {
        parts.push(format!("font-family:{}", family));
    }
    if let Some(size) = style.font_size {
        parts.push(format!("font-size:{}pt", size));
    }
    parts.join(";")
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Reader

#[derive(Debug, PartialEq)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(String),
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = html;
    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        let tail = &rest[lt..];
        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }
        let next = tail[1..].chars().next();
        let is_tag = matches!(next, Some(ch) if ch.is_ascii_alphabetic() || ch == '/' || ch == '!' || ch == '?');
        let close = tail.find('>');
        match (is_tag, close) {
            (true, Some(close)) => {
                if !text.is_empty() {
                    tokens.push(Token::Text(decode_entities(&text)));
                    text.clear();
                }
                if let Some(token) = parse_tag(&tail[1..close]) {
                    tokens.push(token);
                }
                rest = &tail[close + 1..];
            }
            _ => {
                text.push('<');
                rest = &tail[1..];
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(&text)));
    }
    tokens
}

fn parse_tag(inner: &str) -> Option<Token> {
    if inner.starts_with('!') || inner.starts_with('?') {
        return None;
    }
    if let Some(name) = inner.strip_prefix('/') {
        return Some(Token::End {
            name: name.trim().to_ascii_lowercase(),
        });
    }
    let inner = inner.trim_end_matches('/');
    let name_end = inner
        .find(|ch: char| ch.is_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    Some(Token::Start {
        name,
        attrs: parse_attrs(&inner[name_end..]),
    })
}

fn parse_attrs(source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = source.chars().peekable();
    loop {
        while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&ch) = chars.peek() {
            if ch.is_whitespace() || ch == '=' {
                break;
            }
            name.push(ch);
            chars.next();
        }
        if name.is_empty() {
            if chars.next().is_none() {
                break;
            }
            continue;
        }
        while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
            chars.next();
        }
        let mut value = String::new();
        if chars.peek() == Some(&'=') {
            chars.next();
            while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch == quote {
                            break;
                        }
                        value.push(ch);
                    }
                }
                _ => {
                    while let Some(&ch) = chars.peek() {
                        if ch.is_whitespace() {
                            break;
                        }
                        value.push(ch);
                        chars.next();
                    }
                }
            }
        }
        attrs.push((name.to_ascii_lowercase(), decode_entities(&value)));
    }
    attrs
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn css_declarations(attrs: &[(String, String)]) -> Vec<(String, String)> {
    attr(attrs, "style")
        .map(|style| {
            style
                .split(';')
                .filter_map(|decl| {
                    let (key, value) = decl.split_once(':')?;
                    Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_font_size(value: &str) -> Option<u16> {
    let value = value.trim().to_ascii_lowercase();
    let (number, scale) = if let Some(pt) = value.strip_suffix("pt") {
        (pt, 1.0)
    } else if let Some(px) = value.strip_suffix("px") {
        (px, 0.75)
    } else {
        (value.as_str(), 1.0)
    };
    let size = number.trim().parse::<f64>().ok()? * scale;
    if size.is_finite() && size >= 1.0 {
        Some(size.round().min(u16::MAX as f64) as u16)
    } else {
        None
    }
}

fn block_alignment(attrs: &[(String, String)]) -> Alignment {
    css_declarations(attrs)
        .iter()
        .find(|(key, _)| key == "text-align")
        .and_then(|(_, value)| Alignment::from_css(value))
        .or_else(|| attr(attrs, "align").and_then(Alignment::from_css))
        .unwrap_or_default()
}

fn keeps_whitespace(attrs: &[(String, String)]) -> bool {
    css_declarations(attrs).iter().any(|(key, value)| {
        key == "white-space" && matches!(value.as_str(), "pre" | "pre-wrap" | "break-spaces")
    })
}

const SKIPPED: [&str; 5] = ["head", "style", "script", "title", "template"];
const VOID: [&str; 7] = ["br", "hr", "img", "meta", "link", "input", "col"];

#[derive(Default)]
struct Reader {
    blocks: Vec<Block>,
    current: Option<TextBlock>,
    styles: Vec<(String, RunStyle)>,
    lists: Vec<TextKind>,
    quote_depth: usize,
    in_pre: bool,
    /// The open block asked for `white-space: pre` or `pre-wrap`.
    keep_spaces: bool,
    skip_depth: usize,
    table: Option<TableBlock>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl Reader {
    fn style(&self) -> RunStyle {
        self.styles
            .last()
            .map(|(_, style)| style.clone())
            .unwrap_or_default()
    }

    fn context_kind(&self) -> TextKind {
        if self.in_pre {
            TextKind::CodeBlock
        } else if let Some(kind) = self.lists.last() {
            *kind
        } else if self.quote_depth > 0 {
            TextKind::Quote
        } else {
            TextKind::Paragraph
        }
    }

    fn open_block(&mut self, kind: TextKind, align: Alignment) {
        if let Some(current) = &mut self.current {
            // `<li><p>` and `<blockquote><p>` reuse the block the container opened.
            if current.runs.is_empty() && (kind == TextKind::Paragraph || kind == current.kind) {
                if align != Alignment::Left {
                    current.align = align;
                }
                return;
            }
        }
        self.flush();
        let mut block = TextBlock::new(kind, "");
        block.align = align;
        self.current = Some(block);
    }

    /// Open a `p`/`div`/`h*`/`li` block, honoring its inline style.
    fn open_styled_block(&mut self, kind: TextKind, attrs: &[(String, String)]) {
        self.open_block(kind, block_alignment(attrs));
        if keeps_whitespace(attrs) {
            self.keep_spaces = true;
        }
    }

    fn flush(&mut self) {
        let keep_spaces = std::mem::take(&mut self.keep_spaces);
        let Some(mut block) = self.current.take() else {
            return;
        };
        if keep_spaces {
            block.runs.retain(|run| !run.text.is_empty());
        } else if block.kind != TextKind::CodeBlock {
            while let Some(last) = block.runs.last_mut() {
                let trimmed = last.text.trim_end_matches(' ').len();
                last.text.truncate(trimmed);
                if !last.text.is_empty() {
                    break;
                }
                block.runs.pop();
            }
        } else if let Some(last) = block.runs.last_mut() {
            if last.text.ends_with('\n') {
                last.text.pop();
            }
        }
        normalize(&mut block.runs);
        self.blocks.push(Block::Text(block));
    }

    fn push_text(&mut self, raw: &str) {
        if let Some(cell) = &mut self.cell {
            let collapsed = collapse_whitespace(raw);
            if cell.is_empty() || cell.ends_with(' ') {
                cell.push_str(collapsed.trim_start());
            } else {
                cell.push_str(&collapsed);
            }
            return;
        }
        if self.table.is_some() {
            return;
        }
        if self.in_pre {
            if self.current.is_none() {
                self.open_block(TextKind::CodeBlock, Alignment::Left);
            }
            let text = match &self.current {
                Some(block) if block.runs.is_empty() => raw.strip_prefix('\n').unwrap_or(raw),
                _ => raw,
            };
            self.append(text.to_string(), RunStyle::default());
            return;
        }
        if self.keep_spaces && self.current.is_some() {
            let style = self.style();
            self.append(raw.to_string(), style);
            return;
        }
        let collapsed = collapse_whitespace(raw);
        if self.current.is_none() {
            if collapsed.trim().is_empty() {
                return;
            }
            let kind = self.context_kind();
            self.open_block(kind, Alignment::Left);
        }
        let at_line_start = self
            .current
            .as_ref()
            .map(|block| {
                block
                    .runs
                    .last()
                    .map(|run| run.text.ends_with([' ', '\n']))
                    .unwrap_or(true)
            })
            .unwrap_or(true);
        let text = if at_line_start {
            collapsed.trim_start().to_string()
        } else {
            collapsed
        };
        let style = self.style();
        self.append(text, style);
    }

    fn append(&mut self, text: String, style: RunStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(block) = &mut self.current {
            match block.runs.last_mut() {
                Some(last) if last.style == style => last.text.push_str(&text),
                _ => block.runs.push(Run::styled(text, style)),
            }
        }
    }

    fn start(&mut self, name: &str, attrs: &[(String, String)]) {
        if SKIPPED.contains(&name) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match name {
            "p" | "div" => {
                let kind = self.context_kind();
                self.open_styled_block(kind, attrs);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                self.flush();
                self.open_styled_block(TextKind::heading(level), attrs);
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.push(if name == "ol" {
                    TextKind::OrderedItem
                } else {
                    TextKind::BulletItem
                });
            }
            "li" => {
                self.flush();
                let kind = self.lists.last().copied().unwrap_or(TextKind::BulletItem);
                self.open_styled_block(kind, attrs);
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            "pre" => {
                self.flush();
                self.in_pre = true;
                self.open_block(TextKind::CodeBlock, Alignment::Left);
            }
            "hr" => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            "br" => {
                if let Some(cell) = &mut self.cell {
                    cell.push(' ');
                } else if self.current.is_some() {
                    let style = self.style();
                    self.append("\n".to_string(), style);
                }
            }
            "table" => {
                self.flush();
                self.table = Some(TableBlock { rows: Vec::new() });
            }
            "tr" => {
                self.finish_row();
                self.row = Some(Vec::new());
            }
            "td" | "th" => {
                self.finish_cell();
                if self.row.is_none() {
                    self.row = Some(Vec::new());
                }
                self.cell = Some(String::new());
            }
            _ => self.start_inline(name, attrs),
        }
    }

    fn start_inline(&mut self, name: &str, attrs: &[(String, String)]) {
        if VOID.contains(&name) {
            return;
        }
        let mut style = self.style();
        match name {
            "strong" | "b" => style.bold = true,
            "em" | "i" => style.italic = true,
            "u" | "ins" => style.underline = true,
            "s" | "strike" | "del" => style.strike = true,
            "mark" => style.highlight = true,
            "code" if !self.in_pre => style.code = true,
            "a" => style.link = attr(attrs, "href").map(str::to_string),
            _ => {}
        }
        for (key, value) in css_declarations(attrs) {
            match key.as_str() {
                "color" if !value.is_empty() => style.color = Some(value),
                "font-family" if !value.is_empty() => {
                    style.font_family = Some(value.trim_matches(['"', '\'']).to_string())
                }
                "font-size" => {
                    if let Some(size) = parse_font_size(&value) {
                        style.font_size = Some(size);
                    }
                }
                "font-weight" if value == "bold" || value == "700" => style.bold = true,
                "font-style" if value == "italic" => style.italic = true,
                _ => {}
            }
        }
        if name == "font" {
            if let Some(color) = attr(attrs, "color") {
                style.color = Some(color.to_string());
            }
            if let Some(face) = attr(attrs, "face") {
                style.font_family = Some(face.to_string());
            }
        }
        self.styles.push((name.to_string(), style));
    }

    fn end(&mut self, name: &str) {
        if SKIPPED.contains(&name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }
        match name {
            "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.flush(),
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
            }
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            "pre" => {
                self.flush();
                self.in_pre = false;
            }
            "td" | "th" => self.finish_cell(),
            "tr" => self.finish_row(),
            "table" => self.finish_table(),
            _ => {
                if let Some(index) = self.styles.iter().rposition(|(open, _)| open == name) {
                    self.styles.truncate(index);
                }
            }
        }
    }

    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            let row = self.row.get_or_insert_with(Vec::new);
            row.push(cell.trim().to_string());
        }
    }

    fn finish_row(&mut self) {
        self.finish_cell();
        if let Some(row) = self.row.take() {
            if let Some(table) = &mut self.table {
                if !row.is_empty() {
                    table.rows.push(row);
                }
            }
        }
    }

    fn finish_table(&mut self) {
        self.finish_row();
        if let Some(mut table) = self.table.take() {
            let cols = table.rows.iter().map(Vec::len).max().unwrap_or(0);
            if cols > 0 {
                for row in &mut table.rows {
                    row.resize(cols, String::new());
                }
                self.blocks.push(Block::Table(table));
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.finish_table();
        self.flush();
        self.blocks
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(if ch == '\u{a0}' { ' ' } else { ch });
            in_space = false;
        }
    }
    out
}

/// Parse an HTML fragment or page into a document.
pub fn from_html(html: &str) -> Document {
    let mut reader = Reader::default();
    for token in tokenize(html) {
        match token {
            Token::Start { name, attrs } => reader.start(&name, &attrs),
            Token::End { name } => reader.end(&name),
            Token::Text(text) => {
                if reader.skip_depth == 0 {
                    reader.push_text(&text);
                }
            }
        }
    }
    Document::from_blocks(reader.finish())
}
