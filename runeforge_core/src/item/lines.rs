//! Line-level model of a copied item card.
//!
//! Every line is classified once while parsing, so the override engines match
//! on [`LineKind`] instead of re-scanning text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Marker line that delimits logical blocks of an item card.
pub const SEPARATOR: &str = "--------";

const RUNE_SUFFIX: &str = "(rune)";

static RUNE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\(rune\)\s*$").unwrap_or_else(|e| panic!("invalid rune regex: {e}"))
});

static ENCHANT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Allocates\s+").unwrap_or_else(|e| panic!("invalid enchant regex: {e}"))
});

/// Structural role of a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Separator,
    /// `Item Class: <name>`
    ItemClass(String),
    Rarity,
    /// `Sockets: S S` with the number of socket symbols.
    Sockets(usize),
    ItemLevel,
    Requires,
    /// Any line ending with the `(rune)` marker.
    Rune,
    /// `Allocates <passive>` amulet enchant.
    Enchant,
    Text,
}

impl LineKind {
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line == SEPARATOR {
            return Self::Separator;
        }
        if let Some(count) = line.strip_prefix("Sockets: ") {
            return Self::Sockets(count.split_whitespace().count());
        }
        if let Some(name) = strip_prefix_ignore_case(line, "Item Class:") {
            return Self::ItemClass(name.trim().to_string());
        }
        if strip_prefix_ignore_case(line, "Rarity:").is_some() {
            return Self::Rarity;
        }
        if strip_prefix_ignore_case(line, "Item Level:").is_some() {
            return Self::ItemLevel;
        }
        if strip_prefix_ignore_case(line, "Requires:").is_some() {
            return Self::Requires;
        }
        if is_rune_line(line) {
            return Self::Rune;
        }
        if ENCHANT_RE.is_match(line) {
            return Self::Enchant;
        }
        Self::Text
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

/// Whether `text` carries the `(rune)` marker at its end.
#[must_use]
pub fn is_rune_line(text: &str) -> bool {
    RUNE_SUFFIX_RE.is_match(text)
}

/// Append the `(rune)` marker unless it is already present.
#[must_use]
pub fn rune_line(text: &str) -> String {
    if is_rune_line(text) {
        text.to_string()
    } else {
        format!("{text} {RUNE_SUFFIX}")
    }
}

/// Remove the `(rune)` marker and any whitespace around it.
#[must_use]
pub fn strip_rune_suffix(text: &str) -> &str {
    RUNE_SUFFIX_RE
        .find(text)
        .map_or(text, |m| &text[..m.start()])
}

/// Build the `Sockets:` line declaring `count` filler sockets.
#[must_use]
pub fn sockets_line(count: usize) -> String {
    let symbols = vec!["S"; count].join(" ");
    format!("Sockets: {symbols}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = LineKind::classify(&text);
        Self { text, kind }
    }

    #[must_use]
    pub fn separator() -> Self {
        Self {
            text: SEPARATOR.to_string(),
            kind: LineKind::Separator,
        }
    }

    #[must_use]
    pub const fn is_separator(&self) -> bool {
        matches!(self.kind, LineKind::Separator)
    }
}

/// Ordered lines of one item card.
///
/// Separators delimit logical blocks but the number of blocks is never fixed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemDescription {
    lines: Vec<Line>,
}

impl ItemDescription {
    /// Split on `\n` with no other normalization.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(Line::new).collect(),
        }
    }

    #[must_use]
    pub fn serialize(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the card has no meaningful text at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        let text = self.serialize();
        let trimmed = text.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
    }

    /// Index of the first line satisfying `predicate`.
    pub fn find(&self, predicate: impl Fn(&LineKind) -> bool) -> Option<usize> {
        self.lines.iter().position(|line| predicate(&line.kind))
    }

    /// Index of the first line of exactly `kind`.
    #[must_use]
    pub fn find_kind(&self, kind: &LineKind) -> Option<usize> {
        self.find(|k| k == kind)
    }

    #[must_use]
    pub fn first_separator(&self) -> Option<usize> {
        self.find_kind(&LineKind::Separator)
    }

    /// Texts of every `(rune)` line, in document order.
    #[must_use]
    pub fn rune_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Rune)
            .map(|line| line.text.as_str())
            .collect()
    }

    /// Socket symbols declared on the `Sockets:` line, 0 when absent.
    #[must_use]
    pub fn declared_sockets(&self) -> usize {
        self.lines
            .iter()
            .find_map(|line| match line.kind {
                LineKind::Sockets(count) => Some(count),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Value of the `Item Class:` line, if any.
    #[must_use]
    pub fn item_class(&self) -> Option<&str> {
        self.lines.iter().find_map(|line| match &line.kind {
            LineKind::ItemClass(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Base type line: the last header line that is neither class nor rarity.
    #[must_use]
    pub fn type_line(&self) -> Option<&str> {
        self.lines
            .iter()
            .take_while(|line| !line.is_separator())
            .filter(|line| line.kind == LineKind::Text && !line.text.trim().is_empty())
            .map(|line| line.text.trim())
            .last()
    }

    fn is_separator_at(&self, index: usize) -> bool {
        self.lines.get(index).is_some_and(Line::is_separator)
    }

    /// Make sure a separator sits directly before `index`.
    ///
    /// Returns the (possibly shifted) index of the line that was at `index`.
    /// Nothing is inserted at the very start of the document.
    pub fn ensure_separator_before(&mut self, index: usize) -> usize {
        if index == 0 || index > self.lines.len() || self.is_separator_at(index - 1) {
            return index;
        }
        self.lines.insert(index, Line::separator());
        index + 1
    }

    /// Make sure a separator sits directly after `index`.
    ///
    /// Nothing is inserted when `index` is the last line.
    pub fn ensure_separator_after(&mut self, index: usize) {
        let next = index + 1;
        if next >= self.lines.len() || self.is_separator_at(next) {
            return;
        }
        self.lines.insert(next, Line::separator());
    }

    fn insert_bounded(&mut self, at: usize, block: Vec<Line>) -> usize {
        if block.is_empty() {
            return at;
        }
        let count = block.len();
        self.lines.splice(at..at, block);
        let first = self.ensure_separator_before(at);
        self.ensure_separator_after(first + count - 1);
        first
    }

    /// Insert `block` ahead of the line at `anchor`, separator-bounded.
    ///
    /// When the anchor is already preceded by a separator the block lands in
    /// front of that separator and reuses it. Returns the block's first index.
    pub fn insert_block_before(&mut self, anchor: usize, block: Vec<Line>) -> usize {
        let mut at = anchor.min(self.lines.len());
        if at > 0 && self.is_separator_at(at - 1) {
            at -= 1;
        }
        self.insert_bounded(at, block)
    }

    /// Insert `block` right after the line at `anchor`, separator-bounded.
    pub fn insert_block_after(&mut self, anchor: usize, block: Vec<Line>) -> usize {
        let at = (anchor + 1).min(self.lines.len());
        self.insert_bounded(at, block)
    }

    /// Append `block` at the end of the document behind a separator.
    pub fn push_block(&mut self, block: Vec<Line>) -> usize {
        let at = self.lines.len();
        self.insert_bounded(at, block)
    }

    pub fn replace(&mut self, index: usize, line: Line) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line;
        }
    }

    /// Replace the inclusive range `first..=last` with `lines`.
    pub fn splice_range(&mut self, first: usize, last: usize, lines: Vec<Line>) {
        let end = (last + 1).min(self.lines.len());
        self.lines.splice(first..end, lines);
    }

    /// Remove every line whose kind matches, collapsing separators that end
    /// up adjacent or at either end of the document. Returns how many lines
    /// matched.
    pub fn remove_where(&mut self, predicate: impl Fn(&LineKind) -> bool) -> usize {
        let before = self.lines.len();
        let mut out: Vec<Line> = Vec::with_capacity(before);
        let mut removed = 0;
        let mut dropped_since_keep = false;

        for line in self.lines.drain(..) {
            if predicate(&line.kind) {
                removed += 1;
                dropped_since_keep = true;
                continue;
            }
            let orphaned = line.is_separator() && out.last().is_none_or(Line::is_separator);
            if !(orphaned && dropped_since_keep) {
                out.push(line);
            }
            dropped_since_keep = false;
        }

        if dropped_since_keep && out.last().is_some_and(Line::is_separator) {
            out.pop();
        }
        self.lines = out;
        removed
    }
}

impl fmt::Display for ItemDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl From<&str> for ItemDescription {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}
