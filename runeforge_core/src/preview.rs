//! Local preview fragment shown next to the impact result.

use crate::overrides::{EnchantAction, EnchantResult};

const BOX_STYLE: &str =
    "margin-bottom:6px;padding:6px 8px;border:1px solid #333;background:#121212;border-radius:8px;";
const WARNING: &str = "wrong item type: these runes do not fit this item, reload runes and pick again";

/// Inline error shown when the impact service cannot be reached.
pub const HTTP_ERROR_HTML: &str = r#"<span style="color:#f55">HTTP error</span>"#;

/// Inline error shown when the card carries no usable text.
pub const NO_ITEM_TEXT_HTML: &str = r#"<span style="color:#f55">No item text</span>"#;

#[derive(Debug, Clone)]
pub struct Preview<'a> {
    pub used_runes: &'a [String],
    pub target_socket_count: usize,
    /// Sockets added by padding.
    pub added_sockets: usize,
    pub incompatible: bool,
    pub enchant: &'a EnchantResult,
}

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

impl Preview<'_> {
    fn warning_html(&self) -> String {
        if self.incompatible {
            format!(r#"<div style="color:#ff6666;margin:0 0 6px 0;font-weight:600;">{WARNING}</div>"#)
        } else {
            String::new()
        }
    }

    /// Rune box, or a bare warning box when nothing was applied.
    #[must_use]
    pub fn rune_html(&self) -> String {
        let warning = self.warning_html();
        if self.used_runes.is_empty() {
            return if warning.is_empty() {
                String::new()
            } else {
                format!(r#"<div class="rune_preview_box" style="{BOX_STYLE}">{warning}</div>"#)
            };
        }

        let padded = if self.added_sockets > 0 {
            format!(
                r#" <span style="opacity:.7">(+{} sockets)</span>"#,
                self.added_sockets
            )
        } else {
            String::new()
        };
        let runes: String = self
            .used_runes
            .iter()
            .map(|rune| format!(r#"<div style="white-space:pre-wrap">{}</div>"#, escape_html(rune)))
            .collect();

        format!(
            r#"<div class="rune_preview_box" style="{BOX_STYLE}">{warning}<div style="opacity:.8;margin-bottom:4px;">Runes applied ({}/{}){padded}</div><div>{runes}</div></div>"#,
            self.used_runes.len(),
            self.target_socket_count,
        )
    }

    #[must_use]
    pub fn enchant_html(&self) -> String {
        let Some(text) = self.enchant.applied_text.as_deref() else {
            return String::new();
        };
        let mode = match self.enchant.action {
            EnchantAction::Overridden => "(replaced existing)",
            EnchantAction::Added | EnchantAction::None => "(added)",
        };
        format!(
            r#"<div class="rune_preview_box" style="margin-top:6px;padding:8px;border:1px solid #333;background:#121212;border-radius:8px;"><div style="opacity:.8;margin-bottom:4px;">Amulet enchant {mode}</div><div style="white-space:pre-wrap">{}</div></div>"#,
            escape_html(text)
        )
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        self.rune_html() + &self.enchant_html()
    }
}
