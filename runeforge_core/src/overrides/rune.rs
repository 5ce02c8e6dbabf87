//! Socket padding and rune placement.

use tracing::debug;

use super::config::OverrideConfig;
use crate::item::{
    ItemDescription, ItemMeta, Line, LineKind, rune_line, sockets_line, strip_rune_suffix,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuneOutcome {
    pub text: ItemDescription,
    /// Non-empty rune lines in socket order.
    pub used_runes: Vec<String>,
    pub target_socket_count: usize,
}

impl RuneOutcome {
    fn unchanged(item: &ItemDescription, target_socket_count: usize) -> Self {
        Self {
            text: item.clone(),
            used_runes: Vec::new(),
            target_socket_count,
        }
    }
}

/// Sockets the item really has: the collaborator's count, else the
/// symbols on the `Sockets:` line.
#[must_use]
pub fn observed_sockets(item: &ItemDescription, meta: &ItemMeta) -> usize {
    if meta.observed_sockets > 0 {
        meta.observed_sockets
    } else {
        item.declared_sockets()
    }
}

/// Socket count after optional padding up to the class maximum.
#[must_use]
pub fn target_sockets(observed: usize, meta: &ItemMeta, config: &OverrideConfig) -> usize {
    if config.pad_sockets() && meta.max_sockets > observed {
        meta.max_sockets
    } else {
        observed
    }
}

fn non_blank(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

/// One candidate rune line per socket, `None` for sockets left empty.
fn candidates(
    config: &OverrideConfig,
    existing: &[&str],
    target: usize,
) -> Option<Vec<Option<String>>> {
    if config.per_socket_enabled() {
        // A rune block shorter than the socket count is compact, so its
        // positions say nothing about which socket a rune sits in.
        let has_choices = config.per_socket().iter().any(|s| non_blank(s).is_some());
        let positional = !has_choices || existing.len() >= target;

        // The uniform line stays a fallback here even though uniform mode is off.
        let slots = (0..target)
            .map(|i| {
                config
                    .per_socket()
                    .get(i)
                    .and_then(|s| non_blank(s))
                    .or_else(|| non_blank(config.rune_line()))
                    .or_else(|| {
                        existing
                            .get(i)
                            .filter(|_| positional)
                            .and_then(|r| non_blank(strip_rune_suffix(r)))
                    })
                    .map(rune_line)
            })
            .collect();
        return Some(slots);
    }

    if config.uniform_enabled() {
        let base = non_blank(config.rune_line()).map(rune_line);
        let slots = (0..target)
            .map(|i| {
                base.clone()
                    .or_else(|| existing.get(i).and_then(|r| non_blank(r)).map(rune_line))
            })
            .collect();
        return Some(slots);
    }

    None
}

/// Rewrite or insert the `Sockets:` line to declare `target` sockets.
fn set_sockets_line(text: &mut ItemDescription, target: usize) {
    let line = Line::new(sockets_line(target));
    if let Some(idx) = text.find(|k| matches!(k, LineKind::Sockets(_))) {
        text.replace(idx, line);
    } else if let Some(idx) = text.find_kind(&LineKind::ItemLevel) {
        text.insert_block_before(idx, vec![line]);
    } else if let Some(idx) = text.find_kind(&LineKind::Requires) {
        text.insert_block_after(idx, vec![line]);
    } else {
        text.push_block(vec![line]);
    }
}

/// Put `runes` where the old rune lines were, or in a new block.
fn place_runes(text: &mut ItemDescription, runes: &[String]) {
    let rune_indices: Vec<usize> = text
        .lines()
        .iter()
        .enumerate()
        .filter(|(_, line)| line.kind == LineKind::Rune)
        .map(|(i, _)| i)
        .collect();
    let block: Vec<Line> = runes.iter().map(Line::new).collect();

    if let (Some(&first), Some(&last)) = (rune_indices.first(), rune_indices.last()) {
        text.splice_range(first, last, block);
        return;
    }
    if block.is_empty() {
        return;
    }

    let anchor = text
        .find_kind(&LineKind::ItemLevel)
        .or_else(|| text.find_kind(&LineKind::Requires))
        .or_else(|| text.first_separator());
    match anchor {
        Some(idx) => text.insert_block_after(idx, block),
        None => text.push_block(block),
    };
}

/// Pad sockets and fill them with runes according to `config`.
#[must_use]
pub fn apply_rune_override(
    item: &ItemDescription,
    meta: &ItemMeta,
    config: &OverrideConfig,
) -> RuneOutcome {
    let observed = observed_sockets(item, meta);
    let target = target_sockets(observed, meta, config);
    if target == 0 {
        return RuneOutcome::unchanged(item, 0);
    }

    let existing = item.rune_lines();
    let Some(slots) = candidates(config, &existing, target) else {
        return RuneOutcome::unchanged(item, observed);
    };

    let mut text = item.clone();
    if target > observed {
        debug!("Padding sockets {observed} -> {target}");
        set_sockets_line(&mut text, target);
    }

    let used_runes: Vec<String> = slots.into_iter().take(target).flatten().collect();
    place_runes(&mut text, &used_runes);

    RuneOutcome {
        text,
        used_runes,
        target_socket_count: target,
    }
}
