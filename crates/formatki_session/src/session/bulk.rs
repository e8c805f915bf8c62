//! Bulk paste resolution for the GT and KW stages.
//!
//! GT pastes go to the service, which owns the code -> name mapping. KW
//! pastes are matched locally against the KW candidates already loaded.

use super::{FormSession, RenderCmd, Stage};
use crate::backend::{CoreCmd, Epoch};
use formatki_core::{is_lighting, split_tokens, CatalogError};
use tracing::{debug, info, warn};

/// Result of applying a paste to a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteOutcome {
    /// Tokens that were new to the tag set, in paste order.
    pub added: Vec<String>,
    /// Pieces ignored because no known candidate matched them.
    pub dropped: usize,
}

/// Split pasted text and keep the pieces that name a known candidate.
///
/// Matching ignores case; kept pieces retain their pasted spelling.
///
/// # Returns
/// The kept pieces in paste order and the number of unknown pieces.
pub fn match_known_tokens<'a>(raw: &'a str, known: &[String]) -> (Vec<&'a str>, usize) {
    let known: Vec<String> = known.iter().map(|item| item.to_lowercase()).collect();
    let mut kept = Vec::new();
    let mut dropped = 0;
    for piece in split_tokens(raw) {
        if known.contains(&piece.to_lowercase()) {
            kept.push(piece);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

impl FormSession {
    /// Send pasted GT text to the service for resolution.
    ///
    /// Blank pastes and pastes into a locked GT stage do nothing.
    pub fn paste_gt(&mut self, raw: &str) {
        if raw.trim().is_empty() || !self.gt.enabled {
            return;
        }
        if self.category.is_empty() || is_lighting(&self.category) {
            return;
        }
        let epoch = Epoch(self.category_epoch);
        let category = self.category.clone();
        debug!(category = %category, "resolving pasted GT codes");
        self.send(CoreCmd::ResolveGt {
            epoch,
            category,
            raw: raw.to_string(),
        });
    }

    /// Add every KW piece of `raw` that matches a loaded KW candidate.
    pub fn paste_kw(&mut self, raw: &str) -> PasteOutcome {
        if !self.kw.enabled {
            return PasteOutcome::default();
        }
        let (kept, dropped) = match_known_tokens(raw, &self.kw.available);
        let mut outcome = PasteOutcome {
            added: Vec::new(),
            dropped,
        };
        for piece in kept {
            if self.select_tag(Stage::Kw, piece) {
                outcome.added.push(piece.to_string());
            }
        }
        self.kw.input.clear();
        self.push(RenderCmd::ClearInput { stage: Stage::Kw });
        self.refresh_candidates(Stage::Kw);

        info!(
            added = outcome.added.len(),
            dropped = outcome.dropped,
            "KW paste applied"
        );
        if outcome.dropped > 0 {
            self.show_message(
                format!("Skipped {} unknown KW code(s)", outcome.dropped),
                false,
            );
        }
        outcome
    }

    pub(super) fn apply_resolved_gt(&mut self, epoch: Epoch, items: Vec<String>) {
        if epoch.0 != self.category_epoch {
            debug!("discarding GT resolution for a previous category");
            return;
        }
        if !self.gt.enabled {
            debug!("discarding GT resolution for a locked GT stage");
            return;
        }
        let mut added = 0usize;
        for name in &items {
            if self.select_tag(Stage::Gt, name) {
                added += 1;
            }
        }
        info!(resolved = items.len(), added, "GT paste applied");
        if added > 0 {
            self.on_gt_changed();
        }
    }

    pub(super) fn apply_resolve_error(&mut self, epoch: Epoch, error: &CatalogError) {
        if epoch.0 != self.category_epoch {
            return;
        }
        warn!("GT resolve failed: {}", error);
        self.show_error("Could not expand pasted GT codes");
    }
}

#[cfg(test)]
mod tests {
    use super::match_known_tokens;

    fn known(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_known_pieces_in_paste_order() {
        let (kept, dropped) = match_known_tokens("a, B ,c,,d", &known(&["a", "b", "d"]));
        assert_eq!(kept, vec!["a", "B", "d"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn semicolons_also_separate_pieces() {
        let (kept, dropped) = match_known_tokens("Krzesła;stoły ; X", &known(&["krzesła", "Stoły"]));
        assert_eq!(kept, vec!["Krzesła", "stoły"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn nothing_known_means_nothing_kept() {
        let (kept, dropped) = match_known_tokens("a,b", &[]);
        assert!(kept.is_empty());
        assert_eq!(dropped, 2);
    }
}
