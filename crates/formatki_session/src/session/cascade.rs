//! Category -> GT -> KW cascade.
//!
//! Each upstream change bumps an epoch and re-derives the stages below it.
//! Responses carry the epoch they were requested under; anything older than
//! the current epoch is dropped on arrival.

use super::{FormSession, RenderCmd, Stage};
use crate::backend::{CoreCmd, Epoch};
use formatki_core::{is_lighting, CatalogError};
use tracing::{debug, info, warn};

impl FormSession {
    /// Switch to `category`, discarding every GT/KW selection.
    ///
    /// Empty and lighting categories lock both stages; any other category
    /// unlocks GT and requests its candidate list.
    pub fn set_category(&mut self, category: &str) {
        if self.busy {
            return;
        }
        let category = category.trim().to_string();
        self.category = category.clone();
        self.category_epoch += 1;
        self.kw_epoch += 1;

        self.reset_stage(Stage::Gt);
        self.reset_stage(Stage::Kw);
        self.set_stage_enabled(Stage::Kw, false);

        let lighting = is_lighting(&category);
        self.push(RenderCmd::SetLightingNotice(lighting));
        if category.is_empty() || lighting {
            self.set_stage_enabled(Stage::Gt, false);
            info!(category = %category, "category has no GT/KW stages");
            return;
        }

        self.set_stage_enabled(Stage::Gt, true);
        info!(category = %category, "category selected; loading GT list");
        let epoch = Epoch(self.category_epoch);
        self.send(CoreCmd::FetchGtList { epoch, category });
    }

    /// Re-derive the KW stage after the GT selection changed.
    pub(crate) fn on_gt_changed(&mut self) {
        self.kw_epoch += 1;
        self.refresh_candidates(Stage::Gt);

        if self.gt.tags.is_empty() {
            self.kw.available.clear();
            if !self.kw.tags.is_empty() {
                self.kw.tags.clear();
                self.push(RenderCmd::ClearChips { stage: Stage::Kw });
            }
            self.set_stage_enabled(Stage::Kw, false);
            self.refresh_candidates(Stage::Kw);
            return;
        }

        let epoch = Epoch(self.kw_epoch);
        let gt_list = self.gt.tags.to_vec();
        debug!(gt_count = gt_list.len(), "loading KW list");
        self.send(CoreCmd::FetchKwList { epoch, gt_list });
    }

    pub(super) fn apply_gt_list(&mut self, epoch: Epoch, category: &str, items: Vec<String>) {
        if epoch.0 != self.category_epoch || category != self.category {
            debug!(category = %category, "discarding stale GT list");
            return;
        }
        self.gt.available = items;
        self.refresh_candidates(Stage::Gt);
    }

    pub(super) fn apply_kw_list(&mut self, epoch: Epoch, items: Vec<String>) {
        if epoch.0 != self.kw_epoch {
            debug!("discarding stale KW list");
            return;
        }
        self.kw.available = items;
        self.refresh_candidates(Stage::Kw);
        self.set_stage_enabled(Stage::Kw, true);
    }

    pub(super) fn apply_gt_list_error(&mut self, epoch: Epoch, error: &CatalogError) {
        if epoch.0 != self.category_epoch {
            debug!("ignoring failure of a superseded GT request");
            return;
        }
        warn!(category = %self.category, "GT list failed: {}", error);
        self.set_stage_enabled(Stage::Gt, false);
        self.show_error("Failed to load GT list");
    }

    pub(super) fn apply_kw_list_error(&mut self, epoch: Epoch, error: &CatalogError) {
        if epoch.0 != self.kw_epoch {
            debug!("ignoring failure of a superseded KW request");
            return;
        }
        warn!("KW list failed: {}", error);
        self.set_stage_enabled(Stage::Kw, false);
        self.show_error("Failed to load KW list");
    }

    /// Record typed text for `stage` and re-filter its candidates.
    pub(super) fn set_input(&mut self, stage: Stage, text: String) {
        if !self.stage(stage).enabled {
            return;
        }
        self.stage_mut(stage).input = text;
        self.refresh_candidates(stage);
    }

    /// Turn the typed text of `stage` into a tag (the Enter key).
    pub(super) fn commit_input(&mut self, stage: Stage) {
        if !self.stage(stage).enabled {
            return;
        }
        let token = std::mem::take(&mut self.stage_mut(stage).input);
        self.push(RenderCmd::ClearInput { stage });
        let added = self.select_tag(stage, &token);
        match stage {
            Stage::Gt if added => self.on_gt_changed(),
            _ => self.refresh_candidates(stage),
        }
    }

    pub(super) fn remove_tag(&mut self, stage: Stage, token: &str) {
        let Some(removed) = self.stage_mut(stage).tags.take(token) else {
            return;
        };
        self.push(RenderCmd::RemoveChip {
            stage,
            token: removed,
        });
        match stage {
            Stage::Gt => self.on_gt_changed(),
            Stage::Kw => self.refresh_candidates(Stage::Kw),
        }
    }

    /// Add one token to a stage without cascading.
    ///
    /// # Returns
    /// `true` when the tag set changed.
    pub(super) fn select_tag(&mut self, stage: Stage, token: &str) -> bool {
        let token = token.trim();
        if !self.stage_mut(stage).tags.add(token) {
            return false;
        }
        self.push(RenderCmd::AddChip {
            stage,
            token: token.to_string(),
        });
        true
    }

    pub(super) fn refresh_candidates(&mut self, stage: Stage) {
        let items = self.candidates(stage);
        self.push(RenderCmd::SetCandidates { stage, items });
    }

    pub(super) fn set_stage_enabled(&mut self, stage: Stage, enabled: bool) {
        self.stage_mut(stage).enabled = enabled;
        self.push_stage_enabled(stage);
    }

    fn reset_stage(&mut self, stage: Stage) {
        let state = self.stage_mut(stage);
        state.tags.clear();
        state.available.clear();
        state.input.clear();
        self.push(RenderCmd::ClearChips { stage });
        self.push(RenderCmd::ClearInput { stage });
        self.push(RenderCmd::SetCandidates {
            stage,
            items: Vec::new(),
        });
    }
}
