//! Submission: validation, the busy lifecycle, and result reporting.

use super::{DownloadLink, FormSession, Input, RenderCmd};
use crate::backend::CoreCmd;
use formatki_core::email::parse_email_list;
use formatki_core::{
    is_lighting, CatalogError, GenerateOutcome, GenerateRequest, TagSet, ValidationError,
};
use tracing::{error, info, warn};

/// Check the form and build the generation request.
///
/// Rules, in order: a category is chosen; unless it is lighting, both tag
/// sets are non-empty; the email field holds at least one valid address.
pub fn validate_form(
    category: &str,
    gt: &TagSet,
    kw: &TagSet,
    email_raw: &str,
) -> Result<GenerateRequest, ValidationError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    if !is_lighting(category) && (gt.is_empty() || kw.is_empty()) {
        return Err(ValidationError::MissingSelection);
    }
    let emails = parse_email_list(email_raw);
    if emails.is_empty() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(GenerateRequest {
        category: category.to_string(),
        gt_list: gt.to_vec(),
        kw_list: kw.to_vec(),
        email: emails.join(", "),
    })
}

impl FormSession {
    /// Validate the form and, if it passes, send the generation request.
    ///
    /// Validation failures are reported locally and never reach the service.
    pub fn submit(&mut self) {
        if self.busy {
            return;
        }
        self.clear_message();
        let validated = validate_form(&self.category, &self.gt.tags, &self.kw.tags, &self.email);
        let request = match validated {
            Ok(request) => request,
            Err(err) => {
                info!("submission rejected locally: {}", err);
                self.show_error(err.to_string());
                return;
            }
        };

        self.set_busy(true);
        self.remember_email();
        if self.download.take().is_some() {
            self.push(RenderCmd::HideDownload);
        }
        info!(
            category = %request.category,
            gt_count = request.gt_list.len(),
            kw_count = request.kw_list.len(),
            "submitting generation request"
        );
        // A worker lost during this send already released busy in `send`.
        if !self.send(CoreCmd::Generate { request }) && self.busy {
            self.set_busy(false);
            self.show_error("Lost connection to the background worker.");
        }
    }

    /// Leave the busy state and report the generation result.
    pub(super) fn finish_submission(&mut self, result: Result<GenerateOutcome, CatalogError>) {
        if !self.busy {
            warn!("generation result arrived with no submission pending");
        }
        self.set_busy(false);
        match result {
            Ok(GenerateOutcome::Generated {
                filename,
                download_url,
                note,
            }) => {
                info!(filename = %filename, has_download = download_url.is_some(), "file generated");
                let mut text = format!(
                    "File generated and sent. Check your mailbox.\nFile name: {}",
                    filename
                );
                if let Some(note) = note {
                    text.push('\n');
                    text.push_str(&note);
                }
                self.show_message(text, false);
                if let Some(url) = download_url {
                    let link = DownloadLink {
                        url: url.clone(),
                        label: filename,
                    };
                    self.push(RenderCmd::ShowDownload {
                        url,
                        label: link.label.clone(),
                    });
                    self.download = Some(link);
                }
            }
            Ok(GenerateOutcome::Rejected { reason }) => {
                warn!(reason = %reason, "generation rejected by service");
                self.show_error(format!("Generation failed: {}", reason));
            }
            Err(CatalogError::Transport(detail)) => {
                error!("generation transport failure: {}", detail);
                self.show_error("Connection error while submitting");
            }
            Err(err) => {
                error!("generation failed: {}", err);
                self.show_error(format!("Generation failed: {}", err));
            }
        }
    }

    /// Enter or leave the busy state, updating every input's enabled flag.
    pub(super) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.push(RenderCmd::SetBusy(busy));
        for input in Input::ALL {
            let enabled = self.is_input_enabled(input);
            self.push(RenderCmd::SetInputEnabled { input, enabled });
        }
    }

    fn remember_email(&mut self) {
        let raw = self.email.trim().to_string();
        if let Err(err) = self.store.save(&raw) {
            warn!("could not remember email: {}", err);
        }
    }
}
