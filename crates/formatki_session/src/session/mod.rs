//! Form session: cascade, bulk paste, and submission state for one visit.
//!
//! A session is created when the form opens and dropped when it closes. It is
//! driven from a single thread: the view feeds [`UiEvent`]s through
//! [`FormSession::handle`], backend answers arrive through
//! [`FormSession::poll_backend`] or [`FormSession::pump`], and the view drains
//! [`RenderCmd`]s afterwards.

mod bulk;
mod cascade;
mod submit;
mod view;

pub use bulk::{match_known_tokens, PasteOutcome};
pub use submit::validate_form;
pub use view::{DownloadLink, FormState, Input, RenderCmd, Stage, UiEvent};

use crate::backend::{BackendHandle, CoreCmd, CoreErrorSource, CoreEvent};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use formatki_core::{EmailStore, Message, MessageCenter, TagSet};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Selection state for one stage.
#[derive(Debug, Default)]
struct StageState {
    tags: TagSet,
    /// Full candidate list for the current upstream state.
    available: Vec<String>,
    /// Text currently typed into the stage input; doubles as the filter.
    input: String,
    enabled: bool,
}

pub struct FormSession {
    backend: BackendHandle,
    backend_alive: bool,
    store: Box<dyn EmailStore>,
    categories: Vec<String>,
    category: String,
    gt: StageState,
    kw: StageState,
    email: String,
    busy: bool,
    download: Option<DownloadLink>,
    messages: MessageCenter,
    category_epoch: u64,
    kw_epoch: u64,
    in_flight: usize,
    render: Vec<RenderCmd>,
}

impl FormSession {
    /// Open a session: restore the remembered email and request categories.
    pub fn new(backend: BackendHandle, store: Box<dyn EmailStore>) -> Self {
        Self::with_messages(backend, store, MessageCenter::new())
    }

    /// Like [`FormSession::new`] with a custom message center (e.g. short TTL).
    pub fn with_messages(
        backend: BackendHandle,
        store: Box<dyn EmailStore>,
        messages: MessageCenter,
    ) -> Self {
        let email = match store.load() {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!("could not read remembered email: {}", err);
                String::new()
            }
        };
        let mut session = Self {
            backend,
            backend_alive: true,
            store,
            categories: Vec::new(),
            category: String::new(),
            gt: StageState::default(),
            kw: StageState::default(),
            email,
            busy: false,
            download: None,
            messages,
            category_epoch: 0,
            kw_epoch: 0,
            in_flight: 0,
            render: Vec::new(),
        };
        if !session.email.is_empty() {
            let email = session.email.clone();
            session.push(RenderCmd::SetEmail(email));
        }
        session.push_stage_enabled(Stage::Gt);
        session.push_stage_enabled(Stage::Kw);
        session.send(CoreCmd::LoadCategories);
        session
    }

    /// Apply one user action. Ignored while a submission is in progress.
    pub fn handle(&mut self, event: UiEvent) {
        if self.busy {
            debug!(?event, "ignoring UI event while submitting");
            return;
        }
        match event {
            UiEvent::CategoryChanged(category) => self.set_category(&category),
            UiEvent::TextTyped { stage, text } => self.set_input(stage, text),
            UiEvent::EnterPressed { stage } => self.commit_input(stage),
            UiEvent::TagRemoveClicked { stage, token } => self.remove_tag(stage, &token),
            UiEvent::Pasted { stage, text } => match stage {
                Stage::Gt => self.paste_gt(&text),
                Stage::Kw => {
                    self.paste_kw(&text);
                }
            },
            UiEvent::EmailEdited(email) => self.email = email,
            UiEvent::Submitted => self.submit(),
        }
    }

    /// Apply every backend event that is ready without blocking.
    ///
    /// # Returns
    /// The number of events applied.
    pub fn poll_backend(&mut self) -> usize {
        let mut applied = 0;
        while self.backend_alive {
            match self.backend.evt_rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.on_backend_lost(),
            }
        }
        applied
    }

    /// Block until no request is outstanding or `timeout` elapses.
    ///
    /// # Returns
    /// `true` when the session settled in time.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 && self.backend_alive {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.backend.evt_rx.recv_timeout(remaining) {
                Ok(event) => self.apply_event(event),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(in_flight = self.in_flight, "backend did not answer in time");
                    return false;
                }
                Err(RecvTimeoutError::Disconnected) => self.on_backend_lost(),
            }
        }
        self.in_flight == 0
    }

    /// Apply a single backend event.
    ///
    /// Read responses tagged with a superseded epoch are discarded.
    pub fn apply_event(&mut self, event: CoreEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            CoreEvent::CategoriesLoaded { items } => {
                info!(count = items.len(), "categories loaded");
                self.categories = items.clone();
                self.push(RenderCmd::SetCategoryOptions(items));
            }
            CoreEvent::GtListLoaded {
                epoch,
                category,
                items,
            } => self.apply_gt_list(epoch, &category, items),
            CoreEvent::KwListLoaded { epoch, items } => self.apply_kw_list(epoch, items),
            CoreEvent::GtResolved { epoch, items } => self.apply_resolved_gt(epoch, items),
            CoreEvent::Generated { outcome } => self.finish_submission(Ok(outcome)),
            CoreEvent::Error { source, error } => match source {
                CoreErrorSource::Categories => {
                    error!("loading categories failed: {}", error);
                    self.show_error("Failed to load categories. Check the server.");
                }
                CoreErrorSource::GtList { epoch } => self.apply_gt_list_error(epoch, &error),
                CoreErrorSource::KwList { epoch } => self.apply_kw_list_error(epoch, &error),
                CoreErrorSource::ResolveGt { epoch } => self.apply_resolve_error(epoch, &error),
                CoreErrorSource::Generate => self.finish_submission(Err(error)),
            },
        }
    }

    /// Expire the status message if its time is up.
    pub fn tick(&mut self, now: Instant) {
        if self.messages.tick(now) {
            self.push(RenderCmd::HideMessage);
        }
    }

    /// Take the render commands produced since the last call.
    pub fn drain_render(&mut self) -> Vec<RenderCmd> {
        std::mem::take(&mut self.render)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn tags(&self, stage: Stage) -> &TagSet {
        &self.stage(stage).tags
    }

    /// Full candidate list last received for `stage`.
    pub fn available(&self, stage: Stage) -> &[String] {
        &self.stage(stage).available
    }

    /// Current candidate pool for `stage`, filtered by its typed input.
    pub fn candidates(&self, stage: Stage) -> Vec<String> {
        let state = self.stage(stage);
        state.tags.candidates(&state.available, &state.input)
    }

    pub fn input(&self, stage: Stage) -> &str {
        &self.stage(stage).input
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_stage_enabled(&self, stage: Stage) -> bool {
        self.stage(stage).enabled
    }

    /// Whether `input` currently accepts user interaction.
    pub fn is_input_enabled(&self, input: Input) -> bool {
        !self.busy && self.input_allowed(input)
    }

    pub fn message(&self) -> Option<&Message> {
        self.messages.current()
    }

    pub fn download(&self) -> Option<&DownloadLink> {
        self.download.as_ref()
    }

    /// Number of backend requests still awaiting an answer.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn form_state(&self) -> FormState {
        FormState {
            category: self.category.clone(),
            gt: self.gt.tags.to_vec(),
            kw: self.kw.tags.to_vec(),
            email: self.email.clone(),
        }
    }

    fn stage(&self, stage: Stage) -> &StageState {
        match stage {
            Stage::Gt => &self.gt,
            Stage::Kw => &self.kw,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut StageState {
        match stage {
            Stage::Gt => &mut self.gt,
            Stage::Kw => &mut self.kw,
        }
    }

    fn input_allowed(&self, input: Input) -> bool {
        match input {
            Input::Category | Input::Email | Input::Submit => true,
            Input::Gt => self.gt.enabled,
            Input::Kw => self.kw.enabled,
        }
    }

    fn push(&mut self, cmd: RenderCmd) {
        self.render.push(cmd);
    }

    fn push_stage_enabled(&mut self, stage: Stage) {
        let input = Input::from(stage);
        let enabled = self.is_input_enabled(input);
        self.push(RenderCmd::SetInputEnabled { input, enabled });
    }

    /// Send a command to the worker, tracking it as outstanding.
    ///
    /// # Returns
    /// `false` when the worker is gone.
    fn send(&mut self, cmd: CoreCmd) -> bool {
        if !self.backend_alive {
            return false;
        }
        match self.backend.cmd_tx.send(cmd) {
            Ok(()) => {
                self.in_flight += 1;
                true
            }
            Err(_) => {
                self.on_backend_lost();
                false
            }
        }
    }

    fn on_backend_lost(&mut self) {
        if !self.backend_alive {
            return;
        }
        error!("backend worker disconnected");
        self.backend_alive = false;
        self.in_flight = 0;
        if self.busy {
            self.set_busy(false);
        }
        self.show_error("Lost connection to the background worker.");
    }

    fn show_message(&mut self, text: impl Into<String>, is_error: bool) {
        let text = text.into();
        self.messages.show(text.clone(), is_error, Instant::now());
        self.push(RenderCmd::ShowMessage { text, is_error });
    }

    fn show_error(&mut self, text: impl Into<String>) {
        self.show_message(text, true);
    }

    fn clear_message(&mut self) {
        if self.messages.clear() {
            self.push(RenderCmd::HideMessage);
        }
    }
}
