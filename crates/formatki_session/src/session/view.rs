//! Presentation boundary: events the view reports and commands it renders.

/// One of the two dependent selection stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Gt,
    Kw,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Gt => "GT",
            Stage::Kw => "KW",
        }
    }
}

/// Inputs whose enabled state the session controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    Category,
    Gt,
    Kw,
    Email,
    Submit,
}

impl Input {
    pub const ALL: [Input; 5] = [
        Input::Category,
        Input::Gt,
        Input::Kw,
        Input::Email,
        Input::Submit,
    ];
}

impl From<Stage> for Input {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Gt => Input::Gt,
            Stage::Kw => Input::Kw,
        }
    }
}

/// Discrete user actions reported by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CategoryChanged(String),
    TextTyped { stage: Stage, text: String },
    EnterPressed { stage: Stage },
    TagRemoveClicked { stage: Stage, token: String },
    Pasted { stage: Stage, text: String },
    EmailEdited(String),
    Submitted,
}

/// Instructions for the presentation layer, emitted in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCmd {
    SetCategoryOptions(Vec<String>),
    SetEmail(String),
    SetCandidates { stage: Stage, items: Vec<String> },
    AddChip { stage: Stage, token: String },
    RemoveChip { stage: Stage, token: String },
    ClearChips { stage: Stage },
    ClearInput { stage: Stage },
    SetInputEnabled { input: Input, enabled: bool },
    SetBusy(bool),
    ShowMessage { text: String, is_error: bool },
    HideMessage,
    ShowDownload { url: String, label: String },
    HideDownload,
    /// Lighting uses a unique format; the view explains why GT/KW are locked.
    SetLightingNotice(bool),
}

/// Retrievable result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    pub label: String,
}

/// Snapshot of everything the user has entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub category: String,
    pub gt: Vec<String>,
    pub kw: Vec<String>,
    pub email: String,
}
