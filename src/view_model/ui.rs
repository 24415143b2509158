// UI-only state: modals, selection, single-flight action flags

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Shutdown,
    BatchUpdate,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Create => "Create",
            ActionKind::Update => "Update",
            ActionKind::Delete => "Delete",
            ActionKind::Shutdown => "Shutdown",
            ActionKind::BatchUpdate => "Batch update",
        }
    }
}

/// Expected failure of a CRUD action. Returned, never panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{} operation already in progress", .0.label())]
    InProgress(ActionKind),
    #[error("{0}")]
    Service(String),
}

pub type ActionResult<T = ()> = Result<T, ActionError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsInProgress {
    pub creating: bool,
    pub updating: bool,
    pub deleting: bool,
    pub shutting_down: bool,
    pub batch_updating: bool,
}

impl ActionsInProgress {
    pub fn get(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Create => self.creating,
            ActionKind::Update => self.updating,
            ActionKind::Delete => self.deleting,
            ActionKind::Shutdown => self.shutting_down,
            ActionKind::BatchUpdate => self.batch_updating,
        }
    }

    pub(crate) fn set(&mut self, kind: ActionKind, value: bool) {
        let slot = match kind {
            ActionKind::Create => &mut self.creating,
            ActionKind::Update => &mut self.updating,
            ActionKind::Delete => &mut self.deleting,
            ActionKind::Shutdown => &mut self.shutting_down,
            ActionKind::BatchUpdate => &mut self.batch_updating,
        };
        *slot = value;
    }

    pub fn any(&self) -> bool {
        self.creating || self.updating || self.deleting || self.shutting_down || self.batch_updating
    }
}

/// Which modal is open and for which container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    pub create_open: bool,
    pub edit_target: Option<i64>,
    pub delete_target: Option<i64>,
    pub shutdown_target: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub modals: ModalState,
    pub selected_container: Option<i64>,
    pub actions: ActionsInProgress,
}

impl UiState {
    /// Modal tied to a finished action; `BatchUpdate` has none.
    pub(crate) fn close_modal_for(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Create => self.modals.create_open = false,
            ActionKind::Update => self.modals.edit_target = None,
            ActionKind::Delete => self.modals.delete_target = None,
            ActionKind::Shutdown => self.modals.shutdown_target = None,
            ActionKind::BatchUpdate => {}
        }
    }
}
