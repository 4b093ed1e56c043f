//! Render state - data structure sent from the App layer to the UI

use crate::app::state::{DocEdit, HealthState, Modal, RequestEdit, ResourceState};
use crate::messages::ui_events::{AppTab, Panel};
use crate::models::{ApiRequest, Collection, OpenApiSpec};

/// Complete state needed by the UI to render
#[derive(Clone)]
pub struct RenderState {
    pub active_tab: AppTab,
    pub focus: Panel,

    pub collections: ResourceState<Collection>,
    pub requests: ResourceState<ApiRequest>,
    pub openapi: ResourceState<OpenApiSpec>,
    pub collection_requests: Vec<ApiRequest>,

    pub collection_edit: Option<DocEdit>,
    pub openapi_edit: Option<DocEdit>,
    pub request_edit: RequestEdit,

    pub modal: Option<Modal>,
    pub health: HealthState,
    pub status: Option<String>,

    /// Whether keystrokes go to an inline edit buffer (for key mapping)
    pub editing: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            active_tab: AppTab::Collections,
            focus: Panel::List,
            collections: ResourceState::default(),
            requests: ResourceState::default(),
            openapi: ResourceState::default(),
            collection_requests: Vec::new(),
            collection_edit: None,
            openapi_edit: None,
            request_edit: RequestEdit::default(),
            modal: None,
            health: HealthState::default(),
            status: None,
            editing: false,
        }
    }
}

impl RenderState {
    /// Coarse modal shape for the key mapper
    pub fn modal_kind(&self) -> Option<crate::messages::ui_events::ModalKind> {
        self.modal.as_ref().map(Modal::kind)
    }
}
