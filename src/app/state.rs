//! App state - pure data structures with no I/O logic

use std::collections::VecDeque;

use crate::kv::KvEditor;
use crate::messages::api::{ApiCommand, MutationKind};
use crate::messages::ui_events::{AppTab, ModalKind, Panel};
use crate::messages::RenderState;
use crate::models::{
    ApiRequest, BodyModel, Collection, HttpMethod, NewRequest, OpenApiSpec, Resource, ResourceKind,
};

/// List/detail lifecycle state for one entity kind.
///
/// One generic implementation, instantiated per kind. List and detail
/// loading are tracked independently and may overlap; mutations are
/// serialized through a single-slot guard with a FIFO queue so a second
/// save issued mid-flight is deferred instead of racing the first.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceState<T> {
    pub items: Vec<T>,
    pub cursor: usize,
    pub selected_id: Option<String>,
    pub detail: Option<T>,
    pub list_loading: bool,
    pub detail_loading: bool,
    pub saving: bool,
    pub importing: bool,
    pub error: Option<String>,
    detail_generation: u64,
    mutation_in_flight: bool,
    pending_mutations: VecDeque<ApiCommand>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        ResourceState {
            items: Vec::new(),
            cursor: 0,
            selected_id: None,
            detail: None,
            list_loading: false,
            detail_loading: false,
            saving: false,
            importing: false,
            error: None,
            detail_generation: 0,
            mutation_in_flight: false,
            pending_mutations: VecDeque::new(),
        }
    }
}

impl<T: Resource> ResourceState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ResourceKind {
        T::kind()
    }

    /// Start a full list reload
    pub fn begin_list_load(&mut self) -> ApiCommand {
        self.list_loading = true;
        self.error = None;
        ApiCommand::FetchList { kind: T::kind() }
    }

    /// Replace the list wholesale; a failed fetch resets it to empty
    pub fn apply_list(&mut self, outcome: Result<Vec<T>, String>) {
        self.list_loading = false;
        match outcome {
            Ok(items) => self.items = items,
            Err(message) => {
                self.items = Vec::new();
                self.error = Some(message);
            }
        }
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
    }

    pub fn cursor_item(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Select an entity and start its detail load. Each load gets a fresh
    /// generation; completions carrying an older generation are discarded,
    /// so a rapid re-selection cannot be overwritten by a late response.
    pub fn select(&mut self, id: &str) -> ApiCommand {
        self.selected_id = Some(id.to_string());
        self.detail_loading = true;
        self.error = None;
        self.detail_generation += 1;
        ApiCommand::FetchDetail {
            kind: T::kind(),
            id: id.to_string(),
            generation: self.detail_generation,
        }
    }

    /// Clear the selection without a network call, invalidating any detail
    /// load still in flight
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.detail = None;
        self.detail_loading = false;
        self.detail_generation += 1;
    }

    /// Apply a detail outcome; returns false when it was stale
    pub fn apply_detail(&mut self, generation: u64, outcome: Result<T, String>) -> bool {
        if generation != self.detail_generation {
            return false;
        }
        self.detail_loading = false;
        match outcome {
            Ok(entity) => self.detail = Some(entity),
            Err(message) => {
                self.detail = None;
                self.error = Some(message);
            }
        }
        true
    }

    pub fn current_generation(&self) -> u64 {
        self.detail_generation
    }

    /// Pass a mutating command through the single-slot guard: dispatch it
    /// when idle, queue it when another mutation is outstanding.
    pub fn submit_mutation(&mut self, cmd: ApiCommand) -> Option<ApiCommand> {
        if self.mutation_in_flight {
            self.pending_mutations.push_back(cmd);
            return None;
        }
        self.mutation_in_flight = true;
        self.note_flags(&cmd);
        Some(cmd)
    }

    /// Mark the in-flight mutation finished and dispatch the next queued one
    pub fn finish_mutation(&mut self) -> Option<ApiCommand> {
        match self.pending_mutations.pop_front() {
            Some(cmd) => {
                self.note_flags(&cmd);
                Some(cmd)
            }
            None => {
                self.mutation_in_flight = false;
                self.saving = false;
                self.importing = false;
                None
            }
        }
    }

    fn note_flags(&mut self, cmd: &ApiCommand) {
        match cmd.mutation() {
            Some((_, MutationKind::Import)) => {
                self.importing = true;
                self.saving = false;
            }
            Some(_) => {
                self.saving = true;
                self.importing = false;
            }
            None => {}
        }
    }
}

/// Edit buffer for the name/description surface of collections and specs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocEdit {
    pub name: String,
    pub description: String,
    pub field: DocField,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocField {
    #[default]
    Name,
    Description,
}

impl DocEdit {
    pub fn from_collection(collection: &Collection) -> Self {
        DocEdit {
            name: collection.name.clone().unwrap_or_default(),
            description: collection.description.clone().unwrap_or_default(),
            field: DocField::Name,
        }
    }

    pub fn from_spec(spec: &OpenApiSpec) -> Self {
        DocEdit {
            name: spec
                .title
                .clone()
                .or_else(|| spec.name.clone())
                .unwrap_or_default(),
            description: spec.description.clone().unwrap_or_default(),
            field: DocField::Name,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            DocField::Name => DocField::Description,
            DocField::Description => DocField::Name,
        };
    }

    pub fn current_mut(&mut self) -> &mut String {
        match self.field {
            DocField::Name => &mut self.name,
            DocField::Description => &mut self.description,
        }
    }
}

/// The three independently committed sections of a request's edit surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestSection {
    #[default]
    Payload,
    Headers,
    Params,
}

impl RequestSection {
    pub fn next(&self) -> RequestSection {
        match self {
            RequestSection::Payload => RequestSection::Headers,
            RequestSection::Headers => RequestSection::Params,
            RequestSection::Params => RequestSection::Payload,
        }
    }

    pub fn prev(&self) -> RequestSection {
        match self {
            RequestSection::Payload => RequestSection::Params,
            RequestSection::Headers => RequestSection::Payload,
            RequestSection::Params => RequestSection::Headers,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RequestSection::Payload => "Payload",
            RequestSection::Headers => "Headers",
            RequestSection::Params => "Params",
        }
    }
}

/// Form-shaped body modes that edit through the key-value surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormMode {
    FormData,
    UrlEncoded,
}

/// Edit buffer for a request payload, seeded from the declared body mode.
/// Modes without an edit surface stay read-only.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyEditor {
    Raw { text: String },
    Form { mode: FormMode, kv: KvEditor },
}

impl BodyEditor {
    /// Seed from the entity's current body as-is; no mode conversion
    pub fn seed(body: &BodyModel) -> Option<BodyEditor> {
        match body {
            BodyModel::Raw(text) => Some(BodyEditor::Raw { text: text.clone() }),
            BodyModel::FormData(fields) => Some(BodyEditor::Form {
                mode: FormMode::FormData,
                kv: KvEditor::from_fields(fields),
            }),
            BodyModel::UrlEncoded(fields) => Some(BodyEditor::Form {
                mode: FormMode::UrlEncoded,
                kv: KvEditor::from_fields(fields),
            }),
            BodyModel::None | BodyModel::Other(_) => None,
        }
    }

    /// Project the buffer back into a whole body object for submission.
    /// Duplicate keys from the original records were already collapsed when
    /// the editor was seeded.
    pub fn to_body(&self) -> BodyModel {
        match self {
            BodyEditor::Raw { text } => BodyModel::Raw(text.clone()),
            BodyEditor::Form { mode, kv } => match mode {
                FormMode::FormData => BodyModel::FormData(kv.to_fields()),
                FormMode::UrlEncoded => BodyModel::UrlEncoded(kv.to_fields()),
            },
        }
    }
}

/// Per-section edit buffers for the request detail view. A `Some` buffer
/// means that section is in edit mode; buffers are discarded wholesale when
/// the underlying entity changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestEdit {
    pub section: RequestSection,
    pub payload: Option<BodyEditor>,
    pub headers: Option<KvEditor>,
    pub params: Option<KvEditor>,
}

impl RequestEdit {
    /// Drop all buffers, keeping the section focus
    pub fn reset(&mut self) {
        self.payload = None;
        self.headers = None;
        self.params = None;
    }

    /// Whether the focused section has an active buffer
    pub fn editing(&self) -> bool {
        match self.section {
            RequestSection::Payload => self.payload.is_some(),
            RequestSection::Headers => self.headers.is_some(),
            RequestSection::Params => self.params.is_some(),
        }
    }

    pub fn active_kv_mut(&mut self) -> Option<&mut KvEditor> {
        match self.section {
            RequestSection::Payload => match self.payload.as_mut() {
                Some(BodyEditor::Form { kv, .. }) => Some(kv),
                _ => None,
            },
            RequestSection::Headers => self.headers.as_mut(),
            RequestSection::Params => self.params.as_mut(),
        }
    }
}

/// Fields of the create-request form, in navigation order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreateField {
    #[default]
    Name,
    Method,
    Url,
    Collection,
    Payload,
    Headers,
    Params,
}

impl CreateField {
    fn is_advanced(&self) -> bool {
        matches!(
            self,
            CreateField::Payload | CreateField::Headers | CreateField::Params
        )
    }
}

/// The create-request form; stateless between submissions
#[derive(Clone, Debug, PartialEq)]
pub struct CreateForm {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    /// Index into the collections list; `None` means unassociated
    pub collection_index: Option<usize>,
    pub show_advanced: bool,
    pub payload: String,
    pub headers: KvEditor,
    pub params: KvEditor,
    pub field: CreateField,
}

impl Default for CreateForm {
    fn default() -> Self {
        CreateForm {
            name: String::new(),
            method: HttpMethod::GET,
            url: String::new(),
            collection_index: None,
            show_advanced: false,
            payload: String::new(),
            headers: KvEditor::new(),
            params: KvEditor::new(),
            field: CreateField::Name,
        }
    }
}

impl CreateForm {
    pub fn next_field(&mut self) {
        self.field = match self.field {
            CreateField::Name => CreateField::Method,
            CreateField::Method => CreateField::Url,
            CreateField::Url => CreateField::Collection,
            CreateField::Collection if self.show_advanced => CreateField::Payload,
            CreateField::Collection => CreateField::Name,
            CreateField::Payload => CreateField::Headers,
            CreateField::Headers => CreateField::Params,
            CreateField::Params => CreateField::Name,
        };
    }

    pub fn prev_field(&mut self) {
        self.field = match self.field {
            CreateField::Name if self.show_advanced => CreateField::Params,
            CreateField::Name => CreateField::Collection,
            CreateField::Method => CreateField::Name,
            CreateField::Url => CreateField::Method,
            CreateField::Collection => CreateField::Url,
            CreateField::Payload => CreateField::Collection,
            CreateField::Headers => CreateField::Payload,
            CreateField::Params => CreateField::Headers,
        };
    }

    pub fn toggle_advanced(&mut self) {
        self.show_advanced = !self.show_advanced;
        if !self.show_advanced && self.field.is_advanced() {
            self.field = CreateField::Name;
        }
    }

    /// Cycle the collection association: none -> first -> ... -> none
    pub fn cycle_collection(&mut self, count: usize, forward: bool) {
        self.collection_index = if forward {
            match self.collection_index {
                None if count > 0 => Some(0),
                None => None,
                Some(i) if i + 1 < count => Some(i + 1),
                Some(_) => None,
            }
        } else {
            match self.collection_index {
                None if count > 0 => Some(count - 1),
                None => None,
                Some(0) => None,
                Some(i) => Some(i - 1),
            }
        };
    }

    /// Build the create payload; an empty collection id means unassociated
    pub fn to_new_request(&self, collections: &[Collection]) -> NewRequest {
        NewRequest {
            name: self.name.clone(),
            method: self.method,
            url: self.url.clone(),
            collection_id: self
                .collection_index
                .and_then(|i| collections.get(i))
                .map(|c| c.id.clone())
                .unwrap_or_default(),
            payload: self.payload.clone(),
            headers: self.headers.to_map(),
            params: self.params.to_map(),
        }
    }
}

/// Modal dialogs; destructive and name-taking operations go through these
#[derive(Clone, Debug, PartialEq)]
pub enum Modal {
    Help,
    ConfirmDelete {
        kind: ResourceKind,
        id: String,
        label: String,
    },
    CloneName {
        id: String,
        input: String,
    },
    ImportPath {
        kind: ResourceKind,
        input: String,
    },
    CreateRequest(Box<CreateForm>),
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::Help => ModalKind::Help,
            Modal::ConfirmDelete { .. } => ModalKind::Confirm,
            Modal::CloneName { .. } | Modal::ImportPath { .. } => ModalKind::Prompt,
            Modal::CreateRequest(_) => ModalKind::Form,
        }
    }
}

/// Backend health, refreshed when the Health tab is opened
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HealthState {
    pub loading: bool,
    pub status: Option<String>,
    pub error: Option<String>,
    pub checked_at: Option<chrono::DateTime<chrono::Local>>,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub active_tab: AppTab,
    pub focus: Panel,

    // One synchronizer per entity kind
    pub collections: ResourceState<Collection>,
    pub requests: ResourceState<ApiRequest>,
    pub openapi: ResourceState<OpenApiSpec>,

    /// Requests belonging to the selected collection (secondary fetch).
    /// Left stale on deselection; the detail view gates its rendering.
    pub collection_requests: Vec<ApiRequest>,

    // Edit buffers
    pub collection_edit: Option<DocEdit>,
    pub openapi_edit: Option<DocEdit>,
    pub request_edit: RequestEdit,

    pub modal: Option<Modal>,
    pub health: HealthState,

    /// Transient status line message (export URLs, hints)
    pub status: Option<String>,

    /// Base URL used to assemble export links without a network call
    pub api_base: String,
}

impl AppState {
    pub fn new(api_base: impl Into<String>) -> Self {
        AppState {
            active_tab: AppTab::Collections,
            focus: Panel::List,
            collections: ResourceState::new(),
            requests: ResourceState::new(),
            openapi: ResourceState::new(),
            collection_requests: Vec::new(),
            collection_edit: None,
            openapi_edit: None,
            request_edit: RequestEdit::default(),
            modal: None,
            health: HealthState::default(),
            status: None,
            api_base: api_base.into(),
        }
    }

    /// Whether keystrokes currently flow into an inline edit buffer
    pub fn is_editing(&self) -> bool {
        if self.modal.is_some() {
            return false;
        }
        match self.active_tab {
            AppTab::Collections => self.collection_edit.is_some(),
            AppTab::Requests => self.request_edit.editing(),
            AppTab::OpenApi => self.openapi_edit.is_some(),
            AppTab::Health => false,
        }
    }

    /// Snapshot everything the UI needs to render
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            active_tab: self.active_tab,
            focus: self.focus,
            collections: self.collections.clone(),
            requests: self.requests.clone(),
            openapi: self.openapi.clone(),
            collection_requests: self.collection_requests.clone(),
            collection_edit: self.collection_edit.clone(),
            openapi_edit: self.openapi_edit.clone(),
            request_edit: self.request_edit.clone(),
            modal: self.modal.clone(),
            health: self.health.clone(),
            status: self.status.clone(),
            editing: self.is_editing(),
        }
    }
}
