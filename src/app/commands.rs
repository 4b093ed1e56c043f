//! Command handlers - business logic for processing UI events and API results
//!
//! Handlers mutate state and return the API commands to dispatch, which
//! keeps the whole lifecycle testable without channels or a runtime.

use std::path::PathBuf;

use crate::app::state::{
    AppState, BodyEditor, CreateField, DocEdit, DocField, Modal, RequestSection,
};
use crate::kv::{KvColumn, KvEditor};
use crate::messages::api::{ApiCommand, ApiResult, EntityDetail, EntityList, MutationKind};
use crate::messages::ui_events::{AppTab, Panel, UiEvent};
use crate::models::{Resource, ResourceKind};

impl AppState {
    /// Commands to issue when the app starts
    pub fn initial_commands(&mut self) -> Vec<ApiCommand> {
        vec![self.collections.begin_list_load()]
    }

    /// Process one UI event, returning the API commands it produced
    pub fn handle_event(&mut self, event: UiEvent) -> Vec<ApiCommand> {
        match event {
            UiEvent::SwitchTab(tab) => self.switch_tab(tab),
            UiEvent::ToggleHelp => {
                self.modal = if matches!(self.modal, Some(Modal::Help)) {
                    None
                } else {
                    Some(Modal::Help)
                };
                Vec::new()
            }
            UiEvent::FocusNext | UiEvent::FocusPrev => {
                if self.active_tab != AppTab::Health {
                    self.focus = self.focus.toggle();
                }
                Vec::new()
            }
            UiEvent::NavUp => {
                self.nav_vertical(false);
                Vec::new()
            }
            UiEvent::NavDown => {
                self.nav_vertical(true);
                Vec::new()
            }
            UiEvent::NavLeft => {
                self.nav_horizontal(false);
                Vec::new()
            }
            UiEvent::NavRight => {
                self.nav_horizontal(true);
                Vec::new()
            }
            UiEvent::Activate => self.activate(),
            UiEvent::ClearSelection => {
                self.clear_selection();
                Vec::new()
            }
            UiEvent::ReloadList => self.reload_list(),
            UiEvent::RefreshHealth => {
                self.health.loading = true;
                self.health.error = None;
                vec![ApiCommand::FetchHealth]
            }
            UiEvent::StartEdit => {
                self.start_edit();
                Vec::new()
            }
            UiEvent::CancelEdit => {
                self.cancel_edit();
                Vec::new()
            }
            UiEvent::SaveEdit => self.save_edit(),
            UiEvent::CharInput(c) => {
                self.input_char(c);
                Vec::new()
            }
            UiEvent::Backspace => {
                self.input_backspace();
                Vec::new()
            }
            UiEvent::NextField => {
                self.field_nav(true);
                Vec::new()
            }
            UiEvent::PrevField => {
                self.field_nav(false);
                Vec::new()
            }
            UiEvent::KvAddRow => {
                self.kv_row_op(true);
                Vec::new()
            }
            UiEvent::KvRemoveRow => {
                self.kv_row_op(false);
                Vec::new()
            }
            UiEvent::OpenCreateForm => {
                if self.active_tab == AppTab::Requests {
                    self.modal = Some(Modal::CreateRequest(Box::default()));
                }
                Vec::new()
            }
            UiEvent::FormToggleAdvanced => {
                if let Some(Modal::CreateRequest(form)) = self.modal.as_mut() {
                    form.toggle_advanced();
                }
                Vec::new()
            }
            UiEvent::SubmitForm => self.submit_form(),
            UiEvent::RequestDelete => {
                self.open_delete_confirm();
                Vec::new()
            }
            UiEvent::RequestClone => {
                self.open_clone_prompt();
                Vec::new()
            }
            UiEvent::RequestImport => {
                if let Some(kind) = self.active_tab_kind().filter(|k| k.supports_import()) {
                    self.modal = Some(Modal::ImportPath {
                        kind,
                        input: String::new(),
                    });
                }
                Vec::new()
            }
            UiEvent::ExportSelected => {
                self.export_selected();
                Vec::new()
            }
            UiEvent::ConfirmModal => self.confirm_modal(),
            UiEvent::CancelModal => {
                // declining a confirmation records no error and calls nothing
                self.modal = None;
                Vec::new()
            }
            UiEvent::Quit => Vec::new(),
        }
    }

    /// Process one API result, returning follow-up commands (reloads,
    /// queued mutations, secondary fetches)
    pub fn handle_result(&mut self, result: ApiResult) -> Vec<ApiCommand> {
        match result {
            ApiResult::List { kind, outcome } => {
                self.apply_list_result(kind, outcome);
                Vec::new()
            }
            ApiResult::Detail {
                kind,
                generation,
                outcome,
            } => self.apply_detail_result(kind, generation, outcome),
            ApiResult::CollectionRequests {
                generation,
                outcome,
            } => {
                // a failed sub-fetch leaves the detail loaded with no requests
                if generation == self.collections.current_generation() {
                    self.collection_requests = outcome.unwrap_or_default();
                }
                Vec::new()
            }
            ApiResult::Mutation {
                kind,
                mutation,
                outcome,
            } => self.apply_mutation_result(kind, mutation, outcome),
            ApiResult::Health { outcome } => {
                self.health.loading = false;
                self.health.checked_at = Some(chrono::Local::now());
                match outcome {
                    Ok(health) => {
                        self.health.status = Some(if health.status.is_empty() {
                            "unknown".to_string()
                        } else {
                            health.status
                        });
                        self.health.error = None;
                    }
                    Err(message) => {
                        self.health.status = None;
                        self.health.error = Some(message);
                    }
                }
                Vec::new()
            }
        }
    }

    // ========================
    // Tabs and navigation
    // ========================

    fn switch_tab(&mut self, tab: AppTab) -> Vec<ApiCommand> {
        self.active_tab = tab;
        self.focus = Panel::List;
        self.status = None;
        match tab {
            AppTab::Collections => vec![self.collections.begin_list_load()],
            // the create form needs the collections list for association
            AppTab::Requests => vec![
                self.requests.begin_list_load(),
                self.collections.begin_list_load(),
            ],
            AppTab::OpenApi => vec![self.openapi.begin_list_load()],
            AppTab::Health => {
                self.health.loading = true;
                self.health.error = None;
                vec![ApiCommand::FetchHealth]
            }
        }
    }

    fn active_tab_kind(&self) -> Option<ResourceKind> {
        match self.active_tab {
            AppTab::Collections => Some(ResourceKind::Collections),
            AppTab::Requests => Some(ResourceKind::Requests),
            AppTab::OpenApi => Some(ResourceKind::OpenApi),
            AppTab::Health => None,
        }
    }

    fn reload_list(&mut self) -> Vec<ApiCommand> {
        match self.active_tab {
            AppTab::Collections => vec![self.collections.begin_list_load()],
            AppTab::Requests => vec![self.requests.begin_list_load()],
            AppTab::OpenApi => vec![self.openapi.begin_list_load()],
            AppTab::Health => Vec::new(),
        }
    }

    fn nav_vertical(&mut self, down: bool) {
        if let Some(Modal::CreateRequest(form)) = self.modal.as_mut() {
            match form.field {
                CreateField::Headers => {
                    if down {
                        form.headers.next_row()
                    } else {
                        form.headers.prev_row()
                    }
                }
                CreateField::Params => {
                    if down {
                        form.params.next_row()
                    } else {
                        form.params.prev_row()
                    }
                }
                _ => {
                    if down {
                        form.next_field()
                    } else {
                        form.prev_field()
                    }
                }
            }
            return;
        }
        if self.modal.is_some() {
            return;
        }
        if self.is_editing() {
            if self.active_tab == AppTab::Requests {
                if let Some(kv) = self.request_edit.active_kv_mut() {
                    if down {
                        kv.next_row()
                    } else {
                        kv.prev_row()
                    }
                }
            }
            return;
        }
        match self.focus {
            Panel::List => match self.active_tab {
                AppTab::Collections => {
                    if down {
                        self.collections.cursor_down()
                    } else {
                        self.collections.cursor_up()
                    }
                }
                AppTab::Requests => {
                    if down {
                        self.requests.cursor_down()
                    } else {
                        self.requests.cursor_up()
                    }
                }
                AppTab::OpenApi => {
                    if down {
                        self.openapi.cursor_down()
                    } else {
                        self.openapi.cursor_up()
                    }
                }
                AppTab::Health => {}
            },
            Panel::Detail => {
                if self.active_tab == AppTab::Requests {
                    self.request_edit.section = if down {
                        self.request_edit.section.next()
                    } else {
                        self.request_edit.section.prev()
                    };
                }
            }
        }
    }

    fn nav_horizontal(&mut self, right: bool) {
        let collection_count = self.collections.items.len();
        if let Some(Modal::CreateRequest(form)) = self.modal.as_mut() {
            match form.field {
                CreateField::Method => {
                    form.method = if right {
                        form.method.next()
                    } else {
                        form.method.prev()
                    };
                }
                CreateField::Collection => form.cycle_collection(collection_count, right),
                CreateField::Headers => form.headers.set_column(column_for(right)),
                CreateField::Params => form.params.set_column(column_for(right)),
                _ => {}
            }
            return;
        }
        if self.modal.is_some() {
            return;
        }
        if self.is_editing() && self.active_tab == AppTab::Requests {
            if let Some(kv) = self.request_edit.active_kv_mut() {
                kv.set_column(column_for(right));
            }
        }
    }

    fn field_nav(&mut self, forward: bool) {
        if let Some(Modal::CreateRequest(form)) = self.modal.as_mut() {
            if forward {
                form.next_field()
            } else {
                form.prev_field()
            }
            return;
        }
        if self.modal.is_some() {
            return;
        }
        match self.active_tab {
            AppTab::Collections => {
                if let Some(edit) = self.collection_edit.as_mut() {
                    edit.toggle_field();
                }
            }
            AppTab::OpenApi => {
                if let Some(edit) = self.openapi_edit.as_mut() {
                    edit.toggle_field();
                }
            }
            AppTab::Requests => {
                if let Some(kv) = self.request_edit.active_kv_mut() {
                    kv.toggle_column();
                }
            }
            AppTab::Health => {}
        }
    }

    // ========================
    // Selection
    // ========================

    fn activate(&mut self) -> Vec<ApiCommand> {
        match self.focus {
            Panel::List => match self.active_tab {
                AppTab::Collections => {
                    if let Some(id) = self.collections.cursor_item().map(|c| c.id.clone()) {
                        self.collection_edit = None;
                        return vec![self.collections.select(&id)];
                    }
                    Vec::new()
                }
                AppTab::Requests => {
                    if let Some(id) = self.requests.cursor_item().map(|r| r.id.clone()) {
                        self.request_edit.reset();
                        return vec![self.requests.select(&id)];
                    }
                    Vec::new()
                }
                AppTab::OpenApi => {
                    if let Some(id) = self.openapi.cursor_item().map(|s| s.id.clone()) {
                        self.openapi_edit = None;
                        return vec![self.openapi.select(&id)];
                    }
                    Vec::new()
                }
                AppTab::Health => Vec::new(),
            },
            Panel::Detail => {
                self.start_edit();
                Vec::new()
            }
        }
    }

    fn clear_selection(&mut self) {
        match self.active_tab {
            AppTab::Collections => {
                self.collections.clear_selection();
                self.collection_edit = None;
            }
            AppTab::Requests => {
                self.requests.clear_selection();
                self.request_edit.reset();
            }
            AppTab::OpenApi => {
                self.openapi.clear_selection();
                self.openapi_edit = None;
            }
            AppTab::Health => {}
        }
        self.focus = Panel::List;
        self.status = None;
    }

    // ========================
    // Inline editing
    // ========================

    fn start_edit(&mut self) {
        match self.active_tab {
            AppTab::Collections => {
                if let Some(detail) = &self.collections.detail {
                    self.collection_edit = Some(DocEdit::from_collection(detail));
                    self.focus = Panel::Detail;
                }
            }
            AppTab::OpenApi => {
                if let Some(detail) = &self.openapi.detail {
                    self.openapi_edit = Some(DocEdit::from_spec(detail));
                    self.focus = Panel::Detail;
                }
            }
            AppTab::Requests => {
                if let Some(detail) = &self.requests.detail {
                    self.focus = Panel::Detail;
                    match self.request_edit.section {
                        RequestSection::Payload => match BodyEditor::seed(&detail.body) {
                            Some(editor) => self.request_edit.payload = Some(editor),
                            None => {
                                self.status = Some(format!(
                                    "Body mode '{}' is read-only",
                                    detail.body.mode()
                                ));
                            }
                        },
                        RequestSection::Headers => {
                            self.request_edit.headers =
                                Some(KvEditor::from_map(&detail.headers));
                        }
                        RequestSection::Params => {
                            self.request_edit.params =
                                Some(KvEditor::from_map(&detail.params.params));
                        }
                    }
                }
            }
            AppTab::Health => {}
        }
    }

    fn cancel_edit(&mut self) {
        match self.active_tab {
            AppTab::Collections => self.collection_edit = None,
            AppTab::OpenApi => self.openapi_edit = None,
            AppTab::Requests => match self.request_edit.section {
                RequestSection::Payload => self.request_edit.payload = None,
                RequestSection::Headers => self.request_edit.headers = None,
                RequestSection::Params => self.request_edit.params = None,
            },
            AppTab::Health => {}
        }
    }

    fn save_edit(&mut self) -> Vec<ApiCommand> {
        match self.active_tab {
            AppTab::Collections => {
                let cmd = match (&self.collections.detail, &self.collection_edit) {
                    (Some(detail), Some(edit)) => {
                        let mut updated = detail.clone();
                        updated.name = Some(edit.name.clone());
                        updated.description = Some(edit.description.clone());
                        Some(ApiCommand::SaveCollection {
                            collection: updated,
                        })
                    }
                    _ => None,
                };
                match cmd {
                    Some(cmd) => self.submit_for(ResourceKind::Collections, cmd),
                    None => Vec::new(),
                }
            }
            AppTab::OpenApi => {
                let cmd = match (&self.openapi.detail, &self.openapi_edit) {
                    (Some(detail), Some(edit)) => {
                        let mut updated = detail.clone();
                        updated.title = Some(edit.name.clone());
                        updated.description = Some(edit.description.clone());
                        Some(ApiCommand::SaveOpenApi { spec: updated })
                    }
                    _ => None,
                };
                match cmd {
                    Some(cmd) => self.submit_for(ResourceKind::OpenApi, cmd),
                    None => Vec::new(),
                }
            }
            AppTab::Requests => {
                let Some(id) = self.requests.detail.as_ref().map(|d| d.id.clone()) else {
                    return Vec::new();
                };
                let cmd = match self.request_edit.section {
                    RequestSection::Payload => {
                        self.request_edit
                            .payload
                            .as_ref()
                            .map(|editor| ApiCommand::SaveRequestPayload {
                                id: id.clone(),
                                body: editor.to_body(),
                            })
                    }
                    RequestSection::Headers => {
                        self.request_edit
                            .headers
                            .as_ref()
                            .map(|kv| ApiCommand::SaveRequestHeaders {
                                id: id.clone(),
                                headers: kv.to_map(),
                            })
                    }
                    RequestSection::Params => {
                        self.request_edit
                            .params
                            .as_ref()
                            .map(|kv| ApiCommand::SaveRequestParams {
                                id: id.clone(),
                                params: kv.to_map(),
                            })
                    }
                };
                match cmd {
                    Some(cmd) => self.submit_for(ResourceKind::Requests, cmd),
                    None => Vec::new(),
                }
            }
            AppTab::Health => Vec::new(),
        }
    }

    fn input_char(&mut self, c: char) {
        if let Some(modal) = self.modal.as_mut() {
            match modal {
                Modal::CloneName { input, .. } | Modal::ImportPath { input, .. } => {
                    if c != '\n' {
                        input.push(c);
                    }
                }
                Modal::CreateRequest(form) => match form.field {
                    CreateField::Name => {
                        if c != '\n' {
                            form.name.push(c);
                        }
                    }
                    CreateField::Url => {
                        if c != '\n' {
                            form.url.push(c);
                        }
                    }
                    CreateField::Payload => form.payload.push(c),
                    CreateField::Headers => {
                        if c != '\n' {
                            form.headers.insert_char(c);
                        }
                    }
                    CreateField::Params => {
                        if c != '\n' {
                            form.params.insert_char(c);
                        }
                    }
                    CreateField::Method | CreateField::Collection => {}
                },
                _ => {}
            }
            return;
        }
        match self.active_tab {
            AppTab::Collections => {
                if let Some(edit) = self.collection_edit.as_mut() {
                    if c != '\n' || edit.field == DocField::Description {
                        edit.current_mut().push(c);
                    }
                }
            }
            AppTab::OpenApi => {
                if let Some(edit) = self.openapi_edit.as_mut() {
                    if c != '\n' || edit.field == DocField::Description {
                        edit.current_mut().push(c);
                    }
                }
            }
            AppTab::Requests => match self.request_edit.section {
                RequestSection::Payload => match self.request_edit.payload.as_mut() {
                    Some(BodyEditor::Raw { text }) => text.push(c),
                    Some(BodyEditor::Form { kv, .. }) => {
                        if c != '\n' {
                            kv.insert_char(c);
                        }
                    }
                    None => {}
                },
                RequestSection::Headers => {
                    if let Some(kv) = self.request_edit.headers.as_mut() {
                        if c != '\n' {
                            kv.insert_char(c);
                        }
                    }
                }
                RequestSection::Params => {
                    if let Some(kv) = self.request_edit.params.as_mut() {
                        if c != '\n' {
                            kv.insert_char(c);
                        }
                    }
                }
            },
            AppTab::Health => {}
        }
    }

    fn input_backspace(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            match modal {
                Modal::CloneName { input, .. } | Modal::ImportPath { input, .. } => {
                    input.pop();
                }
                Modal::CreateRequest(form) => match form.field {
                    CreateField::Name => {
                        form.name.pop();
                    }
                    CreateField::Url => {
                        form.url.pop();
                    }
                    CreateField::Payload => {
                        form.payload.pop();
                    }
                    CreateField::Headers => form.headers.backspace(),
                    CreateField::Params => form.params.backspace(),
                    CreateField::Method | CreateField::Collection => {}
                },
                _ => {}
            }
            return;
        }
        match self.active_tab {
            AppTab::Collections => {
                if let Some(edit) = self.collection_edit.as_mut() {
                    edit.current_mut().pop();
                }
            }
            AppTab::OpenApi => {
                if let Some(edit) = self.openapi_edit.as_mut() {
                    edit.current_mut().pop();
                }
            }
            AppTab::Requests => match self.request_edit.section {
                RequestSection::Payload => match self.request_edit.payload.as_mut() {
                    Some(BodyEditor::Raw { text }) => {
                        text.pop();
                    }
                    Some(BodyEditor::Form { kv, .. }) => kv.backspace(),
                    None => {}
                },
                RequestSection::Headers => {
                    if let Some(kv) = self.request_edit.headers.as_mut() {
                        kv.backspace();
                    }
                }
                RequestSection::Params => {
                    if let Some(kv) = self.request_edit.params.as_mut() {
                        kv.backspace();
                    }
                }
            },
            AppTab::Health => {}
        }
    }

    fn kv_row_op(&mut self, add: bool) {
        if let Some(Modal::CreateRequest(form)) = self.modal.as_mut() {
            let kv = match form.field {
                CreateField::Headers => Some(&mut form.headers),
                CreateField::Params => Some(&mut form.params),
                _ => None,
            };
            if let Some(kv) = kv {
                if add {
                    kv.add_row()
                } else {
                    kv.remove_selected()
                }
            }
            return;
        }
        if self.modal.is_some() {
            return;
        }
        if self.active_tab == AppTab::Requests {
            if let Some(kv) = self.request_edit.active_kv_mut() {
                if add {
                    kv.add_row()
                } else {
                    kv.remove_selected()
                }
            }
        }
    }

    // ========================
    // Modals and operations
    // ========================

    fn open_delete_confirm(&mut self) {
        let target = match (self.focus, self.active_tab) {
            (Panel::Detail, AppTab::Collections) => self
                .collections
                .detail
                .as_ref()
                .map(|c| (c.id.clone(), c.detail_title().to_string())),
            (Panel::Detail, AppTab::Requests) => self
                .requests
                .detail
                .as_ref()
                .map(|r| (r.id.clone(), r.detail_title().to_string())),
            (Panel::Detail, AppTab::OpenApi) => self
                .openapi
                .detail
                .as_ref()
                .map(|s| (s.id.clone(), s.detail_title().to_string())),
            (Panel::List, AppTab::Collections) => self
                .collections
                .cursor_item()
                .map(|c| (c.id.clone(), c.list_label().to_string())),
            (Panel::List, AppTab::Requests) => self
                .requests
                .cursor_item()
                .map(|r| (r.id.clone(), r.list_label().to_string())),
            (Panel::List, AppTab::OpenApi) => self
                .openapi
                .cursor_item()
                .map(|s| (s.id.clone(), s.list_label().to_string())),
            (_, AppTab::Health) => None,
        };
        if let (Some((id, label)), Some(kind)) = (target, self.active_tab_kind()) {
            self.modal = Some(Modal::ConfirmDelete { kind, id, label });
        }
    }

    fn open_clone_prompt(&mut self) {
        if !self
            .active_tab_kind()
            .is_some_and(|kind| kind.supports_clone())
        {
            return;
        }
        let id = self
            .requests
            .cursor_item()
            .map(|r| r.id.clone())
            .or_else(|| self.requests.selected_id.clone());
        if let Some(id) = id {
            self.modal = Some(Modal::CloneName {
                id,
                input: String::new(),
            });
        }
    }

    fn export_selected(&mut self) {
        let Some(kind) = self.active_tab_kind() else {
            return;
        };
        if !kind.supports_import() {
            return;
        }
        let id = match self.active_tab {
            AppTab::Collections => self
                .collections
                .selected_id
                .clone()
                .or_else(|| self.collections.cursor_item().map(|c| c.id.clone())),
            AppTab::OpenApi => self
                .openapi
                .selected_id
                .clone()
                .or_else(|| self.openapi.cursor_item().map(|s| s.id.clone())),
            _ => None,
        };
        if let Some(id) = id {
            self.status = Some(format!("Export URL: {}", self.export_url(kind, &id)));
        }
    }

    /// Export is synchronous and side-effect-free: it only assembles the
    /// retrieval location, it never fetches it.
    pub fn export_url(&self, kind: ResourceKind, id: &str) -> String {
        format!(
            "{}/{}/{}/export",
            self.api_base.trim_end_matches('/'),
            kind.base_path(),
            id
        )
    }

    fn confirm_modal(&mut self) -> Vec<ApiCommand> {
        match self.modal.take() {
            Some(Modal::ConfirmDelete { kind, id, .. }) => {
                self.submit_for(kind, ApiCommand::DeleteEntity { kind, id })
            }
            Some(Modal::CloneName { id, input }) => {
                let name = input.trim().to_string();
                if name.is_empty() {
                    // an empty name counts as declining the prompt
                    return Vec::new();
                }
                self.submit_for(
                    ResourceKind::Requests,
                    ApiCommand::CloneRequest { id, name },
                )
            }
            Some(Modal::ImportPath { kind, input }) => {
                let path = input.trim().to_string();
                if path.is_empty() {
                    return Vec::new();
                }
                self.submit_for(
                    kind,
                    ApiCommand::ImportFile {
                        kind,
                        path: PathBuf::from(path),
                    },
                )
            }
            Some(modal @ Modal::CreateRequest(_)) => {
                // forms submit through SubmitForm, not the generic confirm
                self.modal = Some(modal);
                Vec::new()
            }
            Some(Modal::Help) | None => Vec::new(),
        }
    }

    fn submit_form(&mut self) -> Vec<ApiCommand> {
        if let Some(Modal::CreateRequest(form)) = self.modal.take() {
            let request = form.to_new_request(&self.collections.items);
            return self.submit_for(
                ResourceKind::Requests,
                ApiCommand::CreateRequest { request },
            );
        }
        Vec::new()
    }

    fn submit_for(&mut self, kind: ResourceKind, cmd: ApiCommand) -> Vec<ApiCommand> {
        let dispatched = match kind {
            ResourceKind::Collections => self.collections.submit_mutation(cmd),
            ResourceKind::Requests => self.requests.submit_mutation(cmd),
            ResourceKind::OpenApi => self.openapi.submit_mutation(cmd),
        };
        dispatched.into_iter().collect()
    }

    // ========================
    // API result application
    // ========================

    fn apply_list_result(&mut self, kind: ResourceKind, outcome: Result<EntityList, String>) {
        match kind {
            ResourceKind::Collections => {
                let outcome = outcome.and_then(|list| match list {
                    EntityList::Collections(items) => Ok(items),
                    _ => Err("unexpected list payload".to_string()),
                });
                self.collections.apply_list(outcome);
            }
            ResourceKind::Requests => {
                let outcome = outcome.and_then(|list| match list {
                    EntityList::Requests(items) => Ok(items),
                    _ => Err("unexpected list payload".to_string()),
                });
                self.requests.apply_list(outcome);
            }
            ResourceKind::OpenApi => {
                let outcome = outcome.and_then(|list| match list {
                    EntityList::OpenApi(items) => Ok(items),
                    _ => Err("unexpected list payload".to_string()),
                });
                self.openapi.apply_list(outcome);
            }
        }
    }

    fn apply_detail_result(
        &mut self,
        kind: ResourceKind,
        generation: u64,
        outcome: Result<EntityDetail, String>,
    ) -> Vec<ApiCommand> {
        match kind {
            ResourceKind::Collections => {
                let outcome = outcome.and_then(|detail| match detail {
                    EntityDetail::Collection(collection) => Ok(*collection),
                    _ => Err("unexpected detail payload".to_string()),
                });
                let loaded = outcome.is_ok();
                if self.collections.apply_detail(generation, outcome) {
                    self.collection_edit = None;
                    self.collection_requests.clear();
                    if loaded {
                        if let Some(id) = self.collections.selected_id.clone() {
                            return vec![ApiCommand::FetchCollectionRequests {
                                collection_id: id,
                                generation,
                            }];
                        }
                    }
                }
                Vec::new()
            }
            ResourceKind::Requests => {
                let outcome = outcome.and_then(|detail| match detail {
                    EntityDetail::Request(request) => Ok(*request),
                    _ => Err("unexpected detail payload".to_string()),
                });
                if self.requests.apply_detail(generation, outcome) {
                    self.request_edit.reset();
                }
                Vec::new()
            }
            ResourceKind::OpenApi => {
                let outcome = outcome.and_then(|detail| match detail {
                    EntityDetail::OpenApi(spec) => Ok(*spec),
                    _ => Err("unexpected detail payload".to_string()),
                });
                if self.openapi.apply_detail(generation, outcome) {
                    self.openapi_edit = None;
                }
                Vec::new()
            }
        }
    }

    fn apply_mutation_result(
        &mut self,
        kind: ResourceKind,
        mutation: MutationKind,
        outcome: Result<(), String>,
    ) -> Vec<ApiCommand> {
        // advance the per-synchronizer queue before anything else so a
        // queued mutation is dispatched even when this one failed
        let mut cmds: Vec<ApiCommand> = match kind {
            ResourceKind::Collections => self.collections.finish_mutation(),
            ResourceKind::Requests => self.requests.finish_mutation(),
            ResourceKind::OpenApi => self.openapi.finish_mutation(),
        }
        .into_iter()
        .collect();

        match outcome {
            Err(message) => match kind {
                ResourceKind::Collections => self.collections.error = Some(message),
                ResourceKind::Requests => self.requests.error = Some(message),
                ResourceKind::OpenApi => self.openapi.error = Some(message),
            },
            Ok(()) => cmds.extend(self.after_successful_mutation(kind, mutation)),
        }
        cmds
    }

    fn after_successful_mutation(
        &mut self,
        kind: ResourceKind,
        mutation: MutationKind,
    ) -> Vec<ApiCommand> {
        match mutation {
            // a save unconditionally reloads the list and the current detail
            MutationKind::Save { id } => match kind {
                ResourceKind::Collections => {
                    let mut cmds = vec![self.collections.begin_list_load()];
                    if self.collections.selected_id.as_deref() == Some(id.as_str()) {
                        cmds.push(self.collections.select(&id));
                    }
                    cmds
                }
                ResourceKind::Requests => {
                    let mut cmds = vec![self.requests.begin_list_load()];
                    if self.requests.selected_id.as_deref() == Some(id.as_str()) {
                        cmds.push(self.requests.select(&id));
                    }
                    cmds
                }
                ResourceKind::OpenApi => {
                    let mut cmds = vec![self.openapi.begin_list_load()];
                    if self.openapi.selected_id.as_deref() == Some(id.as_str()) {
                        cmds.push(self.openapi.select(&id));
                    }
                    cmds
                }
            },
            MutationKind::Delete { id } => {
                match kind {
                    ResourceKind::Collections => {
                        if self.collections.selected_id.as_deref() == Some(id.as_str()) {
                            self.collections.clear_selection();
                            self.collection_edit = None;
                        }
                        vec![self.collections.begin_list_load()]
                    }
                    ResourceKind::Requests => {
                        if self.requests.selected_id.as_deref() == Some(id.as_str()) {
                            self.requests.clear_selection();
                            self.request_edit.reset();
                        }
                        vec![self.requests.begin_list_load()]
                    }
                    ResourceKind::OpenApi => {
                        if self.openapi.selected_id.as_deref() == Some(id.as_str()) {
                            self.openapi.clear_selection();
                            self.openapi_edit = None;
                        }
                        vec![self.openapi.begin_list_load()]
                    }
                }
            }
            // neither creates nor clones select the new entity
            MutationKind::Create | MutationKind::Clone => {
                vec![self.requests.begin_list_load()]
            }
            MutationKind::Import => match kind {
                // imported items are not auto-selected; the stale secondary
                // request list is acceptable because selection was cleared
                ResourceKind::Collections => {
                    self.collections.clear_selection();
                    self.collection_edit = None;
                    vec![self.collections.begin_list_load()]
                }
                ResourceKind::OpenApi => {
                    self.openapi.clear_selection();
                    self.openapi_edit = None;
                    vec![self.openapi.begin_list_load()]
                }
                ResourceKind::Requests => vec![self.requests.begin_list_load()],
            },
        }
    }
}

fn column_for(right: bool) -> KvColumn {
    if right {
        KvColumn::Value
    } else {
        KvColumn::Key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiRequest, BodyModel, Collection, FormField, HealthStatus, OpenApiSpec};

    const BASE: &str = "http://localhost:8080/api/v1";

    fn state() -> AppState {
        AppState::new(BASE)
    }

    fn collection(id: &str) -> Collection {
        Collection {
            id: id.to_string(),
            name: Some(format!("collection {id}")),
            ..Collection::default()
        }
    }

    fn request(id: &str) -> ApiRequest {
        ApiRequest {
            id: id.to_string(),
            name: Some(format!("request {id}")),
            ..ApiRequest::default()
        }
    }

    fn select_request(state: &mut AppState, id: &str) {
        state.active_tab = AppTab::Requests;
        let cmds = state.handle_event(UiEvent::Activate);
        assert_eq!(cmds.len(), 1);
        let generation = state.requests.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation,
            outcome: Ok(EntityDetail::Request(Box::new(request(id)))),
        });
    }

    #[test]
    fn list_load_replaces_items_wholesale() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("old")]));

        state.handle_result(ApiResult::List {
            kind: ResourceKind::Collections,
            outcome: Ok(EntityList::Collections(vec![
                collection("c1"),
                collection("c2"),
            ])),
        });
        let ids: Vec<&str> = state.collections.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn failed_list_load_resets_to_empty() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));

        state.handle_result(ApiResult::List {
            kind: ResourceKind::Collections,
            outcome: Err("Failed to fetch collections".to_string()),
        });
        assert!(state.collections.items.is_empty());
        assert_eq!(
            state.collections.error.as_deref(),
            Some("Failed to fetch collections")
        );
    }

    #[test]
    fn selecting_a_collection_chains_the_requests_sub_fetch() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));

        let cmds = state.handle_event(UiEvent::Activate);
        let generation = state.collections.current_generation();
        assert_eq!(
            cmds,
            vec![ApiCommand::FetchDetail {
                kind: ResourceKind::Collections,
                id: "c1".to_string(),
                generation,
            }]
        );

        let cmds = state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Collections,
            generation,
            outcome: Ok(EntityDetail::Collection(Box::new(collection("c1")))),
        });
        assert_eq!(
            cmds,
            vec![ApiCommand::FetchCollectionRequests {
                collection_id: "c1".to_string(),
                generation,
            }]
        );
    }

    #[test]
    fn failed_sub_fetch_keeps_detail_and_empties_requests() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));
        state.handle_event(UiEvent::Activate);
        let generation = state.collections.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Collections,
            generation,
            outcome: Ok(EntityDetail::Collection(Box::new(collection("c1")))),
        });
        state.collection_requests = vec![request("r1")];

        state.handle_result(ApiResult::CollectionRequests {
            generation,
            outcome: Err("boom".to_string()),
        });
        assert!(state.collections.detail.is_some());
        assert!(state.collection_requests.is_empty());
        assert!(state.collections.error.is_none());
    }

    #[test]
    fn stale_detail_responses_are_discarded() {
        let mut state = state();
        state
            .requests
            .apply_list(Ok(vec![request("r1"), request("r2")]));
        state.active_tab = AppTab::Requests;

        state.handle_event(UiEvent::Activate);
        let first = state.requests.current_generation();
        state.handle_event(UiEvent::NavDown);
        state.handle_event(UiEvent::Activate);
        let second = state.requests.current_generation();
        assert!(second > first);

        // the late completion of the first load must not win
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation: first,
            outcome: Ok(EntityDetail::Request(Box::new(request("r1")))),
        });
        assert!(state.requests.detail.is_none());

        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation: second,
            outcome: Ok(EntityDetail::Request(Box::new(request("r2")))),
        });
        assert_eq!(
            state.requests.detail.as_ref().map(|r| r.id.as_str()),
            Some("r2")
        );
    }

    #[test]
    fn save_reloads_list_and_current_detail() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        select_request(&mut state, "r1");

        state.request_edit.section = RequestSection::Headers;
        state.handle_event(UiEvent::StartEdit);
        let cmds = state.handle_event(UiEvent::SaveEdit);
        assert!(matches!(
            cmds.as_slice(),
            [ApiCommand::SaveRequestHeaders { id, .. }] if id == "r1"
        ));
        assert!(state.requests.saving);

        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Requests,
            mutation: MutationKind::Save {
                id: "r1".to_string(),
            },
            outcome: Ok(()),
        });
        assert!(matches!(cmds[0], ApiCommand::FetchList { .. }));
        assert!(matches!(cmds[1], ApiCommand::FetchDetail { ref id, .. } if id == "r1"));
        assert!(!state.requests.saving);
    }

    #[test]
    fn second_save_queues_and_dispatches_after_the_first() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        select_request(&mut state, "r1");

        // first save: headers
        state.request_edit.section = RequestSection::Headers;
        state.handle_event(UiEvent::StartEdit);
        let first = state.handle_event(UiEvent::SaveEdit);
        assert_eq!(first.len(), 1);

        // second save while the first is in flight: params, queued
        state.request_edit.section = RequestSection::Params;
        state.handle_event(UiEvent::StartEdit);
        let second = state.handle_event(UiEvent::SaveEdit);
        assert!(second.is_empty());

        // first completes: the queued params save goes out with the reloads
        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Requests,
            mutation: MutationKind::Save {
                id: "r1".to_string(),
            },
            outcome: Ok(()),
        });
        assert!(matches!(cmds[0], ApiCommand::SaveRequestParams { .. }));
        assert!(cmds
            .iter()
            .any(|c| matches!(c, ApiCommand::FetchList { .. })));
        assert!(state.requests.saving);
    }

    #[test]
    fn delete_of_the_selected_entity_clears_the_selection() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        select_request(&mut state, "r1");

        state.handle_event(UiEvent::RequestDelete);
        assert!(matches!(state.modal, Some(Modal::ConfirmDelete { .. })));
        let cmds = state.handle_event(UiEvent::ConfirmModal);
        assert!(matches!(
            cmds.as_slice(),
            [ApiCommand::DeleteEntity { id, .. }] if id == "r1"
        ));

        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Requests,
            mutation: MutationKind::Delete {
                id: "r1".to_string(),
            },
            outcome: Ok(()),
        });
        assert!(state.requests.selected_id.is_none());
        assert!(state.requests.detail.is_none());
        assert!(matches!(cmds.as_slice(), [ApiCommand::FetchList { .. }]));
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        select_request(&mut state, "r1");

        state.handle_event(UiEvent::RequestDelete);
        let cmds = state.handle_event(UiEvent::CancelModal);
        assert!(cmds.is_empty());
        assert!(state.modal.is_none());
        assert!(state.requests.error.is_none());
        assert_eq!(state.requests.selected_id.as_deref(), Some("r1"));
    }

    #[test]
    fn clone_with_empty_name_is_a_cancel() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        state.active_tab = AppTab::Requests;

        state.handle_event(UiEvent::RequestClone);
        assert!(matches!(state.modal, Some(Modal::CloneName { .. })));
        let cmds = state.handle_event(UiEvent::ConfirmModal);
        assert!(cmds.is_empty());
        assert!(state.requests.error.is_none());
    }

    #[test]
    fn clone_reloads_the_list_without_selecting() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        state.active_tab = AppTab::Requests;

        state.handle_event(UiEvent::RequestClone);
        for c in "copy".chars() {
            state.handle_event(UiEvent::CharInput(c));
        }
        let cmds = state.handle_event(UiEvent::ConfirmModal);
        assert!(matches!(
            cmds.as_slice(),
            [ApiCommand::CloneRequest { id, name }] if id == "r1" && name == "copy"
        ));

        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Requests,
            mutation: MutationKind::Clone,
            outcome: Ok(()),
        });
        assert!(matches!(cmds.as_slice(), [ApiCommand::FetchList { .. }]));
        assert!(state.requests.selected_id.is_none());
    }

    #[test]
    fn import_reloads_and_deselects_but_keeps_stale_secondary() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));
        state.handle_event(UiEvent::Activate);
        let generation = state.collections.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Collections,
            generation,
            outcome: Ok(EntityDetail::Collection(Box::new(collection("c1")))),
        });
        state.collection_requests = vec![request("r1")];

        state.handle_event(UiEvent::RequestImport);
        for c in "/tmp/export.json".chars() {
            state.handle_event(UiEvent::CharInput(c));
        }
        let cmds = state.handle_event(UiEvent::ConfirmModal);
        assert!(matches!(cmds.as_slice(), [ApiCommand::ImportFile { .. }]));
        assert!(state.collections.importing);

        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Collections,
            mutation: MutationKind::Import,
            outcome: Ok(()),
        });
        assert!(matches!(cmds.as_slice(), [ApiCommand::FetchList { .. }]));
        assert!(state.collections.selected_id.is_none());
        assert!(state.collections.detail.is_none());
        // stale until the next selection, by design
        assert_eq!(state.collection_requests.len(), 1);
        assert!(!state.collections.importing);
    }

    #[test]
    fn detail_fetch_failure_after_import_surfaces_and_clears() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("gone")]));
        state.active_tab = AppTab::Requests;

        state.handle_event(UiEvent::Activate);
        let generation = state.requests.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation,
            outcome: Err("server returned 404 Not Found".to_string()),
        });
        assert!(state.requests.detail.is_none());
        assert_eq!(
            state.requests.error.as_deref(),
            Some("server returned 404 Not Found")
        );
    }

    #[test]
    fn create_form_submits_and_reloads_without_selecting() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));
        state.active_tab = AppTab::Requests;

        state.handle_event(UiEvent::OpenCreateForm);
        for c in "ping".chars() {
            state.handle_event(UiEvent::CharInput(c));
        }
        // name -> method, cycle GET -> POST
        state.handle_event(UiEvent::NextField);
        state.handle_event(UiEvent::NavRight);
        // method -> url
        state.handle_event(UiEvent::NextField);
        for c in "https://api.example.com/ping".chars() {
            state.handle_event(UiEvent::CharInput(c));
        }
        // url -> collection, none -> c1
        state.handle_event(UiEvent::NextField);
        state.handle_event(UiEvent::NavRight);

        let cmds = state.handle_event(UiEvent::SubmitForm);
        assert!(state.modal.is_none());
        match cmds.as_slice() {
            [ApiCommand::CreateRequest { request }] => {
                assert_eq!(request.name, "ping");
                assert_eq!(request.method.as_str(), "POST");
                assert_eq!(request.url, "https://api.example.com/ping");
                assert_eq!(request.collection_id, "c1");
            }
            other => panic!("unexpected commands: {other:?}"),
        }

        let cmds = state.handle_result(ApiResult::Mutation {
            kind: ResourceKind::Requests,
            mutation: MutationKind::Create,
            outcome: Ok(()),
        });
        assert!(matches!(cmds.as_slice(), [ApiCommand::FetchList { .. }]));
        assert!(state.requests.selected_id.is_none());
    }

    #[test]
    fn payload_edit_is_gated_on_an_editable_mode() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        state.active_tab = AppTab::Requests;
        state.handle_event(UiEvent::Activate);
        let generation = state.requests.current_generation();
        let mut detail = request("r1");
        detail.body = BodyModel::Other(serde_json::json!({ "mode": "file" }));
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation,
            outcome: Ok(EntityDetail::Request(Box::new(detail))),
        });

        state.request_edit.section = RequestSection::Payload;
        state.handle_event(UiEvent::StartEdit);
        assert!(state.request_edit.payload.is_none());
        assert!(state.status.as_deref().unwrap_or_default().contains("read-only"));
    }

    #[test]
    fn formdata_payload_round_trips_through_the_kv_editor() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        state.active_tab = AppTab::Requests;
        state.handle_event(UiEvent::Activate);
        let generation = state.requests.current_generation();
        let mut detail = request("r1");
        detail.body = BodyModel::FormData(vec![
            FormField::new("a", "1"),
            FormField::new("b", "2"),
        ]);
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation,
            outcome: Ok(EntityDetail::Request(Box::new(detail))),
        });

        state.request_edit.section = RequestSection::Payload;
        state.handle_event(UiEvent::StartEdit);
        let cmds = state.handle_event(UiEvent::SaveEdit);
        match cmds.as_slice() {
            [ApiCommand::SaveRequestPayload { body, .. }] => match body {
                BodyModel::FormData(fields) => {
                    assert_eq!(fields.len(), 2);
                    assert!(fields.contains(&FormField::new("a", "1")));
                    assert!(fields.contains(&FormField::new("b", "2")));
                }
                other => panic!("unexpected body: {other:?}"),
            },
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn detail_reload_discards_edit_buffers() {
        let mut state = state();
        state.requests.apply_list(Ok(vec![request("r1")]));
        select_request(&mut state, "r1");

        state.request_edit.section = RequestSection::Headers;
        state.handle_event(UiEvent::StartEdit);
        assert!(state.request_edit.headers.is_some());

        // a reload of the same entity (e.g. after a save) replaces the buffer
        let generation = state.requests.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::Requests,
            generation,
            outcome: Ok(EntityDetail::Request(Box::new(request("r1")))),
        });
        assert!(state.request_edit.headers.is_none());

        // so does selecting from the list again
        state.handle_event(UiEvent::StartEdit);
        assert!(state.request_edit.headers.is_some());
        state.focus = Panel::List;
        let cmds = state.handle_event(UiEvent::Activate);
        assert!(state.request_edit.headers.is_none());
        assert_eq!(cmds.len(), 1);
    }

    #[test]
    fn export_assembles_the_url_without_commands() {
        let mut state = state();
        state.collections.apply_list(Ok(vec![collection("c1")]));

        let cmds = state.handle_event(UiEvent::ExportSelected);
        assert!(cmds.is_empty());
        assert_eq!(
            state.status.as_deref(),
            Some("Export URL: http://localhost:8080/api/v1/postman/c1/export")
        );
        assert_eq!(
            state.export_url(ResourceKind::OpenApi, "s1"),
            "http://localhost:8080/api/v1/openapi/s1/export"
        );
    }

    #[test]
    fn health_result_updates_status_and_timestamp() {
        let mut state = state();
        state.handle_event(UiEvent::SwitchTab(AppTab::Health));
        assert!(state.health.loading);

        state.handle_result(ApiResult::Health {
            outcome: Ok(HealthStatus {
                status: "ok".to_string(),
            }),
        });
        assert_eq!(state.health.status.as_deref(), Some("ok"));
        assert!(!state.health.loading);
        assert!(state.health.checked_at.is_some());
    }

    #[test]
    fn openapi_save_edits_title_and_description() {
        let mut state = state();
        state.active_tab = AppTab::OpenApi;
        state.openapi.apply_list(Ok(vec![OpenApiSpec {
            id: "s1".to_string(),
            name: Some("petstore".to_string()),
            ..OpenApiSpec::default()
        }]));
        state.handle_event(UiEvent::Activate);
        let generation = state.openapi.current_generation();
        state.handle_result(ApiResult::Detail {
            kind: ResourceKind::OpenApi,
            generation,
            outcome: Ok(EntityDetail::OpenApi(Box::new(OpenApiSpec {
                id: "s1".to_string(),
                name: Some("petstore".to_string()),
                ..OpenApiSpec::default()
            }))),
        });

        state.handle_event(UiEvent::StartEdit);
        // seeded from name when title is absent
        assert_eq!(
            state.openapi_edit.as_ref().map(|e| e.name.as_str()),
            Some("petstore")
        );
        state.handle_event(UiEvent::CharInput('!'));
        let cmds = state.handle_event(UiEvent::SaveEdit);
        match cmds.as_slice() {
            [ApiCommand::SaveOpenApi { spec }] => {
                assert_eq!(spec.title.as_deref(), Some("petstore!"));
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }
}
