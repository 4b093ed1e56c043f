//! Apidesk - terminal admin console for API artifacts
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - per-kind resource synchronizers processing events
//! - API Layer (Tokio) - REST calls against the backend

mod api;
mod app;
mod config;
mod constants;
mod kv;
mod messages;
mod models;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;

use api::{ApiActor, ApiClient};
use app::{AppActor, AppState};
use config::Config;
use kv::KvEditor;
use messages::ui_events::{key_to_ui_event, AppTab, Panel};
use messages::{ApiCommand, ApiResult, RenderState, UiEvent};
use models::{ApiRequest, BodyModel, Resource};
use app::state::{
    BodyEditor, CreateField, CreateForm, DocEdit, DocField, Modal, RequestSection, ResourceState,
};
use ui::{health_color, highlight_json, kv_list_items, method_color, render_tabs};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", "apidesk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::load();
    tracing::info!(base_url = %config.base_url, "Starting apidesk");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (api_cmd_tx, api_cmd_rx) = mpsc::unbounded_channel::<ApiCommand>();
    let (api_result_tx, api_result_rx) = mpsc::unbounded_channel::<ApiResult>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn API actor
    let api_actor = ApiActor::new(ApiClient::new(&config), api_result_tx);
    tokio::spawn(api_actor.run(api_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(AppState::new(&config.base_url), api_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, api_result_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.active_tab,
                    current_state.modal_kind(),
                    current_state.editing,
                ) {
                    let quit = matches!(event, UiEvent::Quit);
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_tab_bar(f, state, main_chunks[0]);

    match state.active_tab {
        AppTab::Collections => draw_collections_tab(f, state, main_chunks[1]),
        AppTab::Requests => draw_requests_tab(f, state, main_chunks[1]),
        AppTab::OpenApi => draw_openapi_tab(f, state, main_chunks[1]),
        AppTab::Health => draw_health_tab(f, state, main_chunks[1]),
    }

    draw_status_bar(f, state, main_chunks[2]);

    match &state.modal {
        Some(Modal::Help) => draw_help_popup(f, area),
        Some(Modal::ConfirmDelete { kind, label, .. }) => {
            draw_confirm_popup(f, area, kind.noun(), label)
        }
        Some(Modal::CloneName { input, .. }) => draw_prompt_popup(
            f,
            area,
            " Clone Request (Enter to clone, Esc to cancel) ",
            "Name for the cloned request...",
            input,
        ),
        Some(Modal::ImportPath { kind, input }) => draw_prompt_popup(
            f,
            area,
            &format!(" Import {} (Enter to upload, Esc to cancel) ", kind.noun()),
            "Path to the file to import...",
            input,
        ),
        Some(Modal::CreateRequest(form)) => draw_create_form(f, state, form, area),
        None => {}
    }
}

fn draw_tab_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let tabs = [
        AppTab::Collections,
        AppTab::Requests,
        AppTab::OpenApi,
        AppTab::Health,
    ];
    let spans: Vec<Span> = tabs
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let label = format!(" {}:{} ", i + 1, tab.title());
            let style = if state.active_tab == *tab {
                Style::default().fg(Color::Black).bg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            [Span::styled(label, style), Span::raw(" ")]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ============================================================================
// Resource tabs
// ============================================================================

fn resource_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(area);
    (chunks[0], chunks[1])
}

fn draw_collections_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let (list_area, detail_area) = resource_layout(area);
    draw_resource_list(
        f,
        &state.collections,
        " Collections (i:import x:export) ",
        "No collections found.",
        state.focus == Panel::List,
        list_area,
    );
    draw_collection_detail(f, state, detail_area);
}

fn draw_openapi_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let (list_area, detail_area) = resource_layout(area);
    draw_resource_list(
        f,
        &state.openapi,
        " OpenAPI Specs (i:import x:export) ",
        "No OpenAPI specs found.",
        state.focus == Panel::List,
        list_area,
    );
    draw_openapi_detail(f, state, detail_area);
}

fn draw_requests_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let (list_area, detail_area) = resource_layout(area);
    draw_resource_list(
        f,
        &state.requests,
        " Requests (n:new c:clone) ",
        "No requests found.",
        state.focus == Panel::List,
        list_area,
    );
    draw_request_detail(f, state, detail_area);
}

fn draw_resource_list<T: Resource>(
    f: &mut Frame,
    sync: &ResourceState<T>,
    title: &str,
    empty_text: &str,
    is_focused: bool,
    area: Rect,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    if sync.list_loading {
        let loading = Paragraph::new(format!("Loading {}s...", sync.kind().noun()))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    if sync.items.is_empty() {
        let empty = Paragraph::new(empty_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = sync
        .items
        .iter()
        .map(|item| {
            let style = if sync.selected_id.as_deref() == Some(item.id()) {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            ListItem::new(item.list_label().to_string()).style(style)
        })
        .collect();

    let highlight_style = if is_focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style)
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(sync.cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn detail_placeholder(f: &mut Frame, text: &str, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let placeholder = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray).italic())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(placeholder, area);
}

// ============================================================================
// Collection detail
// ============================================================================

fn draw_collection_detail(f: &mut Frame, state: &RenderState, area: Rect) {
    if state.collections.detail_loading {
        detail_placeholder(f, "Loading collection...", area);
        return;
    }
    let Some(collection) = &state.collections.detail else {
        detail_placeholder(f, "Select a collection to view or edit.", area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    match &state.collection_edit {
        Some(edit) => draw_doc_edit(f, edit, " Edit Collection ", chunks[0]),
        None => {
            let lines = vec![
                Line::from(Span::styled(
                    collection.detail_title().to_string(),
                    Style::default().fg(Color::Cyan).bold(),
                )),
                Line::raw(""),
                Line::from(vec![
                    Span::styled("Description: ", Style::default().fg(Color::DarkGray)),
                    description_span(collection.description.as_deref()),
                ]),
                Line::from(vec![
                    Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
                    Span::raw(collection.id.clone()),
                ]),
            ];
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(detail_border(state))
                .title(" Collection (e:edit d:delete x:export) ");
            f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), chunks[0]);
        }
    }

    draw_collection_requests(f, state, chunks[1]);
}

fn draw_collection_requests(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Requests in this Collection ");

    if state.collection_requests.is_empty() {
        let empty = Paragraph::new("No requests found for this collection.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .collection_requests
        .iter()
        .map(|request| {
            let method = request.method.as_str();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{method:7}"),
                    Style::default().fg(method_color(method)).bold(),
                ),
                Span::raw(request.list_label().to_string()),
                Span::styled(
                    format!("  {}", request.url.raw),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// OpenAPI detail
// ============================================================================

fn draw_openapi_detail(f: &mut Frame, state: &RenderState, area: Rect) {
    if state.openapi.detail_loading {
        detail_placeholder(f, "Loading OpenAPI spec...", area);
        return;
    }
    let Some(spec) = &state.openapi.detail else {
        detail_placeholder(f, "Select an OpenAPI spec to view or edit.", area);
        return;
    };

    match &state.openapi_edit {
        Some(edit) => draw_doc_edit(f, edit, " Edit OpenAPI Spec ", area),
        None => {
            let mut lines = vec![
                Line::from(Span::styled(
                    spec.detail_title().to_string(),
                    Style::default().fg(Color::Cyan).bold(),
                )),
                Line::raw(""),
                Line::from(vec![
                    Span::styled("Description: ", Style::default().fg(Color::DarkGray)),
                    description_span(spec.description.as_deref()),
                ]),
            ];
            if let Some(version) = &spec.version {
                lines.push(Line::from(vec![
                    Span::styled("Version: ", Style::default().fg(Color::DarkGray)),
                    Span::raw(version.clone()),
                ]));
            }
            lines.push(Line::from(vec![
                Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
                Span::raw(spec.id.clone()),
            ]));

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(detail_border(state))
                .title(" OpenAPI Spec (e:edit d:delete x:export) ");
            f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
        }
    }
}

/// Shared name/description edit surface for collections and specs
fn draw_doc_edit(f: &mut Frame, edit: &DocEdit, title: &str, area: Rect) {
    let name_style = if edit.field == DocField::Name {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default()
    };
    let description_style = if edit.field == DocField::Description {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled("Name: ", Style::default().fg(Color::DarkGray)),
        Span::styled(edit.name.clone(), name_style),
    ])];
    lines.push(Line::from(Span::styled(
        "Description:",
        Style::default().fg(Color::DarkGray),
    )));
    for text_line in edit.description.split('\n') {
        lines.push(Line::from(Span::styled(
            text_line.to_string(),
            description_style,
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!("{title}(Tab:field Ctrl+S:save Esc:cancel) "));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

// ============================================================================
// Request detail
// ============================================================================

fn draw_request_detail(f: &mut Frame, state: &RenderState, area: Rect) {
    if state.requests.detail_loading {
        detail_placeholder(f, "Loading request...", area);
        return;
    }
    let Some(request) = &state.requests.detail else {
        detail_placeholder(f, "Select a request to view or edit.", area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Info
            Constraint::Length(1), // Section tabs
            Constraint::Min(3),    // Section content
        ])
        .split(area);

    draw_request_info(f, state, request, chunks[0]);

    let section_titles = [
        RequestSection::Payload.title(),
        RequestSection::Headers.title(),
        RequestSection::Params.title(),
    ];
    let selected = match state.request_edit.section {
        RequestSection::Payload => 0,
        RequestSection::Headers => 1,
        RequestSection::Params => 2,
    };
    f.render_widget(render_tabs(&section_titles, selected), chunks[1]);

    match state.request_edit.section {
        RequestSection::Payload => draw_payload_section(f, state, request, chunks[2]),
        RequestSection::Headers => draw_headers_section(f, state, request, chunks[2]),
        RequestSection::Params => draw_params_section(f, state, request, chunks[2]),
    }
}

fn draw_request_info(f: &mut Frame, state: &RenderState, request: &ApiRequest, area: Rect) {
    let method = request.method.as_str();
    let collection = request
        .collection_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or("none");
    let lines = vec![
        Line::from(Span::styled(
            request.detail_title().to_string(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
            Span::raw(request.id.clone()),
        ]),
        Line::from(vec![
            Span::styled("Collection: ", Style::default().fg(Color::DarkGray)),
            Span::raw(collection.to_string()),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{method} "),
                Style::default().fg(method_color(method)).bold(),
            ),
            Span::raw(if request.url.raw.is_empty() {
                "No URL".to_string()
            } else {
                request.url.raw.clone()
            }),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(detail_border(state))
        .title(" Request (↑/↓:section e:edit d:delete) ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_payload_section(f: &mut Frame, state: &RenderState, request: &ApiRequest, area: Rect) {
    let mode = request.body.mode().to_string();
    match &state.request_edit.payload {
        Some(BodyEditor::Raw { text }) => {
            let block = editing_block(" Payload (raw) (Ctrl+S:save Esc:cancel) ".to_string());
            f.render_widget(
                Paragraph::new(text.as_str()).block(block).wrap(Wrap { trim: false }),
                area,
            );
        }
        Some(BodyEditor::Form { kv, .. }) => {
            let block = editing_block(format!(
                " Payload ({mode}) (Ctrl+N:add Ctrl+D:del Ctrl+S:save) "
            ));
            draw_kv_editor(f, kv, true, block, area);
        }
        None => {
            let hint = if request.body.is_editable() {
                "e:edit"
            } else {
                "read-only"
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" Payload (mode: {mode}) ({hint}) "));
            match &request.body {
                BodyModel::Raw(text) if text.is_empty() => {
                    f.render_widget(
                        Paragraph::new("No payload")
                            .style(Style::default().fg(Color::DarkGray).italic())
                            .block(block),
                        area,
                    );
                }
                BodyModel::Raw(text) => {
                    f.render_widget(
                        Paragraph::new(text.as_str()).block(block).wrap(Wrap { trim: false }),
                        area,
                    );
                }
                body => {
                    // structural dump for list-shaped and unknown modes
                    let dump = serde_json::to_string_pretty(body)
                        .unwrap_or_else(|_| "<unrenderable body>".to_string());
                    f.render_widget(
                        Paragraph::new(highlight_json(&dump))
                            .block(block)
                            .wrap(Wrap { trim: false }),
                        area,
                    );
                }
            }
        }
    }
}

fn draw_headers_section(f: &mut Frame, state: &RenderState, request: &ApiRequest, area: Rect) {
    match &state.request_edit.headers {
        Some(kv) => {
            let block =
                editing_block(" Headers (Ctrl+N:add Ctrl+D:del Ctrl+S:save) ".to_string());
            draw_kv_editor(f, kv, true, block, area);
        }
        None => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" Headers (e:edit) ");
            let readonly = KvEditor::from_map(&request.headers);
            draw_kv_editor(f, &readonly, false, block, area);
        }
    }
}

fn draw_params_section(f: &mut Frame, state: &RenderState, request: &ApiRequest, area: Rect) {
    match &state.request_edit.params {
        Some(kv) => {
            let block =
                editing_block(" Params (Ctrl+N:add Ctrl+D:del Ctrl+S:save) ".to_string());
            draw_kv_editor(f, kv, true, block, area);
        }
        None => {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" Params (e:edit) ");
            let readonly = KvEditor::from_map(&request.params.params);
            draw_kv_editor(f, &readonly, false, block, area);
        }
    }
}

fn draw_kv_editor(f: &mut Frame, kv: &KvEditor, editing: bool, block: Block<'_>, area: Rect) {
    let items = kv_list_items(kv.rows(), kv.selected, kv.column, editing);
    f.render_widget(List::new(items).block(block), area);
}

fn editing_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title)
}

fn detail_border(state: &RenderState) -> Style {
    if state.focus == Panel::Detail {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn description_span(description: Option<&str>) -> Span<'static> {
    match description.filter(|d| !d.is_empty()) {
        Some(description) => Span::raw(description.to_string()),
        None => Span::styled(
            "No description".to_string(),
            Style::default().fg(Color::DarkGray).italic(),
        ),
    }
}

// ============================================================================
// Health tab
// ============================================================================

fn draw_health_tab(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" API Health Check (r:refresh) ");

    let mut lines: Vec<Line> = vec![Line::raw("")];
    if state.health.loading {
        lines.push(Line::from(Span::styled(
            "Checking API health...",
            Style::default().fg(Color::DarkGray),
        )));
    } else if let Some(error) = &state.health.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(Color::Red).bold(),
        )));
    } else if let Some(status) = &state.health.status {
        let text = if status == "ok" {
            "API is healthy".to_string()
        } else {
            format!("Status: {status}")
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(health_color(status)).bold(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press 'r' to check the backend.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(checked_at) = &state.health.checked_at {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("Last checked: {}", checked_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block).centered(), area);
}

// ============================================================================
// Status bar
// ============================================================================

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let (error, saving, importing, loading) = match state.active_tab {
        AppTab::Collections => (
            state.collections.error.as_deref(),
            state.collections.saving,
            state.collections.importing,
            state.collections.list_loading || state.collections.detail_loading,
        ),
        AppTab::Requests => (
            state.requests.error.as_deref(),
            state.requests.saving,
            state.requests.importing,
            state.requests.list_loading || state.requests.detail_loading,
        ),
        AppTab::OpenApi => (
            state.openapi.error.as_deref(),
            state.openapi.saving,
            state.openapi.importing,
            state.openapi.list_loading || state.openapi.detail_loading,
        ),
        AppTab::Health => (state.health.error.as_deref(), false, false, state.health.loading),
    };

    let bar = if let Some(error) = error {
        Paragraph::new(format!(" Error: {error} ")).style(Style::default().fg(Color::Red))
    } else if saving {
        Paragraph::new(" Saving... ").style(Style::default().fg(Color::Yellow))
    } else if importing {
        Paragraph::new(" Importing... ").style(Style::default().fg(Color::Yellow))
    } else if loading {
        Paragraph::new(" Loading... ").style(Style::default().fg(Color::DarkGray))
    } else if let Some(status) = &state.status {
        Paragraph::new(format!(" {status} ")).style(Style::default().fg(Color::Green))
    } else if state.editing {
        Paragraph::new(" Esc:cancel | Ctrl+S:save | Tab:field | Ctrl+N:add row | Ctrl+D:del row ")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(
            " 1-4:tabs | Tab:panel | Enter:select | e:edit | d:delete | r:reload | ?:help | q:quit ",
        )
        .style(Style::default().fg(Color::DarkGray))
    };

    f.render_widget(bar, area);
}

// ============================================================================
// Popups
// ============================================================================

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = r#"
 APIDESK - Keyboard Shortcuts

 NAVIGATION
   1-4                Switch tab
   Tab / Shift+Tab    Switch list/detail panel
   ↑ / ↓              Move in list / switch request section
   Enter              Select highlighted entry
   Esc                Clear selection

 RESOURCES
   r                  Reload list (refresh health on Health tab)
   e                  Edit detail / current section
   d                  Delete (asks for confirmation)
   n                  New request (Requests tab)
   c                  Clone request (Requests tab)
   i                  Import file (Collections / OpenAPI)
   x                  Show export URL (Collections / OpenAPI)

 EDITING
   Ctrl+S             Save
   Tab                Next field / key-value column
   Ctrl+N / Ctrl+D    Add / delete key-value row
   Esc                Cancel without saving

 GENERAL
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, area: Rect, noun: &str, label: &str) {
    let popup_area = centered_rect(50, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Confirm Delete ")
        .style(Style::default().bg(Color::Black));

    let text = vec![
        Line::raw(""),
        Line::from(format!("Delete {noun} '{label}'?")),
        Line::raw(""),
        Line::from(Span::styled(
            "y: delete    n/Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(text).block(block).centered(), popup_area);
}

fn draw_prompt_popup(f: &mut Frame, area: Rect, title: &str, placeholder: &str, input: &str) {
    let popup_area = centered_rect(60, 18, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title.to_string())
        .style(Style::default().bg(Color::Black));

    let content = if input.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input.to_string())
    };

    f.render_widget(Clear, popup_area);
    f.render_widget(
        Paragraph::new(Line::from(content)).block(block).wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn draw_create_form(f: &mut Frame, state: &RenderState, form: &CreateForm, area: Rect) {
    let popup_area = centered_rect(70, 80, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Create New Request (Enter:create Esc:cancel Ctrl+A:advanced) ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    f.render_widget(Clear, popup_area);
    f.render_widget(block, popup_area);

    let collection_label = form
        .collection_index
        .and_then(|i| state.collections.items.get(i))
        .map(|c| c.list_label().to_string())
        .unwrap_or_else(|| "(None)".to_string());

    let mut lines = vec![
        form_line("Name", &form.name, form.field == CreateField::Name, false),
        form_line(
            "Method",
            form.method.as_str(),
            form.field == CreateField::Method,
            true,
        ),
        form_line("URL", &form.url, form.field == CreateField::Url, false),
        form_line(
            "Collection",
            &collection_label,
            form.field == CreateField::Collection,
            true,
        ),
    ];

    if form.show_advanced {
        lines.push(Line::raw(""));
        lines.push(form_line(
            "Payload",
            &form.payload,
            form.field == CreateField::Payload,
            false,
        ));
        lines.push(section_header("Headers", form.field == CreateField::Headers));
        lines.extend(kv_form_lines(&form.headers, form.field == CreateField::Headers));
        lines.push(section_header("Params", form.field == CreateField::Params));
        lines.extend(kv_form_lines(&form.params, form.field == CreateField::Params));
    } else {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Ctrl+A: show advanced (payload, headers, params)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn form_line<'a>(label: &'a str, value: &'a str, focused: bool, cycles: bool) -> Line<'a> {
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{label:11}"), label_style),
        Span::raw(value),
    ];
    if focused && cycles {
        spans.push(Span::styled(
            "  (←/→ to change)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn section_header(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!("{label}:"), style))
}

fn kv_form_lines(kv: &KvEditor, focused: bool) -> Vec<Line<'static>> {
    kv.rows()
        .iter()
        .enumerate()
        .map(|(i, row)| ui::kv_row_line(row, focused && i == kv.selected, kv.column))
        .collect()
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
