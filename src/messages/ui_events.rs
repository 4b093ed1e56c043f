//! UI events - messages from the UI layer to the App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application tabs, one per entity kind plus the health check
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AppTab {
    #[default]
    Collections,
    Requests,
    OpenApi,
    Health,
}

impl AppTab {
    pub fn title(&self) -> &'static str {
        match self {
            AppTab::Collections => "Collections",
            AppTab::Requests => "Requests",
            AppTab::OpenApi => "OpenAPI Specs",
            AppTab::Health => "Health",
        }
    }
}

/// Focused panel inside a resource tab
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Panel {
    #[default]
    List,
    Detail,
}

impl Panel {
    pub fn toggle(&self) -> Panel {
        match self {
            Panel::List => Panel::Detail,
            Panel::Detail => Panel::List,
        }
    }
}

/// Coarse modal shape, enough for context-aware key mapping
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModalKind {
    Help,
    Confirm,
    Prompt,
    Form,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Tab navigation
    SwitchTab(AppTab),

    // Panel navigation
    FocusNext,
    FocusPrev,
    NavUp,
    NavDown,
    NavLeft,
    NavRight,

    /// Enter in normal mode: select a list row or start editing the detail
    Activate,
    ClearSelection,
    ReloadList,
    RefreshHealth,

    // Inline editing
    StartEdit,
    CancelEdit,
    SaveEdit,
    CharInput(char),
    Backspace,
    NextField,
    PrevField,

    // Key-value editor rows
    KvAddRow,
    KvRemoveRow,

    // Create-request form
    OpenCreateForm,
    FormToggleAdvanced,
    SubmitForm,

    // Resource operations
    RequestDelete,
    RequestClone,
    RequestImport,
    ExportSelected,

    // Modals
    ConfirmModal,
    CancelModal,
    ToggleHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    active_tab: AppTab,
    modal: Option<ModalKind>,
    editing: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('s') if modal.is_none() && editing => return Some(UiEvent::SaveEdit),
            _ => {}
        }
    }

    if let Some(kind) = modal {
        return handle_modal_keys(key, kind);
    }

    if editing {
        return handle_editing_keys(key);
    }

    handle_normal_keys(key, active_tab)
}

/// Keys while a modal is open
fn handle_modal_keys(key: KeyEvent, kind: ModalKind) -> Option<UiEvent> {
    match kind {
        ModalKind::Help => Some(UiEvent::CancelModal),
        ModalKind::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::ConfirmModal),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelModal),
            _ => None,
        },
        ModalKind::Prompt => match key.code {
            KeyCode::Esc => Some(UiEvent::CancelModal),
            KeyCode::Enter => Some(UiEvent::ConfirmModal),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        },
        ModalKind::Form => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return match key.code {
                    KeyCode::Char('a') => Some(UiEvent::FormToggleAdvanced),
                    KeyCode::Char('n') => Some(UiEvent::KvAddRow),
                    KeyCode::Char('d') => Some(UiEvent::KvRemoveRow),
                    _ => None,
                };
            }
            match key.code {
                KeyCode::Esc => Some(UiEvent::CancelModal),
                KeyCode::Enter => Some(UiEvent::SubmitForm),
                KeyCode::Tab => Some(UiEvent::NextField),
                KeyCode::BackTab => Some(UiEvent::PrevField),
                KeyCode::Up => Some(UiEvent::NavUp),
                KeyCode::Down => Some(UiEvent::NavDown),
                KeyCode::Left => Some(UiEvent::NavLeft),
                KeyCode::Right => Some(UiEvent::NavRight),
                KeyCode::Backspace => Some(UiEvent::Backspace),
                KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
                _ => None,
            }
        }
    }
}

/// Keys while an inline edit buffer is active
fn handle_editing_keys(key: KeyEvent) -> Option<UiEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('n') => Some(UiEvent::KvAddRow),
            KeyCode::Char('d') => Some(UiEvent::KvRemoveRow),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Esc => Some(UiEvent::CancelEdit),
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Up => Some(UiEvent::NavUp),
        KeyCode::Down => Some(UiEvent::NavDown),
        KeyCode::Left => Some(UiEvent::NavLeft),
        KeyCode::Right => Some(UiEvent::NavRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Enter => Some(UiEvent::CharInput('\n')),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

/// Keys in normal (non-editing) mode
fn handle_normal_keys(key: KeyEvent, active_tab: AppTab) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('1') => Some(UiEvent::SwitchTab(AppTab::Collections)),
        KeyCode::Char('2') => Some(UiEvent::SwitchTab(AppTab::Requests)),
        KeyCode::Char('3') => Some(UiEvent::SwitchTab(AppTab::OpenApi)),
        KeyCode::Char('4') => Some(UiEvent::SwitchTab(AppTab::Health)),
        KeyCode::Tab => Some(UiEvent::FocusNext),
        KeyCode::BackTab => Some(UiEvent::FocusPrev),
        KeyCode::Up => Some(UiEvent::NavUp),
        KeyCode::Down => Some(UiEvent::NavDown),
        KeyCode::Enter => Some(UiEvent::Activate),
        KeyCode::Esc => Some(UiEvent::ClearSelection),
        KeyCode::Char('r') if active_tab == AppTab::Health => Some(UiEvent::RefreshHealth),
        KeyCode::Char('r') => Some(UiEvent::ReloadList),
        KeyCode::Char('e') => Some(UiEvent::StartEdit),
        KeyCode::Char('d') if active_tab != AppTab::Health => Some(UiEvent::RequestDelete),
        KeyCode::Char('n') if active_tab == AppTab::Requests => Some(UiEvent::OpenCreateForm),
        KeyCode::Char('c') if active_tab == AppTab::Requests => Some(UiEvent::RequestClone),
        KeyCode::Char('i') if matches!(active_tab, AppTab::Collections | AppTab::OpenApi) => {
            Some(UiEvent::RequestImport)
        }
        KeyCode::Char('x') if matches!(active_tab, AppTab::Collections | AppTab::OpenApi) => {
            Some(UiEvent::ExportSelected)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn confirm_modal_only_accepts_yes_no() {
        let confirm = Some(ModalKind::Confirm);
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('y')), AppTab::Collections, confirm, false),
            Some(UiEvent::ConfirmModal)
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Esc), AppTab::Collections, confirm, false),
            Some(UiEvent::CancelModal)
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('z')), AppTab::Collections, confirm, false),
            None
        );
    }

    #[test]
    fn prompt_modal_captures_text() {
        let prompt = Some(ModalKind::Prompt);
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('d')), AppTab::Requests, prompt, false),
            Some(UiEvent::CharInput('d'))
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Enter), AppTab::Requests, prompt, false),
            Some(UiEvent::ConfirmModal)
        );
    }

    #[test]
    fn editing_mode_routes_chars_to_the_buffer() {
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('d')), AppTab::Requests, None, true),
            Some(UiEvent::CharInput('d'))
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Esc), AppTab::Requests, None, true),
            Some(UiEvent::CancelEdit)
        );
    }

    #[test]
    fn import_and_clone_are_tab_scoped() {
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('i')), AppTab::Requests, None, false),
            None
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('c')), AppTab::Collections, None, false),
            None
        );
        assert_eq!(
            key_to_ui_event(press(KeyCode::Char('i')), AppTab::OpenApi, None, false),
            Some(UiEvent::RequestImport)
        );
    }
}
