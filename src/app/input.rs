use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::model::Mode;
use crate::app::{App, Message, Model};
use crate::document::CursorMove;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model, now_ms: u64) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Self::handle_key(*key, model, now_ms)
            }
            Event::Resize(w, h) => Some(Message::Resize(*w, *h)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model, now_ms: u64) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q' | '?') => {
                    Some(Message::HideHelp)
                }
                _ => None,
            };
        }

        match model.mode {
            Mode::ConfirmClear => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Message::ConfirmClear(true)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Message::ConfirmClear(false)),
                _ => None,
            },
            mode if mode.is_prompt() => match key.code {
                KeyCode::Enter => Some(Message::PromptSubmit),
                KeyCode::Esc => Some(Message::PromptCancel),
                KeyCode::Backspace => Some(Message::PromptBackspace),
                KeyCode::Char(c) if !ctrl => Some(Message::PromptInput(c)),
                _ => None,
            },
            _ => Self::handle_editing_key(key, ctrl, now_ms),
        }
    }

    fn handle_editing_key(key: KeyEvent, ctrl: bool, now_ms: u64) -> Option<Message> {
        if ctrl {
            return match key.code {
                KeyCode::Char('s') => Some(Message::Save),
                KeyCode::Char('o') => Some(Message::StartOpen),
                KeyCode::Char('l') => Some(Message::StartClear),
                KeyCode::Char('b') => Some(Message::StartInsertButton),
                KeyCode::Char('w') => Some(Message::ToggleWatch),
                KeyCode::Char('q') => Some(Message::Quit),
                _ => None,
            };
        }
        if key.modifiers.contains(KeyModifiers::ALT) {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => Some(Message::InsertChar(c, now_ms)),
            KeyCode::Enter => Some(Message::InsertParagraph(now_ms)),
            KeyCode::Backspace => Some(Message::DeleteBack(now_ms)),
            KeyCode::Left => Some(Message::MoveCursor(CursorMove::Left)),
            KeyCode::Right => Some(Message::MoveCursor(CursorMove::Right)),
            KeyCode::Up => Some(Message::MoveCursor(CursorMove::Up)),
            KeyCode::Down => Some(Message::MoveCursor(CursorMove::Down)),
            KeyCode::Home => Some(Message::MoveCursor(CursorMove::Home)),
            KeyCode::End => Some(Message::MoveCursor(CursorMove::End)),
            KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::F(2) => Some(Message::StartRename),
            _ => None,
        }
    }
}
