use super::super::messages::Message;
use super::super::state::{App, Screen};
use iced::keyboard::key::Named;
use iced::keyboard::{Key, Modifiers};

impl App {
    /// Keyboard shortcuts for the reader and the search dropdown. Events
    /// captured by focused widgets never reach this (the runtime filter
    /// drops them), so typing in a text field is unaffected.
    pub(super) fn shortcut_message_for_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
    ) -> Option<Message> {
        if modifiers.command() || modifiers.alt() {
            return None;
        }

        if self.search.open {
            match key.as_ref() {
                Key::Named(Named::ArrowDown) => {
                    self.search.move_active(true);
                    return None;
                }
                Key::Named(Named::ArrowUp) => {
                    self.search.move_active(false);
                    return None;
                }
                Key::Named(Named::Enter) => return Some(Message::SearchSubmitted),
                Key::Named(Named::Escape) => return Some(Message::CloseSearch),
                _ => {}
            }
        }

        if self.screen != Screen::Reader || !self.chapter_open() {
            return None;
        }
        match key.as_ref() {
            Key::Named(Named::Space) => Some(Message::TogglePlayPause),
            Key::Named(Named::ArrowRight) => Some(Message::SkipForward),
            Key::Named(Named::ArrowLeft) => Some(Message::SkipBackward),
            _ => None,
        }
    }
}
