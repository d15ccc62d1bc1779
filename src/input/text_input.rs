use crate::terminal::{KeyCode, KeyModifiers};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    Handled,
    NotHandled,
    Submit,
}

/// Cursor and editing rules for one form field. The text itself lives in
/// `FormFields`; every edit goes through a `&mut String` borrowed from there.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    cursor_pos: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    pub fn reset(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_end(&mut self, value: &str) {
        self.cursor_pos = value.chars().count();
    }

    pub fn handle_key(
        &mut self,
        value: &mut String,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> KeyResult {
        self.clamp(value);
        match code {
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(value, ch);
                KeyResult::Handled
            }
            KeyCode::Char('w') => {
                self.delete_word(value);
                KeyResult::Handled
            }
            KeyCode::Backspace => {
                if modifiers.contains(KeyModifiers::CONTROL) {
                    self.delete_word(value);
                } else {
                    self.backspace(value);
                }
                KeyResult::Handled
            }
            KeyCode::Delete => {
                self.delete_forward(value);
                KeyResult::Handled
            }
            KeyCode::Left => {
                if modifiers.contains(KeyModifiers::CONTROL) {
                    self.move_word_left(value);
                } else {
                    self.cursor_pos = self.cursor_pos.saturating_sub(1);
                }
                KeyResult::Handled
            }
            KeyCode::Right => {
                if modifiers.contains(KeyModifiers::CONTROL) {
                    self.move_word_right(value);
                } else if self.cursor_pos < value.chars().count() {
                    self.cursor_pos += 1;
                }
                KeyResult::Handled
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                KeyResult::Handled
            }
            KeyCode::End => {
                self.move_end(value);
                KeyResult::Handled
            }
            KeyCode::Enter => KeyResult::Submit,
            _ => KeyResult::NotHandled,
        }
    }

    /// Display columns between the start of the value and the cursor.
    pub fn cursor_offset(&self, value: &str) -> usize {
        value
            .chars()
            .take(self.cursor_pos)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn clamp(&mut self, value: &str) {
        let len = value.chars().count();
        if self.cursor_pos > len {
            self.cursor_pos = len;
        }
    }

    fn byte_index(value: &str, char_pos: usize) -> usize {
        value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(value.len())
    }

    fn insert_char(&mut self, value: &mut String, ch: char) {
        let byte_pos = Self::byte_index(value, self.cursor_pos);
        value.insert(byte_pos, ch);
        self.cursor_pos += 1;
    }

    fn backspace(&mut self, value: &mut String) {
        if self.cursor_pos == 0 {
            return;
        }
        let byte_pos = Self::byte_index(value, self.cursor_pos - 1);
        value.remove(byte_pos);
        self.cursor_pos -= 1;
    }

    fn delete_forward(&mut self, value: &mut String) {
        if self.cursor_pos >= value.chars().count() {
            return;
        }
        let byte_pos = Self::byte_index(value, self.cursor_pos);
        value.remove(byte_pos);
    }

    fn is_separator(ch: char) -> bool {
        ch.is_whitespace() || matches!(ch, '.' | '/' | ',' | '-' | '@' | '(' | ')')
    }

    fn word_start_before(chars: &[char], mut pos: usize) -> usize {
        while pos > 0 && Self::is_separator(chars[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && !Self::is_separator(chars[pos - 1]) {
            pos -= 1;
        }
        pos
    }

    fn move_word_left(&mut self, value: &str) {
        let chars: Vec<char> = value.chars().collect();
        self.cursor_pos = Self::word_start_before(&chars, self.cursor_pos);
    }

    fn move_word_right(&mut self, value: &str) {
        let chars: Vec<char> = value.chars().collect();
        let mut pos = self.cursor_pos;
        while pos < chars.len() && Self::is_separator(chars[pos]) {
            pos += 1;
        }
        while pos < chars.len() && !Self::is_separator(chars[pos]) {
            pos += 1;
        }
        self.cursor_pos = pos;
    }

    fn delete_word(&mut self, value: &mut String) {
        if self.cursor_pos == 0 {
            return;
        }
        let mut chars: Vec<char> = value.chars().collect();
        let start = Self::word_start_before(&chars, self.cursor_pos);
        chars.drain(start..self.cursor_pos);
        *value = chars.into_iter().collect();
        self.cursor_pos = start;
    }
}
