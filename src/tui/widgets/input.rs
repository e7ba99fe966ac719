use crossterm::event::{KeyCode, KeyEvent};

/// Minimal single-line text input with a cursor, used by the search box and
/// the section modal. Cursor positions are char offsets, not byte offsets.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    value: String,
    cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            cursor: value.chars().count(),
            value: value.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply a key event. Returns true if the event edited or moved anything
    /// (so callers can skip further handling for consumed keys).
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                let byte_idx = self.byte_index(self.cursor);
                self.value.insert(byte_idx, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let byte_idx = self.byte_index(self.cursor - 1);
                    self.value.remove(byte_idx);
                    self.cursor -= 1;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let byte_idx = self.byte_index(self.cursor);
                    self.value.remove(byte_idx);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                true
            }
            _ => false,
        }
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut input = InputField::new();
        input.handle_key(key(KeyCode::Char('f')));
        input.handle_key(key(KeyCode::Char('e')));
        input.handle_key(key(KeyCode::Char('r')));
        input.handle_key(key(KeyCode::Char('n')));
        assert_eq!(input.as_str(), "fern");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.as_str(), "fer");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_insert_mid_string() {
        let mut input = InputField::with_value("frn");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Char('e')));
        assert_eq!(input.as_str(), "fern");
    }

    #[test]
    fn test_multibyte_chars() {
        let mut input = InputField::new();
        input.handle_key(key(KeyCode::Char('🌿')));
        input.handle_key(key(KeyCode::Char('a')));
        assert_eq!(input.as_str(), "🌿a");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.as_str(), "a");
    }
}
