//! Single-line search field

use crossterm::event::{KeyCode, KeyModifiers};

/// What a key did to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChange {
    /// Text changed; suggestions need recomputing
    Edited,
    /// Only the cursor moved
    Moved,
    /// Key was not for the field
    Ignored,
}

/// Move names are hyphenated, so `-` separates words as well as whitespace
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || c == '-'
}

/// Text plus a byte-offset cursor that always sits on a char boundary
#[derive(Debug, Default, Clone)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole text and put the cursor at the end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    fn prev_char(&self, at: usize) -> usize {
        self.text[..at]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_char(&self, at: usize) -> usize {
        self.text[at..]
            .chars()
            .next()
            .map(|c| at + c.len_utf8())
            .unwrap_or(self.text.len())
    }

    /// Start of the word before `at`, skipping boundary chars first
    fn prev_word(&self, at: usize) -> usize {
        let mut pos = at;
        while pos > 0 && self.text[self.prev_char(pos)..].starts_with(is_word_boundary) {
            pos = self.prev_char(pos);
        }
        while pos > 0 && !self.text[self.prev_char(pos)..].starts_with(is_word_boundary) {
            pos = self.prev_char(pos);
        }
        pos
    }

    /// End of the word after `at`, skipping boundary chars first
    fn next_word(&self, at: usize) -> usize {
        let len = self.text.len();
        let mut pos = at;
        while pos < len && self.text[pos..].starts_with(is_word_boundary) {
            pos = self.next_char(pos);
        }
        while pos < len && !self.text[pos..].starts_with(is_word_boundary) {
            pos = self.next_char(pos);
        }
        pos
    }

    fn insert(&mut self, c: char) -> InputChange {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        InputChange::Edited
    }

    fn delete_range(&mut self, start: usize, end: usize) -> InputChange {
        if start == end {
            return InputChange::Moved;
        }
        self.text.drain(start..end);
        self.cursor = start;
        InputChange::Edited
    }

    fn move_to(&mut self, pos: usize) -> InputChange {
        self.cursor = pos;
        InputChange::Moved
    }

    /// Handle a key event
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> InputChange {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        // macOS Option may report as SUPER
        let alt = modifiers.contains(KeyModifiers::ALT) || modifiers.contains(KeyModifiers::SUPER);

        match code {
            KeyCode::Char('u') if ctrl => self.delete_range(0, self.cursor),
            KeyCode::Char('w') if ctrl => self.delete_range(self.prev_word(self.cursor), self.cursor),
            KeyCode::Backspace if alt => self.delete_range(self.prev_word(self.cursor), self.cursor),
            KeyCode::Char('a') if ctrl => self.move_to(0),
            KeyCode::Char('e') if ctrl => self.move_to(self.text.len()),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.text.len()),
            KeyCode::Char('b') if alt => self.move_to(self.prev_word(self.cursor)),
            KeyCode::Char('f') if alt => self.move_to(self.next_word(self.cursor)),
            KeyCode::Left if alt || ctrl => self.move_to(self.prev_word(self.cursor)),
            KeyCode::Right if alt || ctrl => self.move_to(self.next_word(self.cursor)),
            KeyCode::Left => self.move_to(self.prev_char(self.cursor)),
            KeyCode::Right => self.move_to(self.next_char(self.cursor)),
            KeyCode::Backspace => self.delete_range(self.prev_char(self.cursor), self.cursor),
            KeyCode::Delete => self.delete_range(self.cursor, self.next_char(self.cursor)),
            KeyCode::Char(c) if !ctrl && !alt => self.insert(c),
            _ => InputChange::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new();
        for c in s.chars() {
            input.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        input
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("thunx");
        assert_eq!(
            input.handle_key(KeyCode::Backspace, KeyModifiers::NONE),
            InputChange::Edited
        );
        assert_eq!(input.text, "thun");
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn test_backspace_at_start_is_not_an_edit() {
        let mut input = TextInput::new();
        assert_eq!(
            input.handle_key(KeyCode::Backspace, KeyModifiers::NONE),
            InputChange::Moved
        );
    }

    #[test]
    fn test_ctrl_w_deletes_hyphenated_word() {
        let mut input = typed("thunder-punch");
        input.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(input.text, "thunder-");
        input.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(input.text, "");
    }

    #[test]
    fn test_word_motion() {
        let mut input = typed("fire-fang");
        input.handle_key(KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(input.cursor, 5);
        input.handle_key(KeyCode::Home, KeyModifiers::NONE);
        input.handle_key(KeyCode::Char('f'), KeyModifiers::ALT);
        assert_eq!(input.cursor, 4);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = typed("é-x");
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(input.cursor, 0);
        input.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.text, "-x");
    }

    #[test]
    fn test_ctrl_u_and_unhandled() {
        let mut input = typed("surf");
        assert_eq!(
            input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL),
            InputChange::Edited
        );
        assert!(input.text.is_empty());
        assert_eq!(
            input.handle_key(KeyCode::F(1), KeyModifiers::NONE),
            InputChange::Ignored
        );
    }
}
