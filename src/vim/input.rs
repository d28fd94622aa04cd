/// Single-line edit buffer with a char-indexed cursor
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer pre-filled with `value`, cursor at the end
    pub fn with_content(value: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set(value);
        buffer
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    /// Text before and after the cursor, for rendering a caret
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.content.split_at(self.cursor_byte_position())
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = self.cursor_byte_position();
        self.content.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        self.remove_at_cursor();
        true
    }

    /// Ctrl+W: drop trailing spaces, then the word before the cursor.
    pub fn delete_word_back(&mut self) {
        while self.cursor > 0 && self.char_before_cursor() == Some(' ') {
            self.delete_back();
        }
        while self.cursor > 0 && self.char_before_cursor().is_some_and(|c| c != ' ') {
            self.delete_back();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, value: &str) {
        self.content = value.to_string();
        self.cursor = self.len();
    }

    fn char_before_cursor(&self) -> Option<char> {
        self.content.chars().nth(self.cursor.checked_sub(1)?)
    }

    fn remove_at_cursor(&mut self) {
        let byte_pos = self.cursor_byte_position();
        if let Some(c) = self.content[byte_pos..].chars().next() {
            self.content.drain(byte_pos..byte_pos + c.len_utf8());
        }
    }

    fn cursor_byte_position(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}
