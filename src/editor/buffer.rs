use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars.
    pub col: usize,
    /// Sticky column for vertical movement.
    col_memory: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rope-backed markdown text with a cursor.
///
/// Every mutation bumps [`EditorBuffer::revision`], which the app uses to
/// decide whether a render needs scheduling.
#[derive(Clone)]
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    revision: u64,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
            revision: 0,
        }
    }

    /// Replace the whole text and move the cursor to the start.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = Cursor::default();
        self.bump();
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Monotonic edit counter.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Line length in chars, without the trailing newline.
    pub fn line_len(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(line_idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        len
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.split_line();
            return;
        }
        self.rope.insert_char(self.cursor_char_idx(), ch);
        self.cursor.set_col(self.cursor.col + 1);
        self.bump();
    }

    /// Insert text at the cursor and move past it. Carriage returns are dropped.
    pub fn insert_str(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        if normalized.is_empty() {
            return;
        }
        self.rope.insert(self.cursor_char_idx(), &normalized);

        let mut parts = normalized.split('\n');
        let first = parts.next().unwrap_or_default();
        let mut added_lines = 0;
        let mut last = first;
        for part in parts {
            added_lines += 1;
            last = part;
        }
        if added_lines == 0 {
            self.cursor.set_col(self.cursor.col + first.chars().count());
        } else {
            self.cursor.line += added_lines;
            self.cursor.set_col(last.chars().count());
        }
        self.bump();
    }

    /// Enter key.
    pub fn split_line(&mut self) {
        self.rope.insert_char(self.cursor_char_idx(), '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        self.bump();
    }

    /// Backspace. Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }
        let char_idx = self.cursor_char_idx();
        if self.cursor.col == 0 {
            let prev_len = self.line_len(self.cursor.line - 1);
            let line_start = self.rope.line_to_char(self.cursor.line);
            let prev_content_end = self.rope.line_to_char(self.cursor.line - 1) + prev_len;
            self.rope.remove(prev_content_end..line_start);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_len);
        } else {
            self.rope.remove(char_idx - 1..char_idx);
            self.cursor.set_col(self.cursor.col - 1);
        }
        self.bump();
        true
    }

    /// Delete key. Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        let char_idx = self.cursor_char_idx();
        if self.cursor.col < line_len {
            self.rope.remove(char_idx..=char_idx);
        } else if self.cursor.line + 1 < self.line_count() {
            let next_start = self.rope.line_to_char(self.cursor.line + 1);
            self.rope.remove(char_idx..next_start);
        } else {
            return false;
        }
        self.bump();
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_vertical(-1),
            Direction::Down => self.move_vertical(1),
        }
    }

    /// Move up or down by `delta` lines, keeping the sticky column.
    pub fn move_vertical(&mut self, delta: isize) {
        let last = self.line_count().saturating_sub(1);
        let target = self.cursor.line.saturating_add_signed(delta).min(last);
        if target == self.cursor.line {
            return;
        }
        self.cursor.line = target;
        self.cursor.col = self.cursor.col_memory.min(self.line_len(target));
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Ctrl+Left.
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }
        let chars = self.line_chars(self.cursor.line);
        let mut col = self.cursor.col.min(chars.len());
        while col > 0 && !is_word_char(chars[col - 1]) {
            col -= 1;
        }
        while col > 0 && is_word_char(chars[col - 1]) {
            col -= 1;
        }
        self.cursor.set_col(col);
    }

    /// Ctrl+Right.
    pub fn move_word_right(&mut self) {
        let chars = self.line_chars(self.cursor.line);
        if self.cursor.col >= chars.len() {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }
        let mut col = self.cursor.col;
        while col < chars.len() && is_word_char(chars[col]) {
            col += 1;
        }
        while col < chars.len() && !is_word_char(chars[col]) {
            col += 1;
        }
        self.cursor.set_col(col);
    }

    /// Move to a line and char column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        self.cursor.set_col(col.min(self.line_len(self.cursor.line)));
    }

    /// Move to a line and on-screen column, accounting for wide chars.
    pub fn move_to_display_col(&mut self, line: usize, display_col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let mut width = 0;
        let mut col = 0;
        for ch in self.line_chars(line) {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > display_col {
                break;
            }
            width += ch_width;
            col += 1;
        }
        self.move_to(line, col);
    }

    /// On-screen column of the cursor within its line.
    pub fn cursor_display_col(&self) -> usize {
        self.line_chars(self.cursor.line)
            .into_iter()
            .take(self.cursor.col)
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }

    fn line_chars(&self, line_idx: usize) -> Vec<char> {
        if line_idx >= self.rope.len_lines() {
            return Vec::new();
        }
        self.rope
            .line(line_idx)
            .chars()
            .take(self.line_len(line_idx))
            .collect()
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.set_col(self.cursor.col - 1);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col < self.line_len(self.cursor.line) {
            self.cursor.set_col(self.cursor.col + 1);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::default();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
    }

    #[test]
    fn test_from_text_trailing_newline() {
        let buf = EditorBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some(String::new()));
        assert_eq!(buf.line_at(2), None);
    }

    #[test]
    fn test_line_len_counts_chars() {
        let buf = EditorBuffer::from_text("héllo\r\nhi");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line_len(1), 2);
    }

    #[test]
    fn test_edits_bump_revision() {
        let mut buf = EditorBuffer::from_text("a");
        assert_eq!(buf.revision(), 0);
        buf.insert_char('b');
        buf.delete_back();
        assert_eq!(buf.revision(), 2);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.revision(), 2);
    }

    #[test]
    fn test_noop_delete_keeps_revision() {
        let mut buf = EditorBuffer::from_text("a");
        assert!(!buf.delete_back());
        buf.move_end();
        assert!(!buf.delete_forward());
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_set_text_replaces_and_resets_cursor() {
        let mut buf = EditorBuffer::from_text("old\ntext");
        buf.move_to_end();
        buf.set_text("new");
        assert_eq!(buf.text(), "new");
        assert_eq!(buf.cursor(), Cursor::default());
        assert_eq!(buf.revision(), 1);
    }

    #[test]
    fn test_insert_char_in_middle() {
        let mut buf = EditorBuffer::from_text("ac");
        buf.move_to(0, 1);
        buf.insert_char('b');
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor().col, 2);
    }

    #[test]
    fn test_insert_multibyte_then_backspace() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_char('é');
        buf.insert_char('日');
        assert_eq!(buf.text(), "aé日b");
        assert_eq!(buf.cursor().col, 3);
        buf.delete_back();
        assert_eq!(buf.text(), "aéb");
        assert_eq!(buf.cursor().col, 2);
    }

    #[test]
    fn test_insert_str_multiline_moves_cursor() {
        let mut buf = EditorBuffer::from_text("xy");
        buf.move_to(0, 1);
        buf.insert_str("one\r\ntwo\nthr");
        assert_eq!(buf.text(), "xone\ntwo\nthry");
        assert_eq!(buf.cursor().line, 2);
        assert_eq!(buf.cursor().col, 3);
    }

    #[test]
    fn test_insert_str_empty_is_noop() {
        let mut buf = EditorBuffer::from_text("x");
        buf.insert_str("");
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(0, 2);
        buf.split_line();
        assert_eq!(buf.text(), "he\nllo");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_joins_crlf_lines() {
        let mut buf = EditorBuffer::from_text("ab\r\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(0, 2);
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_move_left_and_right_wrap_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_move_vertical_clamps_to_buffer() {
        let mut buf = EditorBuffer::from_text("a\nb\nc");
        buf.move_vertical(10);
        assert_eq!(buf.cursor().line, 2);
        buf.move_vertical(-10);
        assert_eq!(buf.cursor().line, 0);
    }

    #[test]
    fn test_word_movement() {
        let mut buf = EditorBuffer::from_text("hello big world");
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 6);
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 10);
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 6);
        buf.move_home();
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 0);
    }

    #[test]
    fn test_display_col_accounts_for_wide_chars() {
        let mut buf = EditorBuffer::from_text("日本x");
        buf.move_to_display_col(0, 4);
        assert_eq!(buf.cursor().col, 2);
        assert_eq!(buf.cursor_display_col(), 4);
        buf.move_to_display_col(0, 3);
        assert_eq!(buf.cursor().col, 1);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = EditorBuffer::from_text("hi\nthere");
        buf.move_to(9, 99);
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
    }

    #[test]
    fn test_move_to_start_and_end() {
        let mut buf = EditorBuffer::from_text("one\ntwo");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 3));
        buf.move_to_start();
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }
}
