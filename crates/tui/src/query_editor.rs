use crate::ansi::{slice_runes, truncate_visible};
use crate::keys::Key;
use crate::theme::{paint, Palette};

const PLACEHOLDER: &str = "Write your SQL here...";
const GUTTER_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Submit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEditor {
    lines: Vec<String>,
    row: usize,
    column: usize,
    focused: bool,
}

impl Default for QueryEditor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            column: 0,
            focused: false,
        }
    }
}

impl QueryEditor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    #[must_use]
    pub fn value(&self) -> String {
        self.lines.join("\n")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    pub fn set_value(&mut self, value: &str) {
        self.lines = value.split('\n').map(str::to_string).collect();
        self.row = self.lines.len() - 1;
        self.column = self.current_len();
    }

    #[must_use]
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    pub fn handle_key(&mut self, key: Key) -> Option<EditorAction> {
        if !self.focused {
            return match key {
                Key::Enter if !self.value().trim().is_empty() => {
                    Some(EditorAction::Submit(self.value()))
                }
                _ => None,
            };
        }

        match key {
            Key::Esc => self.blur(),
            Key::Enter => self.insert_newline(),
            Key::Char(ch) => self.insert_char(ch),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.move_left(),
            Key::Right => self.move_right(),
            Key::Up => self.move_vertically(-1),
            Key::Down => self.move_vertically(1),
            Key::Home => self.column = 0,
            Key::End => self.column = self.current_len(),
            Key::Tab | Key::BackTab | Key::CtrlC => {}
        }
        None
    }

    fn current_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    fn byte_offset(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.column)
            .map_or(line.len(), |(offset, _)| offset)
    }

    fn insert_char(&mut self, ch: char) {
        let offset = self.byte_offset();
        self.lines[self.row].insert(offset, ch);
        self.column += 1;
    }

    fn insert_newline(&mut self) {
        let offset = self.byte_offset();
        let tail = self.lines[self.row].split_off(offset);
        self.row += 1;
        self.lines.insert(self.row, tail);
        self.column = 0;
    }

    fn backspace(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            let offset = self.byte_offset();
            self.lines[self.row].remove(offset);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.column = self.current_len();
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete(&mut self) {
        if self.column < self.current_len() {
            let offset = self.byte_offset();
            self.lines[self.row].remove(offset);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn move_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.column = self.current_len();
        }
    }

    fn move_right(&mut self) {
        if self.column < self.current_len() {
            self.column += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.column = 0;
        }
    }

    fn move_vertically(&mut self, delta: isize) {
        let Some(row) = self.row.checked_add_signed(delta) else {
            return;
        };
        if row < self.lines.len() {
            self.row = row;
            self.column = self.column.min(self.current_len());
        }
    }

    #[must_use]
    pub fn render(&self, rows: usize, columns: usize, palette: &Palette) -> String {
        if self.is_empty() && !self.focused {
            return paint(palette.muted_style(), truncate_visible(PLACEHOLDER, columns));
        }

        let rows = rows.max(1);
        let text_columns = columns.saturating_sub(GUTTER_WIDTH);
        let first = self.row.saturating_sub(rows - 1);

        self.lines
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .map(|(index, line)| {
                let gutter = paint(
                    palette.muted_style(),
                    format!("{:>width$} ", index + 1, width = GUTTER_WIDTH - 1),
                );
                let body = if self.focused && index == self.row {
                    self.line_with_cursor(line, palette)
                } else {
                    line.clone()
                };
                format!("{gutter}{}", truncate_visible(&body, text_columns))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line_with_cursor(&self, line: &str, palette: &Palette) -> String {
        let before = slice_runes(line, 0, self.column);
        let under = line.chars().nth(self.column).unwrap_or(' ');
        let after = slice_runes(line, self.column + 1, usize::MAX);
        format!(
            "{before}{}{after}",
            paint(palette.cursor_style(), under.to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorAction, QueryEditor};
    use crate::ansi::strip_styles;
    use crate::keys::Key;
    use crate::theme::Palette;

    fn type_text(editor: &mut QueryEditor, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                editor.handle_key(Key::Enter);
            } else {
                editor.handle_key(Key::Char(ch));
            }
        }
    }

    #[test]
    fn blurred_editor_ignores_typing() {
        let mut editor = QueryEditor::new();
        assert_eq!(editor.handle_key(Key::Char('x')), None);
        assert!(editor.is_empty());
    }

    #[test]
    fn focused_editor_accepts_multiline_input() {
        let mut editor = QueryEditor::new();
        editor.focus();
        type_text(&mut editor, "SELECT 1\nFROM dual");

        assert_eq!(editor.value(), "SELECT 1\nFROM dual");
        assert_eq!(editor.cursor(), (1, 9));
    }

    #[test]
    fn enter_submits_only_when_blurred_and_not_blank() {
        let mut editor = QueryEditor::new();
        assert_eq!(editor.handle_key(Key::Enter), None);

        editor.focus();
        type_text(&mut editor, "SELECT 2");
        editor.handle_key(Key::Esc);
        assert!(!editor.is_focused());
        assert_eq!(
            editor.handle_key(Key::Enter),
            Some(EditorAction::Submit("SELECT 2".to_string()))
        );
    }

    #[test]
    fn editing_keys_work_across_line_boundaries() {
        let mut editor = QueryEditor::new();
        editor.focus();
        type_text(&mut editor, "ab\ncd");

        editor.handle_key(Key::Home);
        editor.handle_key(Key::Backspace);
        assert_eq!(editor.value(), "abcd");
        assert_eq!(editor.cursor(), (0, 2));

        editor.handle_key(Key::Delete);
        assert_eq!(editor.value(), "abd");

        editor.handle_key(Key::Left);
        editor.handle_key(Key::Left);
        editor.handle_key(Key::Left);
        editor.handle_key(Key::Left);
        assert_eq!(editor.cursor(), (0, 0));

        editor.handle_key(Key::End);
        editor.handle_key(Key::Right);
        assert_eq!(editor.cursor(), (0, 3));
    }

    #[test]
    fn multibyte_characters_are_edited_by_character() {
        let mut editor = QueryEditor::new();
        editor.focus();
        type_text(&mut editor, "héé");
        editor.handle_key(Key::Left);
        editor.handle_key(Key::Backspace);
        assert_eq!(editor.value(), "hé");
    }

    #[test]
    fn vertical_moves_clamp_the_column() {
        let mut editor = QueryEditor::new();
        editor.focus();
        type_text(&mut editor, "x\nlonger");
        editor.handle_key(Key::Up);
        assert_eq!(editor.cursor(), (0, 1));
        editor.handle_key(Key::Up);
        assert_eq!(editor.cursor(), (0, 1));
    }

    #[test]
    fn set_value_moves_cursor_to_end() {
        let mut editor = QueryEditor::new();
        editor.set_value("SELECT *\nFROM posts");
        assert_eq!(editor.cursor(), (1, 10));
    }

    #[test]
    fn render_shows_placeholder_then_numbered_lines() {
        let palette = Palette::default();
        let mut editor = QueryEditor::new();
        assert_eq!(
            strip_styles(&editor.render(5, 40, &palette)),
            "Write your SQL here..."
        );

        editor.set_value("SELECT 1\nFROM t");
        assert_eq!(
            strip_styles(&editor.render(5, 40, &palette)),
            "  1 SELECT 1\n  2 FROM t"
        );

        editor.focus();
        let focused = editor.render(5, 40, &palette);
        assert!(focused.contains("\u{1b}[7m \u{1b}[0m"));
    }

    #[test]
    fn cursor_highlights_the_character_under_it() {
        let palette = Palette::default();
        let mut editor = QueryEditor::new();
        editor.focus();
        type_text(&mut editor, "héllo");
        for _ in 0..4 {
            editor.handle_key(Key::Left);
        }

        let rendered = editor.render(5, 40, &palette);
        assert!(rendered.contains("h\u{1b}[7mé\u{1b}[0mllo"));
        assert_eq!(strip_styles(&rendered), "  1 héllo");
    }
}
