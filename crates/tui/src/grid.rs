use paneql_core::result_set::ResultSet;

use crate::ansi::{fit_visible, single_line};
use crate::keys::Key;
use crate::theme::{paint, Palette};

pub const DEFAULT_COLUMN_PADDING: usize = 10;

const CELL_PADDING: usize = 1;
const PLACEHOLDER: &str = "No results yet. Execute a query to see the results here...";
const NO_ROWS: &str = "Query returned no rows";
const CHROME_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
}

impl Movement {
    #[must_use]
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Up | Key::Char('k') => Some(Self::Up),
            Key::Down | Key::Char('j') => Some(Self::Down),
            Key::Left | Key::Char('h') => Some(Self::Left),
            Key::Right | Key::Char('l') => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultGrid {
    result: Option<ResultSet>,
    cursor: Cursor,
    column_padding: usize,
}

impl Default for ResultGrid {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMN_PADDING)
    }
}

impl ResultGrid {
    #[must_use]
    pub fn new(column_padding: usize) -> Self {
        Self {
            result: None,
            cursor: Cursor::default(),
            column_padding,
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn set_result(&mut self, result: ResultSet) {
        self.result = Some(result);
        self.cursor = Cursor::default();
        self.clamp_cursor();
    }

    pub fn move_cursor(&mut self, movement: Movement) {
        let Some(result) = &self.result else {
            return;
        };
        let last_row = result.row_count().saturating_sub(1);
        let last_column = result.column_count().saturating_sub(1);

        match movement {
            Movement::Up => self.cursor.row = self.cursor.row.saturating_sub(1),
            Movement::Down => self.cursor.row = (self.cursor.row + 1).min(last_row),
            Movement::Left => self.cursor.column = self.cursor.column.saturating_sub(1),
            Movement::Right => self.cursor.column = (self.cursor.column + 1).min(last_column),
        }
    }

    fn clamp_cursor(&mut self) {
        let (rows, columns) = self
            .result
            .as_ref()
            .map_or((0, 0), |result| (result.row_count(), result.column_count()));
        self.cursor.row = self.cursor.row.min(rows.saturating_sub(1));
        self.cursor.column = self.cursor.column.min(columns.saturating_sub(1));
    }

    #[must_use]
    pub fn column_width(&self, name: &str) -> usize {
        name.chars().count() + self.column_padding
    }

    #[must_use]
    pub fn render(&self, height: usize, width: usize, palette: &Palette) -> String {
        let Some(result) = &self.result else {
            return paint(palette.muted_style(), PLACEHOLDER);
        };
        if result.columns.is_empty() {
            return paint(palette.muted_style(), NO_ROWS);
        }

        let widths = result
            .columns
            .iter()
            .map(|name| self.column_width(name))
            .collect::<Vec<_>>();
        let first_column = first_visible_column(&widths, self.cursor.column, width);
        let shown = (first_column..widths.len())
            .map(|column| (column, widths[column]))
            .collect::<Vec<_>>();

        let header = shown
            .iter()
            .map(|&(column, width)| {
                paint(palette.header_style(), pad_cell(&result.columns[column], width))
            })
            .collect::<String>();
        let rule = paint(
            palette.muted_style(),
            "─".repeat(shown.iter().map(|&(_, width)| width).sum()),
        );

        let mut lines = vec![header, rule];

        if result.has_rows() {
            let visible_rows = height.saturating_sub(CHROME_ROWS).max(1);
            let first_row = self.cursor.row.saturating_sub(visible_rows - 1);
            let last_row = (first_row + visible_rows).min(result.row_count());

            for row in first_row..last_row {
                let line = shown
                    .iter()
                    .map(|&(column, width)| {
                        let cell = pad_cell(&result.cell_text(row, column), width);
                        if self.cursor == (Cursor { row, column }) {
                            paint(palette.cursor_style(), cell)
                        } else {
                            cell
                        }
                    })
                    .collect::<String>();
                lines.push(line);
            }
        } else {
            lines.push(paint(palette.muted_style(), NO_ROWS));
        }

        lines.push(paint(
            palette.muted_style(),
            format!(
                "Executed in {} microseconds · {} rows",
                result.elapsed_micros,
                result.row_count()
            ),
        ));
        lines.join("\n")
    }
}

// Leftmost column that still lets `cursor` fit inside `width`.
fn first_visible_column(widths: &[usize], cursor: usize, width: usize) -> usize {
    let mut first = cursor.min(widths.len().saturating_sub(1));
    let mut used = widths.get(first).copied().unwrap_or(0);
    while first > 0 && used + widths[first - 1] <= width {
        first -= 1;
        used += widths[first];
    }
    first
}

#[must_use]
pub fn pad_cell(text: &str, width: usize) -> String {
    let content_width = width.saturating_sub(2 * CELL_PADDING);
    let body = fit_visible(&single_line(text), content_width);
    let pad = " ".repeat(CELL_PADDING.min(width));
    let trailing = " ".repeat(width.saturating_sub(content_width + pad.len()));
    format!("{pad}{body}{trailing}")
}
