use crate::ansi::{fit_visible, visible_length};
use crate::pane::Pane;

const LEFT_COLUMN_WIDTH: usize = 40;
const DATABASE_HEIGHT: usize = 5;
const QUERY_HEIGHT: usize = 10;
const STATUS_ROWS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub left_width: usize,
    pub right_width: usize,
    pub database_height: usize,
    pub tables_height: usize,
    pub query_height: usize,
    pub result_height: usize,
}

impl LayoutMetrics {
    #[must_use]
    pub fn for_terminal(width: usize, height: usize) -> Self {
        let chrome_columns = Pane::outer_width(0) * 2;
        let chrome_rows = Pane::outer_height(0) * 2 + STATUS_ROWS;

        let inner_width = width.saturating_sub(chrome_columns);
        let left_width = LEFT_COLUMN_WIDTH.min(inner_width / 2);
        let right_width = inner_width - left_width;

        let inner_height = height.saturating_sub(chrome_rows);
        let database_height = DATABASE_HEIGHT.min(inner_height / 2);
        let query_height = QUERY_HEIGHT.min(inner_height / 2);

        Self {
            left_width,
            right_width,
            database_height,
            tables_height: inner_height - database_height,
            query_height,
            result_height: inner_height - query_height,
        }
    }
}

#[must_use]
pub fn join_vertical(blocks: &[String]) -> String {
    blocks
        .iter()
        .filter(|block| !block.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn join_horizontal(left: &str, right: &str) -> String {
    let left_lines = left.split('\n').collect::<Vec<_>>();
    let right_lines = right.split('\n').collect::<Vec<_>>();
    let left_width = left_lines
        .iter()
        .map(|line| visible_length(line))
        .max()
        .unwrap_or(0);

    (0..left_lines.len().max(right_lines.len()))
        .map(|index| {
            let left_line = left_lines.get(index).copied().unwrap_or_default();
            let right_line = right_lines.get(index).copied().unwrap_or_default();
            format!("{}{right_line}", fit_visible(left_line, left_width))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Default)]
pub struct PaneFrames {
    pub database: String,
    pub tables: String,
    pub query: String,
    pub result: String,
}

#[must_use]
pub fn compose(frames: &PaneFrames, status: &str, width: usize) -> String {
    let left = join_vertical(&[frames.database.clone(), frames.tables.clone()]);
    let right = join_vertical(&[frames.query.clone(), frames.result.clone()]);
    let body = join_horizontal(&left, &right);
    format!("{body}\n{}", fit_visible(status, width))
}
