use crate::ansi::fit_visible;
use crate::border::add_label_to_border;
use crate::theme::{paint, Palette};

const PADDING: usize = 1;
const MARGIN_RIGHT: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub index: usize,
    pub title: String,
    pub selected: bool,
    pub width: usize,
    pub height: usize,
    pub content: String,
}

impl Pane {
    #[must_use]
    pub fn outer_width(width: usize) -> usize {
        width + 2 + MARGIN_RIGHT
    }

    #[must_use]
    pub fn outer_height(height: usize) -> usize {
        height + 2
    }

    #[must_use]
    pub fn content_rows(height: usize) -> usize {
        height.saturating_sub(2 * PADDING)
    }

    #[must_use]
    pub fn content_columns(width: usize) -> usize {
        width.saturating_sub(2 * PADDING)
    }

    #[must_use]
    pub fn render(&self, palette: &Palette) -> String {
        create_pane(self, palette)
    }
}

#[must_use]
pub fn create_pane(pane: &Pane, palette: &Palette) -> String {
    let border = palette.border_style(pane.selected);
    let margin = " ".repeat(MARGIN_RIGHT);
    let inner_columns = Pane::content_columns(pane.width);
    let inner_rows = Pane::content_rows(pane.height);
    let side_padding = " ".repeat(PADDING.min(pane.width));

    let mut lines = Vec::with_capacity(pane.height + 2);
    lines.push(format!(
        "{}{margin}",
        paint(border, format!("╭{}╮", "─".repeat(pane.width)))
    ));

    let left = paint(border, "│");
    let right = paint(border, "│");
    let blank = format!("{left}{}{right}{margin}", " ".repeat(pane.width));

    let top_padding = PADDING.min(pane.height);
    lines.extend(std::iter::repeat(blank.clone()).take(top_padding));

    let mut content_lines = pane.content.lines();
    for _ in 0..inner_rows {
        let line = content_lines.next().unwrap_or_default();
        let trailing = " ".repeat(pane.width.saturating_sub(inner_columns + side_padding.len()));
        lines.push(format!(
            "{left}{side_padding}{}{trailing}{right}{margin}",
            fit_visible(line, inner_columns)
        ));
    }

    let bottom_padding = pane.height - top_padding - inner_rows;
    lines.extend(std::iter::repeat(blank).take(bottom_padding));
    lines.push(format!(
        "{}{margin}",
        paint(border, format!("╰{}╯", "─".repeat(pane.width)))
    ));

    add_label_to_border(
        &lines.join("\n"),
        pane.index,
        &pane.title,
        pane.selected,
        palette,
    )
}
