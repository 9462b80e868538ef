use crate::ansi::{active_styles, split_at_visible, truncate_visible, visible_length};
use crate::theme::{paint, Palette};

pub const LABEL_OFFSET: usize = 2;

#[must_use]
pub fn label_text(index: usize, title: &str) -> String {
    format!("[{index}] {title}")
}

#[must_use]
pub fn add_label_to_border(
    content: &str,
    index: usize,
    title: &str,
    selected: bool,
    palette: &Palette,
) -> String {
    let insertion = paint(palette.label_style(selected), label_text(index, title));
    splice_label(content, &insertion, LABEL_OFFSET)
}

// The first line keeps its visible width; labels that overflow are cut.
#[must_use]
pub fn splice_label(content: &str, insertion: &str, offset: usize) -> String {
    let Some((first, rest)) = split_first_line(content) else {
        return content.to_string();
    };

    let first_len = visible_length(first);
    if first_len < offset {
        return content.to_string();
    }

    let cut = (offset + visible_length(insertion)).min(first_len);
    let (before, _) = split_at_visible(first, offset);
    let (covered, after) = split_at_visible(first, cut);

    let mut line = String::with_capacity(first.len() + insertion.len());
    line.push_str(before);
    line.push_str(insertion);
    if !after.is_empty() {
        line.push_str(&active_styles(covered));
    }
    line.push_str(after);

    let mut spliced = truncate_visible(&line, first_len);
    if let Some(rest) = rest {
        spliced.push('\n');
        spliced.push_str(rest);
    }
    spliced
}

fn split_first_line(content: &str) -> Option<(&str, Option<&str>)> {
    if content.is_empty() {
        return None;
    }
    Some(match content.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (content, None),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{add_label_to_border, label_text, splice_label, LABEL_OFFSET};
    use crate::ansi::{strip_styles, visible_length};
    use crate::theme::Palette;

    const TOP: &str = "╭──────────╮";

    fn first_line(text: &str) -> String {
        strip_styles(text.lines().next().unwrap_or_default())
    }

    #[test]
    fn empty_content_is_returned_unchanged() {
        assert_eq!(splice_label("", "[1] Query", 2), "");
    }

    #[test]
    fn short_first_line_aborts_the_splice() {
        let content = "╭─╮\n│ │";
        assert_eq!(splice_label(content, "[1] Query", 6), content);
    }

    #[test]
    fn fitting_label_preserves_line_width_and_other_lines() {
        let content = format!("{TOP}\n│ body     │\n╰──────────╯");
        let spliced = splice_label(&content, "[1] DB", 2);

        assert_eq!(first_line(&spliced), "╭─[1] DB───╮");
        assert_eq!(visible_length(&first_line(&spliced)), 12);
        assert!(spliced.ends_with("\n│ body     │\n╰──────────╯"));
    }

    #[test]
    fn overflowing_label_is_cut_at_the_line_end() {
        // 12 visible columns, offset 6, 9 column label: the cut clamps to 12
        // and the label keeps only the 6 columns that fit.
        let spliced = splice_label(TOP, "[1] Query", 6);

        assert_eq!(strip_styles(&spliced), "╭─────[1] Qu");
        assert_eq!(visible_length(&spliced), 12);
    }

    #[test]
    fn cut_styled_label_is_closed_with_a_reset() {
        let spliced = splice_label(TOP, "\u{1b}[1m[1] Query\u{1b}[0m", 6);
        assert!(spliced.ends_with("Qu\u{1b}[0m"));
    }

    #[test]
    fn empty_title_still_renders_index() {
        assert_eq!(label_text(4, ""), "[4] ");
        let spliced = splice_label(TOP, &label_text(4, ""), LABEL_OFFSET);
        assert_eq!(strip_styles(&spliced), "╭─[4] ─────╮");
    }

    #[test]
    fn styled_border_keeps_its_color_after_the_label() {
        let border = "\u{1b}[38;5;50m╭──────────╮\u{1b}[39m";
        let spliced = splice_label(border, "\u{1b}[1mAB\u{1b}[0m", 2);

        assert_eq!(strip_styles(&spliced), "╭─AB───────╮");
        assert!(spliced.starts_with("\u{1b}[38;5;50m╭─\u{1b}[1mAB\u{1b}[0m\u{1b}[38;5;50m───"));
    }

    #[test]
    fn selected_labels_are_painted_with_the_accent() {
        let palette = Palette::default();
        let selected = add_label_to_border(TOP, 3, "Query", true, &palette);
        let idle = add_label_to_border(TOP, 3, "Query", false, &palette);

        assert_eq!(strip_styles(&selected), "╭─[3] Query╮");
        assert!(selected.contains("\u{1b}[38;5;50m"));
        assert!(idle.contains("\u{1b}[38;5;255m"));
    }

    proptest! {
        #[test]
        fn labels_never_change_the_line_width(
            width in 0usize..40,
            title in "[A-Za-z ]{0,12}",
            offset in 0usize..8,
        ) {
            let line = format!("╭{}╮", "─".repeat(width));
            let label = label_text(1, &title);
            let before = visible_length(&line);
            let after = visible_length(&splice_label(&line, &label, offset));

            prop_assert_eq!(after, before);
        }
    }
}
