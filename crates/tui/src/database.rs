use paneql_core::connection::{ConnectionPhase, ConnectionSummary};

use crate::ansi::{single_line, truncate_visible};
use crate::theme::{paint, Palette};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabasePanel {
    summary: Option<ConnectionSummary>,
}

impl DatabasePanel {
    pub fn set_summary(&mut self, summary: ConnectionSummary) {
        self.summary = Some(summary);
    }

    #[must_use]
    pub fn summary(&self) -> Option<&ConnectionSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn render(&self, columns: usize, palette: &Palette) -> String {
        let Some(summary) = &self.summary else {
            return paint(palette.muted_style(), "No connection");
        };

        let target = summary
            .target
            .as_ref()
            .map_or_else(|| "No connection".to_string(), |target| target.describe());
        let status_style = match summary.phase {
            ConnectionPhase::Connected => palette.highlight_style(),
            ConnectionPhase::Pending => palette.muted_style(),
            ConnectionPhase::Failed => palette.error_style(),
        };

        format!(
            "{}\n{}",
            truncate_visible(&target, columns),
            paint(
                status_style,
                truncate_visible(&single_line(&summary.status), columns)
            )
        )
    }
}
