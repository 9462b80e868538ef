use paneql_core::connection::ConnectionSummary;
use paneql_core::query_executor::{RequestId, RequestSequencer};
use paneql_core::result_set::ResultSet;
use tracing::{debug, info, warn};

use crate::ansi::single_line;
use crate::database::DatabasePanel;
use crate::focus::{FocusController, KeyRoute, Tab};
use crate::grid::{Movement, ResultGrid};
use crate::keys::Key;
use crate::layout::{compose, LayoutMetrics, PaneFrames};
use crate::pane::Pane;
use crate::query_editor::{EditorAction, QueryEditor};
use crate::tables::{preview_sql, TableAction, TableList};
use crate::theme::{paint, Palette};

pub const PREVIEW_LIMIT: usize = 200;

const KEY_HINTS: &str =
    "tab/shift+tab: switch pane · 1-4: jump · /: edit query · esc: stop editing · enter: run · q: quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Resize { width: u16, height: u16 },
    Key(Key),
    FocusQuery,
    Connection(ConnectionSummary),
    TablesLoaded(Result<Vec<String>, String>),
    QueryFinished { request_id: RequestId, result: ResultSet },
    QueryFailed { request_id: RequestId, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Post(Msg),
    ExecuteQuery { request_id: RequestId, sql: String },
    LoadTables,
}

#[derive(Debug)]
pub struct App {
    palette: Palette,
    focus: FocusController,
    database: DatabasePanel,
    tables: TableList,
    editor: QueryEditor,
    grid: ResultGrid,
    requests: RequestSequencer,
    in_flight: Option<RequestId>,
    error: Option<String>,
    width: usize,
    height: usize,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl App {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            focus: FocusController::new(),
            database: DatabasePanel::default(),
            tables: TableList::default(),
            editor: QueryEditor::new(),
            grid: ResultGrid::default(),
            requests: RequestSequencer::new(),
            in_flight: None,
            error: None,
            width: 0,
            height: 0,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.focus.active()
    }

    #[must_use]
    pub fn editor(&self) -> &QueryEditor {
        &self.editor
    }

    #[must_use]
    pub fn tables(&self) -> &TableList {
        &self.tables
    }

    #[must_use]
    pub fn grid(&self) -> &ResultGrid {
        &self.grid
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Command> {
        match msg {
            Msg::Resize { width, height } => {
                self.width = usize::from(width);
                self.height = usize::from(height);
                Vec::new()
            }
            Msg::Key(key) => self.on_key(key),
            Msg::FocusQuery => {
                self.focus.activate(Tab::Query);
                self.editor.focus();
                Vec::new()
            }
            Msg::Connection(summary) => {
                let connected = summary.is_connected();
                self.database.set_summary(summary);
                if connected {
                    vec![Command::LoadTables]
                } else {
                    Vec::new()
                }
            }
            Msg::TablesLoaded(Ok(tables)) => {
                debug!(count = tables.len(), "table list refreshed");
                self.tables.set_tables(tables);
                Vec::new()
            }
            Msg::TablesLoaded(Err(error)) => {
                self.error = Some(format!("Failed to load tables: {error}"));
                Vec::new()
            }
            Msg::QueryFinished { request_id, result } => {
                if !self.accept_completion(request_id) {
                    return Vec::new();
                }
                info!(
                    request_id = request_id.get(),
                    rows = result.row_count(),
                    elapsed_micros = result.elapsed_micros,
                    "query finished"
                );
                self.error = None;
                self.grid.set_result(result);
                vec![Command::LoadTables]
            }
            Msg::QueryFailed { request_id, error } => {
                if self.accept_completion(request_id) {
                    warn!(request_id = request_id.get(), %error, "query failed");
                    self.error = Some(error);
                }
                Vec::new()
            }
        }
    }

    // Only the newest submission may replace the shown result.
    fn accept_completion(&mut self, request_id: RequestId) -> bool {
        if !self.requests.is_latest(request_id) {
            warn!(
                request_id = request_id.get(),
                latest = ?self.requests.latest().map(RequestId::get),
                "dropping stale query completion"
            );
            return false;
        }
        self.in_flight = None;
        true
    }

    fn on_key(&mut self, key: Key) -> Vec<Command> {
        let text_capture = self.focus.is_active(Tab::Query) && self.editor.is_focused();
        match self.focus.route(key, text_capture) {
            KeyRoute::Quit => {
                info!(key = %key.name(), "quit requested");
                self.should_quit = true;
                Vec::new()
            }
            KeyRoute::Switched(_) => Vec::new(),
            KeyRoute::FocusQuery => vec![Command::Post(Msg::FocusQuery)],
            KeyRoute::Deliver(tab) => self.deliver(tab, key),
        }
    }

    fn deliver(&mut self, tab: Tab, key: Key) -> Vec<Command> {
        match tab {
            Tab::Database => Vec::new(),
            Tab::Tables => match self.tables.handle_key(key) {
                Some(TableAction::Preview(table)) => {
                    let sql = preview_sql(&table, PREVIEW_LIMIT);
                    self.editor.set_value(&sql);
                    self.submit(sql)
                }
                None => Vec::new(),
            },
            Tab::Query => match self.editor.handle_key(key) {
                Some(EditorAction::Submit(sql)) => self.submit(sql),
                None => Vec::new(),
            },
            Tab::Result => {
                if let Some(movement) = Movement::from_key(&key) {
                    self.grid.move_cursor(movement);
                }
                Vec::new()
            }
        }
    }

    fn submit(&mut self, sql: String) -> Vec<Command> {
        let request_id = self.requests.next_id();
        self.in_flight = Some(request_id);
        info!(request_id = request_id.get(), sql_len = sql.len(), "query submitted");
        vec![Command::ExecuteQuery { request_id, sql }]
    }

    #[must_use]
    pub fn view(&self) -> String {
        let metrics = LayoutMetrics::for_terminal(self.width, self.height);
        let palette = &self.palette;

        let database = self.pane(
            Tab::Database,
            metrics.left_width,
            metrics.database_height,
            self.database
                .render(Pane::content_columns(metrics.left_width), palette),
        );
        let tables = self.pane(
            Tab::Tables,
            metrics.left_width,
            metrics.tables_height,
            self.tables.render(
                self.focus.is_active(Tab::Tables),
                Pane::content_rows(metrics.tables_height),
                Pane::content_columns(metrics.left_width),
                palette,
            ),
        );
        let query = self.pane(
            Tab::Query,
            metrics.right_width,
            metrics.query_height,
            self.editor.render(
                Pane::content_rows(metrics.query_height),
                Pane::content_columns(metrics.right_width),
                palette,
            ),
        );
        let result = self.pane(
            Tab::Result,
            metrics.right_width,
            metrics.result_height,
            self.grid.render(
                Pane::content_rows(metrics.result_height),
                Pane::content_columns(metrics.right_width),
                palette,
            ),
        );

        compose(
            &PaneFrames {
                database,
                tables,
                query,
                result,
            },
            &self.status_line(),
            self.width,
        )
    }

    fn pane(&self, tab: Tab, width: usize, height: usize, content: String) -> String {
        Pane {
            index: tab.index(),
            title: tab.title().to_string(),
            selected: self.focus.is_active(tab),
            width,
            height,
            content,
        }
        .render(&self.palette)
    }

    fn status_line(&self) -> String {
        if let Some(error) = &self.error {
            return paint(
                self.palette.error_style(),
                format!("Error: {}", single_line(error)),
            );
        }
        if let Some(request_id) = self.in_flight {
            return paint(
                self.palette.muted_style(),
                format!("Running query #{}...", request_id.get()),
            );
        }
        paint(self.palette.muted_style(), KEY_HINTS)
    }
}
