use crate::ansi::truncate_visible;
use crate::keys::Key;
use crate::theme::{paint, Palette};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    Preview(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableList {
    tables: Vec<String>,
    selected: usize,
}

impl TableList {
    #[must_use]
    pub fn new(tables: Vec<String>) -> Self {
        let mut list = Self::default();
        list.set_tables(tables);
        list
    }

    pub fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = tables;
        self.selected = self.selected.min(self.tables.len().saturating_sub(1));
    }

    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        (!self.tables.is_empty()).then_some(self.selected)
    }

    #[must_use]
    pub fn selected_table(&self) -> Option<&str> {
        self.tables.get(self.selected).map(String::as_str)
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tables.len() {
            self.selected += 1;
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Option<TableAction> {
        match key {
            Key::Up | Key::Char('k') => self.select_previous(),
            Key::Down | Key::Char('j') => self.select_next(),
            Key::Enter => {
                return self
                    .selected_table()
                    .map(|table| TableAction::Preview(table.to_string()));
            }
            _ => {}
        }
        None
    }

    #[must_use]
    pub fn render(&self, active: bool, rows: usize, columns: usize, palette: &Palette) -> String {
        if self.tables.is_empty() {
            return paint(palette.muted_style(), "No tables");
        }

        let rows = rows.max(1);
        let first = self.selected.saturating_sub(rows - 1);
        self.tables
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .map(|(index, table)| {
                let name = truncate_visible(table, columns);
                if index == self.selected && active {
                    paint(palette.highlight_style(), name)
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[must_use]
pub fn preview_sql(table: &str, limit: usize) -> String {
    format!("SELECT * FROM `{}` LIMIT {limit}", table.replace('`', "``"))
}
