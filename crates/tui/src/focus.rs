use tracing::debug;

use crate::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Database,
    Tables,
    Query,
    Result,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Database, Tab::Tables, Tab::Query, Tab::Result];

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Database => Self::Tables,
            Self::Tables => Self::Query,
            Self::Query => Self::Result,
            Self::Result => Self::Database,
        }
    }

    #[must_use]
    pub fn previous(self) -> Self {
        match self {
            Self::Database => Self::Result,
            Self::Tables => Self::Database,
            Self::Query => Self::Tables,
            Self::Result => Self::Query,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Database => 1,
            Self::Tables => 2,
            Self::Query => 3,
            Self::Result => 4,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Database => "Database",
            Self::Tables => "Tables",
            Self::Query => "Query",
            Self::Result => "Result",
        }
    }

    #[must_use]
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(Self::Database),
            '2' => Some(Self::Tables),
            '3' => Some(Self::Query),
            '4' => Some(Self::Result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    Quit,
    Switched(Tab),
    FocusQuery,
    Deliver(Tab),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusController {
    active: Tab,
}

impl Default for FocusController {
    fn default() -> Self {
        Self { active: Tab::Tables }
    }
}

impl FocusController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> Tab {
        self.active
    }

    #[must_use]
    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    pub fn activate(&mut self, tab: Tab) {
        if self.active != tab {
            debug!(from = ?self.active, to = ?tab, "focus changed");
        }
        self.active = tab;
    }

    pub fn route(&mut self, key: Key, text_capture: bool) -> KeyRoute {
        match key {
            Key::CtrlC => KeyRoute::Quit,
            Key::Tab => {
                self.activate(self.active.next());
                KeyRoute::Switched(self.active)
            }
            Key::BackTab => {
                self.activate(self.active.previous());
                KeyRoute::Switched(self.active)
            }
            Key::Char(_) if text_capture => KeyRoute::Deliver(self.active),
            Key::Char('q') => KeyRoute::Quit,
            Key::Char('/') => KeyRoute::FocusQuery,
            Key::Char(digit) => match Tab::from_digit(digit) {
                Some(tab) => {
                    self.activate(tab);
                    KeyRoute::Switched(tab)
                }
                None => KeyRoute::Deliver(self.active),
            },
            _ => KeyRoute::Deliver(self.active),
        }
    }
}
