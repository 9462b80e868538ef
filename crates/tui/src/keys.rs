use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    CtrlC,
}

impl Key {
    #[must_use]
    pub fn from_event(event: KeyEvent) -> Option<Self> {
        match (event.modifiers, event.code) {
            (modifiers, KeyCode::Char('c')) if modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Self::CtrlC)
            }
            (modifiers, KeyCode::Char(_))
                if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                None
            }
            (_, KeyCode::Char(ch)) => Some(Self::Char(ch)),
            (_, KeyCode::Enter) => Some(Self::Enter),
            (_, KeyCode::Esc) => Some(Self::Esc),
            (modifiers, KeyCode::Tab) if modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Self::BackTab)
            }
            (_, KeyCode::Tab) => Some(Self::Tab),
            (_, KeyCode::BackTab) => Some(Self::BackTab),
            (_, KeyCode::Backspace) => Some(Self::Backspace),
            (_, KeyCode::Delete) => Some(Self::Delete),
            (_, KeyCode::Up) => Some(Self::Up),
            (_, KeyCode::Down) => Some(Self::Down),
            (_, KeyCode::Left) => Some(Self::Left),
            (_, KeyCode::Right) => Some(Self::Right),
            (_, KeyCode::Home) => Some(Self::Home),
            (_, KeyCode::End) => Some(Self::End),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Char(ch) => ch.to_string(),
            Self::Enter => "enter".to_string(),
            Self::Esc => "esc".to_string(),
            Self::Tab => "tab".to_string(),
            Self::BackTab => "shift+tab".to_string(),
            Self::Backspace => "backspace".to_string(),
            Self::Delete => "delete".to_string(),
            Self::Up => "up".to_string(),
            Self::Down => "down".to_string(),
            Self::Left => "left".to_string(),
            Self::Right => "right".to_string(),
            Self::Home => "home".to_string(),
            Self::End => "end".to_string(),
            Self::CtrlC => "ctrl+c".to_string(),
        }
    }
}
