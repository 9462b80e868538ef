use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const ESC: char = '\u{1b}';
pub const RESET: &str = "\u{1b}[0m";

// Only complete SGR sequences style text; any other ESC is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Sgr(&'a str),
    Stray,
    Char(char),
}

struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (Token<'a>, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let len = if first == ESC {
            sgr_len(self.rest).unwrap_or(first.len_utf8())
        } else {
            first.len_utf8()
        };
        let (raw, rest) = self.rest.split_at(len);
        self.rest = rest;

        let token = if first != ESC {
            Token::Char(first)
        } else if len == 1 {
            Token::Stray
        } else {
            Token::Sgr(raw)
        };
        Some((token, raw))
    }
}

fn sgr_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[0] != 0x1b || bytes[1] != b'[' {
        return None;
    }
    let params = bytes[2..]
        .iter()
        .take_while(|byte| byte.is_ascii_digit() || **byte == b';')
        .count();
    (bytes.get(2 + params) == Some(&b'm')).then_some(3 + params)
}

#[must_use]
pub fn strip_styles(text: &str) -> String {
    Tokens::new(text)
        .filter_map(|(token, _)| match token {
            Token::Char(ch) => Some(ch),
            Token::Sgr(_) | Token::Stray => None,
        })
        .collect()
}

#[must_use]
pub fn visible_length(text: &str) -> usize {
    Tokens::new(text)
        .filter(|(token, _)| matches!(token, Token::Char(_)))
        .count()
}

#[must_use]
pub fn slice_runes(text: &str, from: usize, to: usize) -> String {
    let to = to.max(from);
    text.chars().skip(from).take(to - from).collect()
}

#[must_use]
pub fn split_at_visible(text: &str, n: usize) -> (&str, &str) {
    let mut seen = 0;
    let mut offset = 0;
    for (token, raw) in Tokens::new(text) {
        if let Token::Char(_) = token {
            if seen == n {
                return text.split_at(offset);
            }
            seen += 1;
        }
        offset += raw.len();
    }
    (text, "")
}

#[must_use]
pub fn active_styles(text: &str) -> String {
    let mut active = String::new();
    for (token, _) in Tokens::new(text) {
        if let Token::Sgr(sequence) = token {
            if is_full_reset(sequence) {
                active.clear();
            } else {
                active.push_str(sequence);
            }
        }
    }
    active
}

fn is_full_reset(sequence: &str) -> bool {
    matches!(&sequence[2..sequence.len() - 1], "" | "0")
}

#[must_use]
pub fn truncate_visible(text: &str, max: usize) -> String {
    let (head, tail) = split_at_visible(text, max);
    if tail.is_empty() {
        return head.to_string();
    }
    if active_styles(head).is_empty() {
        head.to_string()
    } else {
        format!("{head}{RESET}")
    }
}

#[must_use]
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

#[must_use]
pub fn fit_visible(text: &str, width: usize) -> String {
    let mut fitted = truncate_visible(text, width);
    let missing = width.saturating_sub(visible_length(&fitted));
    fitted.extend(std::iter::repeat(' ').take(missing));
    fitted
}

#[must_use]
pub fn to_text(frame: &str) -> Text<'static> {
    let mut style = Style::default();
    let lines = frame
        .split('\n')
        .map(|raw_line| {
            let mut spans = Vec::new();
            let mut run = String::new();
            for (token, _) in Tokens::new(raw_line) {
                match token {
                    Token::Char(ch) => run.push(ch),
                    Token::Stray => {}
                    Token::Sgr(sequence) => {
                        if !run.is_empty() {
                            spans.push(Span::styled(std::mem::take(&mut run), style));
                        }
                        style = apply_sgr(style, &sequence[2..sequence.len() - 1]);
                    }
                }
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, style));
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    Text::from(lines)
}

fn apply_sgr(mut style: Style, params: &str) -> Style {
    let codes = params
        .split(';')
        .map(|code| code.parse::<u16>().unwrap_or(0))
        .collect::<Vec<_>>();

    let mut index = 0;
    while index < codes.len() {
        let code = codes[index];
        match code {
            0 => style = Style::default(),
            1 => style = style.add_modifier(Modifier::BOLD),
            2 => style = style.add_modifier(Modifier::DIM),
            3 => style = style.add_modifier(Modifier::ITALIC),
            4 => style = style.add_modifier(Modifier::UNDERLINED),
            5 => style = style.add_modifier(Modifier::SLOW_BLINK),
            7 => style = style.add_modifier(Modifier::REVERSED),
            9 => style = style.add_modifier(Modifier::CROSSED_OUT),
            22 => style = style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style = style.remove_modifier(Modifier::ITALIC),
            24 => style = style.remove_modifier(Modifier::UNDERLINED),
            25 => style = style.remove_modifier(Modifier::SLOW_BLINK),
            27 => style = style.remove_modifier(Modifier::REVERSED),
            29 => style = style.remove_modifier(Modifier::CROSSED_OUT),
            30..=37 => style.fg = Some(basic_color(code - 30)),
            90..=97 => style.fg = Some(bright_color(code - 90)),
            40..=47 => style.bg = Some(basic_color(code - 40)),
            100..=107 => style.bg = Some(bright_color(code - 100)),
            39 => style.fg = None,
            49 => style.bg = None,
            38 | 48 => {
                let (color, consumed) = extended_color(&codes[index + 1..]);
                if let Some(color) = color {
                    if code == 38 {
                        style.fg = Some(color);
                    } else {
                        style.bg = Some(color);
                    }
                }
                index += consumed;
            }
            _ => {}
        }
        index += 1;
    }
    style
}

fn extended_color(codes: &[u16]) -> (Option<Color>, usize) {
    match codes {
        [5, value, ..] => (u8::try_from(*value).ok().map(Color::Indexed), 2),
        [2, r, g, b, ..] => {
            let channel = |value: u16| u8::try_from(value).unwrap_or(u8::MAX);
            (Some(Color::Rgb(channel(*r), channel(*g), channel(*b))), 4)
        }
        _ => (None, codes.len()),
    }
}

fn basic_color(offset: u16) -> Color {
    match offset {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn bright_color(offset: u16) -> Color {
    match offset {
        0 => Color::DarkGray,
        1 => Color::LightRed,
        2 => Color::LightGreen,
        3 => Color::LightYellow,
        4 => Color::LightBlue,
        5 => Color::LightMagenta,
        6 => Color::LightCyan,
        _ => Color::White,
    }
}
