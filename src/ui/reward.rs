/// Contact-number prompt shown after the quest is complete.
///
/// Digits are kept raw and formatted on every read as `(ddd) ddd-dddd`.
/// Anything that is not an ASCII digit is dropped and input stops at ten
/// digits.

use crossterm::event::KeyCode;

const MAX_DIGITS: usize = 10;
/// Submission needs a formatted value at least this long.
const MIN_SUBMIT_LEN: usize = 10;

/// Format a partial number: `555` → `(555) `, `5551234` → `(555) 123-4`.
pub fn format_phone(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_DIGITS)
        .collect();

    let area: String = digits.iter().take(3).collect();
    let prefix: String = digits.iter().skip(3).take(3).collect();
    let line: String = digits.iter().skip(6).collect();

    let mut out = String::with_capacity(14);
    if !area.is_empty() {
        out.push('(');
        out.push_str(&area);
    }
    if area.len() == 3 {
        out.push_str(") ");
    }
    out.push_str(&prefix);
    if prefix.len() == 3 {
        out.push('-');
    }
    out.push_str(&line);
    out
}

#[derive(Clone, Debug, Default)]
pub struct RewardPrompt {
    digits: String,
}

impl RewardPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> String {
        format_phone(&self.digits)
    }

    pub fn can_submit(&self) -> bool {
        self.display().chars().count() >= MIN_SUBMIT_LEN
    }

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() && self.digits.len() < MAX_DIGITS {
            self.digits.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.digits.pop();
    }

    /// Feed one keystroke. Returns the formatted number when Enter
    /// submits a long enough value.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<String> {
        match key {
            KeyCode::Char(c) => self.push(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Enter if self.can_submit() => return Some(self.display()),
            _ => {}
        }
        None
    }
}
