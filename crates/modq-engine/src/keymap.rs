//! Keybinding tables and key-event resolution.
//!
//! Three binding scopes exist: the list screen, the detail view and the
//! reject confirmation. Exactly one scope is live at a time, chosen by the
//! navigator from the focus context; list bindings are never consulted while
//! an overlay is open.

use std::fmt;
use std::str::FromStr;

use modq_core::Error;
use serde::Serialize;

// ──────────────────────────────────────────────────────────────────────
// Key events
// ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyCode {
    Up,
    Down,
    Left,
    Right,
    Escape,
    Tab,
    BackTab,
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
    };

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.ctrl && !self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_ctrl(mut self) -> Self {
        self.modifiers.ctrl = true;
        self
    }

    #[must_use]
    pub const fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }

    /// Case-folded code used for table lookup.
    fn normalized(self) -> KeyCode {
        match self.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

impl FromStr for KeyEvent {
    type Err = Error;

    /// Parse names like `down`, `Esc`, `space`, `shift+tab`, `ctrl+r` or a
    /// single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut rest = s.trim();
        loop {
            let lower = rest.to_ascii_lowercase();
            if let Some(tail) = lower.strip_prefix("ctrl+") {
                modifiers.ctrl = true;
                rest = &rest[rest.len() - tail.len()..];
            } else if let Some(tail) = lower.strip_prefix("alt+") {
                modifiers.alt = true;
                rest = &rest[rest.len() - tail.len()..];
            } else {
                break;
            }
        }
        let code = match rest.to_ascii_lowercase().as_str() {
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,
            "esc" | "escape" => KeyCode::Escape,
            "tab" => KeyCode::Tab,
            "backtab" | "shift+tab" => KeyCode::BackTab,
            "enter" | "return" => KeyCode::Enter,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => {
                        return Err(Error::InvalidArgument(format!("unknown key: {s:?}")));
                    }
                }
            }
        };
        Ok(Self { code, modifiers })
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        match self.code {
            KeyCode::Up => f.write_str("Up"),
            KeyCode::Down => f.write_str("Down"),
            KeyCode::Left => f.write_str("Left"),
            KeyCode::Right => f.write_str("Right"),
            KeyCode::Escape => f.write_str("Esc"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::BackTab => f.write_str("Shift+Tab"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────
// Commands and binding tables
// ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    FocusNext,
    FocusPrev,
    OpenDetail,
    Approve,
    Reject,
    ClearSelection,
    CloseDetail,
    DetailPrev,
    DetailNext,
    CycleForward,
    CycleBackward,
    Activate,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScope {
    List,
    Detail,
    Confirm,
}

/// A keybinding entry.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Key label for display (e.g. "a", "Esc", "Up").
    pub label: &'static str,
    pub command: Command,
    /// Human-readable action description.
    pub description: &'static str,
}

const fn bind(label: &'static str, command: Command, description: &'static str) -> Binding {
    Binding {
        label,
        command,
        description,
    }
}

pub const LIST_BINDINGS: &[Binding] = &[
    bind("Down", Command::FocusNext, "Focus next item"),
    bind("Up", Command::FocusPrev, "Focus previous item"),
    bind("Space", Command::OpenDetail, "Open focused item"),
    bind("a", Command::Approve, "Approve focused item"),
    bind("r", Command::Reject, "Reject focused item"),
    bind("Esc", Command::ClearSelection, "Clear selection"),
];

pub const DETAIL_BINDINGS: &[Binding] = &[
    bind("Esc", Command::CloseDetail, "Close"),
    bind("a", Command::Approve, "Approve and close"),
    bind("r", Command::Reject, "Reject and close"),
    bind("Left", Command::DetailPrev, "Previous item"),
    bind("Right", Command::DetailNext, "Next item"),
    bind("Tab", Command::CycleForward, "Next control"),
    bind("Shift+Tab", Command::CycleBackward, "Previous control"),
    bind("Enter", Command::Activate, "Activate focused control"),
];

pub const CONFIRM_BINDINGS: &[Binding] = &[
    bind("y", Command::Confirm, "Confirm"),
    bind("Esc/n", Command::Cancel, "Cancel"),
    bind("Enter", Command::Activate, "Press focused button"),
    bind("Tab", Command::CycleForward, "Next button"),
    bind("Shift+Tab", Command::CycleBackward, "Previous button"),
];

#[must_use]
pub const fn bindings(scope: KeyScope) -> &'static [Binding] {
    match scope {
        KeyScope::List => LIST_BINDINGS,
        KeyScope::Detail => DETAIL_BINDINGS,
        KeyScope::Confirm => CONFIRM_BINDINGS,
    }
}

/// Expand a binding label to the key codes it matches.
///
/// Letters are stored lowercase; lookup folds case so `A` matches `a`.
#[must_use]
pub fn label_to_keycodes(label: &str) -> Vec<KeyCode> {
    match label {
        "Tab" => vec![KeyCode::Tab],
        "Shift+Tab" => vec![KeyCode::BackTab],
        "Esc" => vec![KeyCode::Escape],
        "Enter" => vec![KeyCode::Enter],
        "Up" => vec![KeyCode::Up],
        "Down" => vec![KeyCode::Down],
        "Left" => vec![KeyCode::Left],
        "Right" => vec![KeyCode::Right],
        "Space" => vec![KeyCode::Char(' ')],
        s if s.contains('/') => s
            .split('/')
            .flat_map(|part| label_to_keycodes(part.trim()))
            .collect(),
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => vec![KeyCode::Char(c.to_ascii_lowercase())],
                _ => vec![],
            }
        }
    }
}

/// Look `event` up in the table of `scope`.
///
/// Chords with Ctrl or Alt never resolve: they belong to the host.
#[must_use]
pub fn resolve(scope: KeyScope, event: KeyEvent) -> Option<Command> {
    if !event.modifiers.is_empty() {
        return None;
    }
    let code = event.normalized();
    bindings(scope)
        .iter()
        .find(|b| label_to_keycodes(b.label).contains(&code))
        .map(|b| b.command)
}

/// Keys bound to more than one command inside the same scope.
///
/// Returns `(first_label, second_label, key)` per clash.
#[must_use]
pub fn detect_conflicts(table: &[Binding]) -> Vec<(&'static str, &'static str, KeyCode)> {
    let mut conflicts = Vec::new();
    for (i, a) in table.iter().enumerate() {
        let codes = label_to_keycodes(a.label);
        for b in &table[i + 1..] {
            if a.command == b.command {
                continue;
            }
            for code in label_to_keycodes(b.label) {
                if codes.contains(&code) {
                    conflicts.push((a.label, b.label, code));
                }
            }
        }
    }
    conflicts
}

// ──────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────
