//! Key bindings: `ctrl-e`, `alt-enter`, `btab`, ... mapped to actions.

use crate::session::Command;
use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// What a key press does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run(Command),
    /// Delete the character before the cursor
    DeleteChar,
    /// Delete the word before the cursor
    DeleteWord,
    ClearQuery,
}

type Key = (KeyModifiers, KeyCode);

#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Key, Action>,
}

const DEFAULT_BINDINGS: [(&str, Action); 14] = [
    ("enter", Action::Run(Command::AcceptOne)),
    ("alt-enter", Action::Run(Command::AcceptAll)),
    ("tab", Action::Run(Command::NarrowToMatches)),
    ("btab", Action::Run(Command::ResetUniverse)),
    ("ctrl-e", Action::Run(Command::Edit)),
    ("ctrl-y", Action::Run(Command::EmitOne)),
    ("alt-y", Action::Run(Command::EmitAll)),
    ("ctrl-o", Action::Run(Command::AcceptOnly)),
    ("esc", Action::Run(Command::QuitWithCode(1))),
    ("ctrl-c", Action::Run(Command::QuitWithCode(130))),
    ("bspace", Action::DeleteChar),
    ("ctrl-h", Action::DeleteChar),
    ("ctrl-w", Action::DeleteWord),
    ("ctrl-u", Action::ClearQuery),
];

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::with_capacity(DEFAULT_BINDINGS.len());
        for (spec, action) in DEFAULT_BINDINGS {
            match parse_key(spec) {
                Ok(key) => {
                    bindings.insert(key, action);
                }
                Err(err) => warn!(spec, error = %err, "skipping default binding"),
            }
        }
        Self { bindings }
    }
}

impl Keymap {
    /// Default bindings with `overrides` applied on top
    pub fn with_overrides(overrides: &BTreeMap<String, Command>) -> Result<Self> {
        let mut keymap = Self::default();
        for (spec, command) in overrides {
            keymap.bindings.insert(parse_key(spec)?, Action::Run(*command));
        }
        Ok(keymap)
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<Action> {
        let key = normalize(event.modifiers, event.code);
        self.bindings.get(&key).copied()
    }
}

/// Terminals disagree on whether shifted characters carry SHIFT. Plain and
/// shifted characters keep their case; with ctrl or alt the case is dropped.
fn normalize(modifiers: KeyModifiers, code: KeyCode) -> Key {
    let chorded = modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match code {
        KeyCode::Char(c) if chorded => {
            (modifiers - KeyModifiers::SHIFT, KeyCode::Char(c.to_ascii_lowercase()))
        }
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::SHIFT) => {
            (modifiers - KeyModifiers::SHIFT, KeyCode::Char(c.to_ascii_uppercase()))
        }
        KeyCode::BackTab => (modifiers - KeyModifiers::SHIFT, KeyCode::BackTab),
        _ => (modifiers, code),
    }
}

/// Parse a key spec: optional `ctrl-`/`alt-`/`shift-` prefixes and a key name
pub fn parse_key(spec: &str) -> Result<Key> {
    let lowered = spec.trim().to_ascii_lowercase();
    let mut modifiers = KeyModifiers::NONE;
    let mut rest = lowered.as_str();

    loop {
        if let Some(tail) = rest.strip_prefix("ctrl-") {
            modifiers |= KeyModifiers::CONTROL;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("alt-") {
            modifiers |= KeyModifiers::ALT;
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("shift-") {
            modifiers |= KeyModifiers::SHIFT;
            rest = tail;
        } else {
            break;
        }
    }

    let code = match rest {
        "enter" | "return" => KeyCode::Enter,
        "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "btab" => KeyCode::BackTab,
        "esc" | "escape" => KeyCode::Esc,
        "bspace" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                (Some('f'), Some(_)) => match other[1..].parse::<u8>() {
                    Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
                    _ => bail!("unknown key: {}", spec),
                },
                _ => bail!("unknown key: {}", spec),
            }
        }
    };

    Ok(normalize(modifiers, code))
}
