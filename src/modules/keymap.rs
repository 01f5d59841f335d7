// Keyboard dispatch for the tab list.
// One table keyed by (key, modifiers) so "select" and "drag" can never share a chord.

use std::collections::HashMap;
use std::fmt;

use crate::error::KeymapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false, ctrl: false, alt: false, meta: false };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self { key, modifiers: Modifiers::NONE }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (on, name) in [(m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.shift, "Shift"), (m.meta, "Meta")] {
            if on {
                write!(f, "{}+", name)?;
            }
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            key => write!(f, "{:?}", key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Checkbox (bulk close) selection of the focused tab.
    ToggleCheckbox,
    /// Pick up the focused tab when idle, drop it when a keyboard drag is active.
    GrabOrDrop,
    MoveTargetUp,
    MoveTargetDown,
    CancelDrag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<KeyChord, KeyAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(KeyChord::plain(Key::Space), KeyAction::ToggleCheckbox);
        bindings.insert(KeyChord::plain(Key::Enter), KeyAction::GrabOrDrop);
        bindings.insert(KeyChord::plain(Key::ArrowUp), KeyAction::MoveTargetUp);
        bindings.insert(KeyChord::plain(Key::ArrowDown), KeyAction::MoveTargetDown);
        bindings.insert(KeyChord::plain(Key::Escape), KeyAction::CancelDrag);
        Self { bindings }
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, chord: KeyChord, action: KeyAction) -> Result<(), KeymapError> {
        if let Some(existing) = self.bindings.get(&chord) {
            return Err(KeymapError::Conflict {
                chord: chord.to_string(),
                existing: format!("{:?}", existing),
            });
        }
        self.bindings.insert(chord, action);
        Ok(())
    }

    pub fn unbind(&mut self, chord: &KeyChord) -> Option<KeyAction> {
        self.bindings.remove(chord)
    }

    pub fn resolve(&self, chord: &KeyChord) -> Option<KeyAction> {
        self.bindings.get(chord).copied()
    }
}
