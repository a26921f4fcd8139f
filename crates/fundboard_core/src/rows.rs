//! Selection, pin, and expand state keyed by derived row identity, plus the
//! keyboard contract of the results table.

use std::collections::BTreeSet;

use crate::record::RowKey;
use crate::Msg;

/// Per-row view state: one keyboard cursor, one sticky pin, any number of
/// expanded detail rows. Pinning implies expansion; the inverse does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowState {
    pub selected: Option<RowKey>,
    pub pinned: Option<RowKey>,
    pub expanded: BTreeSet<RowKey>,
}

impl RowState {
    /// Toggle inline detail visibility. Collapsing a pinned row drops the pin
    /// with it in the same action.
    pub fn toggle_expanded(&mut self, key: &RowKey) {
        if self.pinned.as_ref() == Some(key) {
            self.pinned = None;
            self.expanded.remove(key);
        } else if !self.expanded.remove(key) {
            self.expanded.insert(key.clone());
        }
    }

    /// Toggle the sticky pin. Pinning expands the row and moves the cursor to
    /// it; un-pinning leaves expansion exactly as last set.
    pub fn toggle_pinned(&mut self, key: &RowKey) {
        if self.pinned.as_ref() == Some(key) {
            self.pinned = None;
        } else {
            self.pinned = Some(key.clone());
            self.expanded.insert(key.clone());
            self.selected = Some(key.clone());
        }
    }

    pub fn is_expanded(&self, key: &RowKey) -> bool {
        self.expanded.contains(key)
    }

    /// Drop the pin when its record has left the full record set (not merely
    /// the filtered view).
    pub fn prune_missing(&mut self, all_keys: &BTreeSet<RowKey>) {
        if let Some(pinned) = &self.pinned {
            if !all_keys.contains(pinned) {
                self.pinned = None;
            }
        }
    }

    /// Re-anchor the cursor against the current filtered view: an empty view
    /// clears it; a cursor pointing outside the view snaps to the first
    /// visible row. No selection stays no selection.
    pub fn sync_selection(&mut self, visible: &[RowKey]) {
        match &self.selected {
            _ if visible.is_empty() => self.selected = None,
            Some(key) if !visible.contains(key) => {
                self.selected = visible.first().cloned();
            }
            _ => {}
        }
    }

    /// Move the cursor by `delta` rows, clamped at both ends (no wraparound).
    /// With nothing selected the first visible row becomes the cursor.
    pub fn move_selection(&mut self, delta: isize, visible: &[RowKey]) {
        if visible.is_empty() {
            self.selected = None;
            return;
        }
        let position = self
            .selected
            .as_ref()
            .and_then(|key| visible.iter().position(|k| k == key));
        let next = match position {
            Some(index) => {
                (index as isize + delta).clamp(0, visible.len() as isize - 1) as usize
            }
            None => 0,
        };
        self.selected = Some(visible[next].clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Char(char),
}

/// One key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }
}

/// Translate a key press into a table message. Returns `None` while a text
/// entry has focus and for any modifier chord, so browser-style shortcuts are
/// never hijacked.
pub fn key_message(press: KeyPress, text_entry_focused: bool) -> Option<Msg> {
    if text_entry_focused || press.ctrl || press.alt || press.meta {
        return None;
    }
    match press.key {
        Key::Down => Some(Msg::SelectionMoved(1)),
        Key::Up => Some(Msg::SelectionMoved(-1)),
        Key::Enter => Some(Msg::PinSelected),
        Key::Char('/') => Some(Msg::SearchFocused),
        Key::Char('e') => Some(Msg::EvidenceToggled),
        Key::Char(_) => None,
    }
}
