//! Checklist progress and skip detection.
//!
//! [`classify`] derives, from the ordered checkable keys of a document and the
//! current [`CheckedState`], which items were skipped and which item is
//! expected next. It is a pure function and is re-run after every mutation;
//! nothing here is cached.
//!
//! An item is *skipped* when it is unchecked and lies before the furthest
//! checked item. The *next* item is the one right after the furthest checked
//! item, unless it is itself checked or skipped. Skipped always wins over
//! next, both in classification and in scroll priority.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::checklist::{CheckedState, ItemKey};

/// Highlight of a single checkable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// No highlight.
    #[default]
    None,
    /// The suggested next item.
    Next,
    /// Unchecked although a later item is checked.
    Skipped,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    highlights: BTreeMap<ItemKey, Highlight>,
    skipped_count: usize,
    first_skipped: Option<ItemKey>,
    next: Option<ItemKey>,
    checked: usize,
    total: usize,
}

impl Progress {
    /// Highlight of `key`; keys without a classification read as
    /// [`Highlight::None`].
    #[must_use]
    pub fn highlight(&self, key: ItemKey) -> Highlight {
        self.highlights.get(&key).copied().unwrap_or_default()
    }

    /// Number of skipped items.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    /// The skipped items in document order.
    pub fn skipped(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.highlights
            .iter()
            .filter(|(_, highlight)| **highlight == Highlight::Skipped)
            .map(|(key, _)| *key)
    }

    /// The first skipped item.
    #[must_use]
    pub fn first_skipped(&self) -> Option<ItemKey> {
        self.first_skipped
    }

    /// The suggested next item.
    #[must_use]
    pub fn next(&self) -> Option<ItemKey> {
        self.next
    }

    /// Item the view should bring into sight: the first skipped item, else
    /// the next one.
    #[must_use]
    pub fn scroll_target(&self) -> Option<ItemKey> {
        self.first_skipped.or(self.next)
    }

    /// Number of checked items.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Number of checkable items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Check whether every checkable item is checked.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.checked == self.total
    }
}

/// Classify every checkable item of a document.
///
/// `keys` is the document's checkable sequence in completion order.
#[must_use]
pub fn classify(keys: &[ItemKey], state: &CheckedState) -> Progress {
    let checked: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| state.is_checked(**key))
        .map(|(position, _)| position)
        .collect();

    let mut skipped = vec![false; keys.len()];

    let candidate = match (checked.first(), checked.last()) {
        (Some(&first), Some(&last)) => {
            // Started mid-checklist.
            skipped[..first].fill(true);
            // Gaps between checked items.
            for pair in checked.windows(2) {
                for position in pair[0] + 1..pair[1] {
                    skipped[position] = !state.is_checked(keys[position]);
                }
            }
            last + 1
        }
        _ => 0,
    };

    let mut progress = Progress {
        checked: checked.len(),
        total: keys.len(),
        ..Progress::default()
    };

    for (position, key) in keys.iter().enumerate() {
        if skipped[position] {
            progress.highlights.insert(*key, Highlight::Skipped);
            progress.skipped_count += 1;
            progress.first_skipped.get_or_insert(*key);
        }
    }

    if let Some(key) = keys.get(candidate) {
        if !skipped[candidate] && !state.is_checked(*key) {
            progress.highlights.insert(*key, Highlight::Next);
            progress.next = Some(*key);
        }
    }

    progress
}

/// Checkbox status of a whole section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// The section has no checkable item and shows no section checkbox.
    Empty,
    /// No item checked.
    Unchecked,
    /// Some but not all items checked (indeterminate checkbox).
    Partial,
    /// Every item checked.
    Complete,
}

impl SectionStatus {
    /// Value the section checkbox sets when clicked.
    #[must_use]
    pub fn toggle_target(self) -> bool {
        self != Self::Complete
    }
}

/// Checkbox status of the section holding `section_keys`.
#[must_use]
pub fn section_status(section_keys: &[ItemKey], state: &CheckedState) -> SectionStatus {
    let checked = section_keys
        .iter()
        .filter(|key| state.is_checked(**key))
        .count();
    match checked {
        _ if section_keys.is_empty() => SectionStatus::Empty,
        0 => SectionStatus::Unchecked,
        n if n == section_keys.len() => SectionStatus::Complete,
        _ => SectionStatus::Partial,
    }
}
