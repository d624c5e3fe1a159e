//! Checklist data model.
//!
//! This module defines the static structure of a checklist (documents,
//! sections, items) and the dynamic checked-state that is joined to it
//! through [`ItemKey`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How an item is presented and whether it takes part in the checkable
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A step acknowledged with a checkbox.
    Checkable,
    /// A step whose expected value is displayed instead of a checkbox.
    Action(String),
    /// Informational text, never checkable.
    Note {
        /// Optional second line shown under the note.
        detail: Option<String>,
    },
}

/// One procedural step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItem", into = "RawItem")]
pub struct ChecklistItem {
    /// Display text.
    pub text: String,
    /// Presentation kind.
    pub kind: ItemKind,
    /// Highlight the text as a warning.
    pub warning: bool,
}

impl ChecklistItem {
    /// A checkable item.
    #[must_use]
    pub fn checkable(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ItemKind::Checkable,
            warning: false,
        }
    }

    /// An item displaying a fixed action value.
    #[must_use]
    pub fn action(text: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ItemKind::Action(action.into()),
            warning: false,
        }
    }

    /// An informational note.
    #[must_use]
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ItemKind::Note { detail: None },
            warning: false,
        }
    }

    /// Check whether the item is part of the checkable sequence.
    #[must_use]
    pub fn is_checkable(&self) -> bool {
        match self.kind {
            ItemKind::Checkable => true,
            ItemKind::Action(_) | ItemKind::Note { .. } => false,
        }
    }
}

/// Catalog representation of an item.
#[derive(Clone, Serialize, Deserialize)]
struct RawItem {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    note: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    warning: bool,
}

impl From<RawItem> for ChecklistItem {
    fn from(raw: RawItem) -> Self {
        let kind = match (raw.note, raw.action) {
            (true, detail) => ItemKind::Note { detail },
            (false, Some(action)) => ItemKind::Action(action),
            (false, None) => ItemKind::Checkable,
        };
        Self {
            text: raw.text,
            kind,
            warning: raw.warning,
        }
    }
}

impl From<ChecklistItem> for RawItem {
    fn from(item: ChecklistItem) -> Self {
        let (action, note) = match item.kind {
            ItemKind::Checkable => (None, false),
            ItemKind::Action(action) => (Some(action), false),
            ItemKind::Note { detail } => (detail, true),
        };
        Self {
            text: item.text,
            action,
            note,
            warning: item.warning,
        }
    }
}

/// An ordered, named group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    /// Section title.
    pub title: String,
    /// Items in completion order.
    pub items: Vec<ChecklistItem>,
}

impl ChecklistSection {
    /// Create a section.
    #[must_use]
    pub fn new(title: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// The checklist of one aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDocument {
    /// Document title.
    pub title: String,
    /// Sections in completion order.
    #[serde(default)]
    pub sections: Vec<ChecklistSection>,
    /// Link to the official PDF of the checklist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl ChecklistDocument {
    /// Create a document without a reference URL.
    #[must_use]
    pub fn new(title: impl Into<String>, sections: Vec<ChecklistSection>) -> Self {
        Self {
            title: title.into(),
            sections,
            reference_url: None,
        }
    }

    /// Check whether the document has anything to display.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.sections.is_empty()
    }

    /// The ordered sequence of checkable keys.
    #[must_use]
    pub fn checkable_keys(&self) -> Vec<ItemKey> {
        (0..self.sections.len())
            .flat_map(|section| self.section_keys(section))
            .collect()
    }

    /// The checkable keys of one section, empty if the section doesn't exist.
    #[must_use]
    pub fn section_keys(&self, section: usize) -> Vec<ItemKey> {
        self.sections
            .get(section)
            .map(|s| {
                s.items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.is_checkable())
                    .map(|(index, _)| ItemKey::new(section, index))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up an item by key.
    #[must_use]
    pub fn item(&self, key: ItemKey) -> Option<&ChecklistItem> {
        self.sections
            .get(key.section)
            .and_then(|s| s.items.get(key.item))
    }

    /// Check whether `key` names a checkable item of this document.
    #[must_use]
    pub fn is_checkable(&self, key: ItemKey) -> bool {
        self.item(key).is_some_and(ChecklistItem::is_checkable)
    }
}

/// Identifies a checkable item by its position.
///
/// Displayed and parsed as `<section>-<item>`, both zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemKey {
    /// Section position in the document.
    pub section: usize,
    /// Item position within the section.
    pub item: usize,
}

impl ItemKey {
    /// Create a key.
    #[must_use]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.section, self.item)
    }
}

impl FromStr for ItemKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidItemKey(s.to_string());
        let (section, item) = s.trim().split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            section: section.parse().map_err(|_| invalid())?,
            item: item.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ItemKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemKey> for String {
    fn from(key: ItemKey) -> Self {
        key.to_string()
    }
}

/// Which checkable items of one tab are checked.
///
/// A missing key reads as unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CheckedState(BTreeMap<ItemKey, bool>);

impl CheckedState {
    /// A state with every given key unchecked.
    #[must_use]
    pub fn all_false(keys: &[ItemKey]) -> Self {
        Self(keys.iter().map(|key| (*key, false)).collect())
    }

    /// Check whether `key` is checked.
    #[must_use]
    pub fn is_checked(&self, key: ItemKey) -> bool {
        self.0.get(&key).copied().unwrap_or(false)
    }

    /// Set the value of `key`.
    pub fn set(&mut self, key: ItemKey, checked: bool) {
        self.0.insert(key, checked);
    }

    /// Flip the value of `key`, returning the new value.
    pub fn toggle(&mut self, key: ItemKey) -> bool {
        let checked = !self.is_checked(key);
        self.set(key, checked);
        checked
    }

    /// Check whether at least one item is checked.
    #[must_use]
    pub fn any_checked(&self) -> bool {
        self.0.values().any(|checked| *checked)
    }

    /// Number of checked items.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.0.values().filter(|checked| **checked).count()
    }

    /// The checked keys in document order.
    pub fn checked_keys(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.0
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(key, _)| *key)
    }

    /// Number of recorded keys (checked or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether no key is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> ChecklistDocument {
        ChecklistDocument::new(
            "Checklist F-TEST",
            vec![
                ChecklistSection::new(
                    "Avant mise en route",
                    vec![
                        ChecklistItem::checkable("Documents avion"),
                        ChecklistItem::action("Magnétos", "OFF"),
                        ChecklistItem::checkable("Verrière"),
                    ],
                ),
                ChecklistSection::new(
                    "Mise en route",
                    vec![
                        ChecklistItem::note("Moteur chaud : pas d'injection"),
                        ChecklistItem::checkable("Pompe électrique"),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_checkable_keys_skip_actions_and_notes() {
        let keys = sample_document().checkable_keys();
        assert_eq!(
            keys,
            vec![ItemKey::new(0, 0), ItemKey::new(0, 2), ItemKey::new(1, 1)]
        );
    }

    #[test]
    fn test_section_keys_out_of_range() {
        assert!(sample_document().section_keys(5).is_empty());
    }

    #[test]
    fn test_is_checkable() {
        let doc = sample_document();
        assert!(doc.is_checkable(ItemKey::new(0, 0)));
        assert!(!doc.is_checkable(ItemKey::new(0, 1)));
        assert!(!doc.is_checkable(ItemKey::new(1, 0)));
        assert!(!doc.is_checkable(ItemKey::new(9, 9)));
    }

    #[test]
    fn test_item_key_parse() {
        assert_eq!("2-7".parse::<ItemKey>().unwrap(), ItemKey::new(2, 7));
        assert_eq!(" 0-0 ".parse::<ItemKey>().unwrap(), ItemKey::new(0, 0));
        assert!("2".parse::<ItemKey>().is_err());
        assert!("a-1".parse::<ItemKey>().is_err());
        assert!("1--1".parse::<ItemKey>().is_err());
    }

    #[test]
    fn test_item_key_order_follows_document() {
        assert!(ItemKey::new(0, 9) < ItemKey::new(1, 0));
        assert!(ItemKey::new(1, 0) < ItemKey::new(1, 1));
    }

    #[test]
    fn test_raw_item_kinds() {
        let json = r#"[
            {"text": "Essence", "action": "Ouvert"},
            {"text": "Attention au vent", "note": true, "action": "> 15 kt"},
            {"text": "Avion à laver", "warning": true}
        ]"#;
        let items: Vec<ChecklistItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items[0].kind, ItemKind::Action("Ouvert".to_string()));
        assert_eq!(
            items[1].kind,
            ItemKind::Note {
                detail: Some("> 15 kt".to_string())
            }
        );
        assert_eq!(items[2].kind, ItemKind::Checkable);
        assert!(items[2].warning);
        assert!(!items[0].warning);
    }

    #[test]
    fn test_item_serializes_back_to_catalog_shape() {
        let json = serde_json::to_string(&ChecklistItem::action("Flaps", "Rentrés")).unwrap();
        assert_eq!(json, r#"{"text":"Flaps","action":"Rentrés"}"#);
    }

    #[test]
    fn test_checked_state_defaults_to_false() {
        let mut state = CheckedState::default();
        let key = ItemKey::new(0, 0);
        assert!(!state.is_checked(key));
        assert!(!state.any_checked());

        assert!(state.toggle(key));
        assert!(state.is_checked(key));
        assert_eq!(state.checked_count(), 1);

        assert!(!state.toggle(key));
        assert!(!state.any_checked());
    }

    #[test]
    fn test_checked_state_all_false() {
        let keys = sample_document().checkable_keys();
        let state = CheckedState::all_false(&keys);
        assert_eq!(state.len(), 3);
        assert_eq!(state.checked_count(), 0);
    }

    #[test]
    fn test_checked_state_serializes_as_map() {
        let mut state = CheckedState::default();
        state.set(ItemKey::new(1, 2), true);
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"1-2":true}"#);
    }
}
