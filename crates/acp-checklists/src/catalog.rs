//! Static checklist content.
//!
//! The catalog holds everything the application displays but never changes
//! at runtime: one [`ChecklistDocument`] per aircraft, the fleet performance
//! recap, the passenger briefing card and the useful links. A built-in
//! catalog is embedded in the binary; another one can be loaded from a JSON
//! file named in the configuration.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checklist::ChecklistDocument;
use crate::error::{Error, Result};
use crate::tab::TabId;

/// The catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Fuel quantities for the main and optional secondary tank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelCapacity {
    /// Main tank.
    pub main: String,
    /// Secondary tank, if fitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

/// Fuel consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    /// Per hour.
    pub per_hour: String,
    /// Per minute.
    pub per_minute: String,
}

/// Endurance on the main tank and with every tank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endurance {
    /// Main tank only.
    pub main: String,
    /// All tanks, if there is more than one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

/// A value given for takeoff and for landing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeoffLanding {
    /// Takeoff value.
    pub takeoff: String,
    /// Landing value.
    pub landing: String,
}

/// Performance summary of one aircraft. Display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AircraftRecap {
    /// Aircraft tab.
    pub id: TabId,
    /// Type designation, e.g. `DR400-120`.
    pub short_name: String,
    /// Maximum fuel.
    pub fuel_max: FuelCapacity,
    /// Unusable fuel.
    pub unusable_fuel: FuelCapacity,
    /// Fuel consumption.
    pub consumption: Consumption,
    /// Endurance.
    pub endurance: Endurance,
    /// Maximum demonstrated crosswind.
    pub crosswind: TakeoffLanding,
    /// Takeoff and landing distances.
    pub distances: TakeoffLanding,
    /// Takeoff power setting.
    pub takeoff_power: String,
}

/// The passenger briefing card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    /// Card title.
    pub title: String,
    /// One line per instruction.
    pub items: Vec<String>,
}

/// A useful link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link text.
    pub label: String,
    /// Target URL.
    pub url: String,
}

/// All static content of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    documents: BTreeMap<TabId, ChecklistDocument>,
    #[serde(default)]
    recaps: Vec<AircraftRecap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    briefing: Option<Briefing>,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contact: Option<String>,
}

impl Catalog {
    /// Build a catalog holding only checklist documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the documents fail [`Catalog::validate`].
    pub fn new(documents: impl IntoIterator<Item = (TabId, ChecklistDocument)>) -> Result<Self> {
        let catalog = Self {
            documents: documents.into_iter().collect(),
            recaps: Vec::new(),
            briefing: None,
            links: Vec::new(),
            contact: None,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is invalid.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Load the configured catalog, or the built-in one when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::builtin(),
        }
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading catalog from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse and validate a catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog inconsistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        debug!(
            "Catalog has {} checklists and {} recaps",
            catalog.documents.len(),
            catalog.recaps.len()
        );
        Ok(catalog)
    }

    /// Check cross references.
    ///
    /// # Errors
    ///
    /// Returns an error if a checklist is filed under a fixed view, a title is
    /// empty, or a recap is duplicated or names an aircraft without checklist.
    pub fn validate(&self) -> Result<()> {
        for (tab, document) in &self.documents {
            if !tab.is_aircraft() {
                return Err(Error::catalog(format!(
                    "{tab} is a fixed view and cannot hold a checklist"
                )));
            }
            if document.title.trim().is_empty() {
                return Err(Error::catalog(format!("checklist {tab} has no title")));
            }
            if let Some((index, _)) = document
                .sections
                .iter()
                .enumerate()
                .find(|(_, section)| section.title.trim().is_empty())
            {
                return Err(Error::catalog(format!(
                    "section {index} of {tab} has no title"
                )));
            }
        }

        let mut seen = HashSet::new();
        for recap in &self.recaps {
            if !self.documents.contains_key(&recap.id) {
                return Err(Error::catalog(format!(
                    "recap for unknown aircraft {}",
                    recap.id
                )));
            }
            if !seen.insert(&recap.id) {
                return Err(Error::catalog(format!("duplicate recap for {}", recap.id)));
            }
        }

        Ok(())
    }

    /// The checklist of an aircraft tab.
    #[must_use]
    pub fn document(&self, tab: &TabId) -> Option<&ChecklistDocument> {
        self.documents.get(tab)
    }

    /// The checklist of an aircraft tab, unless it has no section to show.
    #[must_use]
    pub fn checklist(&self, tab: &TabId) -> Option<&ChecklistDocument> {
        self.document(tab).filter(|document| document.has_content())
    }

    /// Check whether `tab` is a fixed view or a documented aircraft.
    #[must_use]
    pub fn contains(&self, tab: &TabId) -> bool {
        !tab.is_aircraft() || self.documents.contains_key(tab)
    }

    /// Aircraft tabs, sorted.
    pub fn aircraft_tabs(&self) -> impl Iterator<Item = &TabId> {
        self.documents.keys()
    }

    /// Every tab in header order: fixed views, then aircraft.
    #[must_use]
    pub fn tabs(&self) -> Vec<TabId> {
        TabId::fixed_views()
            .into_iter()
            .chain(self.aircraft_tabs().cloned())
            .collect()
    }

    /// Tabs that can be picked as favorite: aircraft, then recap and links.
    #[must_use]
    pub fn favorite_options(&self) -> Vec<TabId> {
        self.aircraft_tabs()
            .cloned()
            .chain([TabId::recap(), TabId::links()])
            .collect()
    }

    /// Performance recap of an aircraft.
    #[must_use]
    pub fn recap(&self, tab: &TabId) -> Option<&AircraftRecap> {
        self.recaps.iter().find(|recap| &recap.id == tab)
    }

    /// All performance recaps, in catalog order.
    #[must_use]
    pub fn recaps(&self) -> &[AircraftRecap] {
        &self.recaps
    }

    /// The passenger briefing card.
    #[must_use]
    pub fn briefing(&self) -> Option<&Briefing> {
        self.briefing.as_ref()
    }

    /// Useful links.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Contact e-mail address.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }
}

/// A small two-aircraft catalog shared by unit tests.
#[cfg(test)]
pub(crate) fn sample() -> Catalog {
    use crate::checklist::{ChecklistItem, ChecklistSection};

    let giya = ChecklistDocument::new(
        "Checklist F-GIYA",
        vec![
            ChecklistSection::new(
                "Visite prévol",
                vec![
                    ChecklistItem::checkable("Documents avion"),
                    ChecklistItem::checkable("Carburant"),
                    ChecklistItem::action("Magnétos", "OFF"),
                ],
            ),
            ChecklistSection::new(
                "Mise en route",
                vec![
                    ChecklistItem::note("Frein de parc serré"),
                    ChecklistItem::checkable("Pompe électrique"),
                    ChecklistItem::checkable("Démarreur"),
                    ChecklistItem::checkable("Pression d'huile"),
                ],
            ),
        ],
    );
    let bubk = ChecklistDocument::new(
        "Checklist F-BUBK",
        vec![ChecklistSection::new(
            "Avant décollage",
            vec![
                ChecklistItem::checkable("Commandes libres"),
                ChecklistItem::checkable("Volets"),
                ChecklistItem::checkable("Transpondeur"),
            ],
        )],
    );

    Catalog::new([(TabId::new("GIYA"), giya), (TabId::new("BUBK"), bubk)])
        .expect("sample catalog is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.aircraft_tabs().count() > 0);
        for tab in catalog.aircraft_tabs() {
            let document = catalog.document(tab).unwrap();
            assert!(document.has_content(), "{tab} has no sections");
            assert!(!document.checkable_keys().is_empty());
        }
        assert!(catalog.briefing().is_some());
        assert!(!catalog.links().is_empty());
    }

    #[test]
    fn test_checklist_skips_empty_documents() {
        let catalog = Catalog::new([
            (TabId::new("GKQA"), ChecklistDocument::new("Checklist F-GKQA", vec![])),
            (TabId::new("GIYA"), sample().document(&TabId::new("GIYA")).unwrap().clone()),
        ])
        .unwrap();

        assert!(catalog.document(&TabId::new("GKQA")).is_some());
        assert!(catalog.checklist(&TabId::new("GKQA")).is_none());
        assert!(catalog.checklist(&TabId::new("GIYA")).is_some());
        assert!(catalog.contains(&TabId::new("GKQA")));
    }

    #[test]
    fn test_builtin_recaps_cover_every_aircraft() {
        let catalog = Catalog::builtin().unwrap();
        for tab in catalog.aircraft_tabs() {
            assert!(catalog.recap(tab).is_some(), "no recap for {tab}");
        }
    }

    #[test]
    fn test_contains() {
        let catalog = sample();
        assert!(catalog.contains(&TabId::new("GIYA")));
        assert!(catalog.contains(&TabId::notice()));
        assert!(catalog.contains(&TabId::favorites()));
        assert!(!catalog.contains(&TabId::new("ZZZZ")));
    }

    #[test]
    fn test_tabs_order() {
        let tabs = sample().tabs();
        let names: Vec<&str> = tabs.iter().map(TabId::as_str).collect();
        assert_eq!(names, vec!["LIENS", "NOTICE", "FAVORI", "RECAP", "BUBK", "GIYA"]);
    }

    #[test]
    fn test_favorite_options() {
        let options = sample().favorite_options();
        let names: Vec<&str> = options.iter().map(TabId::as_str).collect();
        assert_eq!(names, vec!["BUBK", "GIYA", "RECAP", "LIENS"]);
    }

    #[test]
    fn test_rejects_checklist_under_fixed_view() {
        let document = ChecklistDocument::new("Notice", Vec::new());
        let err = Catalog::new([(TabId::notice(), document)]).unwrap_err();
        assert!(err.to_string().contains("fixed view"));
    }

    #[test]
    fn test_rejects_untitled_checklist() {
        let document = ChecklistDocument::new("  ", Vec::new());
        assert!(Catalog::new([(TabId::new("GKQA"), document)]).is_err());
    }

    #[test]
    fn test_rejects_recap_without_checklist() {
        let json = r#"{
            "documents": {"GIYA": {"title": "Checklist F-GIYA", "sections": []}},
            "recaps": [{
                "id": "HPPL",
                "short_name": "DR400",
                "fuel_max": {"main": "110 L"},
                "unusable_fuel": {"main": "1 L"},
                "consumption": {"per_hour": "25 L/h", "per_minute": "0.42 L/min"},
                "endurance": {"main": "4h"},
                "crosswind": {"takeoff": "22 kt", "landing": "22 kt"},
                "distances": {"takeoff": "520 m", "landing": "470 m"},
                "takeoff_power": "2300 rpm"
            }]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("HPPL"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Catalog::load_from(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, Error::CatalogRead { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "acp_checklists_catalog_{}.json",
            std::process::id()
        ));
        let json = serde_json::to_string(&sample()).unwrap();
        std::fs::write(&path, json).unwrap();

        let catalog = Catalog::load(Some(&path)).unwrap();
        assert_eq!(catalog, sample());

        let _ = std::fs::remove_file(&path);
    }
}
