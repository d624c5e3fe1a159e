//! Plain-text and JSON presentation.
//!
//! Every view is a small [`fmt::Display`] wrapper so the CLI can print it
//! directly or turn it into a `String`.
//!
//! Checklist lines look like this:
//!
//! ```text
//! [-] 1. Mise en route
//!   !! [ ] 1-1 Pompe électrique
//!      [x] 1-2 Démarreur
//!   >> [ ] 1-3 Pression d'huile
//! ```
//!
//! `>>` marks the suggested next item and `!!` a skipped one.

use std::fmt;

use serde::Serialize;

use crate::app::{ChecklistScreen, Screen};
use crate::catalog::{AircraftRecap, Briefing, Link};
use crate::checklist::{ChecklistItem, ItemKey, ItemKind};
use crate::error::Result;
use crate::progress::{Highlight, SectionStatus};
use crate::tab::TabId;

/// Banner shown above every checklist.
pub const MANUAL_BANNER: &str = "Not a substitute for the flight manual";

/// Any screen as text.
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a>(pub &'a Screen<'a>);

impl fmt::Display for ScreenView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Screen::Links { links, contact } => write_links(f, links, *contact),
            Screen::Notice => write_notice(f),
            Screen::Favorites { current, options } => {
                write_favorites(f, current.as_ref(), options)
            }
            Screen::Recap { recaps, briefing } => {
                for recap in *recaps {
                    write!(f, "{}", RecapCard(recap))?;
                    writeln!(f)?;
                }
                if let Some(briefing) = briefing {
                    write!(f, "{}", BriefingView(briefing))?;
                }
                Ok(())
            }
            Screen::Checklist(checklist) => write!(f, "{}", ChecklistView(checklist)),
            Screen::NotFound(tab) => writeln!(f, "No checklist found for {tab}."),
        }
    }
}

/// A checklist with its highlights.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistView<'a>(pub &'a ChecklistScreen<'a>);

impl fmt::Display for ChecklistView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let screen = self.0;
        let document = screen.document;

        writeln!(f, "== {} ==", document.title)?;
        if let Some(url) = &document.reference_url {
            writeln!(f, "   {url}")?;
        }
        writeln!(f, "   {MANUAL_BANNER}")?;
        writeln!(
            f,
            "   {}/{} checked",
            screen.progress.checked(),
            screen.progress.total()
        )?;
        if let Some(recap) = screen.recap {
            writeln!(f)?;
            write!(f, "{}", RecapCard(recap))?;
        }

        for (index, section) in document.sections.iter().enumerate() {
            writeln!(f)?;
            let status = screen
                .sections
                .get(index)
                .copied()
                .unwrap_or(SectionStatus::Empty);
            writeln!(f, "{} {}. {}", section_glyph(status), index, section.title)?;

            for (position, item) in section.items.iter().enumerate() {
                let key = ItemKey::new(index, position);
                write_item(
                    f,
                    key,
                    item,
                    screen.state.is_checked(key),
                    screen.progress.highlight(key),
                )?;
            }
        }

        if let Some(count) = screen.warning {
            writeln!(f)?;
            writeln!(f, "{}", WarningLine(count))?;
        }
        if screen.reset_pending {
            writeln!(f)?;
            writeln!(
                f,
                "Reset the checklist? Every checked item will be cleared. [yes/no]"
            )?;
        }
        Ok(())
    }
}

fn section_glyph(status: SectionStatus) -> &'static str {
    match status {
        SectionStatus::Empty => "   ",
        SectionStatus::Unchecked => "[ ]",
        SectionStatus::Partial => "[-]",
        SectionStatus::Complete => "[x]",
    }
}

fn write_item(
    f: &mut fmt::Formatter<'_>,
    key: ItemKey,
    item: &ChecklistItem,
    checked: bool,
    highlight: Highlight,
) -> fmt::Result {
    let marker = match highlight {
        Highlight::None => "  ",
        Highlight::Next => ">>",
        Highlight::Skipped => "!!",
    };
    let warning = if item.warning { " (!)" } else { "" };

    match &item.kind {
        ItemKind::Checkable => {
            let glyph = if checked { "[x]" } else { "[ ]" };
            writeln!(f, "  {marker} {glyph} {key} {}{warning}", item.text)
        }
        ItemKind::Action(action) => {
            writeln!(f, "         {key} {} .... {action}{warning}", item.text)
        }
        ItemKind::Note { detail } => {
            writeln!(f, "         (i) {}{warning}", item.text)?;
            if let Some(detail) = detail {
                writeln!(f, "             {detail}")?;
            }
            Ok(())
        }
    }
}

/// The skipped-items warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningLine(pub usize);

impl fmt::Display for WarningLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.0 > 1 { "s" } else { "" };
        write!(f, "Attention, {} item{plural} not verified!", self.0)
    }
}

/// One aircraft's performance card.
#[derive(Debug, Clone, Copy)]
pub struct RecapCard<'a>(pub &'a AircraftRecap);

impl fmt::Display for RecapCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recap = self.0;
        writeln!(f, "F-{} ({})", recap.id, recap.short_name)?;
        writeln!(
            f,
            "  Fuel max        {}",
            fuel(&recap.fuel_max.main, recap.fuel_max.secondary.as_deref())
        )?;
        writeln!(
            f,
            "  Unusable fuel   {}",
            fuel(&recap.unusable_fuel.main, recap.unusable_fuel.secondary.as_deref())
        )?;
        writeln!(
            f,
            "  Consumption     {} ({})",
            recap.consumption.per_hour, recap.consumption.per_minute
        )?;
        match &recap.endurance.total {
            Some(total) => writeln!(
                f,
                "  Endurance       {} (total {total})",
                recap.endurance.main
            )?,
            None => writeln!(f, "  Endurance       {}", recap.endurance.main)?,
        }
        writeln!(
            f,
            "  Crosswind       takeoff {} / landing {}",
            recap.crosswind.takeoff, recap.crosswind.landing
        )?;
        writeln!(
            f,
            "  Distances       takeoff {} / landing {}",
            recap.distances.takeoff, recap.distances.landing
        )?;
        writeln!(f, "  Takeoff power   {}", recap.takeoff_power)
    }
}

fn fuel(main: &str, secondary: Option<&str>) -> String {
    match secondary {
        Some(secondary) => format!("{main} + {secondary}"),
        None => main.to_string(),
    }
}

/// The fleet recap as a table, one column per aircraft.
#[derive(Debug, Clone, Copy)]
pub struct RecapTable<'a>(pub &'a [AircraftRecap]);

impl fmt::Display for RecapTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let recaps = self.0;
        let rows: Vec<(&str, Vec<String>)> = vec![
            ("", recaps.iter().map(|r| format!("F-{}", r.id)).collect()),
            ("Type", recaps.iter().map(|r| r.short_name.clone()).collect()),
            (
                "Fuel max",
                recaps
                    .iter()
                    .map(|r| fuel(&r.fuel_max.main, r.fuel_max.secondary.as_deref()))
                    .collect(),
            ),
            (
                "Unusable fuel",
                recaps
                    .iter()
                    .map(|r| fuel(&r.unusable_fuel.main, r.unusable_fuel.secondary.as_deref()))
                    .collect(),
            ),
            (
                "Consumption",
                recaps.iter().map(|r| r.consumption.per_hour.clone()).collect(),
            ),
            (
                "Endurance",
                recaps.iter().map(|r| r.endurance.main.clone()).collect(),
            ),
            (
                "Crosswind",
                recaps.iter().map(|r| r.crosswind.takeoff.clone()).collect(),
            ),
            (
                "Takeoff dist.",
                recaps.iter().map(|r| r.distances.takeoff.clone()).collect(),
            ),
            (
                "Landing dist.",
                recaps.iter().map(|r| r.distances.landing.clone()).collect(),
            ),
            (
                "Takeoff power",
                recaps.iter().map(|r| r.takeoff_power.clone()).collect(),
            ),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..recaps.len())
            .map(|column| {
                rows.iter()
                    .map(|(_, cells)| cells[column].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (label, cells) in &rows {
            write!(f, "{label:<label_width$}")?;
            for (cell, width) in cells.iter().zip(widths.iter().copied()) {
                write!(f, "  {cell:<width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The passenger briefing card.
#[derive(Debug, Clone, Copy)]
pub struct BriefingView<'a>(pub &'a Briefing);

impl fmt::Display for BriefingView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0.title)?;
        for item in &self.0.items {
            writeln!(f, "  - {item}")?;
        }
        Ok(())
    }
}

/// The first-launch welcome card.
#[derive(Debug, Clone, Copy, Default)]
pub struct WelcomeView;

impl fmt::Display for WelcomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome to the ACP checklists!")?;
        writeln!(
            f,
            "Check items as you go: the next item is marked >> and skipped ones !!."
        )?;
        writeln!(f, "Pick a favorite aircraft to open it directly next time.")
    }
}

fn write_notice(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "== Usage notice ==")?;
    writeln!(f, "Quick access to the interactive checklists of the club aircraft.")?;
    writeln!(f)?;
    writeln!(f, "  - Tabs: open an aircraft or a view with `tab <ID>`.")?;
    writeln!(f, "  - Checklists: check items in order; the next item is marked >>.")?;
    writeln!(
        f,
        "  - Warnings: an item left unchecked before a checked one is marked !!"
    )?;
    writeln!(f, "    and a warning line shows how many were skipped.")?;
    writeln!(
        f,
        "  - Favorite: the favorite aircraft opens at launch (`fav <ID>`)."
    )?;
    writeln!(f, "  - Recap: performance of the whole fleet side by side.")?;
    writeln!(
        f,
        "  - Reset: clears every checked item of a checklist after confirmation."
    )?;
    writeln!(f)?;
    writeln!(
        f,
        "This tool is an aid and does not replace the official aircraft documents."
    )
}

fn write_links(f: &mut fmt::Formatter<'_>, links: &[Link], contact: Option<&str>) -> fmt::Result {
    writeln!(f, "== Useful links ==")?;
    for link in links {
        writeln!(f, "  {}: {}", link.label, link.url)?;
    }
    if let Some(contact) = contact {
        writeln!(f)?;
        writeln!(f, "Contact: {contact}")?;
    }
    Ok(())
}

fn write_favorites(
    f: &mut fmt::Formatter<'_>,
    current: Option<&TabId>,
    options: &[TabId],
) -> fmt::Result {
    writeln!(f, "== Favorite ==")?;
    match current {
        Some(tab) => writeln!(f, "Current favorite: {tab}")?,
        None => writeln!(f, "No favorite set.")?,
    }
    writeln!(f)?;
    for option in options {
        let mark = if current == Some(option) { "*" } else { " " };
        writeln!(f, "  {mark} {option}")?;
    }
    Ok(())
}

/// Machine-readable progress of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    /// Aircraft tab.
    pub tab: TabId,
    /// Checklist title.
    pub title: String,
    /// Number of checked items.
    pub checked: usize,
    /// Number of checkable items.
    pub total: usize,
    /// Every checkable item is checked.
    pub complete: bool,
    /// Suggested next item.
    pub next: Option<ItemKey>,
    /// Skipped items, in order.
    pub skipped: Vec<ItemKey>,
    /// Checked items, in order.
    pub checked_items: Vec<ItemKey>,
    /// Per-section status.
    pub sections: Vec<SectionReport>,
}

/// Status of one section in a [`ProgressReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    /// Section title.
    pub title: String,
    /// Checkbox status.
    pub status: SectionStatus,
}

impl ProgressReport {
    /// Build the report of a checklist screen.
    #[must_use]
    pub fn new(screen: &ChecklistScreen<'_>) -> Self {
        Self {
            tab: screen.tab.clone(),
            title: screen.document.title.clone(),
            checked: screen.progress.checked(),
            total: screen.progress.total(),
            complete: screen.progress.is_complete(),
            next: screen.progress.next(),
            skipped: screen.progress.skipped().collect(),
            checked_items: screen.state.checked_keys().collect(),
            sections: screen
                .document
                .sections
                .iter()
                .zip(&screen.sections)
                .map(|(section, status)| SectionReport {
                    title: section.title.clone(),
                    status: *status,
                })
                .collect(),
        }
    }

    /// The report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
