//! Option lists and the cascading rules between them.
//!
//! Every fetch is issued as a [`FetchTicket`] carrying a per-kind generation.
//! Only the latest ticket of a kind may update its list, so a slow response
//! for an old region can never overwrite the departments of the new one.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::state::{FieldId, WizardState};
use crate::api::{ApiError, OptionItem, OptionKind, OptionQuery};

/// A fetch that was issued and may still be in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: OptionKind,
    pub query: OptionQuery,
    pub generation: u64,
}

/// What happened when a fetch result came back
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// List replaced; `cleared` is set when the selection was dropped
    Applied { cleared: Option<FieldId> },
    /// A newer fetch for the same list was issued; result discarded
    Stale,
    /// List emptied; carries the warning to show
    Failed(String),
}

/// Loaded option lists plus the generation counters guarding them
#[derive(Debug, Default)]
pub struct OptionCatalog {
    lists: HashMap<OptionKind, Vec<OptionItem>>,
    generations: HashMap<OptionKind, u64>,
}

impl OptionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, kind: OptionKind) -> &[OptionItem] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn label_for(&self, kind: OptionKind, id: i64) -> Option<&str> {
        self.list(kind)
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.label.as_str())
    }

    pub fn generation(&self, kind: OptionKind) -> u64 {
        self.generations.get(&kind).copied().unwrap_or(0)
    }

    fn bump(&mut self, kind: OptionKind) -> u64 {
        let generation = self.generations.entry(kind).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Issue a fetch; any earlier ticket for `kind` becomes stale.
    pub fn issue(&mut self, kind: OptionKind, query: OptionQuery) -> FetchTicket {
        let generation = self.bump(kind);
        debug!("fetch {:?} {:?} gen {}", kind, query, generation);
        FetchTicket { kind, query, generation }
    }

    /// Empty a list without fetching; in-flight results for it are discarded.
    pub fn clear(&mut self, kind: OptionKind) {
        self.bump(kind);
        self.lists.remove(&kind);
    }

    /// Tickets for the lists that do not depend on another selection
    pub fn reference_tickets(&mut self) -> Vec<FetchTicket> {
        OptionKind::REFERENCE
            .into_iter()
            .map(|kind| self.issue(kind, OptionQuery::All))
            .collect()
    }

    /// Tickets for dependent lists whose parent selection is already made
    pub fn dependent_tickets(&mut self, state: &WizardState) -> Vec<FetchTicket> {
        let mut tickets = Vec::new();
        if let Some(region_id) = state.personal.region_id {
            tickets.push(self.issue(OptionKind::Department, OptionQuery::ByRegion { region_id }));
        }
        if let (Some(diploma_id), Some(bac_series_id)) =
            (state.academic.diploma_id, state.academic.bac_series_id)
        {
            tickets.push(self.issue(
                OptionKind::Program,
                OptionQuery::ByDiplomaAndSeries { diploma_id, bac_series_id },
            ));
        }
        tickets
    }

    /// Store a fetch result if `ticket` is still the latest for its kind,
    /// then drop the selection (and what depends on it) when it is no longer offered.
    pub fn apply(
        &mut self,
        state: &mut WizardState,
        ticket: FetchTicket,
        result: Result<Vec<OptionItem>, ApiError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation(ticket.kind) {
            debug!(
                "discarding stale {:?} (gen {} < {})",
                ticket.kind,
                ticket.generation,
                self.generation(ticket.kind)
            );
            return FetchOutcome::Stale;
        }

        let (items, failure) = match result {
            Ok(items) => (items, None),
            Err(e) => {
                warn!("Failed to load {}: {}", ticket.kind.plural_name(), e);
                (
                    Vec::new(),
                    Some(format!("Could not load {}: {}", ticket.kind.plural_name(), e)),
                )
            }
        };

        let field = FieldId::for_option(ticket.kind);
        // A failed reference fetch says nothing about whether the choice is still offered
        let keep_selection = failure.is_some() && OptionKind::REFERENCE.contains(&ticket.kind);
        let absent = state
            .choice(field)
            .is_some_and(|id| !items.iter().any(|item| item.id == id));
        self.lists.insert(ticket.kind, items);

        let cleared = if absent && !keep_selection {
            // Clearing never issues a fetch; it drops dependent lists and selections
            self.select(state, field, None);
            Some(field)
        } else {
            None
        };

        match failure {
            Some(warning) => FetchOutcome::Failed(warning),
            None => FetchOutcome::Applied { cleared },
        }
    }

    /// Set a choice field and apply its cascade; returns the fetch to run, if any.
    pub fn select(
        &mut self,
        state: &mut WizardState,
        field: FieldId,
        value: Option<i64>,
    ) -> Option<FetchTicket> {
        if state.choice(field) == value {
            return None;
        }
        state.set_choice(field, value);

        match field {
            FieldId::Region => self.region_changed(state),
            FieldId::Diploma | FieldId::BacSeries => self.programs_changed(state),
            _ => None,
        }
    }

    fn region_changed(&mut self, state: &mut WizardState) -> Option<FetchTicket> {
        match state.personal.region_id {
            Some(region_id) => Some(self.issue(
                OptionKind::Department,
                OptionQuery::ByRegion { region_id },
            )),
            None => {
                self.clear(OptionKind::Department);
                state.set_choice(FieldId::Department, None);
                None
            }
        }
    }

    fn programs_changed(&mut self, state: &mut WizardState) -> Option<FetchTicket> {
        match (state.academic.diploma_id, state.academic.bac_series_id) {
            (Some(diploma_id), Some(bac_series_id)) => Some(self.issue(
                OptionKind::Program,
                OptionQuery::ByDiplomaAndSeries { diploma_id, bac_series_id },
            )),
            _ => {
                self.clear(OptionKind::Program);
                state.set_choice(FieldId::Program, None);
                None
            }
        }
    }
}
