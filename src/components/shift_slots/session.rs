//! Edit-session state machine for a worker's slot selection.
//!
//! `Viewing -> Editing -> Saving -> Viewing`, or back to `Editing` when saving
//! fails. Catalog fetches are identified by a ticket; a result whose ticket no
//! longer matches the pending one is dropped.

use super::catalog::{catalog_options, load_persisted, reconcile, CatalogCache};
use super::models::{PersistedUser, SlotCatalogEntry, SlotOption};
use super::notation::normalize_slot;
use super::validation::{self, Selection, ToggleOutcome};
use crate::error::{session_error, Error, SlotResult, ValidationError};
use rust_i18n::t;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where the session is in its edit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Viewing,
    Editing,
    Saving,
}

/// Identifies one catalog fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub department: String,
    pub generation: u64,
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub heading: String,
    pub department: Option<String>,
    pub selection: Vec<String>,
    pub options: Vec<SlotOption>,
    pub fetching: bool,
    pub first_time: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

/// One worker's slot selection across edit cycles
#[derive(Debug)]
pub struct EditSession {
    state: SessionState,
    department: Option<String>,
    selection: Selection,
    committed: Selection,
    catalog: Vec<SlotCatalogEntry>,
    catalog_loaded: bool,
    cache: CatalogCache,
    pending_fetch: Option<FetchTicket>,
    generation: u64,
    last_error: Option<ValidationError>,
    notice: Option<String>,
}

impl EditSession {
    /// Open a session from a worker's stored fields
    pub fn new(department: Option<String>, user: &PersistedUser, cache: CatalogCache) -> Self {
        let committed = if user.is_first_time() {
            Selection::new()
        } else {
            load_persisted(user)
        };
        let state = if committed.is_empty() {
            SessionState::Editing
        } else {
            SessionState::Viewing
        };
        info!(
            "Opening slot session in {:?} with {} stored slot(s)",
            state,
            committed.len()
        );

        Self {
            state,
            department,
            selection: committed.clone(),
            committed,
            catalog: Vec::new(),
            catalog_loaded: false,
            cache,
            pending_fetch: None,
            generation: 0,
            last_error: None,
            notice: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn committed(&self) -> &Selection {
        &self.committed
    }

    pub fn catalog(&self) -> &[SlotCatalogEntry] {
        &self.catalog
    }

    pub fn pending_fetch(&self) -> Option<&FetchTicket> {
        self.pending_fetch.as_ref()
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// No selection has ever been committed
    pub fn is_first_time(&self) -> bool {
        self.committed.is_empty()
    }

    /// Heading shown above the slot list
    pub fn heading(&self) -> String {
        match (self.state, self.is_first_time()) {
            (SessionState::Viewing, _) => t!("session.heading_view").to_string(),
            (_, true) => t!("session.heading_first_time").to_string(),
            (_, false) => t!("session.heading_modify").to_string(),
        }
    }

    /// Catalog rows with their selected and disabled flags
    pub fn options(&self) -> Vec<SlotOption> {
        catalog_options(&self.catalog, &self.selection)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            heading: self.heading(),
            department: self.department.clone(),
            selection: self.selection.as_slice().to_vec(),
            options: self.options(),
            fetching: self.pending_fetch.is_some(),
            first_time: self.is_first_time(),
            last_error: self.last_error.as_ref().map(ValidationError::user_message),
            notice: self.notice.clone(),
        }
    }

    /// Make sure a catalog for the current department is loaded or on its way.
    ///
    /// Returns a ticket when the caller has to fetch; a cached catalog is applied
    /// immediately.
    pub fn request_catalog(&mut self) -> Option<FetchTicket> {
        let department = self.department.clone()?;

        if let Some(ticket) = &self.pending_fetch {
            if ticket.department == department {
                return None;
            }
        }

        if let Some(cached) = self.cache.get(&department) {
            debug!("Using cached catalog for {}", department);
            let cached = cached.to_vec();
            self.pending_fetch = None;
            self.apply_catalog(cached);
            return None;
        }

        self.generation += 1;
        let ticket = FetchTicket {
            department,
            generation: self.generation,
        };
        self.pending_fetch = Some(ticket.clone());
        Some(ticket)
    }

    /// Switch from viewing to editing
    pub fn enter_edit(&mut self) -> SlotResult<Option<FetchTicket>> {
        match self.state {
            SessionState::Viewing => {
                self.state = SessionState::Editing;
                self.last_error = None;
            }
            SessionState::Editing => {}
            SessionState::Saving => return Err(session_error("A save is in progress")),
        }

        if self.catalog_loaded {
            self.selection = reconcile(&self.selection, &self.catalog);
            return Ok(None);
        }
        Ok(self.request_catalog())
    }

    /// Point the session at another department, discarding the current picks
    pub fn change_department(&mut self, department: &str) -> SlotResult<Option<FetchTicket>> {
        if self.state == SessionState::Saving {
            return Err(session_error("A save is in progress"));
        }

        let department = department.trim().to_string();
        if department.is_empty() {
            return Err(session_error("Department must not be empty"));
        }

        if let Some(previous) = self.department.take() {
            self.cache.invalidate(&previous);
        }
        info!("Switching slot session to department {}", department);

        self.department = Some(department);
        self.selection.clear();
        self.catalog.clear();
        self.catalog_loaded = false;
        self.pending_fetch = None;
        self.last_error = None;
        self.notice = None;
        self.state = SessionState::Editing;

        Ok(self.request_catalog())
    }

    /// Apply a finished fetch. Returns false when the result was stale and dropped.
    pub fn catalog_loaded(
        &mut self,
        ticket: &FetchTicket,
        result: SlotResult<Vec<SlotCatalogEntry>>,
    ) -> bool {
        if self.pending_fetch.as_ref() != Some(ticket) {
            warn!(
                "Dropping stale catalog for {} (generation {})",
                ticket.department, ticket.generation
            );
            return false;
        }
        self.pending_fetch = None;

        match result {
            Ok(catalog) => {
                info!(
                    "Loaded {} catalog slot(s) for {}",
                    catalog.len(),
                    ticket.department
                );
                self.cache.insert(ticket.department.clone(), catalog.clone());
                self.notice = if catalog.is_empty() {
                    Some(t!("notice.no_slots").to_string())
                } else {
                    None
                };
                self.apply_catalog(catalog);
            }
            Err(e) => {
                let department = ticket.department.as_str();
                warn!("Catalog fetch for {} failed: {}", department, e);
                self.notice =
                    Some(t!("notice.catalog_unavailable", department = department).to_string());
                self.apply_catalog(Vec::new());
                // Next enter_edit fetches again
                self.catalog_loaded = false;
            }
        }
        true
    }

    fn apply_catalog(&mut self, catalog: Vec<SlotCatalogEntry>) {
        self.catalog = catalog;
        self.catalog_loaded = true;
        let before = self.selection.len();
        self.selection = reconcile(&self.selection, &self.catalog);
        if self.selection.len() != before {
            debug!(
                "Reconciliation dropped {} slot(s)",
                before - self.selection.len()
            );
        }
    }

    /// Select or deselect a catalog slot
    pub fn toggle(&mut self, slot: &str) -> SlotResult<ToggleOutcome> {
        if self.state != SessionState::Editing {
            return Err(session_error("Slots can only be changed while editing"));
        }

        let slot = normalize_slot(slot);
        if self.selection.contains(&slot) {
            self.selection.remove(&slot);
            self.last_error = None;
            return Ok(ToggleOutcome::Removed);
        }

        if !self.catalog.iter().any(|entry| entry.canonical() == slot) {
            return Err(Error::UnknownSlot(slot));
        }

        match validation::toggle(&mut self.selection, &slot) {
            Ok(outcome) => {
                self.last_error = None;
                Ok(outcome)
            }
            Err(e) => {
                debug!("Rejected slot {}: {}", slot, e);
                self.last_error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    /// Validate and reconcile the selection, moving to `Saving`.
    ///
    /// Returns the comma-joined value to hand to the persistence collaborator.
    pub fn begin_save(&mut self) -> SlotResult<String> {
        if self.state != SessionState::Editing {
            return Err(session_error("Nothing is being edited"));
        }
        if self.pending_fetch.is_some() {
            return Err(session_error("Time slots are still loading"));
        }

        let reconciled = reconcile(&self.selection, &self.catalog);
        if let Err(e) = validation::validate(&reconciled) {
            self.last_error = Some(e.clone());
            return Err(e.into());
        }

        self.selection = reconciled;
        self.last_error = None;
        self.notice = None;
        self.state = SessionState::Saving;
        Ok(self.selection.to_submission())
    }

    /// Record the outcome of the persist call
    pub fn save_finished(&mut self, result: &SlotResult<()>) {
        if self.state != SessionState::Saving {
            warn!("Ignoring save result outside of a save");
            return;
        }

        match result {
            Ok(()) => {
                info!("Saved {} slot(s)", self.selection.len());
                self.committed = self.selection.clone();
                self.state = SessionState::Viewing;
            }
            Err(e) => {
                warn!("Saving slots failed: {}", e);
                self.notice = Some(t!("notice.save_failed").to_string());
                self.state = SessionState::Editing;
            }
        }
    }

    /// Leave editing without saving, restoring the committed selection
    pub fn cancel(&mut self) -> SlotResult<()> {
        if self.state != SessionState::Editing {
            return Err(session_error("Nothing is being edited"));
        }
        if self.is_first_time() {
            return Err(session_error("A first selection cannot be cancelled"));
        }

        self.selection = self.committed.clone();
        self.last_error = None;
        self.notice = None;
        self.state = SessionState::Viewing;
        Ok(())
    }
}
