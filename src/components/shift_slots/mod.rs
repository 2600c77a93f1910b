//! Shift time-slot selection: parsing stored slots, interval checks,
//! selection rules and the per-worker edit session.

mod actor;
pub mod catalog;
pub mod client;
mod handle;
pub mod models;
pub mod notation;
pub mod session;
pub mod time;
pub mod validation;

pub use catalog::{is_disabled, load_persisted, reconcile, CatalogCache};
pub use client::{CatalogSource, HttpCatalogSource, HttpSelectionSink, SelectionSink};
pub use handle::SlotSessionHandle;
pub use models::{PersistedUser, SlotCatalogEntry, SlotOption};
pub use notation::{decode_slots, normalize_slot, parse_slots, PersistedSlots};
pub use session::{EditSession, SessionSnapshot, SessionState};
pub use time::{ClockTime, Meridiem, TimeInterval};
pub use validation::{validate, Selection, ToggleOutcome};
