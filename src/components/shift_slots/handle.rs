use super::actor::{SlotSessionActor, SlotSessionActorHandle};
use super::catalog::CatalogCache;
use super::client::{CatalogSource, SelectionSink};
use super::models::PersistedUser;
use super::session::{EditSession, SessionSnapshot};
use super::validation::ToggleOutcome;
use crate::error::SlotResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with a worker's slot session
#[derive(Clone)]
pub struct SlotSessionHandle {
    actor_handle: SlotSessionActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl SlotSessionHandle {
    /// Open a session for a worker and spawn its actor
    pub fn new(
        department: Option<String>,
        user: &PersistedUser,
        cache: CatalogCache,
        catalog_source: Arc<dyn CatalogSource>,
        selection_sink: Arc<dyn SelectionSink>,
    ) -> Self {
        let session = EditSession::new(department, user, cache);

        // Create the actor and get its handle
        let (mut actor, handle) = SlotSessionActor::new(session, catalog_source, selection_sink);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Switch to editing
    pub async fn enter_edit(&self) -> SlotResult<()> {
        self.actor_handle.enter_edit().await
    }

    /// Change department; the selection starts over
    pub async fn change_department(&self, department: impl Into<String>) -> SlotResult<()> {
        self.actor_handle.change_department(department).await
    }

    /// Select or deselect a slot
    pub async fn toggle(&self, slot: impl Into<String>) -> SlotResult<ToggleOutcome> {
        self.actor_handle.toggle(slot).await
    }

    /// Validate and persist the selection
    pub async fn save(&self) -> SlotResult<()> {
        self.actor_handle.save().await
    }

    /// Abandon the current edit
    pub async fn cancel(&self) -> SlotResult<()> {
        self.actor_handle.cancel().await
    }

    /// Current view of the session
    pub async fn snapshot(&self) -> SlotResult<SessionSnapshot> {
        self.actor_handle.snapshot().await
    }

    /// Wait for the in-flight catalog fetch, if any
    pub async fn wait_for_catalog(&self) -> SlotResult<SessionSnapshot> {
        self.actor_handle.wait_for_catalog().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SlotResult<()> {
        self.actor_handle.shutdown().await
    }
}
