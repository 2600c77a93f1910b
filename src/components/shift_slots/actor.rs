use super::client::{CatalogSource, SelectionSink};
use super::models::SlotCatalogEntry;
use super::session::{EditSession, FetchTicket, SessionSnapshot};
use super::validation::ToggleOutcome;
use crate::error::{session_error, SlotResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// The slot session actor; sole owner of the edit session
pub struct SlotSessionActor {
    session: EditSession,
    catalog_source: Arc<dyn CatalogSource>,
    selection_sink: Arc<dyn SelectionSink>,
    command_tx: mpsc::Sender<SlotSessionCommand>,
    command_rx: mpsc::Receiver<SlotSessionCommand>,
    catalog_waiters: Vec<mpsc::Sender<SessionSnapshot>>,
}

/// Commands that can be sent to the slot session actor
pub enum SlotSessionCommand {
    EnterEdit(mpsc::Sender<SlotResult<()>>),
    ChangeDepartment(String, mpsc::Sender<SlotResult<()>>),
    Toggle(String, mpsc::Sender<SlotResult<ToggleOutcome>>),
    Save(mpsc::Sender<SlotResult<()>>),
    Cancel(mpsc::Sender<SlotResult<()>>),
    Snapshot(mpsc::Sender<SessionSnapshot>),
    WaitForCatalog(mpsc::Sender<SessionSnapshot>),
    CatalogLoaded(FetchTicket, SlotResult<Vec<SlotCatalogEntry>>),
    SaveFinished(SlotResult<()>, mpsc::Sender<SlotResult<()>>),
    Shutdown,
}

/// Handle for communicating with the slot session actor
#[derive(Clone)]
pub struct SlotSessionActorHandle {
    command_tx: mpsc::Sender<SlotSessionCommand>,
}

impl SlotSessionActorHandle {
    /// Send a command and wait for its reply
    async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<T>) -> SlotSessionCommand,
    ) -> SlotResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| session_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| session_error("Response channel closed"))
    }

    /// Switch to editing, fetching the catalog if needed
    pub async fn enter_edit(&self) -> SlotResult<()> {
        self.request(SlotSessionCommand::EnterEdit).await?
    }

    /// Reset the selection and load another department's catalog
    pub async fn change_department(&self, department: impl Into<String>) -> SlotResult<()> {
        let department = department.into();
        self.request(|tx| SlotSessionCommand::ChangeDepartment(department, tx))
            .await?
    }

    /// Select or deselect one catalog slot
    pub async fn toggle(&self, slot: impl Into<String>) -> SlotResult<ToggleOutcome> {
        let slot = slot.into();
        self.request(|tx| SlotSessionCommand::Toggle(slot, tx)).await?
    }

    /// Validate, reconcile and persist the selection
    pub async fn save(&self) -> SlotResult<()> {
        self.request(SlotSessionCommand::Save).await?
    }

    /// Abandon the current edit
    pub async fn cancel(&self) -> SlotResult<()> {
        self.request(SlotSessionCommand::Cancel).await?
    }

    /// Current view of the session
    pub async fn snapshot(&self) -> SlotResult<SessionSnapshot> {
        self.request(SlotSessionCommand::Snapshot).await
    }

    /// Wait until no catalog fetch is in flight
    pub async fn wait_for_catalog(&self) -> SlotResult<SessionSnapshot> {
        self.request(SlotSessionCommand::WaitForCatalog).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> SlotResult<()> {
        let _ = self.command_tx.send(SlotSessionCommand::Shutdown).await;
        Ok(())
    }
}

impl SlotSessionActor {
    /// Create a new actor and return its handle
    pub fn new(
        session: EditSession,
        catalog_source: Arc<dyn CatalogSource>,
        selection_sink: Arc<dyn SelectionSink>,
    ) -> (Self, SlotSessionActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            session,
            catalog_source,
            selection_sink,
            command_tx: command_tx.clone(),
            command_rx,
            catalog_waiters: Vec::new(),
        };

        let handle = SlotSessionActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Slot session actor started");

        // First-time workers need the catalog straight away
        if self.session.is_first_time() {
            let ticket = self.session.request_catalog();
            self.spawn_fetch(ticket);
        }

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                SlotSessionCommand::EnterEdit(response_tx) => {
                    let result = self.session.enter_edit().map(|ticket| self.spawn_fetch(ticket));
                    let _ = response_tx.send(result).await;
                    // A cached catalog settles waiters without a fetch
                    self.notify_catalog_waiters().await;
                }
                SlotSessionCommand::ChangeDepartment(department, response_tx) => {
                    let result = self
                        .session
                        .change_department(&department)
                        .map(|ticket| self.spawn_fetch(ticket));
                    let _ = response_tx.send(result).await;
                    self.notify_catalog_waiters().await;
                }
                SlotSessionCommand::Toggle(slot, response_tx) => {
                    let result = self.session.toggle(&slot);
                    let _ = response_tx.send(result).await;
                }
                SlotSessionCommand::Save(response_tx) => match self.session.begin_save() {
                    Ok(shifttime) => self.spawn_submit(shifttime, response_tx),
                    Err(e) => {
                        let _ = response_tx.send(Err(e)).await;
                    }
                },
                SlotSessionCommand::Cancel(response_tx) => {
                    let result = self.session.cancel();
                    let _ = response_tx.send(result).await;
                }
                SlotSessionCommand::Snapshot(response_tx) => {
                    let _ = response_tx.send(self.session.snapshot()).await;
                }
                SlotSessionCommand::WaitForCatalog(response_tx) => {
                    if self.session.pending_fetch().is_some() {
                        self.catalog_waiters.push(response_tx);
                    } else {
                        let _ = response_tx.send(self.session.snapshot()).await;
                    }
                }
                SlotSessionCommand::CatalogLoaded(ticket, result) => {
                    if self.session.catalog_loaded(&ticket, result) {
                        self.notify_catalog_waiters().await;
                    }
                }
                SlotSessionCommand::SaveFinished(result, response_tx) => {
                    self.session.save_finished(&result);
                    let _ = response_tx.send(result).await;
                }
                SlotSessionCommand::Shutdown => {
                    info!("Slot session actor shutting down");
                    break;
                }
            }
        }

        info!("Slot session actor shut down");
    }

    /// Run a catalog fetch off the actor and post the result back under its ticket
    fn spawn_fetch(&self, ticket: Option<FetchTicket>) {
        let Some(ticket) = ticket else {
            return;
        };

        let source = Arc::clone(&self.catalog_source);
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_catalog(&ticket.department).await;
            if let Err(e) = &result {
                error!("Failed to fetch catalog for {}: {}", ticket.department, e);
            }
            let _ = command_tx
                .send(SlotSessionCommand::CatalogLoaded(ticket, result))
                .await;
        });
    }

    /// Hand the selection to the sink off the actor; the reply waits for the outcome
    fn spawn_submit(&self, shifttime: String, response_tx: mpsc::Sender<SlotResult<()>>) {
        let sink = Arc::clone(&self.selection_sink);
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            let result = sink.submit(&shifttime).await;
            if let Err(e) = &result {
                error!("Failed to submit slots: {}", e);
            }
            let _ = command_tx
                .send(SlotSessionCommand::SaveFinished(result, response_tx))
                .await;
        });
    }

    async fn notify_catalog_waiters(&mut self) {
        if self.catalog_waiters.is_empty() || self.session.pending_fetch().is_some() {
            return;
        }
        let snapshot = self.session.snapshot();
        for waiter in self.catalog_waiters.drain(..) {
            let _ = waiter.send(snapshot.clone()).await;
        }
    }
}
