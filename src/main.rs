use shiftpick::components::shift_slots::{
    HttpCatalogSource, HttpSelectionSink, PersistedSlots, PersistedUser, SessionSnapshot,
    SessionState,
};
use shiftpick::components::shift_slots::models::display_slot;
use shiftpick::components::shift_slots::CatalogCache;
use shiftpick::components::SlotSessionHandle;
use shiftpick::error::{Error, ValidationError};
use shiftpick::startup;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting shiftpick");

    // Load configuration
    let config = startup::load_config()?;

    let user = PersistedUser {
        selected_slot: env::var("SLOTS_SELECTED_SLOT")
            .ok()
            .map(|s| PersistedSlots::from(s.as_str())),
        selected_weekend_slot: env::var("SLOTS_SELECTED_WEEKEND_SLOT")
            .ok()
            .map(|s| PersistedSlots::from(s.as_str())),
    };

    // Slots to toggle, in order, and whether to save afterwards
    let mut save = false;
    let mut toggles = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "--save" {
            save = true;
        } else {
            toggles.push(arg);
        }
    }

    let catalog_source = Arc::new(HttpCatalogSource::new(&config)?);
    let selection_sink = Arc::new(HttpSelectionSink::new(&config)?);
    let handle = SlotSessionHandle::new(
        config.department.clone(),
        &user,
        CatalogCache::new(),
        catalog_source,
        selection_sink,
    );

    if !toggles.is_empty() || save {
        handle.enter_edit().await?;
    }
    let snapshot = handle.wait_for_catalog().await?;
    print_snapshot(&snapshot);

    for slot in toggles {
        match handle.toggle(slot.as_str()).await {
            Ok(outcome) => info!("{:?} {}", outcome, slot),
            Err(Error::Validation(e)) => print_validation_error(&e),
            Err(e) => warn!("Could not toggle {}: {}", slot, e),
        }
    }

    if save {
        match handle.save().await {
            Ok(()) => info!("Time slots saved"),
            Err(Error::Validation(e)) => print_validation_error(&e),
            Err(e) => warn!("Saving failed: {}", e),
        }
    }

    print_snapshot(&handle.snapshot().await?);
    handle.shutdown().await?;

    Ok(())
}

fn print_validation_error(error: &ValidationError) {
    println!("! {}", error.user_message());
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    let department = snapshot.department.as_deref().unwrap_or("-");
    println!("{}", snapshot.heading);
    println!("Department: {} ({:?})", department, snapshot.state);

    if let Some(notice) = &snapshot.notice {
        println!("! {}", notice);
    }

    if snapshot.state != SessionState::Viewing {
        for option in &snapshot.options {
            let mark = if option.selected {
                "[x]"
            } else if option.disabled {
                "[-]"
            } else {
                "[ ]"
            };
            println!("{} {} ({})", mark, option.label, option.slot_type);
        }
    }

    if snapshot.selection.is_empty() {
        println!("No slots selected");
    } else {
        let slots: Vec<String> = snapshot.selection.iter().map(|s| display_slot(s)).collect();
        println!("Selected: {}", slots.join(", "));
    }
}
