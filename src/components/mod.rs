// Export components
pub mod shift_slots;

// Re-export the slot session handle
pub use shift_slots::SlotSessionHandle;
