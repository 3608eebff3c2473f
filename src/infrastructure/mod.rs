//! Adapters implementing the domain ports against real systems.

pub mod in_memory;
pub mod inter;
pub mod locale;
pub mod object_store;
pub mod pacing;
pub mod pdf_receipt;
pub mod publisher;
pub mod transport;
