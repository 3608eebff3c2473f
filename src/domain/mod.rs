//! Domain types, pure rules and the ports the orchestrator depends on.

pub mod instruction;
pub mod outcome;
pub mod pix_key;
pub mod ports;
pub mod receipt;
pub mod token;
