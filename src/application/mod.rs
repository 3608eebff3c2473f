//! Application layer containing the batch orchestration.
//!
//! `BatchOrchestrator` is the entry point for processing a batch of payment
//! instructions. It only depends on the domain ports, so every external
//! collaborator can be swapped for a test double.

pub mod orchestrator;
