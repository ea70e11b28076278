//! Shared primitive types used across the entire generation pipeline.

/// The master seed a run was started with.
pub type Seed = u64;

/// A stable, unique member identifier ("M100042").
pub type MemberId = String;

/// A batch ledger identifier ("BATCH_20260801_03").
pub type BatchId = String;
