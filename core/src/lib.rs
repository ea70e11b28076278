//! rxmirror-core — synthetic PBM eligibility/claims fixture generation.
//!
//! Fabricates a self-consistent four-table dataset for exercising
//! eligibility reconciliation logic: a batch-load ledger, a
//! system-of-record eligibility table, a PBM-loaded mirror with
//! deliberately injected cross-system drift, and a pharmacy claims
//! stream whose reject outcomes are coupled to the injected defects.
//!
//! Everything is deterministic for a fixed (seed, sizes, time anchor).

pub mod batch_loads;
pub mod catalog;
pub mod claims;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod mirror;
pub mod pipeline;
pub mod rng;
pub mod types;

pub use context::GenContext;
pub use error::{GenError, GenResult};
pub use pipeline::{Dataset, FixturePipeline, RunSizes};
