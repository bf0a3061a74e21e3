//! Sales pipeline deal-lifecycle simulation.
//!
//! Each deal is an independent stochastic trial: classified against
//! drifting market trends, resolved through its stages, dated, and
//! assembled into a validated `OpportunityRecord`.

pub mod assembler;
pub mod batch;
pub mod calendar;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod profile;
pub mod rng;
pub mod roster;
pub mod timeline;
pub mod trend;
pub mod types;
