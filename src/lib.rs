//! Sortnet - Optimal Sorting Network Search
//!
//! Finds comparator networks that sort every input of a fixed width while
//! using as few layers (or comparators) as possible.
//!
//! # Architecture
//!
//! By the zero-one principle a comparator network sorts everything iff it
//! sorts all 2^n binary inputs, so existence within a depth bound becomes a
//! finite boolean model:
//! - Layout variables: which channel pairs meet in which layer (shared)
//! - Value variables: what each channel carries after each layer, one copy
//!   per binary test vector
//! - A sortedness constraint on the last layer of every copy
//!
//! The model goes to a [`engine::ConstraintEngine`] in one call; the answer
//! is decoded into a [`network::Network`] and replayed over every test
//! vector before it is reported.

pub mod cli;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod network;
pub mod report;
pub mod search;
pub mod solution;
pub mod vectors;

pub use config::{NetworkParams, Objective, SearchConfig};
pub use error::{Result, SortnetError};
pub use network::{Comparator, Network};
pub use search::{search, search_with, SearchOutcome, SearchRun};
