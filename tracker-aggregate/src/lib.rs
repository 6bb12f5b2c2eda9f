//! tracker-aggregate - read-side assembly of tracked entity aggregates
//!
//! Rebuilds tracked entity instance → enrollment → event graphs, plus
//! relationships and program ownership, from flat pre-sorted row sets. One
//! batched fetch per requested kind; rows are mapped, grouped by parent key
//! and attached to their roots.

pub mod assembler;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod grouping;
pub mod mapper;
pub mod model;
pub mod orchestrator;
pub mod params;
pub mod row;
pub mod service;

pub use config::AggregateConfig;
pub use error::{AssemblyError, AssemblyResult, DecodingError, FetchError};
pub use fetch::{AccessScope, MemoryRowFetcher, RowFetcher, SqlRowFetcher};
pub use mapper::EntityKind;
pub use params::InclusionConfig;
pub use service::{AggregateService, Assembly};
