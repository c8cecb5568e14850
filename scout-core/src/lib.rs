//! Core types for the company research agent
//!
//! This crate defines the shared data structures used across the workspace:
//! the research report shape, search and document primitives, the `NA`
//! sentinel normalization and the workspace error type.

pub mod document;
pub mod error;
pub mod report;
pub mod sentinel;

pub use document::{Chunk, SearchDepth, SearchResult};
pub use error::{ScoutError, ScoutResult};
pub use report::{CompanyResearch, Competitor, CompetitorList, DomainInfo, DomainKey, KeyMetrics};
pub use sentinel::{is_sentinel, Normalize, NOT_AVAILABLE};
