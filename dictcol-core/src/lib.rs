//! # dictcol-core
//!
//! Core types for the dictcol dictionary-encoded column engine.
//!
//! This crate provides:
//! - [`ValueDict`]: Vec-backed bidirectional dictionary with dense `u32` ids
//! - [`SharedDict`]: reader/writer-guarded wrapper used during concurrent
//!   ingestion and read-locked query scans
//! - [`DictColumn`]: the assembled dictionary + encoded column pair, with
//!   derived stats (compression ratio, memory footprint)
//! - [`Error`]: the error surface shared by the build, query, and
//!   persistence layers
//!
//! ## Design principles
//!
//! 1. **No global state**: dictionaries and columns are passed explicitly.
//! 2. **Append-only ids**: an id assigned to a value is never reassigned;
//!    forward/reverse consistency holds on every write-lock release.
//! 3. **Read-only after build**: query paths borrow [`DictColumn`]
//!    immutably and hold the dictionary read lock for the scan duration.

pub mod column;
pub mod dict;
pub mod error;
pub mod shared;

pub use column::DictColumn;
pub use dict::{ValueDict, DEFAULT_MAX_ENTRIES};
pub use error::{Error, Result};
pub use shared::SharedDict;
