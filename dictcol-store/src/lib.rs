//! # dictcol-store
//!
//! Binary persistence for the dictcol engine: a single little-endian image
//! holding the dictionary records followed by a zstd-compressed block of
//! the encoded id column. Loading validates the image structurally and
//! surfaces every violation as
//! [`PersistenceCorrupt`](dictcol_core::Error::PersistenceCorrupt).

pub mod persist;

pub use persist::{load, load_from_bytes, save};
