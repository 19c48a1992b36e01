//! # dictcol-ingest
//!
//! Concurrent build pipeline for the dictcol engine: streams a text file in
//! bounded chunks, scatters each chunk across worker threads, and populates
//! the shared dictionary and the encoded column under a reader/writer
//! discipline with batched exclusive sections.

pub mod builder;

pub use builder::{build, BuildOptions, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_BYTES};
