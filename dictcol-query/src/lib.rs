//! # dictcol-query
//!
//! Read-only exact and prefix search over a [`dictcol_core::DictColumn`].
//!
//! Each operation comes in three variants with one shared result contract:
//! `baseline` scans the retained original values, `scalar` scans the
//! encoded id column one entry at a time, and `simd` scans eight ids per
//! step with a runtime-dispatched kernel. SIMD is not observable except
//! through throughput.

pub mod exact;
pub mod prefix;
pub mod simd;

pub use exact::{find_baseline, find_batch_simd, find_scalar, find_simd};
pub use prefix::{
    find_prefix_baseline, find_prefix_scalar, find_prefix_simd, PrefixMatches, SIMD_TARGET_LIMIT,
};
