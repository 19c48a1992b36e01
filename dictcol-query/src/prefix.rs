//! Prefix search over the encoded column.
//!
//! A prefix query returns `(value, positions)` pairs: one pair per
//! dictionary value carrying the byte prefix, positions ascending, pairs
//! emitted in the order their ids were collected from the dictionary
//! (which scans in id order). The empty prefix yields an empty result by
//! convention.

use std::sync::Arc;

use dictcol_core::{DictColumn, Error, Result, ValueDict};
use rustc_hash::FxHashMap;

use crate::simd;

/// Matching-value threshold at which the SIMD variant abandons per-id
/// broadcast scans for the single-pass bucketing walk.
pub const SIMD_TARGET_LIMIT: usize = 8;

/// Result of a prefix query: `(matching value, ascending positions)`.
pub type PrefixMatches = Vec<(Arc<str>, Vec<usize>)>;

/// Scalar prefix search: collect matching ids, then bucket positions in
/// one pass over the column.
pub fn find_prefix_scalar(col: &DictColumn, prefix: &str) -> PrefixMatches {
    if prefix.is_empty() {
        return Vec::new();
    }
    let guard = col.dict().read();
    let entries = collect_prefix_entries(&guard, prefix);
    bucket_single_pass(col.encoded(), entries)
}

/// SIMD prefix search: one broadcast-compare scan per matching id while
/// few ids matched, otherwise the same single-pass walk as the scalar
/// variant. Results are identical either way.
pub fn find_prefix_simd(col: &DictColumn, prefix: &str) -> PrefixMatches {
    if prefix.is_empty() {
        return Vec::new();
    }
    let guard = col.dict().read();
    let entries = collect_prefix_entries(&guard, prefix);
    if entries.len() >= SIMD_TARGET_LIMIT {
        return bucket_single_pass(col.encoded(), entries);
    }

    entries
        .into_iter()
        .map(|(value, id)| {
            let mut positions = Vec::new();
            simd::scan_eq_positions(col.encoded(), id, &mut positions);
            (value, positions)
        })
        .collect()
}

/// Baseline prefix search over the retained originals.
///
/// Pair order comes from the same dictionary scan as the other variants;
/// positions come from a byte-prefix walk of the original column. Fails
/// with [`Error::BaselineUnavailable`] when originals were not retained.
pub fn find_prefix_baseline(col: &DictColumn, prefix: &str) -> Result<PrefixMatches> {
    let guard = col.dict().read();
    let originals = col.originals().ok_or(Error::BaselineUnavailable)?;
    if prefix.is_empty() {
        return Ok(Vec::new());
    }

    let entries = collect_prefix_entries(&guard, prefix);
    let mut bucket_of: FxHashMap<Arc<str>, usize> = FxHashMap::default();
    let mut results: PrefixMatches = Vec::with_capacity(entries.len());
    for (value, _id) in entries {
        bucket_of.insert(Arc::clone(&value), results.len());
        results.push((value, Vec::new()));
    }

    for (j, value) in originals.iter().enumerate() {
        if value.starts_with(prefix) {
            if let Some(&bucket) = bucket_of.get(value) {
                results[bucket].1.push(j);
            }
        }
    }
    Ok(results)
}

/// Scan the dictionary in id order for values carrying the prefix.
fn collect_prefix_entries(dict: &ValueDict, prefix: &str) -> Vec<(Arc<str>, u32)> {
    dict.entries()
        .iter()
        .enumerate()
        .filter(|(_, value)| value.starts_with(prefix))
        .map(|(id, value)| (Arc::clone(value), id as u32))
        .collect()
}

/// One pass over the column, appending each position to its id's bucket.
fn bucket_single_pass(encoded: &[u32], entries: Vec<(Arc<str>, u32)>) -> PrefixMatches {
    let mut bucket_of: FxHashMap<u32, usize> = FxHashMap::default();
    let mut results: PrefixMatches = Vec::with_capacity(entries.len());
    for (value, id) in entries {
        bucket_of.insert(id, results.len());
        results.push((value, Vec::new()));
    }

    for (j, id) in encoded.iter().enumerate() {
        if let Some(&bucket) = bucket_of.get(id) {
            results[bucket].1.push(j);
        }
    }
    results
}
