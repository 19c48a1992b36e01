//! Exact-match search over the encoded column.
//!
//! Three variants share one result contract: the ascending list of
//! positions whose column entry denotes the queried value. An unknown
//! value is an empty list, never an error. Every variant holds the
//! dictionary read lock for the duration of its scan.

use dictcol_core::{DictColumn, Error, Result};

use crate::simd;

/// Scalar dictionary scan: translate the value to its id, then walk the
/// column.
pub fn find_scalar(col: &DictColumn, value: &str) -> Vec<usize> {
    let guard = col.dict().read();
    let Some(target) = guard.find(value) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    simd::scan_eq_scalar(col.encoded(), target, &mut out);
    out
}

/// SIMD dictionary scan: semantically identical to [`find_scalar`],
/// processing eight ids per step where the platform allows.
pub fn find_simd(col: &DictColumn, value: &str) -> Vec<usize> {
    let guard = col.dict().read();
    let Some(target) = guard.find(value) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    simd::scan_eq_positions(col.encoded(), target, &mut out);
    out
}

/// Baseline scan over the retained originals, matching by byte equality.
///
/// Fails with [`Error::BaselineUnavailable`] when the column was built
/// without retained originals.
pub fn find_baseline(col: &DictColumn, value: &str) -> Result<Vec<usize>> {
    let _guard = col.dict().read();
    let originals = col.originals().ok_or(Error::BaselineUnavailable)?;
    let mut out = Vec::new();
    for (j, v) in originals.iter().enumerate() {
        if **v == *value {
            out.push(j);
        }
    }
    Ok(out)
}

/// SIMD exact search applied to a batch of queries under one read hold.
pub fn find_batch_simd<S: AsRef<str>>(col: &DictColumn, queries: &[S]) -> Vec<Vec<usize>> {
    let guard = col.dict().read();
    queries
        .iter()
        .map(|query| {
            let Some(target) = guard.find(query.as_ref()) else {
                return Vec::new();
            };
            let mut out = Vec::new();
            simd::scan_eq_positions(col.encoded(), target, &mut out);
            out
        })
        .collect()
}
