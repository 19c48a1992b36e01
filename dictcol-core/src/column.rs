//! The assembled dictionary-encoded column.
//!
//! [`DictColumn`] owns the shared dictionary, the encoded id column, and
//! (optionally) the retained original values. It is produced by the build
//! pipeline or restored from a persisted image, and is read-only from then
//! on: every query operation borrows it immutably.

use std::sync::Arc;

use crate::shared::SharedDict;

/// A dictionary-encoded text column.
///
/// Positionally aligned with the input: `encoded()[j]` is the id of input
/// line `j`. Every encoded entry is a valid id in the dictionary.
pub struct DictColumn {
    dict: SharedDict,
    encoded: Vec<u32>,
    /// Present only when the build retained originals; required by the
    /// baseline search variants.
    originals: Option<Vec<Arc<str>>>,
}

impl DictColumn {
    /// Assemble a column from its parts.
    pub fn from_parts(
        dict: SharedDict,
        encoded: Vec<u32>,
        originals: Option<Vec<Arc<str>>>,
    ) -> Self {
        debug_assert!(
            originals.as_ref().map_or(true, |o| o.len() == encoded.len()),
            "retained originals must align with the encoded column"
        );
        Self {
            dict,
            encoded,
            originals,
        }
    }

    /// The shared dictionary.
    pub fn dict(&self) -> &SharedDict {
        &self.dict
    }

    /// The encoded id column.
    #[inline]
    pub fn encoded(&self) -> &[u32] {
        &self.encoded
    }

    /// Number of encoded positions (input line count).
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.encoded.len()
    }

    /// Number of distinct dictionary entries.
    pub fn dictionary_size(&self) -> usize {
        self.dict.len()
    }

    /// Retained originals, if the build kept them.
    pub fn originals(&self) -> Option<&[Arc<str>]> {
        self.originals.as_deref()
    }

    /// Resolve an id to its value.
    pub fn value_of(&self, id: u32) -> Option<Arc<str>> {
        self.dict.read().resolve_arc(id)
    }

    /// The ordered id -> value sequence (cheap `Arc` clones).
    pub fn reverse_dictionary(&self) -> Vec<Arc<str>> {
        self.dict.read().entries().to_vec()
    }

    /// Compression ratio: total original bytes / (dictionary bytes + 4·L).
    ///
    /// Total original bytes are recovered from the encoded column itself
    /// (sum of the referenced values' lengths), so the ratio is available
    /// on a loaded image where originals were never retained. Returns 0.0
    /// for an empty column.
    pub fn compression_ratio(&self) -> f64 {
        let guard = self.dict.read();
        if guard.is_empty() || self.encoded.is_empty() {
            return 0.0;
        }

        let total_original: u64 = self
            .encoded
            .iter()
            .map(|&id| guard.resolve(id).map_or(0, |s| s.len() as u64))
            .sum();
        let encoded_size =
            guard.value_bytes() as u64 + 4 * self.encoded.len() as u64;

        total_original as f64 / encoded_size as f64
    }

    /// Approximate heap footprint in bytes.
    ///
    /// Counts each dictionary string once (the `Arc` is shared between the
    /// forward sequence and the reverse map), per-entry pointer/id
    /// overhead, the id column, and retained originals.
    pub fn memory_usage(&self) -> usize {
        let guard = self.dict.read();
        let per_entry = 2 * std::mem::size_of::<usize>() + std::mem::size_of::<u32>();
        let dict_bytes = guard.value_bytes() + guard.len() * per_entry;
        let column_bytes = self.encoded.len() * std::mem::size_of::<u32>();
        let originals_bytes = self
            .originals
            .as_ref()
            .map_or(0, |o| o.iter().map(|s| s.len()).sum());
        dict_bytes + column_bytes + originals_bytes
    }

}

impl std::fmt::Debug for DictColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictColumn")
            .field("dictionary_size", &self.dictionary_size())
            .field("encoded_len", &self.encoded_len())
            .field("retained_originals", &self.originals.is_some())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
