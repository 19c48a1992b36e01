//! Binary persistence for a [`DictColumn`].
//!
//! ## Format
//!
//! Little-endian fields, single file:
//!
//! ```text
//! count:          u64
//! For each entry: len: u64, value_bytes: [u8; len], id: u32
//! compressed_len: u64
//! compressed:     [u8; compressed_len]   zstd image of the id column
//!                                        (count_positions x 4 bytes)
//! ```
//!
//! Entries are written in id order; the reader accepts any record order and
//! rebuilds the forward sequence from the recorded ids, rejecting images
//! with out-of-range, duplicate, or missing ids. Retained originals are
//! not persisted — the baseline search variants are unavailable on a
//! loaded column.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use dictcol_core::{DictColumn, Error, Result, SharedDict, ValueDict};

/// zstd level for the column block. Low-to-medium: the ids are already
/// small and the block is decompressed in one shot at load.
const COMPRESSION_LEVEL: i32 = 3;

// ============================================================================
// Save
// ============================================================================

/// Write the column image to `path`.
pub fn save(col: &DictColumn, path: &Path) -> Result<()> {
    let guard = col.dict().read();
    let file = std::fs::File::create(path)
        .map_err(|e| Error::io(format!("cannot create {}: {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let write_err =
        |e: std::io::Error| Error::io(format!("write failed on {}: {e}", path.display()));

    out.write_all(&(guard.len() as u64).to_le_bytes())
        .map_err(write_err)?;
    for (id, value) in guard.iter() {
        let bytes = value.as_bytes();
        out.write_all(&(bytes.len() as u64).to_le_bytes())
            .map_err(write_err)?;
        out.write_all(bytes).map_err(write_err)?;
        out.write_all(&id.to_le_bytes()).map_err(write_err)?;
    }

    let mut raw = Vec::with_capacity(col.encoded_len() * 4);
    for &id in col.encoded() {
        raw.extend_from_slice(&id.to_le_bytes());
    }
    let compressed = zstd::encode_all(raw.as_slice(), COMPRESSION_LEVEL)
        .map_err(|e| Error::io(format!("zstd compression failed: {e}")))?;
    tracing::debug!(
        raw = raw.len(),
        compressed = compressed.len(),
        entries = guard.len(),
        "column image compressed"
    );

    out.write_all(&(compressed.len() as u64).to_le_bytes())
        .map_err(write_err)?;
    out.write_all(&compressed).map_err(write_err)?;
    out.flush().map_err(write_err)?;
    Ok(())
}

// ============================================================================
// Load
// ============================================================================

/// Read a column image from `path`.
pub fn load(path: &Path) -> Result<DictColumn> {
    let data = std::fs::read(path)
        .map_err(|e| Error::io(format!("cannot read {}: {e}", path.display())))?;
    load_from_bytes(&data)
}

/// Parse a column image from a byte buffer.
///
/// Every structural violation — truncation, invalid UTF-8, out-of-range or
/// duplicate or missing ids, decompression failure, a column block that is
/// not a whole number of ids, a column id outside the dictionary — is
/// [`Error::PersistenceCorrupt`].
pub fn load_from_bytes(data: &[u8]) -> Result<DictColumn> {
    let mut pos = 0usize;

    let count = read_u64(data, &mut pos, "entry count")? as usize;
    // Each record is at least 12 bytes; reject absurd counts before
    // allocating.
    let min_record_bytes = count.checked_mul(12).ok_or_else(|| {
        Error::corrupt(format!("entry count {count} overflows"))
    })?;
    if min_record_bytes > data.len().saturating_sub(pos) {
        return Err(Error::corrupt(format!(
            "entry count {count} exceeds image size {}",
            data.len()
        )));
    }

    let mut slots: Vec<Option<Arc<str>>> = vec![None; count];
    for _ in 0..count {
        let len = read_u64(data, &mut pos, "value length")? as usize;
        if len > data.len() - pos {
            return Err(Error::corrupt("value bytes truncated"));
        }
        let value = std::str::from_utf8(&data[pos..pos + len])
            .map_err(|e| Error::corrupt(format!("value is not valid UTF-8: {e}")))?;
        pos += len;

        let id = read_u32(data, &mut pos, "value id")? as usize;
        if id >= count {
            return Err(Error::corrupt(format!(
                "id {id} out of range (count {count})"
            )));
        }
        if slots[id].is_some() {
            return Err(Error::corrupt(format!("duplicate id {id}")));
        }
        slots[id] = Some(Arc::from(value));
    }

    let ordered: Vec<Arc<str>> = slots
        .into_iter()
        .enumerate()
        .map(|(id, slot)| slot.ok_or_else(|| Error::corrupt(format!("missing id {id}"))))
        .collect::<Result<_>>()?;
    let dict = ValueDict::from_ordered_entries(ordered)?;

    let compressed_len = read_u64(data, &mut pos, "compressed length")? as usize;
    if compressed_len > data.len() - pos {
        return Err(Error::corrupt("compressed block truncated"));
    }
    let raw = zstd::decode_all(&data[pos..pos + compressed_len])
        .map_err(|e| Error::corrupt(format!("decompression failed: {e}")))?;
    if raw.len() % 4 != 0 {
        return Err(Error::corrupt(format!(
            "column image length {} is not a multiple of 4",
            raw.len()
        )));
    }

    let mut encoded = Vec::with_capacity(raw.len() / 4);
    for chunk in raw.chunks_exact(4) {
        let id = u32::from_le_bytes(chunk.try_into().unwrap());
        if id as usize >= count {
            return Err(Error::corrupt(format!(
                "column id {id} out of range (count {count})"
            )));
        }
        encoded.push(id);
    }

    tracing::debug!(
        entries = count,
        positions = encoded.len(),
        "column image loaded"
    );
    Ok(DictColumn::from_parts(SharedDict::new(dict), encoded, None))
}

fn read_u64(data: &[u8], pos: &mut usize, field: &str) -> Result<u64> {
    if data.len() - *pos < 8 {
        return Err(Error::corrupt(format!("{field} truncated")));
    }
    let v = u64::from_le_bytes(data[*pos..*pos + 8].try_into().unwrap());
    *pos += 8;
    Ok(v)
}

fn read_u32(data: &[u8], pos: &mut usize, field: &str) -> Result<u32> {
    if data.len() - *pos < 4 {
        return Err(Error::corrupt(format!("{field} truncated")));
    }
    let v = u32::from_le_bytes(data[*pos..*pos + 4].try_into().unwrap());
    *pos += 4;
    Ok(v)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("dictcol_test_persist");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn sample_column(lines: &[&str]) -> DictColumn {
        let mut dict = ValueDict::new();
        let encoded: Vec<u32> = lines
            .iter()
            .map(|l| dict.assign_or_lookup(l).unwrap())
            .collect();
        DictColumn::from_parts(SharedDict::new(dict), encoded, None)
    }

    /// Hand-build a valid image for corruption tests.
    fn build_image(entries: &[(&str, u32)], column: &[u32]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(entries.len() as u64).to_le_bytes());
        for (value, id) in entries {
            data.extend_from_slice(&(value.len() as u64).to_le_bytes());
            data.extend_from_slice(value.as_bytes());
            data.extend_from_slice(&id.to_le_bytes());
        }
        let mut raw = Vec::new();
        for &id in column {
            raw.extend_from_slice(&id.to_le_bytes());
        }
        let compressed = zstd::encode_all(raw.as_slice(), 3).unwrap();
        data.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        data.extend_from_slice(&compressed);
        data
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("round_trip.bin");
        let col = sample_column(&["alpha", "beta", "alpha", "", "gamma", "beta"]);
        save(&col, &path).unwrap();
        let restored = load(&path).unwrap();

        assert_eq!(restored.dictionary_size(), col.dictionary_size());
        assert_eq!(restored.encoded(), col.encoded());
        let orig = col.dict().read();
        let rest = restored.dict().read();
        for (id, value) in orig.iter() {
            assert_eq!(rest.resolve(id), Some(value));
        }
    }

    #[test]
    fn test_round_trip_empty_column() {
        let path = temp_path("empty.bin");
        let col = sample_column(&[]);
        save(&col, &path).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.dictionary_size(), 0);
        assert_eq!(restored.encoded_len(), 0);
    }

    #[test]
    fn test_load_accepts_unordered_records() {
        let image = build_image(&[("b", 1), ("a", 0)], &[0, 1, 0]);
        let col = load_from_bytes(&image).unwrap();
        assert_eq!(&*col.value_of(0).unwrap(), "a");
        assert_eq!(&*col.value_of(1).unwrap(), "b");
        assert_eq!(col.encoded(), &[0, 1, 0]);
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let err = load(&temp_path("never_written.bin")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            load_from_bytes(&[1, 2, 3]).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_truncated_record() {
        let mut image = build_image(&[("abc", 0)], &[0]);
        image.truncate(12); // count + half a length field
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_id_out_of_range() {
        let image = build_image(&[("a", 5)], &[0]);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_duplicate_id() {
        let image = build_image(&[("a", 0), ("b", 0)], &[0, 0]);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_duplicate_value() {
        let image = build_image(&[("a", 0), ("a", 1)], &[0, 1]);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_invalid_utf8_value() {
        let mut image = Vec::new();
        image.extend_from_slice(&1u64.to_le_bytes());
        image.extend_from_slice(&2u64.to_le_bytes());
        image.extend_from_slice(&[0xff, 0xfe]);
        image.extend_from_slice(&0u32.to_le_bytes());
        let compressed = zstd::encode_all(&b""[..], 3).unwrap();
        image.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        image.extend_from_slice(&compressed);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_garbage_compressed_block() {
        let mut image = Vec::new();
        image.extend_from_slice(&0u64.to_le_bytes());
        image.extend_from_slice(&4u64.to_le_bytes());
        image.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_column_id_out_of_range() {
        let image = build_image(&[("a", 0)], &[0, 7]);
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }

    #[test]
    fn test_absurd_entry_count_rejected() {
        let mut image = Vec::new();
        image.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            load_from_bytes(&image).unwrap_err(),
            Error::PersistenceCorrupt(_)
        ));
    }
}
