//! Concurrent column build pipeline.
//!
//! Transforms a text file (one value per line) into a filled dictionary and
//! encoded column with bounded memory:
//!
//! 1. **Size probe** — one streaming pass counts lines; the column is
//!    allocated to exactly that length up front.
//! 2. **Chunked streaming** — a second pass accumulates lines until a byte
//!    or line budget trips. Each chunk carries its starting absolute line
//!    index.
//! 3. **Scatter/join** — the chunk is partitioned into contiguous ranges,
//!    one per worker; each worker also receives the matching disjoint
//!    `&mut` sub-slice of the column, so column writes need no lock.
//! 4. **Batched inserts** — workers probe under the read lock and collect
//!    novel values into a small pending buffer, flushed under a single
//!    write guard. Every pending entry is re-probed inside the exclusive
//!    section: a peer may have inserted it since the read probe.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use dictcol_core::{DictColumn, Error, Result, SharedDict, ValueDict, DEFAULT_MAX_ENTRIES};

/// Default chunk byte budget (10 MiB).
pub const DEFAULT_CHUNK_BYTES: usize = 10 * 1024 * 1024;

/// Default pending-buffer size flushed per exclusive section.
pub const DEFAULT_BATCH_SIZE: usize = 100;

// ============================================================================
// Options
// ============================================================================

/// Build configuration.
///
/// Zero means "derive": `workers` falls back to the machine's available
/// parallelism and `chunk_lines` to `chunk_bytes / 16`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Worker thread count (0 = available parallelism).
    pub workers: usize,
    /// Chunk byte budget.
    pub chunk_bytes: usize,
    /// Chunk line budget (0 = `chunk_bytes / 16`).
    pub chunk_lines: usize,
    /// Pending-buffer size per worker.
    pub batch_size: usize,
    /// Keep the original values alongside the encoded column. Required by
    /// the baseline search variants; inflates memory by the input size.
    pub retain_originals: bool,
    /// Dictionary entry ceiling.
    pub max_dictionary_entries: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            chunk_lines: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            retain_originals: false,
            max_dictionary_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl BuildOptions {
    /// Effective worker count (>= 1).
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Effective chunk line budget (derived from the byte budget if 0).
    pub fn effective_chunk_lines(&self) -> usize {
        if self.chunk_lines > 0 {
            return self.chunk_lines;
        }
        (self.chunk_bytes / 16).max(1)
    }
}

// ============================================================================
// Build
// ============================================================================

/// Build a [`DictColumn`] from a text file, one value per line.
///
/// On any error the partially populated column is discarded; the returned
/// column is internally consistent only on `Ok`.
pub fn build(path: &Path, opts: &BuildOptions) -> Result<DictColumn> {
    let workers = opts.effective_workers();
    let chunk_line_budget = opts.effective_chunk_lines();

    let total_bytes = std::fs::metadata(path)
        .map_err(|e| Error::input(format!("cannot stat {}: {e}", path.display())))?
        .len();
    let total_lines = count_lines(path)?;

    tracing::info!(
        path = %path.display(),
        bytes = total_bytes,
        lines = total_lines,
        workers,
        "starting column build"
    );

    let mut encoded = vec![0u32; total_lines];
    let dict = SharedDict::new(ValueDict::with_max_entries(opts.max_dictionary_entries));
    let mut originals: Option<Vec<Arc<str>>> = opts
        .retain_originals
        .then(|| Vec::with_capacity(total_lines));

    let file = open_input(path)?;
    let mut reader = BufReader::new(file);

    let mut chunk: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut processed_lines = 0usize;
    let mut processed_bytes = 0u64;

    loop {
        chunk.clear();
        let mut chunk_bytes = 0usize;
        while chunk_bytes < opts.chunk_bytes && chunk.len() < chunk_line_budget {
            line.clear();
            let n = reader
                .read_line(&mut line)
                .map_err(|e| Error::input(format!("read failed on {}: {e}", path.display())))?;
            if n == 0 {
                break;
            }
            chunk_bytes += n;
            if line.ends_with('\n') {
                line.pop();
            }
            chunk.push(std::mem::take(&mut line));
        }
        if chunk.is_empty() {
            break;
        }

        let chunk_start = processed_lines;
        let chunk_len = chunk.len();
        if chunk_start + chunk_len > encoded.len() {
            return Err(Error::input(
                "input grew between the probe and ingest passes",
            ));
        }

        encode_chunk(
            &dict,
            &chunk,
            &mut encoded[chunk_start..chunk_start + chunk_len],
            workers,
            opts.batch_size,
        )?;

        processed_lines += chunk_len;
        processed_bytes += chunk_bytes as u64;
        tracing::debug!(
            chunk_start,
            chunk_len,
            percent = format_args!(
                "{:.1}",
                processed_bytes as f64 / (total_bytes.max(1)) as f64 * 100.0
            ),
            "chunk encoded"
        );

        if let Some(orig) = originals.as_mut() {
            orig.extend(chunk.drain(..).map(Arc::from));
        }
    }

    if processed_lines != total_lines {
        return Err(Error::input(format!(
            "input shrank between the probe and ingest passes ({processed_lines} of {total_lines} lines)"
        )));
    }

    tracing::info!(
        lines = total_lines,
        distinct = dict.len(),
        "column build complete"
    );

    Ok(DictColumn::from_parts(dict, encoded, originals))
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::input(format!("cannot open {}: {e}", path.display())))
}

/// Streaming line count for the size probe.
fn count_lines(path: &Path) -> Result<usize> {
    let mut reader = BufReader::new(open_input(path)?);
    let mut line = String::new();
    let mut count = 0usize;
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| Error::input(format!("read failed on {}: {e}", path.display())))?;
        if n == 0 {
            break;
        }
        count += 1;
    }
    Ok(count)
}

// ============================================================================
// Chunk encoding
// ============================================================================

/// Encode one chunk, scattering contiguous line ranges across workers.
///
/// The final range absorbs the remainder. `out` is the chunk's sub-slice
/// of the column; each worker receives a disjoint `&mut` piece of it.
fn encode_chunk(
    dict: &SharedDict,
    lines: &[String],
    out: &mut [u32],
    workers: usize,
    batch_size: usize,
) -> Result<()> {
    debug_assert_eq!(lines.len(), out.len());
    let total = lines.len();
    if workers <= 1 || total < workers {
        return encode_range(dict, lines, out, batch_size);
    }

    let per_worker = total / workers;
    let results = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut rest_lines = lines;
        let mut rest_out = out;
        for w in 0..workers {
            let take = if w == workers - 1 {
                rest_lines.len()
            } else {
                per_worker
            };
            let (range_lines, next_lines) = rest_lines.split_at(take);
            let (range_out, next_out) = std::mem::take(&mut rest_out).split_at_mut(take);
            rest_lines = next_lines;
            rest_out = next_out;
            if range_lines.is_empty() {
                continue;
            }
            handles.push(scope.spawn(move || encode_range(dict, range_lines, range_out, batch_size)));
        }
        handles
            .into_iter()
            .map(|h| h.join().expect("ingest worker panicked"))
            .collect::<Vec<Result<()>>>()
    });

    for result in results {
        result?;
    }
    Ok(())
}

/// Encode one contiguous line range.
///
/// Read-locked probe per line; novel values accumulate in a pending buffer
/// flushed under a single write guard when full or at range end.
fn encode_range(
    dict: &SharedDict,
    lines: &[String],
    out: &mut [u32],
    batch_size: usize,
) -> Result<()> {
    let batch_size = batch_size.max(1);
    let mut pending: Vec<(usize, &str)> = Vec::with_capacity(batch_size);

    for (i, value) in lines.iter().enumerate() {
        if let Some(id) = dict.lookup(value) {
            out[i] = id;
            continue;
        }

        pending.push((i, value.as_str()));
        if pending.len() >= batch_size {
            flush_pending(dict, &mut pending, out)?;
        }
    }

    if !pending.is_empty() {
        flush_pending(dict, &mut pending, out)?;
    }
    Ok(())
}

/// Drain the pending buffer under one exclusive section.
///
/// `assign_or_lookup` re-probes each entry, absorbing inserts made by peer
/// workers since the read probe.
fn flush_pending(
    dict: &SharedDict,
    pending: &mut Vec<(usize, &str)>,
    out: &mut [u32],
) -> Result<()> {
    let mut guard = dict.write();
    for &(idx, value) in pending.iter() {
        out[idx] = guard.assign_or_lookup(value)?;
    }
    pending.clear();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
