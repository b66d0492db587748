//! JSONL segment splitting
//!
//! Some downstream ingestion targets cap file uploads, so a finished run can
//! be split into numbered segments under a byte budget. Splitting only ever
//! happens on line boundaries; a record is never cut in half, so every
//! segment is itself valid JSONL. A single record larger than the budget
//! gets a segment of its own.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{Error, Result};

/// Default segment budget (95 MB), safely under a common 100 MB upload cap
pub const DEFAULT_SEGMENT_BYTES: u64 = 95 * 1024 * 1024;

/// Split a JSONL file into numbered segments of at most `max_bytes` each.
///
/// Segments are named `{stem}.part{NN}.{ext}` next to the input file, with
/// `NN` starting at `01`. Returns the segment paths in order. An empty
/// input produces no segments.
pub async fn split_jsonl(input: impl AsRef<Path>, max_bytes: u64) -> Result<Vec<PathBuf>> {
    let input = input.as_ref();
    if max_bytes == 0 {
        return Err(Error::Config {
            message: "segment size must be at least one byte".to_string(),
            key: Some("max_bytes".to_string()),
        });
    }

    let file = tokio::fs::File::open(input).await?;
    let mut lines = BufReader::new(file).lines();

    let mut segments = Vec::new();
    let mut writer: Option<BufWriter<tokio::fs::File>> = None;
    let mut segment_size = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line_size = line.len() as u64 + 1;

        let roll = writer.is_none() || (segment_size > 0 && segment_size + line_size > max_bytes);
        if roll {
            if let Some(mut prev) = writer.take() {
                prev.flush().await?;
            }
            let path = segment_path(input, segments.len() + 1);
            let file = tokio::fs::File::create(&path).await?;
            segments.push(path);
            writer = Some(BufWriter::new(file));
            segment_size = 0;
        }

        if let Some(writer) = writer.as_mut() {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            segment_size += line_size;
        }
    }

    if let Some(mut last) = writer.take() {
        last.flush().await?;
    }

    tracing::info!(
        input = %input.display(),
        segments = segments.len(),
        "split into segments"
    );
    Ok(segments)
}

/// Concatenate JSONL segments back into a single file, in the order given
pub async fn merge_jsonl(parts: &[PathBuf], output: impl AsRef<Path>) -> Result<()> {
    let output = output.as_ref();
    let file = tokio::fs::File::create(output).await?;
    let mut writer = BufWriter::new(file);

    for part in parts {
        let file = tokio::fs::File::open(part).await?;
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
    }

    writer.flush().await?;
    Ok(())
}

/// `jobs.jsonl` → `jobs.part03.jsonl`
fn segment_path(input: &Path, index: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jsonl".to_string());
    input.with_file_name(format!("{stem}.part{index:02}.{extension}"))
}
