//! Output sinks
//!
//! Jobs are written the moment they are extracted, never buffered per site,
//! so memory stays bounded by in-flight work and partial results survive a
//! crash mid-run. The sink is shared by all workers; a mutex guarantees one
//! writer at a time and each record is appended and flushed atomically, so
//! interleaved or partial lines cannot occur.

use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::Job;

/// Destination for scraped jobs
#[async_trait]
pub trait JobSink: Send + Sync {
    /// Append one job. Must be atomic per record under concurrent callers.
    async fn write(&self, job: &Job) -> Result<()>;
}

/// Newline-delimited JSON file sink
///
/// One JSON object per line, UTF-8, non-ASCII characters left unescaped
/// (serde_json's default). Flushed after every record.
pub struct JsonlSink {
    file: Mutex<tokio::fs::File>,
}

impl JsonlSink {
    /// Create (truncate) the output file, creating parent directories as
    /// needed.
    ///
    /// This is a resource-setup operation: failure here is the one condition
    /// that aborts a whole run.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = tokio::fs::File::create(path).await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl JobSink for JsonlSink {
    async fn write(&self, job: &Job) -> Result<()> {
        let mut line = serde_json::to_string(job)?;
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory sink, mainly for tests and dry runs
#[derive(Default)]
pub struct MemorySink {
    jobs: Mutex<Vec<Job>>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs collected so far
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl JobSink for MemorySink {
    async fn write(&self, job: &Job) -> Result<()> {
        self.jobs.lock().await.push(job.clone());
        Ok(())
    }
}
