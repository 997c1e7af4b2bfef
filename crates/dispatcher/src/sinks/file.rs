//! FileSink - appends batches to a JSON Lines file

use contracts::{ContractError, DataSink, Detection3DArray};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, info, instrument};

use super::PublishedBatch;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file
    pub path: PathBuf,
    /// Append to an existing file instead of truncating it
    pub append: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    ///
    /// `path` names the output file directly. Otherwise a timestamped
    /// `detections_YYYYmmdd_HHMMSS.jsonl` is created under `dir`
    /// (default `./output`).
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = match params.get("path") {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = params
                    .get("dir")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./output"));
                dir.join(timestamped_file_name())
            }
        };

        let append = params
            .get("append")
            .is_some_and(|v| matches!(v.as_str(), "true" | "1" | "yes"));

        Self { path, append }
    }
}

fn timestamped_file_name() -> String {
    format!(
        "detections_{}.jsonl",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Sink that writes one JSON object per batch
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: Some(BufWriter::new(file)),
            lines: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// Output file path
    pub fn path(&self) -> &PathBuf {
        &self.config.path
    }

    fn append_line(&mut self, seq: u64, batch: &Detection3DArray) -> std::io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("file already closed"))?;

        let record = PublishedBatch { seq, batch };
        serde_json::to_writer(&mut *writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn to_contract_error(&self, e: std::io::Error) -> ContractError {
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, batch),
        fields(sink = %self.name)
    )]
    async fn write(&mut self, seq: u64, batch: &Detection3DArray) -> Result<(), ContractError> {
        self.append_line(seq, batch).map_err(|e| {
            error!(sink = %self.name, seq, error = %e, "Write failed");
            self.to_contract_error(e)
        })
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush().map_err(|e| self.to_contract_error(e)),
            None => Ok(()),
        }
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| self.to_contract_error(e))?;
        }
        info!(
            sink = %self.name,
            path = %self.config.path.display(),
            lines = self.lines,
            "FileSink closed"
        );
        debug!(sink = %self.name, "FileSink writer released");
        Ok(())
    }
}
