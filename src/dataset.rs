//! Dataset file I/O.
//!
//! Input items and annotation records travel as newline-delimited JSON;
//! prompt examples load from a JSON array or a YAML list. Malformed or
//! misnamed files are fatal startup errors - the run never starts on a
//! dataset it cannot fully read.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::PromptExample;

/// Read every record from a JSONL file. Blank lines are skipped; a
/// malformed line is an error naming the line number.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).with_context(|| {
            format!("Malformed JSON on line {} of {}", index + 1, path.display())
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Line-by-line JSONL writer.
pub struct JsonlWriter {
    inner: BufWriter<File>,
}

impl JsonlWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            inner: BufWriter::new(file),
        })
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to serialize record")?;
        self.inner
            .write_all(line.as_bytes())
            .and_then(|_| self.inner.write_all(b"\n"))
            .context("Failed to write record")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().context("Failed to flush output file")
    }
}

/// Load prompt examples from a `.json` array or `.yaml`/`.yml` list.
/// Any other extension is a fatal configuration error.
pub fn read_prompt_examples(path: &Path) -> Result<Vec<PromptExample>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    if !matches!(extension, "json" | "yaml" | "yml") {
        anyhow::bail!(
            "The --examples-path parameter expects a .json, .yaml or .yml file, got: {}",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read examples file: {}", path.display()))?;

    if extension == "json" {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse examples file: {}", path.display()))
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse examples file: {}", path.display()))
    }
}
