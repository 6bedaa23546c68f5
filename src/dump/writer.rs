//! Dump file writer.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

use crate::dump::naming::DumpTarget;
use crate::translate::V2Envelope;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode dump: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes dump files into a fixed directory.
#[derive(Debug, Clone)]
pub struct DumpWriter {
    dir: PathBuf,
}

impl DumpWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the raw body, the readable upstream JSON and, for v3 requests,
    /// the converted v2 JSON. Returns the paths written.
    pub async fn write(
        &self,
        target: &DumpTarget,
        raw: &[u8],
        upstream: &Value,
        translated: &V2Envelope,
    ) -> Result<Vec<PathBuf>, DumpError> {
        let mut written = Vec::with_capacity(3);

        written.push(self.write_file(&target.dump_file(), raw).await?);
        written.push(
            self.write_file(&target.readable_file(), &pretty(upstream)?)
                .await?,
        );
        if let Some(name) = target.converted_file() {
            written.push(self.write_file(&name, &pretty(translated)?).await?);
        }

        Ok(written)
    }

    async fn write_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf, DumpError> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| DumpError::Io {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "Dump written");
        Ok(path)
    }
}

/// JSON with 4-space indentation and non-ASCII text kept as UTF-8.
pub fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}
