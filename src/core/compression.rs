//! Gzip transport compression
//!
//! Files are streamed through `flate2` on the blocking pool so large tables
//! never have to fit in memory.

pub use crate::adapters::traits::Compressor;

use crate::domain::job::COMPRESSED_SUFFIX;
use crate::domain::{Result, ShuttleError};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Gzip compressor using flate2
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

/// `file` with the compressed suffix appended
pub fn compressed_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// `file` with the compressed suffix removed
///
/// # Errors
///
/// Returns an error if `file` does not end in the compressed suffix.
pub fn decompressed_path(file: &Path) -> Result<PathBuf> {
    let name = file.to_string_lossy();
    name.strip_suffix(COMPRESSED_SUFFIX)
        .map(PathBuf::from)
        .ok_or_else(|| {
            ShuttleError::Compression(format!(
                "'{}' does not end in {COMPRESSED_SUFFIX}",
                file.display()
            ))
        })
}

fn gzip_file(source: &Path, target: &Path, level: Compression) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(target)?), level);
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}

fn gunzip_file(source: &Path, target: &Path) -> io::Result<()> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(source)?));
    let mut writer = BufWriter::new(File::create(target)?);
    io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Runs a file transform on the blocking pool and swaps the output in
///
/// On failure the partial output is removed and the source is kept.
async fn transform_in_place(
    source: PathBuf,
    target: PathBuf,
    verb: &'static str,
    transform: impl FnOnce(&Path, &Path) -> io::Result<()> + Send + 'static,
) -> Result<PathBuf> {
    let result = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        if let Err(e) = transform(&source, &target) {
            let _ = std::fs::remove_file(&target);
            return Err(ShuttleError::Compression(format!(
                "Failed to {verb} '{}': {e}",
                source.display()
            )));
        }
        std::fs::remove_file(&source)?;
        Ok(target)
    })
    .await
    .map_err(|e| ShuttleError::Compression(format!("{verb} task failed: {e}")))?;
    result
}

#[async_trait]
impl Compressor for GzipCompressor {
    async fn compress(&self, file: &Path) -> Result<PathBuf> {
        let target = compressed_path(file);
        let level = self.level;
        let compressed = transform_in_place(
            file.to_path_buf(),
            target,
            "compress",
            move |source, target| gzip_file(source, target, level),
        )
        .await?;
        tracing::debug!(file = %compressed.display(), "Compressed");
        Ok(compressed)
    }

    async fn decompress(&self, file: &Path) -> Result<PathBuf> {
        let target = decompressed_path(file)?;
        let decompressed =
            transform_in_place(file.to_path_buf(), target, "decompress", gunzip_file).await?;
        tracing::debug!(file = %decompressed.display(), "Decompressed");
        Ok(decompressed)
    }

    fn name(&self) -> &'static str {
        "gzip"
    }
}
