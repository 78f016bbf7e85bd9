use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::bins::Bin;
use crate::contract::BinWriter;
use crate::error::PartitionError;

/// Extension of every bin membership file.
pub const FILELIST_SUFFIX: &str = "filelist";

/// Writes each finalised bin to `<output_dir>/<bin-id>.filelist`, one path per
/// line in insertion order.
#[derive(Debug, Clone)]
pub struct FilelistWriter {
    output_dir: PathBuf,
}

impl FilelistWriter {
    /// Fails if `output_dir` is not an existing directory. Nothing is created.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, PartitionError> {
        let output_dir = output_dir.into();
        if !output_dir.is_dir() {
            error!(output_dir = %output_dir.display(), "Output directory does not exist");
            return Err(PartitionError::MissingOutputDir(output_dir));
        }
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, bin: &Bin) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", bin.id(), FILELIST_SUFFIX))
    }
}

impl BinWriter for FilelistWriter {
    fn write_bin(&mut self, bin: &Bin) -> std::io::Result<PathBuf> {
        let path = self.path_for(bin);
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        let mut out = BufWriter::new(file);
        for item in bin.items() {
            out.write_all(item.path().as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        debug!(path = %path.display(), items = bin.len(), size = bin.cumulative_size(), "Wrote bin");
        Ok(path)
    }
}
