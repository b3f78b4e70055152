//! Binary serialization of the build artifacts.
//!
//! `bincode` over `serde`-derived types gives the "stable binary archive"
//! the wire contract requires: field order is the derive order and must
//! not change across versions without a format bump.

use std::path::Path;

use crate::bloom::IbfImage;
use crate::config::Meta;
use crate::error::Result;
use crate::fmindex::FmIndexImage;

fn write_bincode<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    bincode::serialize_into(writer, value)?;
    Ok(())
}

fn read_bincode<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(bincode::deserialize_from(reader)?)
}

pub fn write_ibf(path: &Path, image: &IbfImage) -> Result<()> {
    write_bincode(path, image)
}

pub fn read_ibf(path: &Path) -> Result<IbfImage> {
    read_bincode(path)
}

pub fn write_meta(path: &Path, meta: &Meta) -> Result<()> {
    write_bincode(path, meta)
}

pub fn read_meta(path: &Path) -> Result<Meta> {
    read_bincode(path)
}

pub fn write_fmindex(path: &Path, image: &FmIndexImage) -> Result<()> {
    write_bincode(path, image)
}

pub fn read_fmindex(path: &Path) -> Result<FmIndexImage> {
    read_bincode(path)
}

pub fn write_ref_store(path: &Path, refs: &[Vec<u8>]) -> Result<()> {
    write_bincode(path, &refs.to_vec())
}

pub fn read_ref_store(path: &Path) -> Result<Vec<Vec<u8>>> {
    read_bincode(path)
}

/// Builds the per-bin artifact paths from a build output prefix.
///
/// `P.ibf`, `P.meta` are shared; `P.i.fmindex`/`P.i.ref` are per bin `i`.
pub struct ArtifactPaths {
    prefix: std::path::PathBuf,
}

impl ArtifactPaths {
    pub fn new(prefix: impl Into<std::path::PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn ibf(&self) -> std::path::PathBuf {
        self.with_suffix("ibf")
    }

    pub fn meta(&self) -> std::path::PathBuf {
        self.with_suffix("meta")
    }

    pub fn fmindex(&self, bin: u32) -> std::path::PathBuf {
        self.with_suffix(&format!("{bin}.fmindex"))
    }

    pub fn ref_store(&self, bin: u32) -> std::path::PathBuf {
        self.with_suffix(&format!("{bin}.ref"))
    }

    fn with_suffix(&self, suffix: &str) -> std::path::PathBuf {
        let mut os = self.prefix.clone().into_os_string();
        os.push(".");
        os.push(suffix);
        std::path::PathBuf::from(os)
    }
}
