use glue_core::RunSummary;
use std::fs::{read, write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not access the summary file")]
    Io(#[from] std::io::Error),
    #[error("could not encode or decode summaries")]
    Codec(#[from] bincode::Error),
}

pub fn to_bytes(summaries: &[RunSummary]) -> Result<Vec<u8>, ExportError> {
    Ok(bincode::serialize(summaries)?)
}

pub fn from_bytes(bytes: &[u8]) -> Result<Vec<RunSummary>, ExportError> {
    Ok(bincode::deserialize(bytes)?)
}

pub fn to_file<S: AsRef<Path>>(path: S, summaries: &[RunSummary]) -> Result<(), ExportError> {
    write(path, to_bytes(summaries)?)?;
    Ok(())
}

pub fn from_file<S: AsRef<Path>>(path: S) -> Result<Vec<RunSummary>, ExportError> {
    from_bytes(&read(path)?)
}
