use crate::error::{Error, Result};

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::prelude::*;
use std::io::{BufReader, ErrorKind, SeekFrom};
use std::path::Path;
use tracing::{debug, info};

/// Reads a ledger file, transparently inflating it when it is gzip framed.
pub fn open_source(path: &Path) -> Result<String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let gzip = is_gzip(&file);
    file.seek(SeekFrom::Start(0))?;

    let mut text = String::new();
    if gzip {
        info!(path = %path.display(), "reading gzip framed ledger");
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        info!(path = %path.display(), "reading plain ledger");
        file.read_to_string(&mut text)?;
    }
    debug!(bytes = text.len(), "ledger text loaded");
    Ok(text)
}

// Framing is decided by whether the first line inflates, not by magic bytes.
fn is_gzip(file: &File) -> bool {
    let mut reader = BufReader::new(GzDecoder::new(file));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line).is_ok()
}

/// Whether `output` is missing or older than `input`.
pub fn needs_refresh(input: &Path, output: &Path) -> Result<bool> {
    let input_modified = match fs::metadata(input) {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::SourceNotFound(input.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    match fs::metadata(output) {
        Ok(meta) => Ok(input_modified > meta.modified()?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}
