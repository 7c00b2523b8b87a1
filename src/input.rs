use std::io::Read;
use std::path::Path;

use crate::error::{Result, CeviriError};

/// Source text from `text`, then `file`, then `stdin`.
///
/// `stdin` is `None` when standard input is an interactive terminal; the
/// source is then empty.
pub fn read_source<R: Read>(text: Option<String>, file: Option<&Path>, stdin: Option<R>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return read_file(path);
    }

    let mut buffer = String::new();
    if let Some(mut stdin) = stdin {
        stdin.read_to_string(&mut buffer)?;
    }
    Ok(buffer)
}

pub fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CeviriError::FileNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}
