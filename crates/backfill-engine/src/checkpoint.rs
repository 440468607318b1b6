//! Checkpoint writer with atomic tmp→rename
//!
//! The checkpoint holds the whole table, processed or not, so a crash leaves
//! either the previous complete snapshot or the new one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::table::{Table, TableError};

/// `<path>.tmp` next to the target
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write the full table to `path`, replacing any previous checkpoint.
pub fn write_checkpoint(table: &Table, path: &Path) -> Result<(), TableError> {
    let tmp = tmp_path(path);
    if let Err(e) = table.write_csv(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
