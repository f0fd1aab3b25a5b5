use std::path::Path;

use crate::Result;

/// Creates the directory that will hold the database file.
pub fn ensure_db_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
