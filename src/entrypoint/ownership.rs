//! Recursive ownership changes

use crate::entrypoint::identity::Identity;
use crate::error::{HandoffError, HandoffResult};
use std::os::unix::fs::{chown, lchown};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Change ownership of `root` and everything beneath it
///
/// Symlinks inside the tree are re-owned themselves, never followed.
/// Returns the number of entries changed.
pub fn chown_recursive(root: &Path, identity: Identity) -> HandoffResult<usize> {
    let mut changed = 0;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| HandoffError::Chown {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source: e.into(),
        })?;

        let path = entry.path();
        let result = if entry.depth() > 0 && entry.path_is_symlink() {
            lchown(path, Some(identity.uid), Some(identity.gid))
        } else {
            chown(path, Some(identity.uid), Some(identity.gid))
        };
        result.map_err(|e| HandoffError::Chown {
            path: path.to_path_buf(),
            source: e,
        })?;
        changed += 1;
    }

    debug!("Changed ownership of {} entries under {}", changed, root.display());
    Ok(changed)
}

/// Recursive chown only if `root` exists
pub fn chown_if_present(root: &Path, identity: Identity) -> HandoffResult<Option<usize>> {
    if !root.exists() {
        debug!("{} not present, skipping ownership", root.display());
        return Ok(None);
    }
    chown_recursive(root, identity).map(Some)
}
