//! Filesystem phases: clear the root, copy static trees, write snapshots.

use std::fs;
use std::path::Path;

use jwalk::WalkDir;

use crate::config::AssetMount;
use crate::core::WriteError;
use crate::{debug, log};

use super::FileTarget;

/// Delete every entry under `root`, leaving it empty. Creates it if missing.
pub fn clear_root(root: &Path) -> Result<(), WriteError> {
    let clear_err = |source| WriteError::Clear {
        path: root.to_path_buf(),
        source,
    };

    if !root.exists() {
        return fs::create_dir_all(root).map_err(clear_err);
    }

    for entry in fs::read_dir(root).map_err(clear_err)? {
        let entry = entry.map_err(clear_err)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(clear_err)?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|source| WriteError::Clear { path, source })?;
    }
    Ok(())
}

/// Copy each `/**` asset tree verbatim under its subpath of `root`.
///
/// Returns the number of files copied. Mounts with another prefix shape, or
/// whose directory does not exist, are skipped with a warning. An entry that
/// cannot be read fails the copy.
pub fn copy_assets(assets: &[AssetMount], root: &Path) -> Result<usize, WriteError> {
    let mut copied = 0;

    for asset in assets {
        let Some(mount) = asset.mount_path() else {
            log!("warn"; "asset prefix `{}` is not a `/**` tree, skipped", asset.prefix);
            continue;
        };
        if !asset.dir.is_dir() {
            log!("warn"; "asset dir `{}` not found, skipped", asset.dir.display());
            continue;
        }

        let dest_root = root.join(mount);
        for entry in WalkDir::new(&asset.dir).sort(true) {
            let entry = entry.map_err(|err| WriteError::Copy {
                from: err.path().unwrap_or(asset.dir.as_path()).to_path_buf(),
                to: dest_root.clone(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source = entry.path();
            let Ok(rel) = source.strip_prefix(&asset.dir) else {
                continue;
            };
            let dest = dest_root.join(rel);
            copy_file(&source, &dest)?;
            copied += 1;
        }
        debug!("assets"; "{} -> /{}", asset.dir.display(), mount);
    }

    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), WriteError> {
    let copy_err = |source| WriteError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    fs::copy(from, to).map_err(copy_err)?;
    Ok(())
}

/// Write a snapshot, creating the full parent chain first. Overwrites.
pub fn write_target(target: &FileTarget) -> Result<(), WriteError> {
    let write_err = |source| WriteError::Write {
        path: target.path.clone(),
        source,
    };
    if let Some(parent) = target.path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&target.path, &target.bytes).map_err(write_err)
}
