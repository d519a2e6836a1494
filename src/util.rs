//! Filesystem helpers for skeleton copies and ownership repair

use std::fs;
use std::os::unix::fs::lchown;
use std::path::Path;

use nix::unistd::{Group, User};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Existence test that does not follow a dangling final symlink
pub fn is_exist(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Merge the contents of `src` into `dst`.
///
/// Directories are created as needed, regular files and symlinks already
/// present at the destination are replaced. `src` itself is not copied,
/// only what is inside it.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::from_read(src, e))?;
    if !meta.is_dir() {
        return Err(Error::parse(src.display().to_string(), "not a directory"));
    }

    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(src, e))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::parse(entry.path().display().to_string(), "outside copy root"))?;
        let target = dst.join(rel);
        let ft = entry.file_type();

        if ft.is_dir() {
            // A symlink at the target is replaced, never written through
            if !fs::symlink_metadata(&target).is_ok_and(|m| m.is_dir()) {
                remove_existing(&target)?;
                fs::create_dir(&target).map_err(|e| Error::io(&target, e))?;
            }
            let perms = entry
                .metadata()
                .map_err(|e| walk_error(src, e))?
                .permissions();
            fs::set_permissions(&target, perms).map_err(|e| Error::io(&target, e))?;
        } else if ft.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            remove_existing(&target)?;
            std::os::unix::fs::symlink(&link, &target).map_err(|e| Error::io(&target, e))?;
        } else if ft.is_file() {
            if fs::symlink_metadata(&target).is_ok_and(|m| !m.is_file()) {
                remove_existing(&target)?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        } else {
            tracing::debug!(path = %entry.path().display(), "Skipping special file");
        }
    }

    Ok(())
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|e| Error::io(path, e)),
        Ok(_) => fs::remove_file(path).map_err(|e| Error::io(path, e)),
        Err(_) => Ok(()),
    }
}

/// Recursively hand `path` to `owner:group`, like `chown -hR`.
///
/// Symlinks are never dereferenced: the link itself changes owner. The walk
/// keeps going after a failed entry and returns the first failure at the end.
pub fn chown_tree(path: &Path, owner: &str, group: &str) -> Result<()> {
    let uid = User::from_name(owner)
        .map_err(|e| Error::parse(format!("user {owner}"), e.to_string()))?
        .ok_or_else(|| Error::not_found(format!("user '{owner}'")))?
        .uid;
    let gid = Group::from_name(group)
        .map_err(|e| Error::parse(format!("group {group}"), e.to_string()))?
        .ok_or_else(|| Error::not_found(format!("group '{group}'")))?
        .gid;

    chown_tree_ids(path, uid.as_raw(), gid.as_raw())
}

/// Numeric form of [`chown_tree`]
pub fn chown_tree_ids(path: &Path, uid: u32, gid: u32) -> Result<()> {
    if !is_exist(path) {
        return Err(Error::not_found(path.display().to_string()));
    }

    let mut first_err = None;
    for entry in WalkDir::new(path)
        .follow_links(false)
        .follow_root_links(false)
    {
        let result = entry.map_err(|e| walk_error(path, e)).and_then(|entry| {
            lchown(entry.path(), Some(uid), Some(gid)).map_err(|e| Error::io(entry.path(), e))
        });
        if let Err(e) = result {
            tracing::debug!("chown: {}", e);
            first_err.get_or_insert(e);
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn walk_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).to_path_buf();
    match e.into_io_error() {
        Some(io) => Error::io(path, io),
        None => Error::parse(path.display().to_string(), "filesystem loop"),
    }
}
