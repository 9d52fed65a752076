use cfg_if::cfg_if;
use rand::distr::Alphanumeric;
use rand::prelude::*;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub fn read_template(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Truncates the target and writes over it. A failure halfway leaves the
/// file truncated.
pub fn write_in_place(path: &Path, contents: &str) -> Result<(), Error> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_err)?;

    file.write_all(contents.as_bytes()).map_err(write_err)
}

fn temp_suffix() -> String {
    let rng = rand::rng();

    rng.sample_iter(&Alphanumeric)
        .take(16)
        .map(|c| c as char)
        .collect::<String>()
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(".{name}.{}.tmp", temp_suffix()))
}

/// Writes to a sibling temporary file and renames it over the target. The
/// target keeps its permissions and is never seen half-written.
///
/// Symlinks are followed, so the file they point to is the one replaced. The
/// target must be writable by the caller. Hard-linked targets are written in
/// place since a rename would split them from their other links.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), Error> {
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    // Fails here, before any temp file exists, if the target is gone
    let target = std::fs::canonicalize(path).map_err(write_err)?;

    // Same access check a plain overwrite would hit
    let current = OpenOptions::new()
        .write(true)
        .open(&target)
        .map_err(write_err)?;
    let metadata = current.metadata().map_err(write_err)?;
    drop(current);

    if has_other_links(&metadata) {
        log::debug!("{} has other hard links, writing in place", target.display());
        return write_in_place(&target, contents).map_err(|e| match e {
            Error::Write { source, .. } => write_err(source),
            other => other,
        });
    }

    let tmp = temp_path(&target);
    log::debug!("Writing temporary file {}", tmp.display());

    let result = (|| -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)?;
        file.write_all(contents.as_bytes())?;
        copy_owner(&file, &metadata);
        file.set_permissions(metadata.permissions())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, &target)
    })();

    if let Err(e) = result {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            log::warn!(
                "Failed to remove temporary file {}: {}",
                tmp.display(),
                cleanup
            );
        }
        return Err(write_err(e));
    }

    sync_parent(&target);

    Ok(())
}

fn has_other_links(metadata: &std::fs::Metadata) -> bool {
    #[allow(unused_mut)] // stays false off Unix
    let mut linked = false;

    cfg_if! {
        if #[cfg(unix)] {
            use std::os::unix::fs::MetadataExt;
            linked = metadata.nlink() > 1;
        } else {
            let _ = metadata;
        }
    }

    linked
}

fn copy_owner(file: &std::fs::File, metadata: &std::fs::Metadata) {
    cfg_if! {
        if #[cfg(unix)] {
            use std::os::unix::fs::MetadataExt;

            // Only root may give a file away; for anyone else this keeps the group at best
            if let Err(e) = std::os::unix::fs::fchown(file, Some(metadata.uid()), Some(metadata.gid())) {
                log::debug!("Could not copy owner to temporary file: {}", e);
            }
        } else {
            let _ = (file, metadata);
        }
    }
}

fn sync_parent(path: &Path) {
    cfg_if! {
        if #[cfg(unix)] {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };

            if let Err(e) = std::fs::File::open(parent).and_then(|dir| dir.sync_all()) {
                log::warn!("Failed to sync directory {}: {}", parent.display(), e);
            }
        } else {
            let _ = path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn read_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = read_template(&dir.path().join("app.yaml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("app.yaml"));
    }

    #[test]
    fn in_place_overwrites_shorter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "a much longer original body").unwrap();

        write_in_place(&path, "short").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn in_place_missing_file_is_write_error() {
        let dir = tempdir().unwrap();
        let err = write_in_place(&dir.path().join("app.yaml"), "x").unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn atomic_replaces_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "project: ##PROJECT_ID\n").unwrap();

        write_atomic(&path, "project: my-proj\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "project: my-proj\n");
        assert_eq!(entries(dir.path()), ["app.yaml"]);
    }

    #[test]
    fn atomic_missing_target_is_write_error() {
        let dir = tempdir().unwrap();
        let err = write_atomic(&dir.path().join("app.yaml"), "x").unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(entries(dir.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "x").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "y").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_writes_through_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.yaml");
        let link = dir.path().join("app.yaml");
        std::fs::write(&real, "id: ##PROJECT_ID\n").unwrap();
        std::os::unix::fs::symlink("real.yaml", &link).unwrap();

        write_atomic(&link, "id: p\n").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "id: p\n");
        assert_eq!(entries(dir.path()), ["app.yaml", "real.yaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_rejects_unwritable_target() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        std::fs::write(&path, "id: ##PROJECT_ID\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // Permission bits are not enforced for root
        if OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let err = write_atomic(&path, "id: p\n").unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id: ##PROJECT_ID\n");
        assert_eq!(entries(dir.path()), ["app.yaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_keeps_hard_links_together() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaml");
        let other = dir.path().join("app.linked.yaml");
        std::fs::write(&path, "id: ##PROJECT_ID\n").unwrap();
        std::fs::hard_link(&path, &other).unwrap();

        write_atomic(&path, "id: p\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id: p\n");
        assert_eq!(std::fs::read_to_string(&other).unwrap(), "id: p\n");
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let tmp = temp_path(Path::new("deploy/app.yaml"));
        assert_eq!(tmp.parent(), Some(Path::new("deploy")));

        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".app.yaml."));
        assert!(name.ends_with(".tmp"));
        assert_eq!(name.len(), ".app.yaml.".len() + 16 + ".tmp".len());
    }
}
