//! Output packaging via an external archiver.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use plantpresets_shared::{PresetsError, Result};

/// Recursively archive the contents of `dir` into `archive_path`.
///
/// Runs `<command> -r <archive_path> .` inside `dir`, the invocation `zip`
/// expects. An existing archive is removed first so stale entries never
/// survive. Fails if the command cannot be spawned, exits unsuccessfully, or
/// leaves no archive behind.
#[instrument(skip_all, fields(dir = %dir.display(), archive = %archive_path.display(), command = %command))]
pub fn archive_dir(dir: &Path, archive_path: &Path, command: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(PresetsError::Package(format!(
            "output directory {} does not exist",
            dir.display()
        )));
    }

    // The archiver runs inside `dir`, so the archive path must not be relative.
    let archive_path =
        std::path::absolute(archive_path).map_err(|e| PresetsError::io(archive_path, e))?;

    if archive_path.exists() {
        debug!("removing previous archive");
        std::fs::remove_file(&archive_path).map_err(|e| PresetsError::io(&archive_path, e))?;
    }

    let output = Command::new(command)
        .arg("-r")
        .arg(&archive_path)
        .arg(".")
        .current_dir(dir)
        .output()
        .map_err(|e| {
            PresetsError::Package(format!("failed to run `{command}`: {e}. Is it installed?"))
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!(output = %line, "archiver");
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PresetsError::Package(format!(
            "`{command}` exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    if !archive_path.is_file() {
        return Err(PresetsError::Package(format!(
            "`{command}` succeeded but produced no archive at {}",
            archive_path.display()
        )));
    }

    info!(archive = %archive_path.display(), "output packaged");
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = archive_dir(&tmp.path().join("dist"), &tmp.path().join("p.zip"), "zip").unwrap_err();
        assert!(matches!(err, PresetsError::Package(_)));
    }

    #[test]
    fn unknown_command_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = archive_dir(
            tmp.path(),
            &tmp.path().join("p.zip"),
            "plantpresets-no-such-archiver",
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[test]
    fn command_without_archive_fails_and_stale_archive_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        let archive = tmp.path().join("presets.zip");
        std::fs::write(&archive, b"stale").unwrap();

        let err = archive_dir(&dist, &archive, "true").unwrap_err();
        assert!(err.to_string().contains("produced no archive"));
        assert!(!archive.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_status() {
        let tmp = tempfile::tempdir().unwrap();
        let err = archive_dir(tmp.path(), &tmp.path().join("p.zip"), "false").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn zip_archives_directory_contents() {
        if Command::new("zip").arg("-v").output().is_err() {
            eprintln!("zip not installed, skipping");
            return;
        }

        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        std::fs::create_dir(&dist).unwrap();
        std::fs::write(dist.join("presets.xml"), "<presets/>").unwrap();

        let archive = archive_dir(&dist, &tmp.path().join("presets.zip"), "zip").unwrap();
        assert_eq!(archive, tmp.path().join("presets.zip"));
        let bytes = std::fs::read(&archive).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
