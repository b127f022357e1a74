//! All-or-nothing CSV file writes.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ReportError;

/// Staging file next to `path`: `.{file_name}.tmp`.
fn temp_path_for(path: &Path) -> Result<PathBuf, ReportError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ReportError::InvalidArgument {
            message: format!("{} does not name a file", path.display()),
        })?
        .to_string_lossy();
    let temp_name = format!(".{}.tmp", file_name);
    Ok(match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

/// Writes `rows` as header-less CSV to `path`, replacing any previous content.
///
/// Rows go to a staging file that is renamed over `path` only after every
/// row was written and flushed. On failure the staging file is removed and
/// `path` is left as it was.
pub(crate) fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<usize, ReportError> {
    let temp_path = temp_path_for(path)?;
    let file = File::create(&temp_path).map_err(|e| ReportError::io(path, e))?;

    let result = write_into(file, path, rows)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| ReportError::io(path, e)));

    if let Err(err) = result {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            debug!(
                "Could not remove staging file {}: {}",
                temp_path.display(),
                cleanup
            );
        }
        return Err(err);
    }

    Ok(rows.len())
}

fn write_into(file: File, path: &Path, rows: &[Vec<String>]) -> Result<(), ReportError> {
    let csv_error = |e: csv::Error| ReportError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(file);

    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| ReportError::io(path, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| ReportError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| ReportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_writes_minimally_quoted_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let written = write_rows(
            &path,
            &[row(&["1", "16:00:00", "Agustin Olmedo"]), row(&["Doe, John"])],
        )
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1,16:00:00,Agustin Olmedo\n\"Doe, John\"\n"
        );
        assert!(!dir.path().join(".out.csv.tmp").exists());
    }

    #[test]
    fn test_no_rows_gives_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "stale\n").unwrap();

        assert_eq!(write_rows(&path, &[]).unwrap(), 0);
        assert_eq!(fs::read(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_missing_parent_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = write_rows(&path, &[row(&["x"])]).unwrap_err();

        assert!(matches!(err, ReportError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_rename_keeps_previous_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curso_C.csv");
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("previous"), "Elber Galarga\n").unwrap();

        let err = write_rows(&path, &[row(&["Alan Brito"])]).unwrap_err();

        assert!(matches!(err, ReportError::Io { .. }));
        assert!(!dir.path().join(".curso_C.csv.tmp").exists());
        assert!(path.is_dir());
        assert_eq!(
            fs::read_to_string(path.join("previous")).unwrap(),
            "Elber Galarga\n"
        );
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        let err = write_rows(Path::new(".."), &[]).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
