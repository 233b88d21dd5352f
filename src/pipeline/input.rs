//! Input resolution: validate a local PDF path, or materialise an uploaded
//! byte buffer into a file the renderer can open.
//!
//! pdfium needs a file-system path. Uploaded bytes are written into a fresh
//! `TempDir` per request so concurrent requests never collide, and the
//! directory is removed when [`ResolvedInput`] is dropped. The `%PDF` magic is
//! checked up front so callers get a meaningful error instead of a pdfium
//! parse failure.

use crate::error::{GradeError, RenderError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// A PDF ready for rendering.
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input arrived as bytes and was written to a temp directory that lives
    /// as long as this value.
    Materialised { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF file regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Materialised { path, .. } => path,
        }
    }
}

/// Validate a local file path: it must exist, be readable, and start with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<ResolvedInput, RenderError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(RenderError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(RenderError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(RenderError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(RenderError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Write an uploaded PDF into its own temp directory.
///
/// `name` becomes the file name inside the directory. Empty uploads are a
/// validation error: the intake must supply both files.
pub async fn materialise_upload(bytes: &[u8], name: &str) -> Result<ResolvedInput, GradeError> {
    if bytes.is_empty() {
        return Err(GradeError::Validation("Please upload both files.".into()));
    }

    let temp_dir = TempDir::new().map_err(|e| GradeError::Internal(format!("tempdir: {e}")))?;
    let path = temp_dir.path().join(name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| GradeError::Internal(format!("Failed to write temp file: {e}")))?;

    debug!("Materialised {} bytes to {}", bytes.len(), path.display());
    Ok(ResolvedInput::Materialised {
        path,
        _temp_dir: temp_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local(Path::new("/definitely/not/here.pdf")).err().unwrap();
        assert!(matches!(err, RenderError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"PK\x03\x04 not a pdf").unwrap();
        let err = resolve_local(f.path()).err().unwrap();
        match err {
            RenderError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        let resolved = resolve_local(f.path()).unwrap();
        assert_eq!(resolved.path(), f.path());
    }

    #[tokio::test]
    async fn empty_upload_is_validation_error() {
        let err = materialise_upload(b"", "student.pdf").await.err().unwrap();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn upload_is_removed_on_drop() {
        let resolved = materialise_upload(b"%PDF-1.4", "key.pdf").await.unwrap();
        let path = resolved.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "key.pdf");
        drop(resolved);
        assert!(!path.exists());
    }
}
