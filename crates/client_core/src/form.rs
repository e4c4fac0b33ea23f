//! Multipart upload form for the roster submission.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use shared::protocol::{ROSTER_EXTENSIONS, ROSTER_FIELD, TEMPLATE_EXTENSIONS, TEMPLATE_FIELD};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported {role} file {}; allowed extensions: {allowed}", .path.display())]
    UnsupportedExtension {
        role: &'static str,
        path: PathBuf,
        allowed: String,
    },
    #[error("invalid mime type '{mime_type}' for {file_name}")]
    InvalidMimeType {
        file_name: String,
        mime_type: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFile {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    files: Vec<FormFile>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: FormFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn files(&self) -> &[FormFile] {
        &self.files
    }

    /// Builds the standard template + roster form from files on disk.
    ///
    /// Extensions are checked before anything is read so an obviously wrong
    /// file never reaches the server.
    pub async fn from_paths(template: &Path, roster: &Path) -> Result<Self, FormError> {
        check_extension("template", template, TEMPLATE_EXTENSIONS)?;
        check_extension("roster", roster, ROSTER_EXTENSIONS)?;

        Ok(Self::new()
            .with_file(read_form_file(TEMPLATE_FIELD, template).await?)
            .with_file(read_form_file(ROSTER_FIELD, roster).await?))
    }

    pub fn into_multipart(self) -> Result<Form, FormError> {
        let mut form = Form::new();
        for file in self.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name.clone())
                .mime_str(&file.mime_type)
                .map_err(|_| FormError::InvalidMimeType {
                    file_name: file.file_name,
                    mime_type: file.mime_type,
                })?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

fn check_extension(role: &'static str, path: &Path, allowed: &[&str]) -> Result<(), FormError> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    if supported {
        return Ok(());
    }
    Err(FormError::UnsupportedExtension {
        role,
        path: path.to_path_buf(),
        allowed: allowed.join(", "),
    })
}

async fn read_form_file(field: &str, path: &Path) -> Result<FormFile, FormError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FormError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| field.to_string());
    Ok(FormFile {
        field: field.to_string(),
        file_name,
        mime_type: mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(check_extension("template", Path::new("cert.PNG"), TEMPLATE_EXTENSIONS).is_ok());
        assert!(check_extension("roster", Path::new("class.Csv"), ROSTER_EXTENSIONS).is_ok());
    }

    #[test]
    fn rejects_missing_or_foreign_extensions() {
        let err = check_extension("roster", Path::new("students.txt"), ROSTER_EXTENSIONS)
            .expect_err("txt is not a roster format");
        assert!(err.to_string().contains("xlsx, xls, csv, docx"));
        assert!(check_extension("template", Path::new("template"), TEMPLATE_EXTENSIONS).is_err());
    }

    #[tokio::test]
    async fn from_paths_reads_both_files_with_guessed_mime() {
        let dir = std::env::temp_dir().join(format!("certgen_form_test_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("temp dir");
        let template = dir.join("template.png");
        let roster = dir.join("students.csv");
        tokio::fs::write(&template, b"png-bytes").await.expect("write template");
        tokio::fs::write(&roster, b"name,email\nAda,ada@example.com\n")
            .await
            .expect("write roster");

        let form = UploadForm::from_paths(&template, &roster)
            .await
            .expect("build form");
        let files = form.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].field, TEMPLATE_FIELD);
        assert_eq!(files[0].mime_type, "image/png");
        assert_eq!(files[1].field, ROSTER_FIELD);
        assert_eq!(files[1].file_name, "students.csv");
        assert_eq!(files[1].mime_type, "text/csv");

        tokio::fs::remove_dir_all(dir).await.expect("cleanup");
    }

    #[tokio::test]
    async fn from_paths_reports_missing_file() {
        let err = UploadForm::from_paths(
            Path::new("/nonexistent/template.pdf"),
            Path::new("/nonexistent/students.xlsx"),
        )
        .await
        .expect_err("missing files");
        assert!(matches!(err, FormError::Read { .. }));
    }
}
