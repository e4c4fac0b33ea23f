use serde::{Deserialize, Serialize};

use crate::domain::{CertificateRecord, EmailResult, StudentRecord};

// Endpoint path segments, relative to the server root.
pub const UPLOAD_ENDPOINT: &str = "upload";
pub const GENERATE_ENDPOINT: &str = "generate";
pub const SEND_EMAILS_ENDPOINT: &str = "send_emails";
pub const PREVIEW_ENDPOINT: &str = "preview";
pub const DOWNLOAD_ENDPOINT: &str = "download";

/// Multipart field carrying the certificate template.
pub const TEMPLATE_FIELD: &str = "template";
/// Multipart field carrying the student roster.
pub const ROSTER_FIELD: &str = "student_data";

pub const TEMPLATE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf"];
pub const ROSTER_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "docx"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub students: Vec<StudentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub certificates: Vec<CertificateRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailsRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendEmailsResponse {
    pub results: Vec<EmailResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
