//! Data-driven rendering of the review and certificate areas.
//!
//! Renderers return view models; `to_html` turns them into escaped markup
//! where actions are carried by `data-action`/`data-index` attributes.

use std::fmt::Write as _;

use shared::domain::{CertificateIndex, CertificateRecord, StudentRecord};

use crate::status::Notice;

pub const REVIEW_SECTION_ID: &str = "review-section";
pub const STUDENT_LIST_ID: &str = "student-list";
pub const PREVIEW_SECTION_ID: &str = "preview-section";
pub const CERTIFICATE_LIST_ID: &str = "certificate-list";
pub const MESSAGE_CONTAINER_ID: &str = "message-container";

pub const NO_STUDENTS_PLACEHOLDER: &str = "No students found";
pub const EMAIL_NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentBlock {
    /// 1-based display position.
    pub ordinal: usize,
    pub name: String,
    pub department: String,
    pub class: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewList {
    Empty,
    Students(Vec<StudentBlock>),
}

impl ReviewList {
    pub fn blocks(&self) -> &[StudentBlock] {
        match self {
            Self::Empty => &[],
            Self::Students(blocks) => blocks,
        }
    }

    pub fn to_html(&self) -> String {
        let blocks = match self {
            Self::Empty => return format!("<p>{NO_STUDENTS_PLACEHOLDER}</p>"),
            Self::Students(blocks) => blocks,
        };
        let mut html = String::new();
        for block in blocks {
            let _ = write!(
                html,
                r#"<div class="student-item"><h4>{ordinal}. {name}</h4><p><strong>Department:</strong> {department}</p><p><strong>Class:</strong> {class}</p><p><strong>Email:</strong> {email}</p></div>"#,
                ordinal = block.ordinal,
                name = html_escape(&block.name),
                department = html_escape(&block.department),
                class = html_escape(&block.class),
                email = html_escape(&block.email),
            );
        }
        html
    }
}

pub fn render_student_review(students: &[StudentRecord]) -> ReviewList {
    if students.is_empty() {
        return ReviewList::Empty;
    }
    ReviewList::Students(
        students
            .iter()
            .enumerate()
            .map(|(position, student)| StudentBlock {
                ordinal: position + 1,
                name: student.name.clone(),
                department: student.department.clone(),
                class: student.class.clone(),
                email: student.email().unwrap_or(EMAIL_NOT_PROVIDED).to_string(),
            })
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateAction {
    Preview(CertificateIndex),
    Download(CertificateIndex),
}

impl CertificateAction {
    pub fn index(self) -> CertificateIndex {
        match self {
            Self::Preview(index) | Self::Download(index) => index,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Preview(_) => "preview",
            Self::Download(_) => "download",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Preview(_) => "Preview",
            Self::Download(_) => "Download",
        }
    }

    /// Inverse of the `data-action`/`data-index` pair written by `to_html`.
    pub fn from_attributes(action: &str, index: &str) -> Option<Self> {
        let index = CertificateIndex(index.parse().ok()?);
        match action {
            "preview" => Some(Self::Preview(index)),
            "download" => Some(Self::Download(index)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRow {
    pub index: CertificateIndex,
    pub student_name: String,
    pub filename: String,
}

impl CertificateRow {
    /// Actions bound to the index captured when the row was rendered.
    pub fn actions(&self) -> [CertificateAction; 2] {
        [
            CertificateAction::Preview(self.index),
            CertificateAction::Download(self.index),
        ]
    }
}

pub fn render_certificate_list(certificates: &[CertificateRecord]) -> Vec<CertificateRow> {
    certificates
        .iter()
        .enumerate()
        .map(|(position, certificate)| CertificateRow {
            index: CertificateIndex(position),
            student_name: certificate.student_name.clone(),
            filename: certificate.filename.clone(),
        })
        .collect()
}

pub fn certificate_list_html(rows: &[CertificateRow]) -> String {
    let mut html = String::new();
    for row in rows {
        let _ = write!(
            html,
            r#"<div class="certificate-item"><div class="certificate-info"><h4>{}</h4><p>{}</p></div><div class="certificate-actions">"#,
            html_escape(&row.student_name),
            html_escape(&row.filename),
        );
        for action in row.actions() {
            let _ = write!(
                html,
                r#"<button class="btn btn-secondary" data-action="{}" data-index="{}">{}</button>"#,
                action.name(),
                action.index(),
                action.label(),
            );
        }
        html.push_str("</div></div>");
    }
    html
}

pub fn notice_html(notice: &Notice) -> String {
    format!(
        r#"<div class="message {}" data-notice="{}">{}</div>"#,
        notice.kind.as_str(),
        notice.id.0,
        html_escape(&notice.text)
    )
}

pub fn status_area_html(notices: &[Notice]) -> String {
    let inner: String = notices.iter().map(notice_html).collect();
    format!(r#"<div id="{MESSAGE_CONTAINER_ID}">{inner}</div>"#)
}

/// Review and certificate areas wrapped in their section containers.
pub fn workflow_sections_html(review: &ReviewList, certificates: &[CertificateRow]) -> String {
    format!(
        r#"<section id="{REVIEW_SECTION_ID}"><div id="{STUDENT_LIST_ID}">{}</div></section><section id="{PREVIEW_SECTION_ID}"><div id="{CERTIFICATE_LIST_ID}">{}</div></section>"#,
        review.to_html(),
        certificate_list_html(certificates),
    )
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
