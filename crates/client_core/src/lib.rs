pub mod api;
pub mod busy;
pub mod controller;
pub mod form;
pub mod render;
pub mod status;
pub mod summary;
pub mod view;

pub use api::{ApiError, CertificateApi, DownloadedFile, HttpCertificateApi};
pub use busy::{BusyGuard, BusyIndicator};
pub use controller::{OperationOutcome, Stage, WorkflowController, SEND_EMAILS_PROMPT};
pub use form::{FormError, FormFile, UploadForm};
pub use render::{CertificateAction, CertificateRow, ReviewList, StudentBlock};
pub use status::{Notice, NoticeEvent, NoticeId, NoticeKind, StatusBoard, DEFAULT_NOTICE_TTL};
pub use summary::EmailSummary;
pub use view::{Navigator, WorkflowView};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
