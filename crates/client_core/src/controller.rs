//! Upload → review → generate → preview/download → email workflow.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{CertificateIndex, CertificateRecord, StudentRecord},
    protocol::SendEmailsRequest,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    api::{ApiError, CertificateApi},
    busy::BusyIndicator,
    form::UploadForm,
    render::{render_certificate_list, render_student_review, CertificateAction},
    status::{NoticeKind, StatusBoard},
    summary::EmailSummary,
    view::{Navigator, WorkflowView},
};

pub const SEND_EMAILS_PROMPT: &str =
    "Are you sure you want to send certificates to all students with email addresses?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    ReviewReady,
    PreviewReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Applied,
    /// Carries the text already shown as an error notice.
    Failed(String),
    Declined,
    /// A newer request of the same kind was issued; this response was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Upload,
    Generate,
    SendEmails,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Generate => "generate",
            Self::SendEmails => "send_emails",
        }
    }

    fn success_text(self) -> &'static str {
        match self {
            Self::Upload => "Files uploaded successfully!",
            Self::Generate => "Certificates generated successfully!",
            Self::SendEmails => "Email sending completed!",
        }
    }

    fn default_failure(self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::Generate => "Certificate generation failed",
            Self::SendEmails => "Email sending failed",
        }
    }

    fn exception_prefix(self) -> &'static str {
        match self {
            Self::Upload => "Error uploading files: ",
            Self::Generate => "Error generating certificates: ",
            Self::SendEmails => "Error sending emails: ",
        }
    }
}

/// Notice text for a failed operation: server text, then the operation's
/// default, then the raw error for failures that never got a usable reply.
fn failure_text(operation: Operation, err: &ApiError) -> String {
    match err {
        ApiError::Server {
            message: Some(message),
            ..
        } => message.clone(),
        ApiError::Server { message: None, .. } => operation.default_failure().to_string(),
        other => format!("{}{other}", operation.exception_prefix()),
    }
}

#[derive(Default)]
struct RequestSequence {
    upload: AtomicU64,
    generate: AtomicU64,
}

impl RequestSequence {
    fn counter(&self, operation: Operation) -> Option<&AtomicU64> {
        match operation {
            Operation::Upload => Some(&self.upload),
            Operation::Generate => Some(&self.generate),
            Operation::SendEmails => None,
        }
    }

    fn issue(&self, operation: Operation) -> u64 {
        self.counter(operation)
            .map(|counter| counter.fetch_add(1, Ordering::SeqCst) + 1)
            .unwrap_or_default()
    }

    fn is_latest(&self, operation: Operation, token: u64) -> bool {
        self.counter(operation)
            .map(|counter| counter.load(Ordering::SeqCst) == token)
            .unwrap_or(true)
    }
}

#[derive(Default)]
struct WorkflowState {
    students: Vec<StudentRecord>,
    certificates: Vec<CertificateRecord>,
    stage: Stage,
}

pub struct WorkflowController {
    api: Arc<dyn CertificateApi>,
    view: Arc<dyn WorkflowView>,
    navigator: Arc<dyn Navigator>,
    busy: BusyIndicator,
    status: StatusBoard,
    sequence: RequestSequence,
    state: Mutex<WorkflowState>,
}

impl WorkflowController {
    pub fn new(
        api: Arc<dyn CertificateApi>,
        view: Arc<dyn WorkflowView>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            view,
            navigator,
            busy: BusyIndicator::new(),
            status: StatusBoard::default(),
            sequence: RequestSequence::default(),
            state: Mutex::new(WorkflowState::default()),
        }
    }

    pub fn with_status_board(mut self, status: StatusBoard) -> Self {
        self.status = status;
        self
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub async fn stage(&self) -> Stage {
        self.state.lock().await.stage
    }

    pub async fn students(&self) -> Vec<StudentRecord> {
        self.state.lock().await.students.clone()
    }

    pub async fn certificates(&self) -> Vec<CertificateRecord> {
        self.state.lock().await.certificates.clone()
    }

    pub async fn submit_upload(&self, form: UploadForm) -> OperationOutcome {
        let token = self.sequence.issue(Operation::Upload);
        info!(files = form.files().len(), token, "uploading roster");
        let result = {
            let _busy = self.busy.enter();
            self.api.upload(form).await
        };
        let response = match result {
            Ok(response) => response,
            Err(err) => return self.report_failure(Operation::Upload, &err).await,
        };

        {
            let mut state = self.state.lock().await;
            if !self.sequence.is_latest(Operation::Upload, token) {
                debug!(token, "dropping stale upload response");
                return OperationOutcome::Superseded;
            }
            info!(
                students = response.students.len(),
                reported = ?response.student_count,
                "roster accepted"
            );
            state.students = response.students;
            state.stage = Stage::ReviewReady;
            self.view
                .show_students(&render_student_review(&state.students));
            self.view.reveal_review();
        }
        self.report_success(Operation::Upload).await
    }

    pub async fn generate_certificates(&self) -> OperationOutcome {
        let token = self.sequence.issue(Operation::Generate);
        info!(token, "requesting certificate generation");
        let result = {
            let _busy = self.busy.enter();
            self.api.generate().await
        };
        let response = match result {
            Ok(response) => response,
            Err(err) => return self.report_failure(Operation::Generate, &err).await,
        };

        {
            let mut state = self.state.lock().await;
            if !self.sequence.is_latest(Operation::Generate, token) {
                debug!(token, "dropping stale generation response");
                return OperationOutcome::Superseded;
            }
            if response.certificates.len() != state.students.len() {
                // Preview/download stay enabled; the server owns the index space.
                warn!(
                    certificates = response.certificates.len(),
                    students = state.students.len(),
                    "certificate count differs from reviewed roster"
                );
            }
            state.certificates = response.certificates;
            state.stage = Stage::PreviewReady;
            self.view
                .show_certificates(&render_certificate_list(&state.certificates));
            self.view.reveal_preview();
        }
        self.report_success(Operation::Generate).await
    }

    pub fn preview_certificate(&self, index: CertificateIndex) {
        let url = self.api.preview_url(index);
        debug!(%index, %url, "opening certificate preview");
        self.navigator.open_in_new_context(url);
    }

    pub fn download_certificate(&self, index: CertificateIndex) {
        let url = self.api.download_url(index);
        debug!(%index, %url, "navigating to certificate download");
        self.navigator.navigate(url);
    }

    pub fn activate(&self, action: CertificateAction) {
        match action {
            CertificateAction::Preview(index) => self.preview_certificate(index),
            CertificateAction::Download(index) => self.download_certificate(index),
        }
    }

    pub async fn send_emails(&self, message: &str) -> OperationOutcome {
        if !self.view.confirm(SEND_EMAILS_PROMPT).await {
            info!("email delivery declined");
            return OperationOutcome::Declined;
        }

        info!(has_message = !message.is_empty(), "requesting email delivery");
        let result = {
            let _busy = self.busy.enter();
            self.api
                .send_emails(SendEmailsRequest {
                    message: message.to_string(),
                })
                .await
        };
        let response = match result {
            Ok(response) => response,
            Err(err) => return self.report_failure(Operation::SendEmails, &err).await,
        };

        let outcome = self.report_success(Operation::SendEmails).await;
        let summary = EmailSummary::from_results(&response.results);
        if summary.unrecognized > 0 {
            warn!(
                count = summary.unrecognized,
                "email results carried unrecognized status values"
            );
        }
        info!(
            sent = summary.sent,
            failed = summary.failed,
            no_email = summary.no_email,
            "email delivery finished"
        );
        self.view.alert(&summary.to_string()).await;
        outcome
    }

    async fn report_success(&self, operation: Operation) -> OperationOutcome {
        self.status
            .post(NoticeKind::Success, operation.success_text())
            .await;
        OperationOutcome::Applied
    }

    async fn report_failure(&self, operation: Operation, err: &ApiError) -> OperationOutcome {
        let text = failure_text(operation, err);
        warn!(operation = operation.name(), error = %err, "operation failed");
        self.status.post(NoticeKind::Error, text.clone()).await;
        OperationOutcome::Failed(text)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
