//! Host surfaces the workflow controller drives.

use async_trait::async_trait;
use url::Url;

use crate::render::{CertificateRow, ReviewList};

/// The page the workflow renders into.
#[async_trait]
pub trait WorkflowView: Send + Sync {
    /// Replaces the whole review area.
    fn show_students(&self, review: &ReviewList);
    fn reveal_review(&self);
    /// Replaces the whole certificate area.
    fn show_certificates(&self, rows: &[CertificateRow]);
    fn reveal_preview(&self);
    /// Blocking yes/no prompt.
    async fn confirm(&self, prompt: &str) -> bool;
    /// Blocking notification.
    async fn alert(&self, text: &str);
}

/// Browsing contexts used for certificate preview and download.
///
/// Both are fire-and-forget; whatever the server answers is the
/// navigator's business.
pub trait Navigator: Send + Sync {
    fn open_in_new_context(&self, url: Url);
    fn navigate(&self, url: Url);
}
