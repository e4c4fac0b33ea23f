//! Terminal rendition of the workflow page.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use client_core::{CertificateRow, HttpCertificateApi, Navigator, ReviewList, WorkflowView};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

pub struct TerminalView {
    assume_yes: bool,
    review: Mutex<Option<ReviewList>>,
    rows: Mutex<Vec<CertificateRow>>,
}

impl TerminalView {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            review: Mutex::new(None),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Last rendered review area.
    pub fn review(&self) -> ReviewList {
        self.review
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or(ReviewList::Empty)
    }

    /// Last rendered certificate area.
    pub fn certificate_rows(&self) -> Vec<CertificateRow> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WorkflowView for TerminalView {
    fn show_students(&self, review: &ReviewList) {
        match review {
            ReviewList::Empty => println!("  {}", client_core::render::NO_STUDENTS_PLACEHOLDER),
            ReviewList::Students(blocks) => {
                for block in blocks {
                    println!("  {}. {}", block.ordinal, block.name);
                    println!("     Department: {}", block.department);
                    println!("     Class:      {}", block.class);
                    println!("     Email:      {}", block.email);
                }
            }
        }
        *self.review.lock().unwrap_or_else(PoisonError::into_inner) = Some(review.clone());
    }

    fn reveal_review(&self) {
        println!("Review the students above before generating certificates.");
    }

    fn show_certificates(&self, rows: &[CertificateRow]) {
        for row in rows {
            println!(
                "  [{}] {} ({})",
                row.index, row.student_name, row.filename
            );
        }
        *self.rows.lock().unwrap_or_else(PoisonError::into_inner) = rows.to_vec();
    }

    fn reveal_preview(&self) {
        println!("Certificates are ready for preview and download.");
    }

    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            println!("{prompt} [y/N] y (--yes)");
            return true;
        }
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            print!("{prompt} [y/N] ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;
        match answer {
            Ok(Ok(line)) => is_affirmative(&line),
            Ok(Err(err)) => {
                warn!(%err, "failed to read confirmation; treating as declined");
                false
            }
            Err(err) => {
                warn!(%err, "confirmation prompt task failed; treating as declined");
                false
            }
        }
    }

    async fn alert(&self, text: &str) {
        println!("{text}");
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Previews are printed; downloads are fetched in the background into the
/// download directory.
pub struct DownloadNavigator {
    api: Arc<HttpCertificateApi>,
    download_dir: PathBuf,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl DownloadNavigator {
    pub fn new(api: Arc<HttpCertificateApi>, download_dir: PathBuf) -> Self {
        Self {
            api,
            download_dir,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Waits for every download started so far.
    pub async fn wait(&self) {
        let pending: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in pending {
            if let Err(err) = handle.await {
                error!(%err, "download task panicked");
            }
        }
    }
}

impl Navigator for DownloadNavigator {
    fn open_in_new_context(&self, url: Url) {
        println!("Preview: {url}");
    }

    fn navigate(&self, url: Url) {
        let api = Arc::clone(&self.api);
        let download_dir = self.download_dir.clone();
        let handle = tokio::spawn(async move {
            let file = match api.fetch_file(url.clone()).await {
                Ok(file) => file,
                Err(err) => {
                    error!(%url, error = %err, message = ?err.server_message(), "download failed");
                    return;
                }
            };
            if let Err(err) = tokio::fs::create_dir_all(&download_dir).await {
                error!(dir = %download_dir.display(), %err, "failed to create download directory");
                return;
            }
            let target = download_dir.join(&file.file_name);
            match tokio::fs::write(&target, &file.bytes).await {
                Ok(()) => info!(path = %target.display(), bytes = file.bytes.len(), "certificate saved"),
                Err(err) => error!(path = %target.display(), %err, "failed to save certificate"),
            }
        });
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}
