use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    render::{status_area_html, workflow_sections_html},
    CertificateAction, HttpCertificateApi, NoticeEvent, NoticeKind, OperationOutcome,
    StatusBoard, UploadForm, WorkflowController,
};
use shared::domain::CertificateIndex;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::{DownloadNavigator, TerminalView};

#[derive(Parser, Debug)]
#[command(name = "certgen", about = "Upload a roster, generate certificates and deliver them")]
struct Args {
    /// Certificate template (png, jpg, jpeg or pdf).
    #[arg(long)]
    template: PathBuf,
    /// Student roster (xlsx, xls, csv or docx).
    #[arg(long)]
    roster: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
    /// Download every generated certificate.
    #[arg(long)]
    download_all: bool,
    /// Print the preview link for a certificate; repeatable.
    #[arg(long = "preview", value_name = "INDEX")]
    preview: Vec<usize>,
    /// Email certificates to every student with an address.
    #[arg(long)]
    send_emails: bool,
    /// Custom message included in the emails.
    #[arg(long, default_value = "")]
    message: String,
    /// Answer yes to the email confirmation prompt.
    #[arg(long)]
    yes: bool,
    /// Write the rendered review/certificate/status markup to this file.
    #[arg(long)]
    html_report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url.clone() {
        settings.server_url = server_url;
    }
    if let Some(download_dir) = args.download_dir.clone() {
        settings.download_dir = download_dir;
    }
    let api = Arc::new(
        HttpCertificateApi::new(&settings.server_url).context("failed to build http client")?,
    );
    info!(server_url = %api.base_url(), "starting certificate workflow");
    let view = Arc::new(TerminalView::new(args.yes));
    let navigator = Arc::new(DownloadNavigator::new(
        Arc::clone(&api),
        settings.download_dir.clone(),
    ));
    let controller = WorkflowController::new(api, view.clone(), navigator.clone())
        .with_status_board(StatusBoard::new(Duration::from_secs(
            settings.notice_ttl_seconds,
        )));
    spawn_notice_printer(controller.status().subscribe());
    spawn_busy_reporter(controller.busy().subscribe());

    let form = UploadForm::from_paths(&args.template, &args.roster)
        .await
        .context("failed to prepare upload form")?;
    if let OperationOutcome::Failed(text) = controller.submit_upload(form).await {
        bail!("upload failed: {text}");
    }
    if let OperationOutcome::Failed(text) = controller.generate_certificates().await {
        bail!("certificate generation failed: {text}");
    }

    for index in &args.preview {
        controller.activate(CertificateAction::Preview(CertificateIndex(*index)));
    }
    if args.download_all {
        for row in view.certificate_rows() {
            let [_, download] = row.actions();
            controller.activate(download);
        }
    }

    if args.send_emails {
        let outcome = controller.send_emails(&args.message).await;
        debug!(?outcome, "email step finished");
    }

    navigator.wait().await;

    if let Some(path) = args.html_report {
        let html = format!(
            "{}{}",
            status_area_html(&controller.status().active().await),
            workflow_sections_html(&view.review(), &view.certificate_rows()),
        );
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("failed to write html report to {}", path.display()))?;
        info!(path = %path.display(), "html report written");
    }

    Ok(())
}

fn spawn_notice_printer(mut events: broadcast::Receiver<NoticeEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(NoticeEvent::Posted(notice)) => match notice.kind {
                    NoticeKind::Error => eprintln!("✗ {}", notice.text),
                    NoticeKind::Success => eprintln!("✓ {}", notice.text),
                    NoticeKind::Info => eprintln!("• {}", notice.text),
                },
                Ok(NoticeEvent::Expired(id)) => debug!(notice_id = id.0, "notice expired"),
                Ok(NoticeEvent::Dismissed(id)) => debug!(notice_id = id.0, "notice dismissed"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "notice printer lagged")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn spawn_busy_reporter(mut depth: watch::Receiver<usize>) {
    tokio::spawn(async move {
        while depth.changed().await.is_ok() {
            let in_flight = *depth.borrow_and_update();
            debug!(in_flight, busy = in_flight > 0, "busy indicator changed");
        }
    });
}
