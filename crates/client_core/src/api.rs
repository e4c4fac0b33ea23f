//! HTTP access to the certificate service.

use std::path::{Component, Path};

use async_trait::async_trait;
use reqwest::{header::CONTENT_DISPOSITION, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::CertificateIndex,
    error::ServerErrorBody,
    protocol::{
        GenerateResponse, SendEmailsRequest, SendEmailsResponse, UploadResponse,
        DOWNLOAD_ENDPOINT, GENERATE_ENDPOINT, PREVIEW_ENDPOINT, SEND_EMAILS_ENDPOINT,
        UPLOAD_ENDPOINT,
    },
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::form::{FormError, UploadForm};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    /// A response arrived but the server rejected the request, either with a
    /// non-2xx status or an `error` field in an otherwise successful body.
    #[error("server rejected request with status {status}")]
    Server { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}

impl ApiError {
    fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }

    /// Server supplied failure text, when there is one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn upload(&self, form: UploadForm) -> Result<UploadResponse, ApiError>;
    async fn generate(&self) -> Result<GenerateResponse, ApiError>;
    async fn send_emails(&self, request: SendEmailsRequest)
        -> Result<SendEmailsResponse, ApiError>;
    fn preview_url(&self, index: CertificateIndex) -> Url;
    fn download_url(&self, index: CertificateIndex) -> Url;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// reqwest backed client.
///
/// The server keeps the uploaded roster and generated certificates in its
/// session, so one instance (and its cookie jar) must serve a whole workflow.
pub struct HttpCertificateApi {
    http: Client,
    base_url: Url,
}

impl HttpCertificateApi {
    pub fn new(server_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(server_url).map_err(|err| ApiError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: "url cannot be a base".to_string(),
            });
        }
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base url always has path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Fetches a certificate file from a download url produced by this client.
    pub async fn fetch_file(&self, url: Url) -> Result<DownloadedFile, ApiError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(ApiError::transport)?;
        let status = response.status();
        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name)
            .unwrap_or_else(|| fallback_file_name(&url));
        let bytes = response.bytes().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(ServerErrorBody::from_value)
                .map(|body| body.error);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(DownloadedFile {
            file_name,
            bytes: bytes.to_vec(),
        })
    }
}

#[async_trait]
impl CertificateApi for HttpCertificateApi {
    async fn upload(&self, form: UploadForm) -> Result<UploadResponse, ApiError> {
        let url = self.endpoint(&[UPLOAD_ENDPOINT]);
        debug!(%url, files = form.files().len(), "posting upload form");
        let response = self
            .http
            .post(url)
            .multipart(form.into_multipart()?)
            .send()
            .await
            .map_err(ApiError::transport)?;
        read_envelope(response).await
    }

    async fn generate(&self) -> Result<GenerateResponse, ApiError> {
        let url = self.endpoint(&[GENERATE_ENDPOINT]);
        debug!(%url, "requesting certificate generation");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(ApiError::transport)?;
        read_envelope(response).await
    }

    async fn send_emails(
        &self,
        request: SendEmailsRequest,
    ) -> Result<SendEmailsResponse, ApiError> {
        let url = self.endpoint(&[SEND_EMAILS_ENDPOINT]);
        debug!(%url, "requesting email delivery");
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::transport)?;
        read_envelope(response).await
    }

    fn preview_url(&self, index: CertificateIndex) -> Url {
        self.endpoint(&[PREVIEW_ENDPOINT, &index.to_string()])
    }

    fn download_url(&self, index: CertificateIndex) -> Url {
        self.endpoint(&[DOWNLOAD_ENDPOINT, &index.to_string()])
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(ApiError::transport)?;
    classify_body(status, &body)
}

/// Maps a status + body pair onto the wire contract shared by every POST.
///
/// An `error` field always wins, even on 2xx and even next to payload fields.
pub(crate) fn classify_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    let value = serde_json::from_slice::<serde_json::Value>(body).ok();
    let server_error = value.as_ref().and_then(ServerErrorBody::from_value);
    if !(200..300).contains(&status) || server_error.is_some() {
        return Err(ApiError::Server {
            status,
            message: server_error.map(|body| body.error),
        });
    }
    let value = value.ok_or_else(|| ApiError::Decode("response body is not JSON".to_string()))?;
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

fn attachment_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .and_then(|name| local_file_name(name.trim_matches('"')))
}

/// Final component of a server supplied name; never a path outside the
/// directory it is joined to.
fn local_file_name(name: &str) -> Option<String> {
    let name = name.rsplit(|c: char| c == '/' || c == '\\').next()?;
    match Path::new(name).components().next_back()? {
        Component::Normal(part) if Path::new(part) == Path::new(name) => {
            part.to_str().map(str::to_string)
        }
        _ => None,
    }
}

fn fallback_file_name(url: &Url) -> String {
    let position = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.parse::<usize>().ok());
    match position {
        Some(index) => format!("certificate_{}.pdf", index + 1),
        None => "certificate.pdf".to_string(),
    }
}
