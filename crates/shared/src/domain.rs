use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Position of a certificate in the most recent generation response.
///
/// The server resolves preview and download requests by this position alone,
/// so it is only meaningful until the next upload or generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CertificateIndex(pub usize);

impl fmt::Display for CertificateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StudentRecord {
    /// Email address, treating an empty string the same as an absent one.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub student_name: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Sent,
    Failed,
    NoEmail,
    Unrecognized,
}

impl EmailStatus {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "sent" => Self::Sent,
            "failed" => Self::Failed,
            "no_email" => Self::NoEmail,
            _ => Self::Unrecognized,
        }
    }
}

// Unknown tags must not fail the whole results payload, and a missing or
// non-string tag is just another unknown tag.
impl<'de> Deserialize<'de> for EmailStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(EmailStatus::from_tag)
            .unwrap_or(EmailStatus::Unrecognized))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "unrecognized_status")]
    pub status: EmailStatus,
}

fn unrecognized_status() -> EmailStatus {
    EmailStatus::Unrecognized
}
