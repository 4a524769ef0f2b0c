use thiserror::Error;

use crate::qtype::QType;

/// Failures raised while decoding or encoding DNS entities.
///
/// None of these are logged where they are detected; the caller decides what
/// to do with a bad packet or a bad backend row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("malformed header: need 12 bytes, got {len}")]
    MalformedHeader { len: usize },

    #[error("truncated record: need {needed} bytes, {available} available")]
    TruncatedRecord { needed: usize, available: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid domain name: {0}")]
    InvalidName(String),

    #[error("invalid {qtype} content: {content}")]
    InvalidContent { qtype: QType, content: String },

    #[error("no content encoding for record type {0}")]
    Unsupported(QType),
}

impl DnsError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        DnsError::Parse(msg.into())
    }
}
