use serde::Serialize;

/// Severity assigned to events that arrive without a numeric `level`.
pub const DEFAULT_LEVEL: i64 = 20;

/// Normalized log record flowing from ingress to the sinks.
///
/// `source_ip` and `identity` are filled in by the ingress layer from the
/// connection and the authenticated credential, never from the payload.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    pub level: i64,
    pub message: String,
    pub source_ip: String,
    pub identity: String,
}

impl LogEvent {
    pub fn new(
        level: i64,
        message: impl Into<String>,
        source_ip: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            source_ip: source_ip.into(),
            identity: identity.into(),
        }
    }
}
