use serde::{Deserialize, Serialize};

/// The status envelope returned by endpoints that do not return an entity,
/// such as delete and reset-password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    /// The numeric HTTP status code the backend reports.
    pub http_status_code: u16,
    /// The HTTP status name.
    #[serde(default)]
    pub http_status: String,
    /// The reason phrase.
    #[serde(default)]
    pub reason: String,
    /// The human-readable message.
    pub message: String,
}
