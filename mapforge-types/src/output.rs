//! Result record of the rendering entry points.

use serde::{Deserialize, Serialize};

/// Outcome of a map rendering call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStatus {
    /// The map file was written.
    Success,
    /// Nothing was written, `message` holds the reason.
    Error,
}

/// Result record returned by every rendering entry point.
///
/// `output_path` is set only for successful calls and is omitted from the serialized form
/// otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOutput {
    /// Whether the call succeeded.
    pub status: MapStatus,
    /// Human readable outcome.
    pub message: String,
    /// Path of the written file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl MapOutput {
    /// Successful outcome with the path of the written file.
    pub fn success(message: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            status: MapStatus::Success,
            message: message.into(),
            output_path: Some(output_path.into()),
        }
    }

    /// Failed outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: MapStatus::Error,
            message: message.into(),
            output_path: None,
        }
    }

    /// Whether the status is [`MapStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == MapStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_success() {
        let output = MapOutput::success("Map saved to /tmp/out/t.png", "/tmp/out/t.png");
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "status": "success",
                "message": "Map saved to /tmp/out/t.png",
                "output_path": "/tmp/out/t.png"
            })
        );
    }

    #[test]
    fn serialize_error_has_no_path() {
        let output = MapOutput::error("Error creating map: boom");
        assert!(!output.is_success());
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"status": "error", "message": "Error creating map: boom"})
        );
    }
}
