//! What the preview currently shows.

use serde::Serialize;

use super::viewer::count_pages;
use crate::core::Artifact;

/// Exactly one of these is shown at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayState {
    /// Nothing has run yet
    #[default]
    Idle,
    /// A request is running
    Loading,
    Artifact(Artifact),
    ErrorMessage(String),
}

impl DisplayState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Artifact(_) => "artifact",
            Self::ErrorMessage(_) => "error",
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Artifact(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// A published display state. `revision` grows with every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub revision: u64,
    pub state: DisplayState,
}

impl Frame {
    pub fn summary(&self) -> FrameSummary<'_> {
        let artifact = self.state.artifact();
        FrameSummary {
            revision: self.revision,
            state: self.state.label(),
            message: match &self.state {
                DisplayState::ErrorMessage(message) => Some(message),
                _ => None,
            },
            pages: artifact.map(|a| count_pages(a.as_bytes())),
            bytes: artifact.map(Artifact::len),
            fingerprint: artifact.map(Artifact::fingerprint),
        }
    }
}

/// JSON shape of a frame, as served on `/status`.
#[derive(Debug, Serialize)]
pub struct FrameSummary<'a> {
    pub revision: u64,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_error() {
        let frame = Frame {
            revision: 3,
            state: DisplayState::ErrorMessage("SyntaxError: boom".into()),
        };
        let json = serde_json::to_string(&frame.summary()).unwrap();
        assert_eq!(json, r#"{"revision":3,"state":"error","message":"SyntaxError: boom"}"#);
    }

    #[test]
    fn test_summary_json_artifact() {
        let artifact = Artifact::from(b"%PDF-1.7 /Type /Page".to_vec());
        let frame = Frame {
            revision: 1,
            state: DisplayState::Artifact(artifact.clone()),
        };
        let value = serde_json::to_value(frame.summary()).unwrap();
        assert_eq!(value["state"], "artifact");
        assert_eq!(value["pages"], 1);
        assert_eq!(value["bytes"], artifact.len());
        assert_eq!(value["fingerprint"], artifact.fingerprint());
    }
}
