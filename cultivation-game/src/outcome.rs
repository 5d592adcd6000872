//! Result descriptors and notices handed to the presentation layer.
use serde::{Deserialize, Serialize};

/// Presentation tone for an outcome or notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Info,
    Danger,
}

/// Result of a player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub ok: bool,
    pub message: String,
    pub kind: OutcomeKind,
}

impl ActionOutcome {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: OutcomeKind::Success,
        }
    }

    /// Completed action whose result is neutral or unlucky.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: OutcomeKind::Info,
        }
    }

    /// Completed action that cost the player something.
    #[must_use]
    pub fn setback(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: OutcomeKind::Danger,
        }
    }

    /// Precondition rejection; no state was touched.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            kind: OutcomeKind::Danger,
        }
    }

    /// Rejection that is informational rather than an error on the player's part.
    #[must_use]
    pub fn declined(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            kind: OutcomeKind::Info,
        }
    }
}

/// Hint for how the UI should surface a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Toast,
    Log,
    Modal,
}

/// Message queued for the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub kind: OutcomeKind,
    pub surface: UiSurfaceHint,
    /// Logical time the notice was raised.
    pub at: u64,
}

impl Notice {
    #[must_use]
    pub fn toast(message: impl Into<String>, kind: OutcomeKind, at: u64) -> Self {
        Self {
            message: message.into(),
            kind,
            surface: UiSurfaceHint::Toast,
            at,
        }
    }

    #[must_use]
    pub fn from_outcome(outcome: &ActionOutcome, at: u64) -> Self {
        Self::toast(outcome.message.clone(), outcome.kind, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_not_ok() {
        assert!(!ActionOutcome::rejected("no").ok);
        assert!(!ActionOutcome::declined("peak").ok);
        assert!(ActionOutcome::setback("ouch").ok);
        assert_eq!(ActionOutcome::setback("ouch").kind, OutcomeKind::Danger);
    }

    #[test]
    fn outcome_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ActionOutcome::success("yes")).unwrap();
        assert!(json.contains(r#""kind":"success""#));
    }
}
