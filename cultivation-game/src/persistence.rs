//! Snapshot decoding and the errors raised at the storage boundary.
use serde_json::Value;
use thiserror::Error;

use crate::stages::STAGES;
use crate::state::PlayerState;

/// Why a stored snapshot was refused.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot is not a JSON object")]
    NotAnObject,
    #[error("snapshot has no qi field")]
    MissingQi,
    #[error("snapshot qi is invalid ({0})")]
    InvalidQi(f64),
    #[error("snapshot stage {stage} is out of range (max {max})")]
    StageOutOfRange { stage: usize, max: usize },
}

/// Failure while writing or reading through a storage backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage backend failed: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl PersistenceError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }
}

/// Decode a snapshot, back-filling absent fields with defaults.
///
/// The loaded state is never mid-meditation: timers are not persisted.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, lacks `qi`, or violates a
/// state invariant.
pub fn load_snapshot(json: &str) -> Result<PlayerState, SnapshotError> {
    let value: Value = serde_json::from_str(json)?;
    let object = value.as_object().ok_or(SnapshotError::NotAnObject)?;
    if !object.contains_key("qi") {
        return Err(SnapshotError::MissingQi);
    }
    let mut state: PlayerState = serde_json::from_value(value)?;
    validate(&state)?;
    state.settle_after_load();
    Ok(state)
}

/// Check the invariants a live state must hold.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate(state: &PlayerState) -> Result<(), SnapshotError> {
    if !state.qi.is_finite() || state.qi < 0.0 {
        return Err(SnapshotError::InvalidQi(state.qi));
    }
    let max = STAGES.len() - 1;
    if state.current_stage > max {
        return Err(SnapshotError::StageOutOfRange {
            stage: state.current_stage,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::InsightId;

    #[test]
    fn round_trip_preserves_state() {
        let mut state = PlayerState {
            qi: 1_234.5,
            current_stage: 2,
            spirit_stones: 77,
            ..PlayerState::default()
        };
        state.dao_insights.insert(InsightId::Unity);
        let json = state.to_snapshot_json().unwrap();
        assert_eq!(load_snapshot(&json).unwrap(), state);
    }

    #[test]
    fn meditating_is_cleared_on_load() {
        let state = load_snapshot(r#"{"qi": 10, "meditating": true}"#).unwrap();
        assert!(!state.meditating);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(load_snapshot("{oops"), Err(SnapshotError::Parse(_))));
        assert!(matches!(load_snapshot("[1, 2]"), Err(SnapshotError::NotAnObject)));
        assert!(matches!(
            load_snapshot(r#"{"spirit": 4}"#),
            Err(SnapshotError::MissingQi)
        ));
        assert!(matches!(
            load_snapshot(r#"{"qi": -5}"#),
            Err(SnapshotError::InvalidQi(_))
        ));
        assert!(matches!(
            load_snapshot(r#"{"qi": 5, "current_stage": 12}"#),
            Err(SnapshotError::StageOutOfRange { stage: 12, max: 7 })
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let state = load_snapshot(r#"{"qi": 3, "legacy_flag": true}"#).unwrap();
        assert!((state.qi - 3.0).abs() <= f64::EPSILON);
    }
}
