//! Pendency status lifecycle.
//!
//! ```text
//! open ──► in_progress ──► resolved
//!   │           │
//!   ├───────────┴────────► rejected
//!   └────────────────────► resolved
//! ```
//!
//! `open` and `in_progress` are *active*: at most one active pendency may
//! exist per (item, vehicle).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendencyStatus {
    Open,
    InProgress,
    Resolved,
    Rejected,
}

impl PendencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PendencyStatus::Open => "open",
            PendencyStatus::InProgress => "in_progress",
            PendencyStatus::Resolved => "resolved",
            PendencyStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "open" => Ok(PendencyStatus::Open),
            "in_progress" => Ok(PendencyStatus::InProgress),
            "resolved" => Ok(PendencyStatus::Resolved),
            "rejected" => Ok(PendencyStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid pendency status '{other}'. \
                 Must be one of: open, in_progress, resolved, rejected"
            ))),
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, PendencyStatus::Open | PendencyStatus::InProgress)
    }

    /// Terminal states record who closed the pendency and when.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

/// Validate a status change requested by staff.
///
/// Rejecting requires a note explaining why the non-conformity was dismissed.
pub fn validate_transition(
    from: PendencyStatus,
    to: PendencyStatus,
    note: Option<&str>,
) -> Result<(), CoreError> {
    use PendencyStatus::*;

    let allowed = matches!(
        (from, to),
        (Open, InProgress)
            | (Open, Resolved)
            | (Open, Rejected)
            | (InProgress, Resolved)
            | (InProgress, Rejected)
    );
    if !allowed {
        return Err(CoreError::Conflict(format!(
            "Cannot move pendency from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        )));
    }

    if to == Rejected && note.map(str::trim).unwrap_or("").is_empty() {
        return Err(CoreError::Validation(
            "A resolution note is required when rejecting a pendency".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use PendencyStatus::*;

    #[test]
    fn active_states() {
        assert!(Open.is_active());
        assert!(InProgress.is_active());
        assert!(Resolved.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(validate_transition(Open, InProgress, None).is_ok());
        assert!(validate_transition(Open, Resolved, None).is_ok());
        assert!(validate_transition(InProgress, Resolved, Some("trocado")).is_ok());
        assert!(validate_transition(InProgress, Rejected, Some("falso alarme")).is_ok());
    }

    #[test]
    fn terminal_states_cannot_move() {
        assert_matches!(validate_transition(Resolved, Open, None), Err(CoreError::Conflict(_)));
        assert_matches!(
            validate_transition(Rejected, InProgress, None),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(validate_transition(InProgress, Open, None), Err(CoreError::Conflict(_)));
        assert_matches!(validate_transition(Open, Open, None), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn rejecting_needs_a_note() {
        assert_matches!(validate_transition(Open, Rejected, None), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_transition(Open, Rejected, Some("  ")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn parse_round_trip() {
        for status in [Open, InProgress, Resolved, Rejected] {
            assert_eq!(PendencyStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(PendencyStatus::parse("closed").is_err());
    }
}
