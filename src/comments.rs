use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// A comment as submitted, before validation. Both the urlencoded form
/// and the JSON endpoint deserialize into this; missing fields come in
/// as empty strings and fail validation rather than deserialization.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentInput {
    #[serde(rename = "_id", default)]
    pub post_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    CommentRequired,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::NameRequired => "The Name Field is required",
            FieldError::EmailRequired => "The Email Field is required",
            FieldError::EmailInvalid => "The Email Field must be a valid email address",
            FieldError::CommentRequired => "The Comment Field is required",
        }
    }
}

/// At most one error per field, in display order. Values are trimmed
/// before the required checks, so whitespace-only input does not pass.
pub fn validate(input: &CommentInput) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if input.name.trim().is_empty() {
        errors.push(FieldError::NameRequired);
    }
    let email = input.email.trim();
    if email.is_empty() {
        errors.push(FieldError::EmailRequired);
    } else if !EMAIL_RE.is_match(email) {
        errors.push(FieldError::EmailInvalid);
    }
    if input.comment.trim().is_empty() {
        errors.push(FieldError::CommentRequired);
    }
    errors
}

/// Lifecycle of one submission. A write to the store may only be
/// attempted from `Submitting`, which is only reachable through
/// `submit` on valid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle { errors: Vec<FieldError> },
    Submitting,
    Submitted,
    Failed,
}

impl SubmissionState {
    pub fn new() -> SubmissionState {
        SubmissionState::Idle { errors: Vec::new() }
    }

    /// Validate and advance. Invalid input stays `Idle` carrying the
    /// errors; any state other than `Idle` is returned unchanged.
    pub fn submit(self, input: &CommentInput) -> SubmissionState {
        match self {
            SubmissionState::Idle { .. } => {
                let errors = validate(input);
                if errors.is_empty() {
                    SubmissionState::Submitting
                } else {
                    SubmissionState::Idle { errors }
                }
            }
            other => other,
        }
    }

    /// Record the outcome of the store write. Only `Submitting` moves.
    pub fn complete(self, ok: bool) -> SubmissionState {
        match self {
            SubmissionState::Submitting => {
                if ok {
                    SubmissionState::Submitted
                } else {
                    SubmissionState::Failed
                }
            }
            other => other,
        }
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CommentInput {
        CommentInput {
            post_id: "post-1".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            comment: "Lovely read".to_string(),
        }
    }

    #[test]
    fn valid_input_has_no_errors() {
        assert!(validate(&valid_input()).is_empty());
    }

    #[test]
    fn blank_name_is_required() {
        let input = CommentInput {
            name: "   ".to_string(),
            ..valid_input()
        };
        assert_eq!(validate(&input), vec![FieldError::NameRequired]);
        assert_eq!(
            FieldError::NameRequired.message(),
            "The Name Field is required"
        );
    }

    #[test]
    fn empty_email_reports_required_not_invalid() {
        let input = CommentInput {
            email: "".to_string(),
            ..valid_input()
        };
        assert_eq!(validate(&input), vec![FieldError::EmailRequired]);
    }

    #[test]
    fn malformed_email_reports_invalid() {
        for email in ["not-an-email", "a@b", "a b@c.com", "@c.com"] {
            let input = CommentInput {
                email: email.to_string(),
                ..valid_input()
            };
            assert_eq!(validate(&input), vec![FieldError::EmailInvalid], "{}", email);
        }
    }

    #[test]
    fn email_is_trimmed_before_checking() {
        let input = CommentInput {
            email: "  jane@example.com  ".to_string(),
            ..valid_input()
        };
        assert!(validate(&input).is_empty());
    }

    #[test]
    fn all_fields_blank_reports_one_error_per_field() {
        let errors = validate(&CommentInput::default());
        assert_eq!(
            errors,
            vec![
                FieldError::NameRequired,
                FieldError::EmailRequired,
                FieldError::CommentRequired,
            ]
        );
    }

    #[test]
    fn submit_with_valid_input_starts_submitting() {
        let state = SubmissionState::new().submit(&valid_input());
        assert_eq!(state, SubmissionState::Submitting);
    }

    #[test]
    fn submit_with_invalid_input_stays_idle_with_errors() {
        let state = SubmissionState::new().submit(&CommentInput::default());
        match state {
            SubmissionState::Idle { errors } => assert_eq!(errors.len(), 3),
            other => panic!("expected Idle, got {:?}", other),
        }
    }

    #[test]
    fn submit_outside_idle_changes_nothing() {
        let state = SubmissionState::Submitted.submit(&valid_input());
        assert_eq!(state, SubmissionState::Submitted);
        let state = SubmissionState::Failed.submit(&CommentInput::default());
        assert_eq!(state, SubmissionState::Failed);
    }

    #[test]
    fn complete_moves_submitting_to_outcome() {
        assert_eq!(
            SubmissionState::Submitting.complete(true),
            SubmissionState::Submitted
        );
        assert_eq!(
            SubmissionState::Submitting.complete(false),
            SubmissionState::Failed
        );
    }

    #[test]
    fn complete_outside_submitting_changes_nothing() {
        let idle = SubmissionState::new();
        assert_eq!(idle.clone().complete(true), idle);
        assert_eq!(
            SubmissionState::Submitted.complete(false),
            SubmissionState::Submitted
        );
    }

    #[test]
    fn form_payload_deserializes_with_hidden_id() {
        let input: CommentInput =
            serde_urlencoded::from_str("_id=post-1&name=Jane&email=j%40e.com&comment=hi").unwrap();
        assert_eq!(input.post_id, "post-1");
        assert_eq!(input.name, "Jane");
        assert_eq!(input.email, "j@e.com");
        assert_eq!(input.comment, "hi");
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let input: CommentInput = serde_urlencoded::from_str("name=Jane").unwrap();
        assert_eq!(input.post_id, "");
        assert_eq!(input.email, "");
        assert!(validate(&input).len() == 2);
    }
}
