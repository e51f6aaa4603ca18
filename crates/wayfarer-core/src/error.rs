//! Failure classification shared by every pipeline stage.

use std::fmt;

use serde::Serialize;

/// The stage-ordered failure taxonomy. Every error raised between the
/// inbound request and the response envelope maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    InputValidationError,
    GenerationFailure,
    MalformedPayload,
    MissingContainerKey,
    IncompleteItem,
    TypeCoercionError,
    UnexpectedError,
}

impl FailureKind {
    /// `true` for failures the caller caused or can act on, `false` only
    /// for [`FailureKind::UnexpectedError`].
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::UnexpectedError)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InputValidationError => "InputValidationError",
            Self::GenerationFailure => "GenerationFailure",
            Self::MalformedPayload => "MalformedPayload",
            Self::MissingContainerKey => "MissingContainerKey",
            Self::IncompleteItem => "IncompleteItem",
            Self::TypeCoercionError => "TypeCoercionError",
            Self::UnexpectedError => "UnexpectedError",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unexpected_is_unclassified() {
        assert!(FailureKind::IncompleteItem.is_classified());
        assert!(FailureKind::GenerationFailure.is_classified());
        assert!(!FailureKind::UnexpectedError.is_classified());
    }

    #[test]
    fn display_uses_taxonomy_names() {
        assert_eq!(FailureKind::MalformedPayload.to_string(), "MalformedPayload");
        assert_eq!(FailureKind::TypeCoercionError.to_string(), "TypeCoercionError");
    }
}
