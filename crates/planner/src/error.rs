use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// An operand does not have the shape its operator requires.
    #[error("Bad filter for `{operator}`: {reason}")]
    BadFilter { operator: String, reason: String },

    #[error("Did not recognize the operator: {0}")]
    UnknownOperator(String),

    /// The filter tree (or one of its branches) is not a mapping/sequence.
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Filter nesting exceeds {0} levels")]
    FilterTooDeep(usize),

    #[error("Unknown join kind `{0}` (expected `inner` or `left`)")]
    UnknownJoinKind(String),

    #[error("Unknown join condition type `{0}` (expected `ON` or `WITH`)")]
    UnknownConditionType(String),

    #[error("Malformed join for `{relation}`: {reason}")]
    MalformedJoin { relation: String, reason: String },

    #[error("Unknown sort direction `{0}` (expected `ASC` or `DESC`)")]
    UnknownDirection(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("Invalid alias `{0}`")]
    InvalidAlias(String),
}

impl PlanError {
    pub fn bad_filter(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::BadFilter {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
