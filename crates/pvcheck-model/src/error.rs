use thiserror::Error;

/// Failure to decode a stored parameter value into a [`crate::Value`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown value type '{0}'")]
    UnknownType(String),

    #[error("missing '{field}' in {value_type} value")]
    MissingField {
        value_type: &'static str,
        field: &'static str,
    },

    #[error("invalid {value_type} value: {message}")]
    Invalid {
        value_type: &'static str,
        message: String,
    },

    #[error("invalid date-time '{0}'")]
    DateTime(String),

    #[error("unknown index type '{0}'")]
    UnknownIndexType(String),
}

impl DecodeError {
    pub(crate) fn invalid(value_type: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            value_type,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
