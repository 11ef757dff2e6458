use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    TooShort {
        field: &'static str,
        min_len: usize,
        actual: usize,
    },
    InvalidPhoneNumber {
        input: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooShort {
                field,
                min_len,
                actual,
            } => {
                write!(
                    f,
                    "{field} is too short: {actual} characters (expected at least {min_len})"
                )
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "token" };
        assert_eq!(err.to_string(), "token must not be empty");

        let err = ValidationError::TooShort {
            field: "originator",
            min_len: 4,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "originator is too short: 3 characters (expected at least 4)"
        );

        let err = ValidationError::InvalidPhoneNumber {
            input: "bad".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid phone number: bad");
    }
}
