use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidEndpoint { input: String },
    InvalidPhoneNumber { input: String },
    InvalidResourceId { field: &'static str, input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidEndpoint { input } => write!(f, "invalid endpoint url: {input}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::InvalidResourceId { field, input } => {
                write!(
                    f,
                    "{field} contains characters not allowed in a path segment: {input}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
