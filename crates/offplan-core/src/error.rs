use thiserror::Error;

#[derive(Debug, Error)]
pub enum OffplanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Schedule horizon of {months} months exceeds the maximum of {max} months")]
    HorizonTooLong { months: u32, max: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for OffplanError {
    fn from(e: serde_json::Error) -> Self {
        OffplanError::SerializationError(e.to_string())
    }
}
