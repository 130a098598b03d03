use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown {0}: '{1}'")]
    UnknownVariant(&'static str, String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
