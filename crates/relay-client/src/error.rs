use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached or its body could not be read.
    #[error("failed to communicate with the relay: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-2xx status.
    #[error("error from relay: {status}, {message}")]
    Status { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of a relay rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
