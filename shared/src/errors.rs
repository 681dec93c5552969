//! Shared error types for the console workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Frame decode failed: {message}")]
    FrameDecodeError { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },

    #[error("Message protocol error: {message}")]
    ProtocolError { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
