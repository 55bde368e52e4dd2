use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Feed Errors
    #[error("Kafka error: {0}")]
    KafkaError(String),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Frame deserialization failed: {0}")]
    DeserializationError(String),

    // Metadata Errors
    #[error("Redis error: {0}")]
    RedisError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Task failure: {0}")]
    TaskFailure(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
