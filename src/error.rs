/// Errors raised by the pool and the command helpers
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = AppError::InvalidInput("ttl must be at least one second".to_string());
        assert_eq!(err.to_string(), "Invalid input: ttl must be at least one second");
    }

    #[test]
    fn test_serialization_error_converts() {
        let parse: Result<Vec<u32>, _> = serde_json::from_str("not json");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_redis_error_converts() {
        let redis_err = redis::RedisError::from((redis::ErrorKind::TypeError, "wrong type"));
        let err: AppError = redis_err.into();
        assert!(matches!(err, AppError::Cache(_)));
    }
}
