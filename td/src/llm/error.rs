use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} rejected model {model}")]
    IncompatibleModel { provider: String, model: String },

    #[error("request to {provider} timed out")]
    Timeout { provider: String },

    #[error("provider {provider} returned an error: {message}")]
    Provider { provider: String, message: String },

    #[error("rate limited by {provider}, retry after {retry_after_secs}s")]
    RateLimited { provider: String, retry_after_secs: u64 },

    #[error("transport error: {0}")]
    Transport(String),
}
