use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to the inference service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The {service} service returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),
}
