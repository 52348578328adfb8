//! use gsn_dev_tools::error::CertError;

use thiserror::Error;

/// Errors raised while generating keys, requests, certificates and envelopes.
///
/// Every variant is terminal for the current run; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error related to certificate or request construction.
    #[error("Certificate error: {0}")]
    CertificateError(String),
}

impl From<der::Error> for CertError {
    /// Converts a `der::Error` into a `CertError`.
    fn from(err: der::Error) -> Self {
        CertError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertError {
    fn from(err: pem::PemError) -> Self {
        CertError::DecodingError(format!("malformed PEM: {err}"))
    }
}

impl From<x509_cert::spki::Error> for CertError {
    fn from(err: x509_cert::spki::Error) -> Self {
        CertError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for CertError {
    fn from(err: pkcs8::Error) -> Self {
        CertError::KeyGenerationError(err.to_string())
    }
}

/// A [`CertError`] tagged with the pipeline stage that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Error generating key pair")]
    KeyGeneration(#[source] CertError),

    #[error("Error creating CSR")]
    Request(#[source] CertError),

    #[error("Error signing CSR")]
    Envelope(#[source] CertError),
}
