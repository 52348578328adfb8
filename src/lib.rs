//! # gsn-dev-tools - certificate pipeline
//!
//! Generates an ECDSA P-256 key pair, a certificate signing request for a
//! subject and its alternate names, and a self-signed certificate wrapped in a
//! certificate-only PKCS#7 signed-data envelope. Everything is built with the
//! RustCrypto crates; there is no OpenSSL or ring dependency outside the tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gsn_dev_tools::{
//!     cert::params::DistinguishedName,
//!     csr::{RequestParams, create_csr},
//!     envelope::sign_csr_to_pkcs7,
//!     key::KeyPair,
//! };
//!
//! # fn main() -> Result<(), gsn_dev_tools::error::CertError> {
//! let key_pair = KeyPair::generate_ecdsa_p256()?;
//!
//! let subject = DistinguishedName::builder()
//!     .common_name("example.com".to_string())
//!     .country("US".to_string())
//!     .build();
//! let params = RequestParams::builder()
//!     .subject(subject)
//!     .alt_names(vec!["www.example.com".to_string()])
//!     .build();
//!
//! let csr = create_csr(&key_pair, &params)?;
//! let pkcs7 = sign_csr_to_pkcs7(&csr.pem, &key_pair, 365)?;
//!
//! println!("{}\n{}\n{}", key_pair.private_key_pem(), csr.pem, pkcs7);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use gsn_dev_tools::{envelope::sign_csr_to_pkcs7, error::CertError, key::KeyPair};
//!
//! let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
//! match sign_csr_to_pkcs7("", &key_pair, 365) {
//!     Err(CertError::DecodingError(msg)) => println!("Failed to decode CSR: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: P-256 key generation, PKCS#8 export and signing
//! - [`csr`]: Certificate signing request construction and parsing
//! - [`cert`]: Certificates, names, validity and extensions
//! - [`envelope`]: Certificate-only signed-data envelopes
//! - [`pipeline`]: The key → CSR → envelope run used by the `gsn` binary
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod csr;
pub mod envelope;
pub mod error;
mod issuer;
pub mod key;
pub mod pem_utils;
pub mod pipeline;
pub mod tbs_certificate;
