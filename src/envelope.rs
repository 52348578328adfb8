//! Certificate-only PKCS#7 / CMS `SignedData` envelopes.
//!
//! The envelope carries exactly one certificate. It has no signer infos and no
//! digest algorithms, so it is a container for the certificate and nothing
//! more; it cannot be verified as a signed message.
//!
//! ```text
//! ContentInfo ::= SEQUENCE {
//!   contentType   id-signedData,
//!   content   [0] EXPLICIT SignedData }
//!
//! SignedData ::= SEQUENCE {
//!   version            INTEGER (1),
//!   digestAlgorithms   SET OF AlgorithmIdentifier,   -- empty
//!   encapContentInfo   ContentInfo,                  -- id-data, no content
//!   certificates   [0] IMPLICIT SET OF Certificate,  -- one entry
//!   signerInfos        SET OF SignerInfo }           -- empty
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use const_oid::ObjectIdentifier;
use const_oid::db::rfc5911::{ID_DATA, ID_SIGNED_DATA};
use der::asn1::SetOfVec;
use der::{Any, Decode, Encode, Sequence};
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::cert::Certificate;
use crate::cert::params::{CertificateTemplate, Validity, is_absolute_uri};
use crate::csr::CertificateRequest;
use crate::error::CertError;
use crate::key::KeyPair;

/// `SignedData` version written into every envelope.
pub const SIGNED_DATA_VERSION: u8 = 1;

/// `ContentInfo` as defined in RFC 5652 §3.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct ContentInfo {
    pub content_type: ObjectIdentifier,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub content: Option<Any>,
}

/// The subset of RFC 5652 `SignedData` written by this crate. CRLs are never
/// present.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SignedData {
    pub version: u8,
    pub digest_algorithms: SetOfVec<AlgorithmIdentifierOwned>,
    pub encap_content_info: ContentInfo,
    #[asn1(
        context_specific = "0",
        tag_mode = "IMPLICIT",
        constructed = "true",
        optional = "true"
    )]
    pub certificates: Option<SetOfVec<x509_cert::Certificate>>,
    pub signer_infos: SetOfVec<Any>,
}

/// A certificate wrapped in a certificate-only signed-data envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LegacyEnvelope {
    signed_data: SignedData,
}

impl LegacyEnvelope {
    /// Wraps `cert` as the single entry of the certificates set.
    pub fn for_certificate(cert: &Certificate) -> Result<Self, CertError> {
        let certificates = SetOfVec::try_from(vec![cert.inner.clone()])
            .map_err(|e| CertError::EncodingError(format!("failed to marshal certificate set: {e}")))?;

        Ok(Self {
            signed_data: SignedData {
                version: SIGNED_DATA_VERSION,
                digest_algorithms: SetOfVec::new(),
                encap_content_info: ContentInfo {
                    content_type: ID_DATA,
                    content: None,
                },
                certificates: Some(certificates),
                signer_infos: SetOfVec::new(),
            },
        })
    }

    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    /// Certificates carried by the envelope, in set order.
    pub fn certificates(&self) -> Vec<Certificate> {
        self.signed_data
            .certificates
            .iter()
            .flat_map(|set| set.iter())
            .map(|inner| Certificate {
                inner: inner.clone(),
            })
            .collect()
    }

    /// The outer `ContentInfo` with content type `id-signedData`.
    pub fn to_content_info(&self) -> Result<ContentInfo, CertError> {
        let signed_data_der = self
            .signed_data
            .to_der()
            .map_err(|e| CertError::EncodingError(format!("failed to marshal signed data: {e}")))?;
        Ok(ContentInfo {
            content_type: ID_SIGNED_DATA,
            content: Some(Any::from_der(&signed_data_der)?),
        })
    }

    pub fn to_der(&self) -> Result<Vec<u8>, CertError> {
        self.to_content_info()?
            .to_der()
            .map_err(|e| CertError::EncodingError(format!("failed to marshal PKCS#7: {e}")))
    }

    /// Standard, padded base64 of the DER encoding.
    pub fn to_base64(&self) -> Result<String, CertError> {
        Ok(STANDARD.encode(self.to_der()?))
    }

    pub fn from_der(der: &[u8]) -> Result<Self, CertError> {
        let content_info = ContentInfo::from_der(der)?;
        if content_info.content_type != ID_SIGNED_DATA {
            return Err(CertError::DecodingError(format!(
                "expected signed-data content, found {}",
                content_info.content_type
            )));
        }
        let content = content_info.content.ok_or_else(|| {
            CertError::DecodingError("signed-data envelope has no content".to_string())
        })?;
        let signed_data = SignedData::from_der(&content.to_der()?)?;
        Ok(Self { signed_data })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CertError> {
        let der = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CertError::DecodingError(format!("invalid base64: {e}")))?;
        Self::from_der(&der)
    }
}

/// Issues a self-signed certificate for the request in `csr_pem`.
///
/// Subject and DNS names come from the request; DNS names that are absolute
/// URIs are repeated as URI SAN entries. The serial is random in `[0, 2^128)`
/// and the certificate is valid from now for `validity_days`.
pub fn self_sign_csr(
    csr_pem: &str,
    signing_key: &KeyPair,
    validity_days: u32,
) -> Result<Certificate, CertError> {
    let csr = CertificateRequest::from_pem(csr_pem)?;
    csr.verify()?;

    let uris = csr
        .dns_names
        .iter()
        .filter(|name| is_absolute_uri(name))
        .cloned()
        .collect();

    let template = CertificateTemplate::builder()
        .subject(csr.subject)
        .subject_public_key(csr.public_key)
        .validity(Validity::for_days(validity_days)?)
        .dns_names(csr.dns_names)
        .uris(uris)
        .build();

    Certificate::new_self_signed(&template, signing_key)
}

/// Self-signs the request in `csr_pem` and returns the certificate wrapped in a
/// certificate-only signed-data envelope, base64-encoded.
pub fn sign_csr_to_pkcs7(
    csr_pem: &str,
    signing_key: &KeyPair,
    validity_days: u32,
) -> Result<String, CertError> {
    let cert = self_sign_csr(csr_pem, signing_key, validity_days)?;
    let envelope = LegacyEnvelope::for_certificate(&cert)?;
    let encoded = envelope.to_base64()?;

    tracing::debug!(
        validity_days,
        envelope_len = encoded.len(),
        "wrapped certificate in signed-data envelope"
    );

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::params::DistinguishedName;
    use crate::csr::{RequestParams, create_csr};

    fn request_pem(key_pair: &KeyPair, alt_names: &[&str]) -> String {
        let params = RequestParams::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name("example.com".to_string())
                    .country("US".to_string())
                    .build(),
            )
            .alt_names(alt_names.iter().map(|s| s.to_string()).collect())
            .build();
        create_csr(key_pair, &params).unwrap().pem
    }

    #[test]
    fn test_envelope_shape() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let pem = request_pem(&key_pair, &["www.example.com"]);
        let encoded = sign_csr_to_pkcs7(&pem, &key_pair, 30).unwrap();

        let envelope = LegacyEnvelope::from_base64(&encoded).unwrap();
        let signed_data = envelope.signed_data();
        assert_eq!(signed_data.version, SIGNED_DATA_VERSION);
        assert!(signed_data.digest_algorithms.is_empty());
        assert!(signed_data.signer_infos.is_empty());
        assert_eq!(signed_data.encap_content_info.content_type, ID_DATA);
        assert!(signed_data.encap_content_info.content.is_none());
        assert_eq!(envelope.certificates().len(), 1);
    }

    #[test]
    fn test_certificates_field_is_implicitly_tagged() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let cert = self_sign_csr(&request_pem(&key_pair, &[]), &key_pair, 1).unwrap();
        let envelope = LegacyEnvelope::for_certificate(&cert).unwrap();
        let signed_data_der = envelope.signed_data().to_der().unwrap();
        let cert_der = cert.to_der().unwrap();

        // SEQUENCE with a two-byte long-form length, then the fields in order.
        assert_eq!(&signed_data_der[..2], &[0x30, 0x82]);
        let body = &signed_data_der[4..];
        assert_eq!(&body[..3], &[0x02, 0x01, 0x01]);
        assert_eq!(&body[3..5], &[0x31, 0x00]);
        let encap = [
            0x30, 0x0b, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x07, 0x01,
        ];
        assert_eq!(&body[5..5 + encap.len()], &encap);
        let certificates = &body[5 + encap.len()..];
        assert_eq!(certificates[0], 0xa0);
        assert!(certificates.windows(cert_der.len()).any(|w| w == cert_der.as_slice()));
        assert!(body.ends_with(&[0x31, 0x00]));
    }

    #[test]
    fn test_malformed_pem_is_a_decode_failure() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        for input in ["", "not pem at all", "-----BEGIN CERTIFICATE REQUEST-----\n"] {
            assert!(matches!(
                sign_csr_to_pkcs7(input, &key_pair, 365),
                Err(CertError::DecodingError(_))
            ));
        }
    }

    #[test]
    fn test_wrong_pem_label_is_rejected() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        assert!(matches!(
            sign_csr_to_pkcs7(key_pair.private_key_pem(), &key_pair, 365),
            Err(CertError::DecodingError(_))
        ));
    }

    #[test]
    fn test_uri_alt_names_become_uri_entries() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let pem = request_pem(&key_pair, &["https://www.powerflex.com", "www.example.com"]);
        let cert = self_sign_csr(&pem, &key_pair, 365).unwrap();
        let san = cert.details().unwrap().subject_alt_name;
        assert_eq!(
            san.dns_names,
            vec![
                "example.com".to_string(),
                "https://www.powerflex.com".to_string(),
                "www.example.com".to_string()
            ]
        );
        assert_eq!(san.uris, vec!["https://www.powerflex.com".to_string()]);
    }
}
