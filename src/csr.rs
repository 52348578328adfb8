//! Certificate signing request construction and parsing.
//!
//! A request names a subject, carries the requester's P-256 public key and a
//! `subjectAltName` extension inside a PKCS#9 `extensionRequest` attribute, and
//! is signed with ECDSA/SHA-256.

use std::collections::HashSet;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{BitString, SetOfVec};
use der::{Any, Decode, Encode};
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::request::{CertReq, CertReqInfo, Version};

use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{SubjectAltName, ToAndFromX509Extension};
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::CertError;
use crate::key::{KeyPair, PublicKey};
use crate::pem_utils::{der_to_pem, pem_to_der};

/// PEM label used for PKCS#10 requests.
pub const CSR_LABEL: &str = "CERTIFICATE REQUEST";

/// PKCS#9 `extensionRequest` attribute type.
pub const EXTENSION_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");

/// Inputs for a certificate signing request.
///
/// # Fields
/// * `subject` - Subject name; its common name becomes the first DNS name.
/// * `alt_names` - Additional alternate names, possibly URIs.
#[derive(Clone, Debug, Builder)]
pub struct RequestParams {
    pub subject: DistinguishedName,
    #[builder(default)]
    pub alt_names: Vec<String>,
}

impl RequestParams {
    /// The request's DNS names: the common name followed by the alternate names.
    pub fn dns_names(&self) -> Vec<String> {
        dns_names(&self.subject.common_name, &self.alt_names)
    }
}

/// Builds the DNS name list: `common_name` first, then `alt_names`, with
/// duplicates and empty entries dropped and first-seen order preserved.
pub fn dns_names(common_name: &str, alt_names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(common_name)
        .chain(alt_names.iter().map(String::as_str))
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// A parsed PKCS#10 certificate signing request.
#[derive(Clone, Debug)]
pub struct CertificateRequest {
    pub subject: DistinguishedName,
    pub dns_names: Vec<String>,
    pub public_key: PublicKey,
    pub signature_algorithm: SignatureAlgorithm,
    pub inner: CertReq,
}

impl CertificateRequest {
    /// Parses a DER-encoded request.
    pub fn from_der(der: &[u8]) -> Result<Self, CertError> {
        let inner = CertReq::from_der(der)
            .map_err(|e| CertError::DecodingError(format!("failed to parse CSR: {e}")))?;

        let signature_algorithm = SignatureAlgorithm::from_oid(&inner.algorithm.oid)?;
        let subject = DistinguishedName::from_x509_name(&inner.info.subject)?;
        let public_key = PublicKey::from_x509spki(&inner.info.public_key)?;
        let dns_names = requested_alt_name(&inner.info)?
            .map(|san| san.dns_names)
            .unwrap_or_default();

        Ok(Self {
            subject,
            dns_names,
            public_key,
            signature_algorithm,
            inner,
        })
    }

    /// Parses a PEM-encoded request; the block must be labelled
    /// `CERTIFICATE REQUEST`.
    pub fn from_pem(pem: &str) -> Result<Self, CertError> {
        let der = pem_to_der(pem, CSR_LABEL)?;
        Self::from_der(&der)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, CertError> {
        self.inner
            .to_der()
            .map_err(|e| CertError::EncodingError(e.to_string()))
    }

    pub fn to_pem(&self) -> Result<String, CertError> {
        Ok(der_to_pem(&self.to_der()?, CSR_LABEL))
    }

    /// Checks the request's signature against its own public key.
    pub fn verify(&self) -> Result<(), CertError> {
        let info_der = self
            .inner
            .info
            .to_der()
            .map_err(|e| CertError::EncodingError(e.to_string()))?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            CertError::DecodingError("CSR signature has unused bits".to_string())
        })?;
        self.public_key.verify(&info_der, signature)
    }
}

fn requested_alt_name(info: &CertReqInfo) -> Result<Option<SubjectAltName>, CertError> {
    for attr in info.attributes.iter().filter(|a| a.oid == EXTENSION_REQUEST) {
        for value in attr.values.iter() {
            let extensions = Vec::<Extension>::from_der(&value.to_der()?)?;
            if let Some(ext) = extensions
                .iter()
                .find(|ext| ext.extn_id == SubjectAltName::OID)
            {
                return ExtensionParam::from_x509(ext).to_extension().map(Some);
            }
        }
    }
    Ok(None)
}

/// A signed request together with its PEM encoding.
#[derive(Clone, Debug)]
pub struct CsrOutput {
    pub csr: CertificateRequest,
    pub pem: String,
}

/// Builds and signs a certificate signing request with `key_pair`.
///
/// The request is encoded, parsed back to validate its structure and then
/// PEM-wrapped with the `CERTIFICATE REQUEST` label.
pub fn create_csr(key_pair: &KeyPair, params: &RequestParams) -> Result<CsrOutput, CertError> {
    let dns_names = params.dns_names();

    let mut attributes = Vec::new();
    if !dns_names.is_empty() {
        let san = SubjectAltName {
            dns_names: dns_names.clone(),
            uris: vec![],
        };
        let extensions = vec![ExtensionParam::from_extension(san, false)?.to_x509()?];
        let value = Any::from_der(&extensions.to_der()?)?;
        attributes.push(Attribute {
            oid: EXTENSION_REQUEST,
            values: SetOfVec::try_from(vec![value])?,
        });
    }

    let info = CertReqInfo {
        version: Version::V1,
        subject: params.subject.as_x509_name()?,
        public_key: key_pair.as_spki()?,
        attributes: SetOfVec::try_from(attributes)?,
    };

    let info_der = info
        .to_der()
        .map_err(|e| CertError::EncodingError(format!("failed to encode CSR info: {e}")))?;
    let signature = key_pair.sign_data(&info_der)?;

    let req = CertReq {
        info,
        algorithm: SignatureAlgorithm::Sha256WithECDSA.into(),
        signature: BitString::from_bytes(&signature)
            .map_err(|e| CertError::EncodingError(e.to_string()))?,
    };

    let der = req
        .to_der()
        .map_err(|e| CertError::EncodingError(format!("failed to create CSR: {e}")))?;
    let csr = CertificateRequest::from_der(&der)?;
    let pem = der_to_pem(&der, CSR_LABEL);

    tracing::debug!(
        common_name = %params.subject.common_name,
        dns_names = ?csr.dns_names,
        "created certificate signing request"
    );

    Ok(CsrOutput { csr, pem })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dns_names_dedup_preserves_first_seen_order() {
        let alt = names(&["b.example", "example.com", "a.example", "b.example"]);
        assert_eq!(
            dns_names("example.com", &alt),
            names(&["example.com", "b.example", "a.example"])
        );
    }

    #[test]
    fn test_dns_names_common_name_always_first() {
        let alt = names(&["www.example.com", "example.com"]);
        assert_eq!(
            dns_names("example.com", &alt),
            names(&["example.com", "www.example.com"])
        );
    }

    #[test]
    fn test_dns_names_skips_empty_entries() {
        let alt = names(&["", "www.example.com"]);
        assert_eq!(dns_names("", &alt), names(&["www.example.com"]));
    }

    #[test]
    fn test_create_csr_round_trips_through_pem() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let params = RequestParams::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name("example.com".to_string())
                    .country("US".to_string())
                    .domain_component("CSO".to_string())
                    .build(),
            )
            .alt_names(names(&["example.com", "www.example.com"]))
            .build();

        let output = create_csr(&key_pair, &params).unwrap();
        assert!(output.pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----\n"));
        assert_eq!(
            output.csr.dns_names,
            names(&["example.com", "www.example.com"])
        );
        assert_eq!(
            output.csr.signature_algorithm,
            SignatureAlgorithm::Sha256WithECDSA
        );
        output.csr.verify().unwrap();

        let reparsed = CertificateRequest::from_pem(&output.pem).unwrap();
        assert_eq!(reparsed.subject, params.subject);
        assert_eq!(reparsed.dns_names, output.csr.dns_names);
        assert_eq!(reparsed.public_key, key_pair.public_key());
    }

    #[test]
    fn test_request_without_names_has_no_attributes() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let params = RequestParams::builder()
            .subject(DistinguishedName::default())
            .build();
        let output = create_csr(&key_pair, &params).unwrap();
        assert!(output.csr.inner.info.attributes.is_empty());
        assert!(output.csr.dns_names.is_empty());
    }

    #[test]
    fn test_tampered_request_fails_verification() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let params = RequestParams::builder()
            .subject(
                DistinguishedName::builder()
                    .common_name("example.com".to_string())
                    .build(),
            )
            .build();
        let mut csr = create_csr(&key_pair, &params).unwrap().csr;
        let other = KeyPair::generate_ecdsa_p256().unwrap();
        csr.public_key = other.public_key();
        assert!(csr.verify().is_err());
    }
}
