pub mod extensions;
pub mod params;

use crate::error::CertError;
pub type Result<T> = std::result::Result<T, CertError>;
use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use extensions::{BasicConstraints, KeyUsage, SubjectAltName, ToAndFromX509Extension};
use params::{CertificateTemplate, DistinguishedName, ExtensionParam, Validity};
use x509_cert::certificate::CertificateInner;

use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// Represents the supported signature algorithms for requests and certificates.
///
/// Signing is fixed to ECDSA over P-256 with SHA-256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
}

impl SignatureAlgorithm {
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha256WithECDSA => const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
        }
    }

    /// Maps a signature algorithm OID back to a `SignatureAlgorithm`.
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        match *oid {
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256 => Ok(SignatureAlgorithm::Sha256WithECDSA),
            _ => Err(CertError::DecodingError(format!(
                "Unsupported signature algorithm {oid}"
            ))),
        }
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// ECDSA signature algorithms carry no parameters (RFC 5758 §3.2).
    fn from(value: SignatureAlgorithm) -> Self {
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters: None,
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode, decode and inspect the certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

/// The decoded contents of a certificate produced by this crate.
#[derive(Debug, Clone)]
pub struct CertificateDetails {
    pub serial: u128,
    pub issuer: DistinguishedName,
    pub subject: DistinguishedName,
    pub validity: Validity,
    pub subject_public_key: PublicKey,
    pub signature_algorithm: SignatureAlgorithm,
    pub subject_alt_name: SubjectAltName,
    pub key_usage: Option<KeyUsage>,
    pub basic_constraints: Option<BasicConstraints>,
    pub extensions: Vec<ExtensionParam>,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertError::EncodingError(e.to_string()))
    }

    /// Parses a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)
            .map_err(|e| CertError::DecodingError(format!("failed to parse certificate: {e}")))?;
        Ok(Self { inner })
    }

    /// Extracts the fields this crate writes into a `CertificateDetails`.
    pub fn details(&self) -> Result<CertificateDetails> {
        let tbs = TbsCertificate::from_tbs_certificate_inner(&self.inner.tbs_certificate)?;

        let find = |oid: ObjectIdentifier| tbs.extensions.iter().find(|ext| ext.oid == oid);

        let subject_alt_name = find(SubjectAltName::OID)
            .map(ExtensionParam::to_extension::<SubjectAltName>)
            .transpose()?
            .unwrap_or_default();
        let key_usage = find(KeyUsage::OID)
            .map(ExtensionParam::to_extension::<KeyUsage>)
            .transpose()?;
        let basic_constraints = find(BasicConstraints::OID)
            .map(ExtensionParam::to_extension::<BasicConstraints>)
            .transpose()?;

        Ok(CertificateDetails {
            serial: tbs.serial_number,
            issuer: tbs.issuer,
            subject: tbs.subject,
            validity: tbs.validity,
            subject_public_key: tbs.subject_public_key,
            signature_algorithm: tbs.signature_algorithm,
            subject_alt_name,
            key_usage,
            basic_constraints,
            extensions: tbs.extensions,
        })
    }

    /// Checks the signature against `issuer_key`.
    pub fn verify_signature(&self, issuer_key: &PublicKey) -> Result<()> {
        let tbs_der = self
            .inner
            .tbs_certificate
            .to_der()
            .map_err(|e| CertError::EncodingError(e.to_string()))?;
        let signature = self.inner.signature.as_bytes().ok_or_else(|| {
            CertError::DecodingError("signature has unused bits".to_string())
        })?;
        issuer_key.verify(&tbs_der, signature)
    }

    /// Creates a new self-signed certificate.
    ///
    /// The issuer name is the template's subject and the certificate is signed
    /// with `key`.
    pub fn new_self_signed(template: &CertificateTemplate, key: &KeyPair) -> Result<Self> {
        let self_issuer = SelfIssuer {
            name: template.subject.clone(),
            key,
        };
        self_issuer.issue(template)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: DistinguishedName,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> DistinguishedName {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }
}
