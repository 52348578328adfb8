use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::Ia5String,
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;

use crate::error::CertError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use gsn_dev_tools::cert::extensions::{SubjectAltName, ToAndFromX509Extension};
/// let san = SubjectAltName {
///     dns_names: vec!["example.com".to_string()],
///     uris: vec![],
/// };
/// let encoded = san.to_x509_extension_value().unwrap();
/// let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(san.dns_names, decoded.dns_names);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertError>
    where
        Self: Sized;
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// DNS names are written first, URIs after them.
///
/// # Fields
/// * `dns_names` - `dNSName` entries, in order.
/// * `uris` - `uniformResourceIdentifier` entries, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub uris: Vec<String>,
}

fn ia5(name: &str) -> Result<Ia5String, CertError> {
    Ia5String::new(name)
        .map_err(|e| CertError::InvalidInput(format!("`{name}` is not an IA5 string: {e}")))
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::SubjectAltName::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertError> {
        let dns = self
            .dns_names
            .iter()
            .map(|name| ia5(name).map(GeneralName::DnsName));
        let uris = self
            .uris
            .iter()
            .map(|uri| ia5(uri).map(GeneralName::UniformResourceIdentifier));
        let san = x509_cert::ext::pkix::SubjectAltName(dns.chain(uris).collect::<Result<_, _>>()?);

        Ok(san.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertError> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let mut decoded = Self::default();
        for name in san.0.iter() {
            match name {
                GeneralName::DnsName(dns) => decoded.dns_names.push(dns.to_string()),
                GeneralName::UniformResourceIdentifier(uri) => decoded.uris.push(uri.to_string()),
                _ => {
                    return Err(CertError::InvalidInput(
                        "Unsupported general name type".to_string(),
                    ));
                }
            }
        }
        Ok(decoded)
    }
}

/// The Basic Constraints extension of an end-entity certificate.
///
/// No path length is ever written; one found while decoding is ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::BasicConstraints::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertError> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: None,
        };

        Ok(bc.to_der()?)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self, CertError> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self { is_ca: bc.ca })
    }
}

use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
use x509_cert::ext::pkix::KeyUsages;

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(FlagSet<KeyUsages>);

impl KeyUsage {
    /// `digitalSignature` + `contentCommitment` (formerly `nonRepudiation`).
    pub fn signing() -> Self {
        Self(KeyUsages::DigitalSignature | KeyUsages::NonRepudiation)
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertError> {
        let ku = X509KeyUsage::from(self.0);
        Ok(ku.to_der()?)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_constraints_encoding_decoding() {
        let original = BasicConstraints { is_ca: false };
        let encoded = original.to_x509_extension_value().unwrap();
        // cA = FALSE is the DEFAULT and must be omitted from the encoding.
        assert_eq!(encoded, vec![0x30, 0x00]);
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_key_usage_signing_flags() {
        let original = KeyUsage::signing();
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
        assert!(decoded.0.contains(KeyUsages::DigitalSignature));
        assert!(decoded.0.contains(KeyUsages::NonRepudiation));
        assert!(!decoded.0.contains(KeyUsages::KeyCertSign));
    }

    #[test]
    fn test_subject_alt_name_keeps_dns_then_uri_order() {
        let original = SubjectAltName {
            dns_names: vec![
                "example.com".to_string(),
                "https://www.example.com".to_string(),
            ],
            uris: vec!["https://www.example.com".to_string()],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_subject_alt_name_rejects_non_ascii() {
        let san = SubjectAltName {
            dns_names: vec!["bücher.example".to_string()],
            uris: vec![],
        };
        assert!(matches!(
            san.to_x509_extension_value(),
            Err(CertError::InvalidInput(_))
        ));
    }
}
