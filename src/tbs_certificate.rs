use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::{
    DistinguishedName, ExtensionParam, Validity, serial_from_x509, serial_to_x509,
};
use crate::error::CertError;
use crate::key::PublicKey;

/// The to-be-signed part of a certificate, in this crate's own types.
///
/// Extensions are kept in the order they will be written.
#[derive(Clone, Debug)]
pub struct TbsCertificate {
    pub serial_number: u128,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Builds the v3 `TbsCertificateInner`; an empty extension list is omitted.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner, CertError> {
        let extensions = self
            .extensions
            .iter()
            .map(ExtensionParam::to_x509)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: serial_to_x509(self.serial_number)?,
            signature: self.signature_algorithm.into(),
            issuer: self.issuer.as_x509_name()?,
            validity: self.validity.to_x509_validity()?,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: (!extensions.is_empty()).then_some(extensions),
        })
    }

    pub fn from_tbs_certificate_inner(inner: &TbsCertificateInner) -> Result<Self, CertError> {
        let extensions = inner
            .extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ExtensionParam::from_x509)
            .collect();

        Ok(Self {
            serial_number: serial_from_x509(&inner.serial_number)?,
            signature_algorithm: SignatureAlgorithm::from_oid(&inner.signature.oid)?,
            issuer: DistinguishedName::from_x509_name(&inner.issuer)?,
            validity: Validity::from_x509_validity(&inner.validity),
            subject: DistinguishedName::from_x509_name(&inner.subject)?,
            subject_public_key: PublicKey::from_x509spki(&inner.subject_public_key_info)?,
            extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;
    use der::Encode;

    #[test]
    fn test_tbs_round_trip_without_extensions() {
        let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
        let name = DistinguishedName::builder()
            .common_name("example.com".to_string())
            .build();
        let tbs = TbsCertificate {
            serial_number: 0x80,
            signature_algorithm: SignatureAlgorithm::Sha256WithECDSA,
            issuer: name.clone(),
            validity: Validity::for_days(10).unwrap(),
            subject: name,
            subject_public_key: key_pair.public_key(),
            extensions: vec![],
        };

        let inner = tbs.to_tbs_certificate_inner().unwrap();
        assert_eq!(inner.version, Version::V3);
        assert!(inner.extensions.is_none());
        assert!(inner.to_der().is_ok());

        let decoded = TbsCertificate::from_tbs_certificate_inner(&inner).unwrap();
        assert_eq!(decoded.serial_number, 0x80);
        assert_eq!(decoded.subject, tbs.subject);
        assert_eq!(decoded.validity, tbs.validity);
        assert_eq!(decoded.subject_public_key, tbs.subject_public_key);
    }
}
