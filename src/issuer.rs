use der::{Decode, Encode};
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{BasicConstraints, KeyUsage, SubjectAltName};
use crate::cert::params::{CertificateTemplate, DistinguishedName, ExtensionParam};
use crate::error::CertError;
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// An entity that signs certificates under its own name.
pub(crate) trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Issues a certificate for `template`.
    ///
    /// The certificate carries critical key usage (digitalSignature,
    /// contentCommitment), critical basic constraints with cA = false and, when
    /// there are names, a SAN with the template's DNS names followed by its URIs.
    /// The encoded certificate is parsed back before it is returned.
    fn issue(&self, template: &CertificateTemplate) -> Result<Certificate, CertError> {
        let signature_algo = SignatureAlgorithm::Sha256WithECDSA;

        let mut extensions: Vec<ExtensionParam> = vec![
            ExtensionParam::from_extension(KeyUsage::signing(), true)?,
            ExtensionParam::from_extension(BasicConstraints::default(), true)?,
        ];

        if !template.dns_names.is_empty() || !template.uris.is_empty() {
            let san = SubjectAltName {
                dns_names: template.dns_names.clone(),
                uris: template.uris.clone(),
            };
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        let tbs_cert = TbsCertificate {
            serial_number: template.serial,
            signature_algorithm: signature_algo,
            issuer: self.issuer_name(),
            validity: template.validity.clone(),
            subject: template.subject.clone(),
            subject_public_key: template.subject_public_key,
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_cert_inner
            .to_der()
            .map_err(|e| CertError::EncodingError(format!("failed to encode TBS: {e}")))?;

        let signature = self.signing_key().sign_data(&tbs_der)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algo.into(),
            signature: der::asn1::BitString::from_bytes(&signature)
                .map_err(|e| CertError::EncodingError(e.to_string()))?,
        };

        let cert_der = cert_inner
            .to_der()
            .map_err(|e| CertError::EncodingError(format!("failed to create certificate: {e}")))?;
        let inner = CertificateInner::from_der(&cert_der)
            .map_err(|e| CertError::DecodingError(format!("failed to parse certificate: {e}")))?;

        tracing::debug!(serial = %format!("{:x}", template.serial), "issued certificate");

        Ok(Certificate { inner })
    }
}
