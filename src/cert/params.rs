use std::sync::LazyLock;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::asn1::{GeneralizedTime, Ia5StringRef, PrintableStringRef, SetOfVec, UtcTime};
use der::{Any, Tag};
use rand_core::RngCore;
use regex::Regex;
use time::Duration;
use time::OffsetDateTime;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;

use super::extensions::ToAndFromX509Extension;
use crate::error::CertError;
use crate::key::PublicKey;

mod rfc4519 {
    use const_oid::ObjectIdentifier;

    pub const C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
    pub const ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
    pub const L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
    pub const O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
    pub const OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
    pub const CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
}

/// Domain component attribute type, `0.9.2342.19200300.100.1.25`.
pub const DOMAIN_COMPONENT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");

/// Distinguished name parameters for building a request or certificate.
///
/// Empty scalar fields are left out of the encoded name. On the wire the
/// attributes appear one per RDN in the order C, ST, L, O, OU, CN, DC.
///
/// # Fields
/// * `common_name` - The common name (CN).
/// * `country` - The country (C).
/// * `state` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `organization` - The organization (O).
/// * `organization_unit` - The organizational unit (OU).
/// * `domain_component` - The domain component (DC).
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    #[builder(default)]
    pub country: String,
    #[builder(default)]
    pub state: String,
    #[builder(default)]
    pub locality: String,
    #[builder(default)]
    pub organization: String,
    pub organization_unit: Option<String>,
    pub domain_component: Option<String>,
}

fn directory_string(value: &str) -> Result<Any, CertError> {
    let tag = if PrintableStringRef::new(value).is_ok() {
        Tag::PrintableString
    } else {
        Tag::Utf8String
    };
    Ok(Any::new(tag, value.as_bytes())?)
}

fn single_rdn(oid: ObjectIdentifier, value: Any) -> Result<RelativeDistinguishedName, CertError> {
    let atv = AttributeTypeAndValue { oid, value };
    Ok(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?))
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509-compatible format.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName, CertError> {
        let scalars = [
            (rfc4519::C, self.country.as_str()),
            (rfc4519::ST, self.state.as_str()),
            (rfc4519::L, self.locality.as_str()),
            (rfc4519::O, self.organization.as_str()),
            (rfc4519::OU, self.organization_unit.as_deref().unwrap_or_default()),
            (rfc4519::CN, self.common_name.as_str()),
        ];

        let mut rdns = Vec::new();
        for (oid, value) in scalars {
            if !value.is_empty() {
                rdns.push(single_rdn(oid, directory_string(value)?)?);
            }
        }

        // DC is IA5String per RFC 4519; non-ASCII values fall back to a directory string.
        if let Some(dc) = &self.domain_component {
            let value = match Ia5StringRef::new(dc) {
                Ok(_) => Any::new(Tag::Ia5String, dc.as_bytes())?,
                Err(_) => directory_string(dc)?,
            };
            rdns.push(single_rdn(DOMAIN_COMPONENT, value)?);
        }

        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509-compatible format.
    ///
    /// Attributes this type does not model are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self, CertError> {
        let mut dn = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let text = || {
                    String::from_utf8(attr.value.value().to_vec()).map_err(|e| {
                        CertError::DecodingError(format!("attribute {} is not text: {e}", attr.oid))
                    })
                };
                match attr.oid {
                    rfc4519::CN => dn.common_name = text()?,
                    rfc4519::C => dn.country = text()?,
                    rfc4519::ST => dn.state = text()?,
                    rfc4519::L => dn.locality = text()?,
                    rfc4519::O => dn.organization = text()?,
                    rfc4519::OU => dn.organization_unit = Some(text()?),
                    DOMAIN_COMPONENT => dn.domain_component = Some(text()?),
                    _ => {}
                }
            }
        }

        Ok(dn)
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// `not_before` is truncated to whole seconds, the precision X.509 time
    /// values carry, so `not_after - not_before` is exactly `days`.
    pub fn for_days(days: u32) -> Result<Self, CertError> {
        let now = OffsetDateTime::now_utc()
            .replace_nanosecond(0)
            .map_err(|e| CertError::InvalidInput(e.to_string()))?;
        Self::starting_at(now, days)
    }

    pub fn starting_at(not_before: OffsetDateTime, days: u32) -> Result<Self, CertError> {
        let not_after = not_before
            .checked_add(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                CertError::InvalidInput(format!("validity of {days} days is out of range"))
            })?;
        Ok(Self {
            not_before,
            not_after,
        })
    }

    /// Converts the validity period to its X.509 form.
    ///
    /// Dates before 2050 use UTCTime, later ones GeneralizedTime (RFC 5280 §4.1.2.5).
    pub fn to_x509_validity(&self) -> Result<x509_cert::time::Validity, CertError> {
        Ok(x509_cert::time::Validity {
            not_before: x509_time(self.not_before)?,
            not_after: x509_time(self.not_after)?,
        })
    }

    pub fn from_x509_validity(validity: &x509_cert::time::Validity) -> Self {
        Self {
            not_before: OffsetDateTime::from(validity.not_before.to_system_time()),
            not_after: OffsetDateTime::from(validity.not_after.to_system_time()),
        }
    }
}

fn x509_time(t: OffsetDateTime) -> Result<x509_cert::time::Time, CertError> {
    let encoded = if t.year() < 2050 {
        x509_cert::time::Time::UtcTime(UtcTime::from_system_time(t.into())?)
    } else {
        x509_cert::time::Time::GeneralTime(GeneralizedTime::from_system_time(t.into())?)
    };
    Ok(encoded)
}

/// Draw a serial number uniformly from `[0, 2^128)`.
pub fn random_serial() -> u128 {
    let mut bytes = [0u8; 16];
    rand_core::OsRng.fill_bytes(&mut bytes);
    u128::from_be_bytes(bytes)
}

/// Encode a non-negative serial as a minimal DER INTEGER body.
pub fn serial_to_x509(serial: u128) -> Result<SerialNumber, CertError> {
    let bytes = serial.to_be_bytes();
    let first = bytes
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(bytes.len() - 1);
    let mut minimal = Vec::with_capacity(17);
    if bytes[first] & 0x80 != 0 {
        minimal.push(0);
    }
    minimal.extend_from_slice(&bytes[first..]);
    Ok(SerialNumber::new(&minimal)?)
}

/// Decode a serial number produced by [`serial_to_x509`].
pub fn serial_from_x509(serial: &SerialNumber) -> Result<u128, CertError> {
    let raw = serial.as_bytes();
    if raw.first().is_some_and(|b| b & 0x80 != 0) {
        return Err(CertError::DecodingError(
            "serial number is negative".to_string(),
        ));
    }
    let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let significant = &raw[first..];
    if significant.len() > 16 {
        return Err(CertError::DecodingError(
            "serial number is wider than 128 bits".to_string(),
        ));
    }
    let mut bytes = [0u8; 16];
    bytes[16 - significant.len()..].copy_from_slice(significant);
    Ok(u128::from_be_bytes(bytes))
}

static URI_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s\x00-\x1f\x7f]*$").expect("valid URI regex")
});

/// Returns true when `name` is an absolute URI, i.e. it carries a non-empty scheme.
pub fn is_absolute_uri(name: &str) -> bool {
    URI_SCHEME.is_match(name)
}

/// Everything needed to issue a self-signed certificate for a request.
///
/// # Fields
/// * `serial` - Certificate serial number.
/// * `subject` - Subject (and, self-signed, issuer) name.
/// * `subject_public_key` - The key being certified.
/// * `validity` - `notBefore` / `notAfter`.
/// * `dns_names` - `dNSName` SAN entries.
/// * `uris` - URI SAN entries.
#[derive(Clone, Debug, Builder)]
pub struct CertificateTemplate {
    #[builder(default = random_serial())]
    pub serial: u128,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    pub validity: Validity,
    #[builder(default)]
    pub dns_names: Vec<String>,
    #[builder(default)]
    pub uris: Vec<String>,
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: E,
        critical: bool,
    ) -> Result<Self, CertError> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CertError> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn to_x509(&self) -> Result<x509_cert::ext::Extension, CertError> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())?,
        })
    }

    pub fn from_x509(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }
}
