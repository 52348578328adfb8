use crate::error::CertError;

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Convert a PEM‑encoded string to DER‑encoded bytes, requiring the given label.
pub fn pem_to_der(pem_str: &str, label: &str) -> Result<Vec<u8>, CertError> {
    let pem = pem::parse(pem_str)?;
    if pem.tag() != label {
        return Err(CertError::DecodingError(format!(
            "expected PEM block `{label}`, found `{}`",
            pem.tag()
        )));
    }
    Ok(pem.contents().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_label_is_checked() {
        let pem = der_to_pem(&[0x30, 0x00], "CERTIFICATE REQUEST");
        assert!(pem.starts_with("-----BEGIN CERTIFICATE REQUEST-----\n"));
        assert_eq!(
            pem_to_der(&pem, "CERTIFICATE REQUEST").unwrap(),
            vec![0x30, 0x00]
        );
        assert!(matches!(
            pem_to_der(&pem, "PRIVATE KEY"),
            Err(CertError::DecodingError(_))
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            pem_to_der("", "CERTIFICATE REQUEST"),
            Err(CertError::DecodingError(_))
        ));
    }
}
