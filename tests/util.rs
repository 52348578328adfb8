#![allow(dead_code)]

use gsn_dev_tools::cert::Certificate;
use gsn_dev_tools::cert::params::DistinguishedName;
use gsn_dev_tools::csr::{CsrOutput, RequestParams, create_csr};
use gsn_dev_tools::envelope::{LegacyEnvelope, sign_csr_to_pkcs7};
use gsn_dev_tools::key::KeyPair;

pub fn example_request() -> RequestParams {
    let subject = DistinguishedName::builder()
        .common_name("example.com".to_string())
        .country("US".to_string())
        .organization("Example".to_string())
        .build();

    RequestParams::builder()
        .subject(subject)
        .alt_names(vec![
            "www.example.com".to_string(),
            "example.com".to_string(),
        ])
        .build()
}

/// A key pair and the request it signed for `params`.
pub fn generate_request(params: &RequestParams) -> (KeyPair, CsrOutput) {
    let key_pair = KeyPair::generate_ecdsa_p256().unwrap();
    let csr = create_csr(&key_pair, params).unwrap();
    (key_pair, csr)
}

/// Runs the request through the envelope stage and unwraps its only certificate.
pub fn enveloped_certificate(params: &RequestParams, days: u32) -> (KeyPair, Certificate) {
    let (key_pair, csr) = generate_request(params);
    let pkcs7 = sign_csr_to_pkcs7(&csr.pem, &key_pair, days).unwrap();

    let mut certificates = LegacyEnvelope::from_base64(&pkcs7).unwrap().certificates();
    assert_eq!(certificates.len(), 1);
    (key_pair, certificates.remove(0))
}
