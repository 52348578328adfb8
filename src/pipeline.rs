//! The three-stage certificate pipeline: key → request → enveloped certificate.

use bon::Builder;

use crate::cert::params::DistinguishedName;
use crate::csr::{RequestParams, create_csr};
use crate::envelope::sign_csr_to_pkcs7;
use crate::error::PipelineError;
use crate::key::KeyPair;

/// Validity period used when none is given.
pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

/// Inputs for one pipeline run.
#[derive(Clone, Debug, Builder)]
pub struct PipelineParams {
    pub request: RequestParams,
    #[builder(default = DEFAULT_VALIDITY_DAYS)]
    pub validity_days: u32,
}

impl PipelineParams {
    /// The subject and alternate name the tool has always used when run
    /// without options.
    pub fn builtin() -> Self {
        let subject = DistinguishedName::builder()
            .common_name("USAMZS00000000000000000000001372070201E".to_string())
            .country("US".to_string())
            .state("California".to_string())
            .locality("San Diego".to_string())
            .organization("AMZ".to_string())
            .domain_component("CSO".to_string())
            .build();
        PipelineParams::builder()
            .request(
                RequestParams::builder()
                    .subject(subject)
                    .alt_names(vec!["https://www.powerflex.com".to_string()])
                    .build(),
            )
            .build()
    }
}

/// The text blocks produced by a pipeline run, in output order.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub private_key_pem: String,
    pub csr_pem: String,
    pub pkcs7_base64: String,
}

/// Generates a key pair, a CSR signed by it and a self-signed certificate in a
/// signed-data envelope. The first failure aborts the run.
pub fn run(params: &PipelineParams) -> Result<PipelineOutput, PipelineError> {
    let key_pair = KeyPair::generate_ecdsa_p256().map_err(PipelineError::KeyGeneration)?;
    tracing::info!("generated ECDSA key pair with P-256 curve");

    let csr = create_csr(&key_pair, &params.request).map_err(PipelineError::Request)?;
    tracing::info!(dns_names = ?csr.csr.dns_names, "created CSR");

    let pkcs7_base64 = sign_csr_to_pkcs7(&csr.pem, &key_pair, params.validity_days)
        .map_err(PipelineError::Envelope)?;
    tracing::info!(validity_days = params.validity_days, "signed CSR into PKCS#7 envelope");

    Ok(PipelineOutput {
        private_key_pem: key_pair.private_key_pem().to_string(),
        csr_pem: csr.pem,
        pkcs7_base64,
    })
}
