use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gsn_dev_tools::pipeline::{self, PipelineParams};
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generates private key, csr and signed certificate to be used
    ///
    /// Generate a CSR and a signed certificate based on a specific hashing algorithm.
    /// Signing is currently always ECDSA with SHA-256.
    Csr(CsrArgs),
}

#[derive(Args, Debug)]
pub struct CsrArgs {
    /// Hash algorithm for the signatures (accepted, signing always uses SHA-256)
    pub hash_algorithm: String,

    /// Subject common name; also the first DNS name
    #[arg(long)]
    pub common_name: Option<String>,

    /// Subject domain component (DC) attribute
    #[arg(long, conflicts_with = "no_domain_component")]
    pub domain_component: Option<String>,

    /// Leave the domain component out of the subject
    #[arg(long)]
    pub no_domain_component: bool,

    /// Alternate name (repeatable); replaces the built-in list when given
    #[arg(long = "alt-name", value_name = "NAME")]
    pub alt_names: Vec<String>,

    /// Subject country (C)
    #[arg(long)]
    pub country: Option<String>,

    /// Subject state or province (ST)
    #[arg(long)]
    pub state: Option<String>,

    /// Subject locality (L)
    #[arg(long)]
    pub locality: Option<String>,

    /// Subject organization (O)
    #[arg(long)]
    pub organization: Option<String>,

    /// Subject organizational unit (OU)
    #[arg(long)]
    pub organizational_unit: Option<String>,

    /// Certificate validity in days
    #[arg(long, default_value_t = pipeline::DEFAULT_VALIDITY_DAYS)]
    pub days: u32,
}

impl CsrArgs {
    /// Overlays the given options on the built-in subject.
    fn params(&self) -> PipelineParams {
        let mut params = PipelineParams::builtin();
        let subject = &mut params.request.subject;

        if let Some(cn) = &self.common_name {
            subject.common_name = cn.clone();
        }
        if let Some(country) = &self.country {
            subject.country = country.clone();
        }
        if let Some(state) = &self.state {
            subject.state = state.clone();
        }
        if let Some(locality) = &self.locality {
            subject.locality = locality.clone();
        }
        if let Some(organization) = &self.organization {
            subject.organization = organization.clone();
        }
        if self.organizational_unit.is_some() {
            subject.organization_unit = self.organizational_unit.clone();
        }
        if self.no_domain_component {
            subject.domain_component = None;
        } else if self.domain_component.is_some() {
            subject.domain_component = self.domain_component.clone();
        }

        if !self.alt_names.is_empty() {
            params.request.alt_names = self.alt_names.clone();
        }
        params.validity_days = self.days;
        params
    }
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Csr(args) => certificate_generation(&args),
    }
}

fn certificate_generation(args: &CsrArgs) -> Result<()> {
    let requested = args.hash_algorithm.to_ascii_lowercase().replace('-', "");
    if requested != "sha256" {
        tracing::warn!(
            hash_algorithm = %args.hash_algorithm,
            "hash algorithm is not configurable yet; signing with ECDSA-with-SHA-256"
        );
    }

    let output = pipeline::run(&args.params())?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Private key PEM:\n{}", output.private_key_pem)
        .and_then(|_| writeln!(stdout, "CSR PEM:\n{}", output.csr_pem))
        .and_then(|_| {
            writeln!(
                stdout,
                "PKCS#7 Certificate (Base64):\n{}\n",
                output.pkcs7_base64
            )
        })
        .context("write output")?;

    Ok(())
}
