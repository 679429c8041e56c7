//! spvctl: verify, convert and inspect SPV ancestries.

mod config;
mod format;
mod headers;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use payd_spv::{Ancestry, HeaderChainVerifier, PaymentVerifier, SpvError};
use serde_json::json;

use config::{FeeQuoteConfig, SpvConfig};
use format::AncestryFormat;
use headers::MemoryHeaderChain;

#[derive(Parser)]
#[command(name = "spvctl", about = "Verify, convert and inspect SPV ancestries")]
struct Cli {
    /// Path to a TOML configuration file. Flags and env vars override it.
    #[arg(long, env = "PAYD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PAYD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PAYD_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Verify a payment against its ancestry.
    Verify {
        /// Ancestry file, or "-" for stdin.
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = AncestryFormat::Bin)]
        from: AncestryFormat,

        /// JSON array of raw block header hex used to check proofs.
        #[arg(long, env = "PAYD_HEADERS")]
        headers: Option<PathBuf>,

        /// Skip merkle proof and completeness checks.
        #[arg(long)]
        no_proofs: bool,

        /// Skip script checks.
        #[arg(long)]
        no_script: bool,

        /// Check fees against a quote of `SATS/BYTES` (for example `5/10`).
        #[arg(long, value_name = "SATS/BYTES")]
        fee_rate: Option<String>,
    },

    /// Re-encode an ancestry in another form.
    Convert {
        /// Ancestry file, or "-" for stdin.
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = AncestryFormat::Bin)]
        from: AncestryFormat,

        #[arg(long, value_enum)]
        to: AncestryFormat,

        /// Output file. Defaults to stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Summarise an ancestry as JSON.
    Inspect {
        /// Ancestry file, or "-" for stdin.
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = AncestryFormat::Bin)]
        from: AncestryFormat,
    },
}

fn parse_fee_rate(s: &str) -> anyhow::Result<FeeQuoteConfig> {
    let (sats, bytes) = s
        .split_once('/')
        .with_context(|| format!("fee rate {s:?} must look like SATS/BYTES"))?;
    Ok(FeeQuoteConfig {
        standard_satoshis: sats.trim().parse().context("fee rate satoshis")?,
        standard_bytes: bytes.trim().parse().context("fee rate bytes")?,
        data_satoshis: None,
        data_bytes: None,
    })
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn summary(ancestry: &Ancestry) -> serde_json::Value {
    let ancestors: Vec<_> = ancestry
        .walk_order()
        .into_iter()
        .filter_map(|id| ancestry.get(&id).map(|a| (id, a)))
        .map(|(id, a)| {
            json!({
                "txid": id,
                "anchored": a.is_anchored(),
                "inputs": a.tx.inputs.len(),
                "outputs": a.tx.outputs.len(),
                "size": a.tx.size(),
                "mapiResponses": a.mapi_responses.len(),
            })
        })
        .collect();
    json!({
        "paymentTxid": ancestry.payment_tx_id(),
        "ancestorCount": ancestry.len(),
        "ancestors": ancestors,
    })
}

async fn verify(
    mut config: SpvConfig,
    input: PathBuf,
    from: AncestryFormat,
    headers: Option<PathBuf>,
    no_proofs: bool,
    no_script: bool,
    fee_rate: Option<String>,
) -> anyhow::Result<ExitCode> {
    if no_proofs {
        config.verify.proofs = false;
    }
    if no_script {
        config.verify.script = false;
    }
    if let Some(rate) = fee_rate {
        config.verify.fees = true;
        config.fee_quote = Some(parse_fee_rate(&rate)?);
    }
    let opts = config.verify_options();

    let chain = match headers.or(config.headers) {
        Some(path) => MemoryHeaderChain::from_file(&path)?,
        None => MemoryHeaderChain::default(),
    };
    if opts.proofs && chain.is_empty() {
        tracing::warn!("no block headers loaded, every proof will be rejected");
    }
    tracing::debug!(headers = chain.len(), ?opts, "verifying payment");

    let verifier = PaymentVerifier::new(Arc::new(HeaderChainVerifier::new(chain))).with_options(opts);
    let raw = format::read_input(&input)?;

    let result = if from == AncestryFormat::Bin {
        verifier.verify_payment(&raw).await
    } else {
        match format::decode(&raw, from) {
            Ok(ancestry) => verifier.verify_ancestry(ancestry, &opts).await,
            Err(e) => match e.downcast::<SpvError>() {
                Ok(spv) => Err(spv),
                Err(other) => return Err(other),
            },
        }
    };

    let (report, code) = match result {
        Ok(payment) => {
            tracing::info!(txid = %payment.tx_id(), "payment accepted");
            (json!({ "valid": true, "txid": payment.tx_id() }), ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::warn!(error = %e, client_error = e.is_client_error(), "payment rejected");
            let code = if e.is_client_error() { 1 } else { 2 };
            (
                json!({ "valid": false, "error": e.to_string(), "clientError": e.is_client_error() }),
                ExitCode::from(code),
            )
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(code)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SpvConfig::from_toml_file(path)?,
        None => SpvConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format.parse()?;
    }
    payd_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Verify {
            input,
            from,
            headers,
            no_proofs,
            no_script,
            fee_rate,
        } => verify(config, input, from, headers, no_proofs, no_script, fee_rate).await,
        Command::Convert {
            input,
            from,
            to,
            output,
        } => {
            let ancestry = format::decode(&format::read_input(&input)?, from)?;
            let mut bytes = format::encode(&ancestry, to)?;
            if to.is_text() && output.is_none() {
                bytes.push(b'\n');
            }
            write_output(output.as_ref(), &bytes)?;
            tracing::info!(txid = %ancestry.payment_tx_id(), ?from, ?to, "converted");
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { input, from } => {
            let ancestry = format::decode(&format::read_input(&input)?, from)?;
            println!("{}", serde_json::to_string_pretty(&summary(&ancestry))?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
