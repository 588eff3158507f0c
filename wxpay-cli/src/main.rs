//! Command-line client for the WeChat Pay v2 API.
//!
//! # Usage
//!
//! ```bash
//! # Sign an arbitrary field set (JSON object) with the configured key
//! wxpay sign '{"appid":"wx1","mch_id":"10000100","nonce_str":"abc"}'
//!
//! # Refund 0.50 CNY of a 1.00 CNY payment
//! wxpay refund --out-trade-no T1 --out-refund-no R1 --total-fee 100 --refund-fee 50
//!
//! # Pay out to a user, with a real-name check when --user-name is given
//! wxpay transfer --partner-trade-no PT1 --openid o-1 --amount 100 --desc bonus --ip 10.0.0.1
//!
//! # Look up a payout
//! wxpay transfer-query --partner-trade-no PT1
//! ```
//!
//! # Environment Variables
//!
//! - `WXPAY_CONFIG` - Path to TOML configuration file (default: `wxpay.toml`)
//! - `WXPAY_SANDBOX` - Override the sandbox flag from the file
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wxpay::{
    FieldMap, ProviderResponse, RefundRequest, TransferNoCheckRequest, TransferQueryRequest,
    TransferRequest,
};
use wxpay_cli::FileConfig;
use wxpay_http::{ConfigError, WxPayClient};

/// WeChat Pay v2 command-line client.
#[derive(Parser, Debug)]
#[command(name = "wxpay", version, about)]
struct Args {
    /// Configuration file.
    #[arg(long, env = "WXPAY_CONFIG", default_value = "wxpay.toml")]
    config: PathBuf,

    /// Override the sandbox flag from the configuration file.
    #[arg(long, env = "WXPAY_SANDBOX", value_parser = clap::builder::BoolishValueParser::new())]
    sandbox: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the signature of a JSON object of fields.
    Sign {
        /// JSON object, or `-` to read from stdin.
        fields: String,

        /// Print the signed document as XML instead of the bare signature.
        #[arg(long)]
        xml: bool,
    },

    #[command(flatten)]
    Api(ApiCommand),
}

/// Subcommands that call the provider.
#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// Refund a payment.
    Refund {
        #[arg(long)]
        out_trade_no: String,
        #[arg(long)]
        out_refund_no: String,
        /// Original payment amount in fen.
        #[arg(long)]
        total_fee: i64,
        /// Amount to refund in fen.
        #[arg(long)]
        refund_fee: i64,
        #[arg(long)]
        desc: Option<String>,
    },

    /// Transfer to an individual.
    Transfer {
        #[arg(long)]
        partner_trade_no: String,
        #[arg(long)]
        openid: String,
        /// Amount in fen.
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        desc: String,
        /// IP address of the calling server.
        #[arg(long)]
        ip: String,
        /// Recipient real name. Enables the real-name check.
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Look up a transfer.
    TransferQuery {
        #[arg(long)]
        partner_trade_no: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("wxpay failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = FileConfig::load_from(&args.config)?;
    if let Some(sandbox) = args.sandbox {
        file.sandbox = sandbox;
    }
    let config = file.into_client_config()?;
    tracing::info!(
        path = %args.config.display(),
        mch_id = %config.mch_id,
        sandbox = config.sandbox,
        sign_type = %config.sign_type,
        "Loaded configuration"
    );

    match args.command {
        Command::Sign { fields, xml } => {
            if config.api_key.is_empty() {
                return Err(ConfigError::MissingCredential("api_key").into());
            }
            sign(&config.signer(), &fields, xml)
        }
        Command::Api(command) => call(&WxPayClient::new(&config)?, command).await,
    }
}

/// Sends one API call and prints the response.
async fn call(client: &WxPayClient, command: ApiCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ApiCommand::Refund {
            out_trade_no,
            out_refund_no,
            total_fee,
            refund_fee,
            desc,
        } => {
            let mut request = RefundRequest::new(out_trade_no, out_refund_no, total_fee, refund_fee);
            request.refund_desc = desc;
            report(&client.refund(request).await?)
        }
        ApiCommand::Transfer {
            partner_trade_no,
            openid,
            amount,
            desc,
            ip,
            user_name: Some(re_user_name),
        } => {
            let request = TransferRequest {
                partner_trade_no,
                openid,
                re_user_name,
                amount,
                desc,
                spbill_create_ip: ip,
                ..TransferRequest::default()
            };
            report(&client.transfer(request).await?)
        }
        ApiCommand::Transfer {
            partner_trade_no,
            openid,
            amount,
            desc,
            ip,
            user_name: None,
        } => {
            let request = TransferNoCheckRequest {
                partner_trade_no,
                openid,
                amount,
                desc,
                spbill_create_ip: ip,
                ..TransferNoCheckRequest::default()
            };
            report(&client.transfer_no_check(request).await?)
        }
        ApiCommand::TransferQuery { partner_trade_no } => {
            report(&client.transfer_query(TransferQueryRequest::new(partner_trade_no)).await?)
        }
    }
}

/// Signs a JSON object of fields and prints the signature or signed XML.
fn sign(signer: &wxpay::Signer, fields: &str, xml: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = if fields == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fields.to_owned()
    };
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let mut map = FieldMap::from_serialize(&value)?;
    let signature = signer.sign_map(&map);

    let mut stdout = std::io::stdout().lock();
    if xml {
        map.insert("sign", signature);
        writeln!(stdout, "{}", wxpay::xml::map_to_xml(&map))?;
    } else {
        writeln!(stdout, "{signature}")?;
    }
    Ok(())
}

/// Prints a response as JSON and logs any provider-reported failure.
fn report<R: ProviderResponse + Serialize>(response: &R) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(failure) = response.failure() {
        tracing::warn!(%failure, "Provider reported failure");
    }
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(response)?)?;
    Ok(())
}
