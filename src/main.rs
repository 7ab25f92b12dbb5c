//! saxotrade: command line front end for the broker OpenAPI and booking
//! exports.
//!
//! Loads configuration, initialises structured logging, runs one subcommand
//! and prints its result as pretty JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use saxotrade::bookings::{BookingDetail, BookingLedger, RowSource};
use saxotrade::config::AppConfig;
use saxotrade::openapi::auth::CodeExchange;
use saxotrade::openapi::client::OrderSpec;
use saxotrade::openapi::{Instruction, SaxoClient};

#[derive(Parser)]
#[command(name = "saxotrade")]
#[command(about = "Typed client for the Saxo OpenAPI and booking exports")]
struct Cli {
    /// Path to the TOML config file (optional)
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Bearer token; defaults to the env var named by `api.token_env`
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the client profile, default account and its balance
    Account,
    /// Search instruments
    Instruments {
        /// Free-text search
        #[arg(short, long)]
        keywords: Option<String>,
        /// Asset types, comma separated
        #[arg(short, long, value_delimiter = ',')]
        asset_types: Vec<String>,
    },
    /// Instrument details by UIC
    Details {
        #[arg(short, long, value_delimiter = ',', required = true)]
        uics: Vec<u64>,
        #[arg(short, long, value_delimiter = ',')]
        asset_types: Vec<String>,
    },
    /// Info prices for instruments of one asset type
    Prices {
        #[arg(short, long, value_delimiter = ',', required = true)]
        uics: Vec<u64>,
        #[arg(short, long)]
        asset_type: String,
    },
    /// Place an order on the default account
    Order {
        #[arg(long)]
        uic: u64,
        #[arg(long)]
        asset_type: String,
        /// Buy or Sell
        #[arg(long)]
        buy_sell: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value_t = 0.0)]
        price: f64,
        /// Defaults to Limit
        #[arg(long)]
        order_type: Option<String>,
        /// Defaults to DayOrder
        #[arg(long)]
        duration: Option<String>,
        /// Build and print the order without sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// List open orders
    Orders,
    /// List positions
    Positions,
    /// List net positions
    NetPositions,
    /// Load a booking export and summarise it
    Bookings {
        /// Path to the CSV export
        file: String,
        /// Fail if any row is rejected
        #[arg(long)]
        strict: bool,
    },
    /// Exchange an OAuth2 authorization code for tokens
    Token {
        #[arg(long)]
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Bookings { file, strict } => run_bookings(&file, strict),
        Commands::Token { code } => {
            let exchange = CodeExchange::new(
                cfg.auth.token_url.clone(),
                cfg.auth.redirect_uri.clone(),
                AppConfig::resolve_secret(&cfg.auth.client_id_env)?,
                AppConfig::resolve_secret(&cfg.auth.client_secret_env)?,
            )?;
            print_json(&exchange.exchange_code(&code).await?)
        }
        command => {
            let token = match cli.token {
                Some(t) => SecretString::new(t),
                None => AppConfig::resolve_secret(&cfg.api.token_env)?,
            };
            let client = SaxoClient::connect(cfg.api.base_url.clone(), token, cfg.api.timeout())?;
            run_api(client, command).await
        }
    }
}

async fn run_api(mut client: SaxoClient, command: Commands) -> Result<()> {
    match command {
        Commands::Account => {
            let account = client.select_default_account().await?;
            let balance = client.balance().await?;
            print_json(&json!({ "account": account, "balance": balance }))
        }
        Commands::Instruments { keywords, asset_types } => {
            let instr = Instruction {
                keywords: keywords.unwrap_or_default(),
                asset_types,
                ..Default::default()
            };
            print_json(&client.instruments(&instr).await?)
        }
        Commands::Details { uics, asset_types } => {
            let instr = Instruction {
                uics,
                asset_types,
                ..Default::default()
            };
            print_json(&client.instrument_details(&instr).await?)
        }
        Commands::Prices { uics, asset_type } => {
            let instr = Instruction {
                uics,
                asset_types: vec![asset_type],
                ..Default::default()
            };
            print_json(&client.prices(&instr).await?)
        }
        Commands::Order {
            uic,
            asset_type,
            buy_sell,
            amount,
            price,
            order_type,
            duration,
            dry_run,
        } => {
            client.select_default_account().await?;
            let order = client.make_order(&OrderSpec {
                uic,
                asset_type,
                buy_sell,
                amount,
                price,
                duration,
                order_type,
            })?;
            if dry_run {
                return print_json(&order);
            }
            let receipt = client.place_order(&order).await?;
            info!(order_id = %receipt.order_id, "Order placed");
            print_json(&receipt)
        }
        Commands::Orders => {
            client.client().await?;
            print_json(&client.order_list().await?)
        }
        Commands::Positions => {
            client.client().await?;
            print_json(&client.positions().await?)
        }
        Commands::NetPositions => {
            client.client().await?;
            print_json(&client.net_positions().await?)
        }
        Commands::Bookings { .. } | Commands::Token { .. } => {
            anyhow::bail!("command does not use an API session")
        }
    }
}

fn run_bookings(file: &str, strict: bool) -> Result<()> {
    let source = RowSource::<BookingDetail, _>::from_path(file)
        .with_context(|| format!("Failed to open booking export: {file}"))?;
    let ledger = BookingLedger::load(source)?;

    if strict && !ledger.rejected().is_empty() {
        anyhow::bail!("{} booking rows rejected", ledger.rejected().len());
    }

    let rejected: Vec<_> = ledger
        .rejected()
        .iter()
        .map(|r| json!({ "row": r.row, "error": r.error.to_string() }))
        .collect();
    print_json(&json!({
        "bookings": ledger.bookings(),
        "instruments": ledger.instruments(),
        "rejected": rejected,
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{out}");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("saxotrade=info"));

    let json_logging = std::env::var("SAXOTRADE_LOG_JSON").is_ok();

    // Logs go to stderr so stdout stays valid JSON.
    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
