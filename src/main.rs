use anyhow::Result;
use bullion::core::builder::{DateMode, EntryMode, TradeRequest};
use bullion::core::log::init_logging;
use bullion::core::{Metal, Period, TransactionKind};
use chrono::NaiveDate;
use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("quantity").required(true).args(["grams", "amount"])))]
struct TradeArgs {
    /// gold or silver
    metal: Metal,

    /// Weight in grams; the amount is derived from the price
    #[arg(long)]
    grams: Option<String>,

    /// Amount paid or received; the weight is derived from the price
    #[arg(long)]
    amount: Option<String>,

    /// Trade date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl TradeArgs {
    fn into_request(self, kind: TransactionKind) -> TradeRequest {
        let (entry, input) = match (self.grams, self.amount) {
            (Some(grams), _) => (EntryMode::Weight, grams),
            (None, amount) => (EntryMode::Amount, amount.unwrap_or_default()),
        };
        TradeRequest {
            kind,
            entry,
            input,
            date: self.date.map_or(DateMode::Today, DateMode::On),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display holdings and their current value
    Summary {
        /// Limit to one metal
        metal: Option<Metal>,
    },
    /// Record a purchase
    Buy(TradeArgs),
    /// Record a sale
    Sell(TradeArgs),
    /// Display transaction history
    History {
        metal: Metal,
        /// all, week, month or year
        #[arg(short, long, default_value = "all")]
        period: Period,
    },
    /// Delete all transactions of a metal
    Clear {
        metal: Metal,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Set the spot price per gram
    Price { metal: Metal, price: String },
    /// Export transaction history as CSV
    Export {
        metal: Metal,
        #[arg(short, long, default_value = "all")]
        period: Period,
        /// Output file, defaults to <metal>-transaction-history.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for bullion::AppCommand {
    fn from(cmd: Commands) -> bullion::AppCommand {
        match cmd {
            Commands::Summary { metal } => bullion::AppCommand::Summary { metal },
            Commands::Buy(args) => bullion::AppCommand::Trade {
                metal: args.metal,
                request: args.into_request(TransactionKind::Buy),
            },
            Commands::Sell(args) => bullion::AppCommand::Trade {
                metal: args.metal,
                request: args.into_request(TransactionKind::Sell),
            },
            Commands::History { metal, period } => bullion::AppCommand::History { metal, period },
            Commands::Clear { metal, yes } => bullion::AppCommand::Clear {
                metal,
                confirmed: yes,
            },
            Commands::Price { metal, price } => bullion::AppCommand::SetPrice { metal, price },
            Commands::Export {
                metal,
                period,
                output,
            } => bullion::AppCommand::Export {
                metal,
                period,
                output,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => bullion::cli::setup::setup_at_path(path),
            None => bullion::cli::setup::setup(),
        },
        Some(cmd) => bullion::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
