mod config;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inflow_codec::{
    address_to_fixed_width_hex, encode_contract_call, format_units_to_decimal,
    parse_decimal_to_units, parse_decimal_to_units_strict, prepare_deposit, prepare_withdrawal,
    stacks_address_to_bytes32, AddressFormat, Chain, ContractCall, EvmAddress, USDC_DECIMALS,
};
use inflow_invoice::{
    build_shareable_url, decode_invoice, decode_invoice_url, encode_invoice, InvoiceBuilder,
    InvoiceRecord, Network,
};
use num_bigint::BigUint;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Overrides, ToolsConfig};

#[derive(Parser)]
#[command(
    name = "inflow",
    about = "Utility commands for Inflow invoices and xReserve bridge call data"
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, inspect and link invoice tokens.
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Convert between decimal amounts and integer token units.
    #[command(subcommand)]
    Units(UnitsCommand),
    /// Print the 32-byte bridge recipient word for an address.
    Recipient(RecipientArgs),
    /// Encode a single bridge contract call.
    #[command(subcommand)]
    Calldata(CalldataCommand),
    /// Build every call needed to move funds across the bridge.
    #[command(subcommand)]
    Plan(PlanCommand),
}

#[derive(Subcommand)]
enum InvoiceCommand {
    /// Print the token for an invoice.
    Encode(InvoiceArgs),
    /// Decode a token or a full pay link into invoice JSON.
    Decode(DecodeArgs),
    /// Print the shareable pay link for an invoice.
    Link(InvoiceArgs),
}

#[derive(Subcommand)]
enum UnitsCommand {
    /// Decimal string to integer units.
    Parse(ParseUnitsArgs),
    /// Integer units to a fixed-width decimal string.
    Format(FormatUnitsArgs),
}

#[derive(Subcommand)]
enum CalldataCommand {
    /// ERC-20 approve(spender, amount).
    Approve(ApproveArgs),
    /// xReserve depositToRemote(...).
    Deposit(DepositCalldataArgs),
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Ethereum → Stacks: approve + depositToRemote.
    Deposit(TransferArgs),
    /// Stacks → Ethereum: withdrawal arguments.
    Withdraw(TransferArgs),
}

/// Network selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NetworkArg {
    Stacks,
    Ethereum,
}

impl From<NetworkArg> for Network {
    fn from(arg: NetworkArg) -> Self {
        match arg {
            NetworkArg::Stacks => Network::Stacks,
            NetworkArg::Ethereum => Network::Ethereum,
        }
    }
}

/// Address family of a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Evm,
    Stacks,
}

#[derive(Args)]
struct InvoiceArgs {
    /// Address that receives the payment.
    #[arg(long)]
    recipient: String,
    /// Decimal amount, at most 6 fractional digits.
    #[arg(long)]
    amount: String,
    #[arg(long)]
    memo: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long, value_enum, default_value_t = NetworkArg::Stacks)]
    network: NetworkArg,
    #[arg(long, value_enum)]
    target_network: Option<NetworkArg>,
    #[arg(long)]
    invoice_id: Option<String>,
    /// Stamp createdAt with the current time.
    #[arg(long)]
    stamp: bool,
}

#[derive(Args)]
struct DecodeArgs {
    /// Invoice token or pay link.
    input: String,
}

#[derive(Args)]
struct ParseUnitsArgs {
    amount: String,
    #[arg(long, default_value_t = USDC_DECIMALS)]
    decimals: u8,
    /// Reject amounts with more fractional digits than `decimals`.
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct FormatUnitsArgs {
    units: BigUint,
    #[arg(long, default_value_t = USDC_DECIMALS)]
    decimals: u8,
}

#[derive(Args)]
struct RecipientArgs {
    address: String,
    /// Address family; guessed from the prefix when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Args)]
struct ApproveArgs {
    /// Spender; defaults to the configured xReserve contract.
    #[arg(long)]
    spender: Option<String>,
    /// Allowance in integer token units.
    #[arg(long)]
    units: BigUint,
}

#[derive(Args)]
struct DepositCalldataArgs {
    /// Amount in integer token units.
    #[arg(long)]
    units: BigUint,
    /// Stacks principal receiving the funds.
    #[arg(long)]
    recipient: String,
    /// Remote domain id.
    #[arg(long, default_value_t = Chain::Stacks.domain_id())]
    domain: u32,
    /// Hook payload as hex.
    #[arg(long, default_value = "")]
    hook_data: String,
}

#[derive(Args)]
struct TransferArgs {
    /// Decimal USDC amount.
    #[arg(long)]
    amount: String,
    /// Address on the destination chain.
    #[arg(long)]
    recipient: String,
}

fn main() -> Result<()> {
    // before the subscriber so RUST_LOG may come from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ToolsConfig::from_env()?.with_overrides(&cli.overrides);
    tracing::debug!("using bridge config {:?}", config.bridge);

    match cli.command {
        Commands::Invoice(cmd) => run_invoice(&config, cmd),
        Commands::Units(cmd) => run_units(cmd),
        Commands::Recipient(args) => run_recipient(args),
        Commands::Calldata(cmd) => run_calldata(&config, cmd),
        Commands::Plan(cmd) => run_plan(&config, cmd),
    }
}

fn run_invoice(config: &ToolsConfig, cmd: InvoiceCommand) -> Result<()> {
    match cmd {
        InvoiceCommand::Encode(args) => {
            let record = build_invoice(args)?;
            println!("{}", encode_invoice(&record));
        }
        InvoiceCommand::Link(args) => {
            let record = build_invoice(args)?;
            println!("{}", build_shareable_url(&record, &config.base_origin));
        }
        InvoiceCommand::Decode(args) => {
            let input = args.input.trim();
            let record = if input.contains("://") {
                decode_invoice_url(input)
            } else {
                decode_invoice(input)
            }
            .context("invalid invoice link")?;
            print_json(&record)?;
        }
    }
    Ok(())
}

fn build_invoice(args: InvoiceArgs) -> Result<InvoiceRecord> {
    let mut builder = InvoiceBuilder::new(args.recipient, args.amount).network(args.network.into());
    if let Some(memo) = args.memo {
        builder = builder.memo(memo);
    }
    if let Some(token) = args.token {
        builder = builder.token(token);
    }
    if let Some(target) = args.target_network {
        builder = builder.target_network(target.into());
    }
    if let Some(id) = args.invoice_id {
        builder = builder.invoice_id(id);
    }
    if args.stamp {
        builder = builder.created_now();
    }
    builder.build().context("invoice rejected")
}

fn run_units(cmd: UnitsCommand) -> Result<()> {
    match cmd {
        UnitsCommand::Parse(args) => {
            let units = if args.strict {
                parse_decimal_to_units_strict(&args.amount, args.decimals)
            } else {
                parse_decimal_to_units(&args.amount, args.decimals)
            }
            .with_context(|| format!("cannot parse amount {}", args.amount))?;
            println!("{}", units);
        }
        UnitsCommand::Format(args) => {
            println!("{}", format_units_to_decimal(&args.units, args.decimals));
        }
    }
    Ok(())
}

fn run_recipient(args: RecipientArgs) -> Result<()> {
    let format = match args.format {
        Some(FormatArg::Evm) => AddressFormat::Evm,
        Some(FormatArg::Stacks) => AddressFormat::Stacks,
        None if args.address.starts_with("0x") => AddressFormat::Evm,
        None => AddressFormat::Stacks,
    };
    let word = address_to_fixed_width_hex(&args.address, format)
        .with_context(|| format!("cannot encode recipient {}", args.address))?;
    println!("0x{}", word);
    Ok(())
}

fn run_calldata(config: &ToolsConfig, cmd: CalldataCommand) -> Result<()> {
    let call = match cmd {
        CalldataCommand::Approve(args) => {
            let spender: EvmAddress = args
                .spender
                .as_deref()
                .unwrap_or(&config.bridge.xreserve)
                .parse()
                .context("invalid spender address")?;
            ContractCall::Approve {
                spender,
                amount: args.units,
            }
        }
        CalldataCommand::Deposit(args) => {
            let hook = args.hook_data.trim_start_matches("0x");
            ContractCall::DepositToRemote {
                value: args.units,
                remote_domain: args.domain,
                remote_recipient: stacks_address_to_bytes32(&args.recipient)
                    .context("invalid Stacks recipient")?,
                local_token: config
                    .bridge
                    .usdc_address()
                    .context("invalid USDC token address")?,
                max_fee: BigUint::from(config.bridge.max_fee_units),
                hook_data: hex::decode(hook).context("hook data is not hex")?,
            }
        }
    };

    println!("{}", encode_contract_call(&call)?);
    Ok(())
}

fn run_plan(config: &ToolsConfig, cmd: PlanCommand) -> Result<()> {
    match cmd {
        PlanCommand::Deposit(args) => {
            let plan = prepare_deposit(&config.bridge, &args.amount, &args.recipient)
                .context("cannot build deposit")?;
            print_json(&json!({
                "amountUnits": plan.amount_units.to_string(),
                "calls": [
                    {
                        "function": plan.approve.function_name(),
                        "to": plan.token.to_string(),
                        "data": format!("0x{}", hex::encode(&plan.approve_call_data)),
                    },
                    {
                        "function": plan.deposit.function_name(),
                        "to": plan.bridge.to_string(),
                        "data": format!("0x{}", hex::encode(&plan.deposit_call_data)),
                    },
                ],
            }))?;
        }
        PlanCommand::Withdraw(args) => {
            if !args.recipient.starts_with("0x") {
                bail!("withdrawals are paid to an Ethereum address");
            }
            let plan = prepare_withdrawal(&args.amount, &args.recipient)
                .context("cannot build withdrawal")?;
            print_json(&plan)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
