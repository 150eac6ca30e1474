//! Command Line Interface for the CLMM vault simulator.
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clmm_vault_core::prelude::*;
use clmm_vault_domain::math::price_tick::{price_to_tick, tick_to_sqrt_price};
use clmm_vault_domain::{Address, Percentage, TickRange};
use clmm_vault_simulation::prelude::*;
use dotenv::dotenv;
use prettytable::{Table, row};
use primitive_types::U256;
use rust_decimal::Decimal;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TOKEN0: u64 = 0x1000;
const TOKEN1: u64 = 0x2000;
const FACTORY: u64 = 0xfac;
const OWNER: u64 = 0x0e;
const FEE_RECIPIENT: u64 = 0xfe;
const LP: u64 = 0x10;
const TRADER: u64 = 0xc0;
const DEPOSITORS: [u64; 2] = [0xa1, 0xb0];

/// Full-range liquidity of the background LP.
const BACKGROUND_LIQUIDITY: u128 = 1_000_000_000_000_000_000_000_000;
const FULL_RANGE: i32 = 887_220;

#[derive(Parser)]
#[command(name = "clmm-vault-cli")]
#[command(about = "Dual-position concentrated liquidity vault simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a vault through a random trading session
    Simulate {
        /// Number of trading steps
        #[arg(short, long, default_value_t = 200)]
        steps: usize,

        /// Rebalance every N steps
        #[arg(short, long, default_value_t = 20)]
        rebalance_every: usize,

        /// Fee tier in hundredths of a bip (500, 3000 or 10000)
        #[arg(long, default_value_t = 3_000)]
        fee: u32,

        /// Annualized volatility of the target price
        #[arg(long, default_value_t = 0.8)]
        volatility: f64,

        /// Seed for the price path
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Whole tokens of each asset deposited per depositor
        #[arg(short, long, default_value_t = 1_000)]
        deposit: u64,

        /// Largest trade per step in whole tokens
        #[arg(long, default_value_t = 5_000)]
        trade_size: u64,

        /// Half width of the base range in ticks
        #[arg(long, default_value_t = 1_800)]
        base_width: i32,

        /// Width of the limit range in ticks
        #[arg(long, default_value_t = 600)]
        limit_width: i32,

        /// JSON file with a vault configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the vault event log to this file as JSON
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            steps,
            rebalance_every,
            fee,
            volatility,
            seed,
            deposit,
            trade_size,
            base_width,
            limit_width,
            config,
            events,
        } => {
            let config = load_config(config.as_deref())?;
            let params = SimulationParams {
                steps,
                rebalance_every: rebalance_every.max(1),
                fee,
                volatility,
                seed,
                deposit: units(deposit),
                trade_size: units(trade_size),
                base_width,
                limit_width,
            };
            let summary = simulate(&params, config)?;
            print_summary(&params, &summary);

            if let Some(path) = events {
                std::fs::write(&path, &summary.events_json)
                    .with_context(|| format!("writing events to {}", path.display()))?;
                println!("Event log written to {}", path.display());
            }
        }
    }

    Ok(())
}

struct SimulationParams {
    steps: usize,
    rebalance_every: usize,
    fee: u32,
    volatility: f64,
    seed: u64,
    deposit: U256,
    trade_size: U256,
    base_width: i32,
    limit_width: i32,
}

struct Summary {
    trades: usize,
    rebalances: usize,
    final_tick: i32,
    fees: (U256, U256),
    recipient: (U256, U256),
    withdrawn: Vec<(U256, U256)>,
    events: usize,
    events_json: String,
}

fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

fn units(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

/// Formats an 18-decimal amount with six fractional digits.
fn format_units(amount: U256) -> String {
    let one = U256::exp10(18);
    let frac = (amount % one) / U256::exp10(12);
    format!("{}.{:06}", amount / one, frac.low_u64())
}

/// Vault configuration from an optional JSON file, then the environment.
fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).context("parsing vault config")?
        }
        None => VaultConfig::default(),
    };

    if let Ok(value) = env::var("VAULT_BASE_FEE") {
        let pct: u8 = value.parse().context("VAULT_BASE_FEE must be 0-100")?;
        config = config.with_base_fee(Percentage::new(pct)?);
    }
    if let Ok(value) = env::var("VAULT_BASE_FEE_SPLIT") {
        let pct: u8 = value.parse().context("VAULT_BASE_FEE_SPLIT must be 0-100")?;
        config = config.with_base_fee_split(Percentage::new(pct)?);
    }
    if let Ok(value) = env::var("VAULT_DEPOSIT_MAX") {
        let whole: u64 = value
            .parse()
            .context("VAULT_DEPOSIT_MAX must be a whole token amount")?;
        config = config.with_deposit_max(units(whole), units(whole));
    }
    Ok(config)
}

/// Rounds `width` up to a positive multiple of `spacing`.
fn align_width(width: i32, spacing: i32) -> i32 {
    let width = width.max(spacing);
    (width + spacing - 1) / spacing * spacing
}

/// Base range centred on the current tick and a limit range on the side of
/// the excess token.
fn plan_ranges(
    tick: i32,
    spacing: i32,
    base_width: i32,
    limit_width: i32,
    excess_token0: bool,
) -> (TickRange, TickRange) {
    let aligned = tick - tick.rem_euclid(spacing);
    let base = TickRange::new(aligned - base_width, aligned + spacing + base_width);
    let limit = if excess_token0 {
        TickRange::new(aligned + spacing, aligned + spacing + limit_width)
    } else {
        TickRange::new(aligned - limit_width, aligned)
    };
    (base, limit)
}

fn simulate(params: &SimulationParams, config: VaultConfig) -> Result<Summary> {
    let factory_config = FactoryConfig::new(addr(FEE_RECIPIENT)).with_vault_config(config);
    let mut factory = VaultFactory::new(
        addr(FACTORY),
        addr(OWNER),
        SimulatedPoolRegistry::new(),
        factory_config,
    );
    let vault_address = factory.create_vault(
        addr(OWNER),
        addr(TOKEN0),
        true,
        addr(TOKEN1),
        true,
        params.fee,
    )?;
    let Some(vault) = factory.vault(vault_address) else {
        bail!("vault {vault_address:?} missing after creation");
    };
    let mut pool = vault.pool().clone();
    let spacing = vault.tick_spacing();
    pool.borrow_mut().initialize(Decimal::ONE)?;

    let mut bank = TokenBank::new();
    for token in [addr(TOKEN0), addr(TOKEN1)] {
        bank.mint(token, addr(LP), units(2_000_000))?;
        bank.mint(token, addr(TRADER), units(1_000_000_000))?;
        for depositor in DEPOSITORS {
            bank.mint(token, addr(depositor), params.deposit)?;
            bank.approve(token, addr(depositor), vault_address, U256::MAX);
        }
    }
    provide_liquidity(
        &mut pool,
        &mut bank,
        addr(LP),
        TickRange::new(-FULL_RANGE, FULL_RANGE),
        BACKGROUND_LIQUIDITY,
    )?;

    let Some(vault) = factory.vault_mut(vault_address) else {
        bail!("vault {vault_address:?} missing after creation");
    };
    for depositor in DEPOSITORS {
        let depositor = addr(depositor);
        vault.deposit(&mut bank, depositor, params.deposit, params.deposit, depositor)?;
    }

    let base_width = align_width(params.base_width, spacing);
    let limit_width = align_width(params.limit_width, spacing);
    let mut fees = (U256::zero(), U256::zero());
    let mut rebalances = 0;
    let mut trades = 0;

    let mut rebalance = |vault: &mut Vault<SharedPool>, bank: &mut TokenBank| -> Result<()> {
        let tick = vault.current_tick()?;
        let (total0, total1) = vault.total_amounts(bank)?;
        let price = spot_price_x18(tick)?;
        let value0 = value_in_token1(total0, U256::zero(), price)?;
        let (base, limit) = plan_ranges(tick, spacing, base_width, limit_width, value0 > total1);
        let report = vault.rebalance(bank, addr(OWNER), base, limit, 0)?;
        fees = (fees.0 + report.fee0, fees.1 + report.fee1);
        rebalances += 1;
        Ok(())
    };

    rebalance(vault, &mut bank)?;

    let time_step = 1.0 / 365.0;
    let mut path = GeometricBrownianMotion::new(Decimal::ONE, 0.0, params.volatility, time_step, params.seed);
    let targets = path.generate(params.steps);

    for (step, target) in targets.iter().enumerate().skip(1) {
        let target_tick = price_to_tick(target.value)?;
        let tick = vault.current_tick()?;
        if target_tick != tick {
            let zero_for_one = target_tick < tick;
            let limit = tick_to_sqrt_price(target_tick)?;
            match swap_exact_in(&mut pool, &mut bank, addr(TRADER), zero_for_one, params.trade_size, Some(limit)) {
                Ok(outcome) => {
                    trades += 1;
                    info!(step, target_tick, tick = outcome.tick_after, "trade");
                }
                Err(e) => warn!(step, error = %e, "trade skipped"),
            }
        }
        if step % params.rebalance_every == 0 {
            rebalance(vault, &mut bank)?;
        }
    }

    let mut withdrawn = Vec::with_capacity(DEPOSITORS.len());
    for depositor in DEPOSITORS {
        let depositor = addr(depositor);
        let shares = vault.balance_of(depositor);
        withdrawn.push(vault.withdraw(&mut bank, depositor, shares, depositor)?);
    }

    let recipient = (
        bank.balance_of(addr(TOKEN0), addr(FEE_RECIPIENT)),
        bank.balance_of(addr(TOKEN1), addr(FEE_RECIPIENT)),
    );
    Ok(Summary {
        trades,
        rebalances,
        final_tick: vault.current_tick()?,
        fees,
        recipient,
        withdrawn,
        events: vault.events().len(),
        events_json: vault.events().to_json()?,
    })
}

fn print_summary(params: &SimulationParams, summary: &Summary) {
    let mut table = Table::new();
    table.add_row(row!["Metric", "Token0", "Token1"]);
    table.add_row(row!["Steps", params.steps, ""]);
    table.add_row(row!["Trades", summary.trades, ""]);
    table.add_row(row!["Rebalances", summary.rebalances, ""]);
    table.add_row(row!["Final tick", summary.final_tick, ""]);
    table.add_row(row![
        "Fees harvested",
        format_units(summary.fees.0),
        format_units(summary.fees.1)
    ]);
    table.add_row(row![
        "Fee recipient",
        format_units(summary.recipient.0),
        format_units(summary.recipient.1)
    ]);
    for (i, (amount0, amount1)) in summary.withdrawn.iter().enumerate() {
        table.add_row(row![
            format!("Depositor {} out", i + 1),
            format_units(*amount0),
            format_units(*amount1)
        ]);
    }
    table.add_row(row![
        "Deposited each",
        format_units(params.deposit),
        format_units(params.deposit)
    ]);
    table.add_row(row!["Events", summary.events, ""]);

    println!("\n📊 Vault Simulation Results");
    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_width() {
        assert_eq!(align_width(1_800, 60), 1_800);
        assert_eq!(align_width(1_801, 60), 1_860);
        assert_eq!(align_width(0, 60), 60);
    }

    #[test]
    fn test_plan_ranges_puts_limit_on_excess_side() {
        let (base, limit) = plan_ranges(-197, 60, 1_800, 600, true);
        assert_eq!(base, TickRange::new(-2_040, 1_620));
        assert_eq!(limit, TickRange::new(-180, 420));

        let (_, limit) = plan_ranges(-197, 60, 1_800, 600, false);
        assert_eq!(limit, TickRange::new(-840, -240));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(units(12)), "12.000000");
        assert_eq!(format_units(units(1) / U256::from(2u64)), "0.500000");
    }

    #[test]
    fn test_short_simulation_runs() {
        let params = SimulationParams {
            steps: 30,
            rebalance_every: 10,
            fee: 3_000,
            volatility: 0.8,
            seed: 7,
            deposit: units(1_000),
            trade_size: units(5_000),
            base_width: 1_800,
            limit_width: 600,
        };
        let summary = simulate(&params, VaultConfig::default()).unwrap();
        assert_eq!(summary.rebalances, 4);
        assert_eq!(summary.withdrawn.len(), 2);
        assert!(summary.events_json.contains("Deposit"));
    }
}
