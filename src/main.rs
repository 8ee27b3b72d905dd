use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warmstats::prelude::*;

#[derive(Parser)]
#[command(name = "warmstats")]
#[command(about = "Warm-up aware performance statistics for backtest results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //build the performance report of a finished backtest
    Report {
        //path to the equity curve csv (timestamp,value)
        #[arg(long)]
        equity: PathBuf,

        //cash left in the broker account
        #[arg(long, default_value = "0")]
        cash: f64,

        //final portfolio value (optional, defaults to the last equity value)
        #[arg(long)]
        final_value: Option<f64>,

        //warm-up to exclude: "auto", a bar count ("200") or a duration ("30d")
        #[arg(long)]
        warmup: Option<WarmupSpec>,

        //report configuration json
        #[arg(long)]
        config: Option<PathBuf>,

        //strategy introspection snapshot json, used when the warm-up is inferred
        #[arg(long)]
        introspection: Option<PathBuf>,

        //engine inputs
        //calendar-year returns csv (year,return)
        #[arg(long)]
        per_year: Option<PathBuf>,

        //per-bar returns csv (timestamp,return)
        #[arg(long)]
        daily_returns: Option<PathBuf>,

        //external deposits and withdrawals csv (date,amount)
        #[arg(long)]
        cashflows: Option<PathBuf>,

        //open positions csv (symbol,size,last_price)
        #[arg(long)]
        positions: Option<PathBuf>,

        //sharpe ratio reported by the engine
        #[arg(long)]
        sharpe: Option<f64>,

        //max drawdown reported by the engine, in percent
        #[arg(long)]
        max_drawdown: Option<f64>,

        //max drawdown length in bars
        #[arg(long)]
        max_drawdown_len: Option<usize>,

        //output options
        //return frequency (daily, weekly), overrides the config file
        #[arg(long)]
        frequency: Option<String>,

        //print the report as json instead of tables
        #[arg(long)]
        json: bool,
    },

    //write a report configuration file with default settings
    InitConfig {
        //output path for the config json
        #[arg(long)]
        output: PathBuf,

        //use the weekly preset
        #[arg(long)]
        weekly: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warmstats=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            equity,
            cash,
            final_value,
            warmup,
            config,
            introspection,
            per_year,
            daily_returns,
            cashflows,
            positions,
            sharpe,
            max_drawdown,
            max_drawdown_len,
            frequency,
            json,
        } => {
            run_report(
                equity,
                cash,
                final_value,
                warmup,
                config,
                introspection,
                per_year,
                daily_returns,
                cashflows,
                positions,
                sharpe,
                max_drawdown,
                max_drawdown_len,
                frequency,
                json,
            )?;
        }
        Commands::InitConfig { output, weekly } => {
            let config = if weekly {
                ReportConfig::weekly()
            } else {
                ReportConfig::default()
            };
            config
                .to_json_file(&output)
                .context(format!("Failed to write config to {:?}", output))?;
            println!("Config saved to {:?}", output);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_report(
    equity_path: PathBuf,
    cash: f64,
    final_value: Option<f64>,
    warmup: Option<WarmupSpec>,
    config_path: Option<PathBuf>,
    introspection_path: Option<PathBuf>,
    per_year_path: Option<PathBuf>,
    returns_path: Option<PathBuf>,
    cashflows_path: Option<PathBuf>,
    positions_path: Option<PathBuf>,
    sharpe: Option<f64>,
    max_drawdown: Option<f64>,
    max_drawdown_len: Option<usize>,
    frequency: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };

    if let Some(frequency) = frequency {
        config.frequency = Frequency::parse(&frequency)
            .ok_or_else(|| anyhow::anyhow!("Unknown frequency: {}", frequency))?;
    }

    //the command line wins over the config file
    let warmup = warmup.unwrap_or(config.warmup);

    let introspection = match &introspection_path {
        Some(path) => Some(StrategyIntrospection::from_json_file(path)?),
        None => None,
    };

    info!(path = ?equity_path, "loading equity curve");
    let series = load_equity_csv(&equity_path)
        .context(format!("Failed to load equity curve from {:?}", equity_path))?;
    info!(
        points = series.len(),
        start = %series.first().timestamp,
        end = %series.last().timestamp,
        "equity curve loaded"
    );

    let mut inputs = ReportInputs::new(series, cash);

    if let Some(value) = final_value {
        if !value.is_finite() {
            anyhow::bail!("--final-value must be a finite number, got {}", value);
        }
        inputs = inputs.with_final_value(value);
    }
    if let Some(path) = per_year_path {
        inputs = inputs.with_per_year_returns(load_per_year_csv(&path)?);
    }
    if let Some(path) = returns_path {
        inputs = inputs.with_period_returns(load_returns_csv(&path)?);
    }
    if let Some(path) = cashflows_path {
        inputs = inputs.with_cashflows(load_cashflows_csv(&path)?);
    }
    if let Some(path) = positions_path {
        inputs = inputs.with_open_positions(load_positions_csv(&path)?);
    }
    if let Some(sharpe) = sharpe {
        inputs = inputs.with_sharpe_ratio(sharpe);
    }
    if let Some(pct) = max_drawdown {
        inputs = inputs.with_max_drawdown(pct, max_drawdown_len);
    }

    let report = PerformanceReport::build(&inputs, &warmup, introspection.as_ref(), &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Performance Report");
        println!("==================\n");
        report.pretty_print();
    }

    Ok(())
}
