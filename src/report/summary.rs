use crate::config::ReportConfig;
use crate::metrics::{
    aggregate, annualize, approximate_sharpe, cagr_from_returns, cashflow_adjusted_returns,
    dated_returns, max_drawdown, max_drawdown_period, trim, yearly_returns, AnnualizationResult,
    ContributionSummary, DrawdownPeriod, Frequency, Metric, PerPeriodReturns, VolatilityResult,
};
use crate::portfolio::OpenPosition;
use crate::report::inputs::ReportInputs;
use crate::warmup::{resolve, ResolvedWarmup, StrategyIntrospection, WarmupSpec};
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use tracing::info;

//where the per-year table and the return series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnSource {
    Engine,
    EquityCurve,
    CashflowAdjusted,
}

impl ReturnSource {
    fn label(&self) -> &'static str {
        match self {
            ReturnSource::Engine => "from engine",
            ReturnSource::EquityCurve => "from equity curve",
            ReturnSource::CashflowAdjusted => "cashflow-adjusted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarmupSummary {
    pub requested: WarmupSpec,
    pub resolved: ResolvedWarmup,
    pub points_dropped: usize,
    pub calendar_days: Option<f64>,
}

//a ratio line, either passed through from the engine or approximated here
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatioLine {
    pub value: Metric,
    pub approximate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawdownLine {
    pub pct: f64,
    pub len: Option<usize>,
    pub approximate: bool,
}

//everything printed at the end of a backtest, as data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub final_value: f64,
    pub cash: f64,
    pub warmup: WarmupSummary,
    pub contributions: Option<ContributionSummary>,
    pub cagr_source: ReturnSource,
    pub annualization: AnnualizationResult,
    pub per_period_source: ReturnSource,
    pub per_period: PerPeriodReturns,
    pub frequency: Frequency,
    pub volatility: VolatilityResult,
    pub sharpe: Option<RatioLine>,
    pub max_drawdown: Option<DrawdownLine>,
    pub drawdown_period: Option<DrawdownPeriod>,
    pub open_positions: Vec<OpenPosition>,
}

impl PerformanceReport {
    //resolve the warm-up once, trim, annualize, aggregate, then assemble
    //never fails: anything that cannot be computed ends up as n/a
    pub fn build(
        inputs: &ReportInputs,
        warmup: &WarmupSpec,
        introspection: Option<&StrategyIntrospection>,
        config: &ReportConfig,
    ) -> Self {
        let points = inputs.equity.points();
        let end_date = inputs.equity.last().timestamp;

        let resolved = resolve(warmup, introspection, config.bars_per_calendar_day);
        let trimmed = trim(points, resolved);
        let baseline = trimmed.baseline();

        let has_cashflows = inputs.has_cashflows();

        //deposits would read as growth, so flows switch every return-based figure to adjusted returns
        let (returns, return_source) = if has_cashflows {
            (
                cashflow_adjusted_returns(points, &inputs.cashflows),
                ReturnSource::CashflowAdjusted,
            )
        } else {
            match &inputs.period_returns {
                Some(returns) => (returns.clone(), ReturnSource::Engine),
                None => (dated_returns(points), ReturnSource::EquityCurve),
            }
        };

        let post_warmup_returns: Vec<f64> = match baseline {
            Some(baseline) => returns
                .iter()
                .filter(|(timestamp, _)| *timestamp > baseline.timestamp)
                .map(|(_, ret)| *ret)
                .collect(),
            None => Vec::new(),
        };

        let cagr_source = if has_cashflows {
            ReturnSource::CashflowAdjusted
        } else {
            ReturnSource::EquityCurve
        };
        let annualization = match baseline {
            Some(baseline) if has_cashflows => cagr_from_returns(&returns, baseline, end_date),
            _ => annualize(&trimmed, inputs.final_value, end_date),
        };

        let contributions = has_cashflows.then(|| {
            let first = inputs.equity.first();
            ContributionSummary::compute(
                first.value,
                first.timestamp.date_naive(),
                &inputs.cashflows,
                inputs.final_value,
                end_date.date_naive(),
            )
        });

        let (per_year, per_period_source) = match &inputs.per_year_returns {
            Some(per_year) if !has_cashflows => (per_year.clone(), ReturnSource::Engine),
            _ => (yearly_returns(&returns), return_source),
        };

        let (per_period, volatility) = aggregate(&per_year, &post_warmup_returns, config.frequency);

        let approximate = || RatioLine {
            value: approximate_sharpe(
                &post_warmup_returns,
                config.risk_free_rate,
                config.frequency,
            ),
            approximate: true,
        };
        let sharpe = match inputs.sharpe_ratio {
            _ if has_cashflows => Some(approximate()),
            Some(value) => Some(RatioLine {
                value: Metric::Value(value),
                approximate: false,
            }),
            None if config.compute_missing_ratios => Some(approximate()),
            None => None,
        };

        let max_drawdown_line = match inputs.max_drawdown {
            Some(supplied) => Some(DrawdownLine {
                pct: supplied.pct,
                len: supplied.len,
                approximate: false,
            }),
            None if config.compute_missing_ratios => Some(DrawdownLine {
                pct: max_drawdown(points),
                len: None,
                approximate: true,
            }),
            None => None,
        };
        let drawdown_period = max_drawdown_line.and_then(|_| max_drawdown_period(points));

        info!(
            %resolved,
            dropped = trimmed.dropped,
            cagr = ?annualization.cagr.value(),
            volatility = ?volatility.annualized_volatility.value(),
            has_cashflows,
            "performance report built"
        );

        PerformanceReport {
            final_value: inputs.final_value,
            cash: inputs.cash,
            warmup: WarmupSummary {
                requested: *warmup,
                resolved,
                points_dropped: trimmed.dropped,
                calendar_days: resolved
                    .calendar_span(config.bars_per_calendar_day)
                    .map(|span| span.num_seconds() as f64 / 86_400.0),
            },
            contributions,
            cagr_source,
            annualization,
            per_period_source,
            per_period,
            frequency: config.frequency,
            volatility,
            sharpe,
            max_drawdown: max_drawdown_line,
            drawdown_period,
            open_positions: inputs.open_positions.clone(),
        }
    }

    //renders the report as text, in the fixed section order
    pub fn render(&self) -> String {
        let mut out = String::new();

        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Final Portfolio Value"),
            Cell::new(&format!("{:.2}", self.final_value)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Remaining Cash"),
            Cell::new(&format!("{:.2}", self.cash)),
        ]));

        if let Some(contributions) = &self.contributions {
            table.add_row(Row::new(vec![
                Cell::new("Total Contributed"),
                Cell::new(&format!(
                    "{:.2} (start={:.2}, deposits={:.2})",
                    contributions.total_contributed, contributions.start_value, contributions.deposits
                )),
            ]));

            let xirr = match contributions.money_weighted_return {
                Some(rate) => format!("{:.2}% over {:.2} years", rate * 100.0, contributions.years),
                None => "n/a".to_string(),
            };
            table.add_row(Row::new(vec![
                Cell::new("Money-weighted Return (XIRR)"),
                Cell::new(&xirr),
            ]));
        }

        let excluded = if self.warmup.resolved.is_zero() {
            "none".to_string()
        } else {
            format!(
                "{} ({} points dropped)",
                self.warmup.resolved, self.warmup.points_dropped
            )
        };
        table.add_row(Row::new(vec![
            Cell::new("Warm-up Excluded"),
            Cell::new(&excluded),
        ]));

        let cagr_label = match self.cagr_source {
            ReturnSource::CashflowAdjusted => "CAGR (cashflow-adjusted)",
            _ => "CAGR",
        };
        table.add_row(Row::new(vec![
            Cell::new(cagr_label),
            Cell::new(&format_cagr(&self.annualization)),
        ]));

        out.push_str(&table.to_string());

        out.push_str(&format!("Per-year returns ({}):\n", self.per_period_source.label()));
        if self.per_period.is_empty() {
            out.push_str("  n/a\n");
        } else {
            let mut years = Table::new();
            years.add_row(Row::new(vec![Cell::new("Year"), Cell::new("Return")]));
            for (year, ret) in self.per_period.iter() {
                years.add_row(Row::new(vec![
                    Cell::new(&year.to_string()),
                    Cell::new(&format!("{:.2}%", ret * 100.0)),
                ]));
            }
            out.push_str(&years.to_string());
        }

        let mut risk = Table::new();
        risk.add_row(Row::new(vec![
            Cell::new("Annualized Volatility"),
            Cell::new(&format!(
                "{} ({} samples, {:?})",
                self.volatility.annualized_volatility.display_pct(),
                self.volatility.sample_count,
                self.frequency
            )),
        ]));

        if let Some(sharpe) = &self.sharpe {
            let label = if sharpe.approximate {
                "Sharpe Ratio (approx)"
            } else {
                "Sharpe Ratio"
            };
            risk.add_row(Row::new(vec![
                Cell::new(label),
                Cell::new(&sharpe.value.to_string()),
            ]));
        }

        if let Some(drawdown) = &self.max_drawdown {
            let value = match drawdown.len {
                Some(len) => format!("{:.2}% ({} bars)", drawdown.pct, len),
                None => format!("{:.2}%", drawdown.pct),
            };
            risk.add_row(Row::new(vec![Cell::new("Max Drawdown"), Cell::new(&value)]));
        }

        if let Some(period) = &self.drawdown_period {
            let recovery = match period.recovery_date {
                Some(date) => date.to_string(),
                None => "(not recovered)".to_string(),
            };
            risk.add_row(Row::new(vec![
                Cell::new("Max Drawdown Period"),
                Cell::new(&format!(
                    "{} -> {} (trough={})",
                    period.peak_date, recovery, period.trough_date
                )),
            ]));
        }

        out.push_str(&risk.to_string());

        if self.open_positions.is_empty() {
            out.push_str("No open positions remaining.\n");
        } else {
            out.push_str("Open positions (post-backtest):\n");
            let mut positions = Table::new();
            positions.add_row(Row::new(vec![
                Cell::new("Symbol"),
                Cell::new("Size"),
                Cell::new("Last Price"),
                Cell::new("Value"),
            ]));
            for position in &self.open_positions {
                positions.add_row(Row::new(vec![
                    Cell::new(&position.symbol),
                    Cell::new(&format!("{:.4}", position.size)),
                    Cell::new(&format_optional(position.last_price)),
                    Cell::new(&format_optional(position.market_value())),
                ]));
            }
            out.push_str(&positions.to_string());
        }

        out
    }

    //prints the report to stdout
    pub fn pretty_print(&self) {
        print!("{}", self.render());
    }
}

fn format_cagr(result: &AnnualizationResult) -> String {
    match (result.cagr, result.span_years) {
        (Metric::Value(cagr), Some(years)) => {
            format!("{:.2}% over {:.2} years", cagr * 100.0, years)
        }
        (Metric::Value(cagr), None) => format!("{:.2}%", cagr * 100.0),
        (Metric::Undefined(anomaly), _) => format!("n/a ({})", anomaly),
    }
}

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}
