//! Scenario modeling: bear / base / bull variants of one assumption set
//!
//! A scenario scales revenue, OpEx and CapEx by multipliers and can delay
//! every revenue stream. Scenarios are independent projections, so the runner
//! fans them out across threads.

use log::info;
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, Money};
use crate::error::{ModelError, ModelResult};
use crate::projection::{ProjectionEngine, ProjectionResult};

/// Parameters for deriving a scenario from the base assumptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Short identifier, also used in output file names ("bear", "bull")
    pub name: String,

    /// Chart title / sheet description
    #[serde(default)]
    pub title: String,

    /// Multiplier on every revenue stream (1.0 = no change)
    #[serde(default = "default_one")]
    pub revenue_mult: Decimal,

    /// Multiplier on every OpEx item (1.0 = no change)
    #[serde(default = "default_one")]
    pub opex_mult: Decimal,

    /// Multiplier on every CapEx item (1.0 = no change)
    #[serde(default = "default_one")]
    pub capex_mult: Decimal,

    /// Months added to every stream's start (construction overrun)
    #[serde(default)]
    pub revenue_delay_months: u32,
}

fn default_one() -> Decimal { Decimal::ONE }

impl ScenarioParams {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            revenue_mult: Decimal::ONE,
            opex_mult: Decimal::ONE,
            capex_mult: Decimal::ONE,
            revenue_delay_months: 0,
        }
    }

    /// Low utilization, high power costs
    pub fn bear() -> Self {
        Self {
            revenue_mult: dec!(0.80),
            opex_mult: dec!(1.10),
            ..Self::new("bear", "Bear Case (Low Utilization, High Power Costs)")
        }
    }

    pub fn base() -> Self {
        Self::new("base", "Base Case")
    }

    /// High utilization, low power costs
    pub fn bull() -> Self {
        Self {
            revenue_mult: dec!(1.60),
            opex_mult: dec!(0.85),
            ..Self::new("bull", "Bull Case (High Utilization, Low Power Costs)")
        }
    }

    /// The standard bear / base / bull trio
    pub fn standard_set() -> Vec<Self> {
        vec![Self::bear(), Self::base(), Self::bull()]
    }

    fn validate(&self) -> ModelResult<()> {
        let checks = [
            ("revenue_mult", self.revenue_mult),
            ("opex_mult", self.opex_mult),
            ("capex_mult", self.capex_mult),
        ];
        for (field, value) in checks {
            if value < Decimal::ZERO {
                return Err(ModelError::invalid(
                    format!("scenario '{}'.{}", self.name, field),
                    format!("multiplier {} must be non-negative", value),
                ));
            }
        }
        Ok(())
    }

    /// Derive the scenario's assumption set (amounts rounded to cents)
    pub fn apply(&self, base: &Assumptions) -> ModelResult<Assumptions> {
        self.validate()?;

        let scale = |amount: Money, mult: Decimal, field: &str| {
            amount
                .checked_mul(mult)
                .map(|scaled| scaled.round_dp(2))
                .ok_or_else(|| ModelError::overflow(format!("scenario '{}'.{}", self.name, field)))
        };

        let mut adjusted = base.clone();
        adjusted.name = format!("{} - {}", base.name, self.display_title());
        for item in &mut adjusted.capex {
            item.amount = scale(item.amount, self.capex_mult, "capex_mult")?;
        }
        for stream in &mut adjusted.revenues {
            stream.monthly_amount = scale(stream.monthly_amount, self.revenue_mult, "revenue_mult")?;
            stream.start_month = stream.start_month.saturating_add(self.revenue_delay_months);
        }
        for item in &mut adjusted.expenses {
            item.monthly_amount = scale(item.monthly_amount, self.opex_mult, "opex_mult")?;
        }

        Ok(adjusted)
    }

    fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// A scenario together with its projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub params: ScenarioParams,
    pub result: ProjectionResult,
}

/// Runs a set of scenarios against one base assumption set
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(engine: ProjectionEngine) -> Self {
        Self { engine }
    }

    /// Project every scenario in parallel; output order matches `scenarios`
    ///
    /// The first failing scenario aborts the whole run.
    pub fn run(&self, base: &Assumptions, scenarios: &[ScenarioParams]) -> ModelResult<Vec<ScenarioOutcome>> {
        let outcomes = scenarios
            .par_iter()
            .map(|params| -> ModelResult<ScenarioOutcome> {
                let adjusted = params.apply(base)?;
                let result = self.engine.project(&adjusted)?;
                Ok(ScenarioOutcome {
                    params: params.clone(),
                    result,
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        for outcome in &outcomes {
            info!(
                "Scenario '{}': break-even {}, final cumulative {}",
                outcome.params.name,
                outcome.result.breakeven_label(),
                outcome.result.summary.final_cumulative
            );
        }
        Ok(outcomes)
    }
}
