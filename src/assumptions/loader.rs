//! Load assumption sets from JSON files
//!
//! Missing top-level fields fall back to defaults (name, horizon, empty lists);
//! every loaded set is validated before it is returned.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::info;

use super::Assumptions;
use crate::error::{ModelError, ModelResult};

/// Load and validate assumptions from a JSON file
pub fn load_assumptions(path: &Path) -> ModelResult<Assumptions> {
    let file = File::open(path).map_err(|e| {
        ModelError::invalid(path.display().to_string(), format!("cannot open assumptions file: {}", e))
    })?;

    let assumptions = load_assumptions_from_reader(BufReader::new(file)).map_err(|e| match e {
        ModelError::InvalidInput { field, reason } if field == "assumptions" => {
            ModelError::invalid(path.display().to_string(), reason)
        }
        other => other,
    })?;

    info!(
        "Loaded '{}' from {}: {} CapEx items, {} revenue streams, {} expense items",
        assumptions.name,
        path.display(),
        assumptions.capex.len(),
        assumptions.revenues.len(),
        assumptions.expenses.len()
    );
    Ok(assumptions)
}

/// Load and validate assumptions from any JSON reader
pub fn load_assumptions_from_reader<R: Read>(reader: R) -> ModelResult<Assumptions> {
    // serde_json reports line/column and the failing field (e.g. a negative start_month)
    let assumptions: Assumptions = serde_json::from_reader(reader)
        .map_err(|e| ModelError::invalid("assumptions", e.to_string()))?;

    assumptions.validate()?;
    Ok(assumptions)
}
