//! Separation energies and Q-values from the `reactions` table.
//!
//! Each lookup runs exactly one query keyed by (Z, A) and reshapes the
//! first row. A nuclide missing from the table is `Ok(None)`, not an error.

use crate::db::{QueryExecutor, SqliteExecutor};
use crate::error::Result;
use crate::models::{QuantityBundle, QuantityResult, QuantityValue, Record, SingleQuantity};
use crate::quantities::{QuantityColumns, QuantityFamily, REACTIONS_TABLE, validate_columns};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

const SELECT_BY_NUCLIDE: &str = "SELECT * FROM reactions WHERE Z = ?1 AND A = ?2";

/// Read-only lookups against a nuclear data database
#[derive(Debug, Clone, Default)]
pub struct ReactionLookup<X = SqliteExecutor> {
    executor: X,
}

impl<X: QueryExecutor> ReactionLookup<X> {
    pub fn new(executor: X) -> Self {
        ReactionLookup { executor }
    }

    /// Fail unless `reactions` has every column the lookups read
    pub async fn verify_schema(&self, path: &Path) -> Result<()> {
        let columns = self.executor.table_columns(path, REACTIONS_TABLE).await?;
        validate_columns(REACTIONS_TABLE, &columns)?;
        info!(path = %path.display(), "reactions schema verified");
        Ok(())
    }

    /// Sn, Sp, S2n, S2p for (Z, A), or only `kind` when given
    pub async fn get_separation_energy(
        &self,
        path: &Path,
        z: u32,
        a: u32,
        kind: Option<&str>,
    ) -> Result<Option<QuantityResult>> {
        self.lookup(QuantityFamily::SeparationEnergy, path, z, a, kind)
            .await
    }

    /// All eight Q-values for (Z, A), or only `kind` when given
    pub async fn get_q_value(
        &self,
        path: &Path,
        z: u32,
        a: u32,
        kind: Option<&str>,
    ) -> Result<Option<QuantityResult>> {
        self.lookup(QuantityFamily::QValue, path, z, a, kind).await
    }

    async fn lookup(
        &self,
        family: QuantityFamily,
        path: &Path,
        z: u32,
        a: u32,
        kind: Option<&str>,
    ) -> Result<Option<QuantityResult>> {
        let selected = kind.map(|k| family.find(k)).transpose()?;

        let rows = self
            .executor
            .query(path, SELECT_BY_NUCLIDE, &[i64::from(z), i64::from(a)])
            .await?;
        let Some(row) = rows.into_iter().next() else {
            debug!(z, a, family = family.as_str(), "no data");
            return Ok(None);
        };

        let element = row
            .get("element")
            .and_then(Value::as_str)
            .map(str::to_string);

        let result = match selected {
            Some(columns) => {
                let value = extract(&row, columns);
                QuantityResult::Single(SingleQuantity {
                    z,
                    a,
                    element,
                    kind: columns.name.to_string(),
                    value_kev: value.value_kev,
                    uncertainty_kev: value.uncertainty_kev,
                })
            }
            None => QuantityResult::Bundle(QuantityBundle {
                z,
                a,
                element,
                quantities: family
                    .columns()
                    .iter()
                    .map(|c| (c.name, extract(&row, c)))
                    .collect(),
            }),
        };
        Ok(Some(result))
    }
}

fn extract(row: &Record, columns: &QuantityColumns) -> QuantityValue {
    QuantityValue {
        value_kev: number(row, columns.value),
        uncertainty_kev: number(row, columns.uncertainty),
    }
}

// Missing, null, and non-numeric cells all read as None
fn number(row: &Record, column: &str) -> Option<f64> {
    row.get(column).and_then(Value::as_f64)
}
