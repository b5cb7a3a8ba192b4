//! Quantity names and the `reactions` columns they are read from.

use crate::error::{InvalidParamsDetails, NdsError, Result};

pub const REACTIONS_TABLE: &str = "reactions";

/// Key and label columns every `reactions` row carries
pub const KEY_COLUMNS: [&str; 3] = ["Z", "A", "element"];

/// Source columns for one quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityColumns {
    pub name: &'static str,
    pub value: &'static str,
    pub uncertainty: &'static str,
}

const fn columns(
    name: &'static str,
    value: &'static str,
    uncertainty: &'static str,
) -> QuantityColumns {
    QuantityColumns {
        name,
        value,
        uncertainty,
    }
}

const SEPARATION_ENERGIES: [QuantityColumns; 4] = [
    columns("Sn", "Sn_keV", "Sn_unc_keV"),
    columns("Sp", "Sp_keV", "Sp_unc_keV"),
    columns("S2n", "S2n_keV", "S2n_unc_keV"),
    columns("S2p", "S2p_keV", "S2p_unc_keV"),
];

const Q_VALUES: [QuantityColumns; 8] = [
    columns("Qa", "Qa_keV", "Qa_unc_keV"),
    columns("Q2bm", "Q2bm_keV", "Q2bm_unc_keV"),
    columns("Qep", "Qep_keV", "Qep_unc_keV"),
    columns("Qbn", "Qbn_keV", "Qbn_unc_keV"),
    columns("Q4bm", "Q4bm_keV", "Q4bm_unc_keV"),
    columns("Qda", "Qda_keV", "Qda_unc_keV"),
    columns("Qpa", "Qpa_keV", "Qpa_unc_keV"),
    columns("Qna", "Qna_keV", "Qna_unc_keV"),
];

/// A closed set of quantities reported together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityFamily {
    SeparationEnergy,
    QValue,
}

impl QuantityFamily {
    pub const ALL: [QuantityFamily; 2] = [QuantityFamily::SeparationEnergy, QuantityFamily::QValue];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityFamily::SeparationEnergy => "separation energy",
            QuantityFamily::QValue => "Q-value",
        }
    }

    pub fn columns(&self) -> &'static [QuantityColumns] {
        match self {
            QuantityFamily::SeparationEnergy => &SEPARATION_ENERGIES,
            QuantityFamily::QValue => &Q_VALUES,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    /// Look up a quantity by its exact name
    pub fn find(&self, name: &str) -> Result<&'static QuantityColumns> {
        self.columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| {
                NdsError::invalid_params(
                    format!(
                        "Unknown {} type '{name}'. Expected one of: {}",
                        self.as_str(),
                        self.names().join(", ")
                    ),
                    InvalidParamsDetails {
                        value: Some(name.to_string()),
                        accepted: Some(self.names().iter().map(|n| n.to_string()).collect()),
                        ..Default::default()
                    },
                )
            })
    }
}

/// Every column the lookups read
pub fn required_columns() -> Vec<&'static str> {
    let mut required: Vec<&'static str> = KEY_COLUMNS.to_vec();
    for family in QuantityFamily::ALL {
        for c in family.columns() {
            required.push(c.value);
            required.push(c.uncertainty);
        }
    }
    required
}

/// Check a table's columns against [`required_columns`]
pub fn validate_columns(table: &str, present: &[String]) -> Result<()> {
    let missing: Vec<String> = required_columns()
        .into_iter()
        .filter(|required| !present.iter().any(|p| p == required))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(NdsError::SchemaMismatch {
            table: table.to_string(),
            missing,
        })
    }
}
