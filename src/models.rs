use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// One row as returned by the storage layer: column name to value
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An absolute path that pointed at a regular file when it was checked.
///
/// Nothing holds the file open, so it may have changed since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        ResolvedPath(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Configuration state of an optional database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DbStatus {
    NotConfigured {
        how_to: String,
    },
    Ok {
        path: String,
        size_mb: f64,
        how_to: String,
    },
}

/// Status of every database the server knows about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoResponse {
    pub nds: DbStatus,
    pub exfor: DbStatus,
}

/// A value with its uncertainty, both in keV
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantityValue {
    #[serde(rename = "value_keV")]
    pub value_kev: Option<f64>,
    #[serde(rename = "uncertainty_keV")]
    pub uncertainty_kev: Option<f64>,
}

/// A single requested quantity for one nuclide
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleQuantity {
    #[serde(rename = "Z")]
    pub z: u32,
    #[serde(rename = "A")]
    pub a: u32,
    pub element: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "value_keV")]
    pub value_kev: Option<f64>,
    #[serde(rename = "uncertainty_keV")]
    pub uncertainty_kev: Option<f64>,
}

/// Every quantity of one family for one nuclide, keyed by quantity name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityBundle {
    #[serde(rename = "Z")]
    pub z: u32,
    #[serde(rename = "A")]
    pub a: u32,
    pub element: Option<String>,
    #[serde(flatten)]
    pub quantities: QuantityMap,
}

/// Quantities keyed by name, serialized in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantityMap(Vec<(&'static str, QuantityValue)>);

impl QuantityMap {
    pub fn get(&self, name: &str) -> Option<&QuantityValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(n, _)| *n)
    }
}

impl FromIterator<(&'static str, QuantityValue)> for QuantityMap {
    fn from_iter<I: IntoIterator<Item = (&'static str, QuantityValue)>>(iter: I) -> Self {
        QuantityMap(iter.into_iter().collect())
    }
}

impl Serialize for QuantityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of a separation-energy or Q-value lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuantityResult {
    Single(SingleQuantity),
    Bundle(QuantityBundle),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_configured_shape() {
        let status = DbStatus::NotConfigured {
            how_to: "X".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "status": "not_configured", "how_to": "X" })
        );
    }

    #[test]
    fn test_ok_shape() {
        let status = DbStatus::Ok {
            path: "/data/nds.sqlite".to_string(),
            size_mb: 1.5,
            how_to: "X".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "status": "ok", "path": "/data/nds.sqlite", "size_mb": 1.5, "how_to": "X" })
        );
    }

    #[test]
    fn test_single_keeps_null_fields() {
        let result = QuantityResult::Single(SingleQuantity {
            z: 8,
            a: 16,
            element: Some("O".to_string()),
            kind: "Sn".to_string(),
            value_kev: Some(15663.7),
            uncertainty_kev: None,
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "Z": 8, "A": 16, "element": "O", "type": "Sn",
                "value_keV": 15663.7, "uncertainty_keV": null
            })
        );
    }

    #[test]
    fn test_bundle_flattens_quantities() {
        let quantities: QuantityMap = [(
            "Sp",
            QuantityValue {
                value_kev: None,
                uncertainty_kev: None,
            },
        )]
        .into_iter()
        .collect();
        let result = QuantityResult::Bundle(QuantityBundle {
            z: 1,
            a: 2,
            element: Some("H".to_string()),
            quantities,
        });
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "Z": 1, "A": 2, "element": "H",
                "Sp": { "value_keV": null, "uncertainty_keV": null }
            })
        );
    }

    #[test]
    fn test_bundle_keeps_insertion_order() {
        let value = |v: f64| QuantityValue {
            value_kev: Some(v),
            uncertainty_kev: None,
        };
        let quantities: QuantityMap = [
            ("Sn", value(1.0)),
            ("Sp", value(2.0)),
            ("S2n", value(3.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(quantities.get("Sp"), Some(&value(2.0)));
        assert!(quantities.get("S2p").is_none());

        let bundle = QuantityBundle {
            z: 8,
            a: 16,
            element: None,
            quantities,
        };
        let json = serde_json::to_string(&bundle).unwrap();
        let sn = json.find("\"Sn\"").unwrap();
        let sp = json.find("\"Sp\"").unwrap();
        let s2n = json.find("\"S2n\"").unwrap();
        assert!(json.find("\"element\"").unwrap() < sn);
        assert!(sn < sp && sp < s2n, "{json}");
    }

    #[test]
    fn test_info_field_order() {
        let info = InfoResponse {
            nds: DbStatus::NotConfigured {
                how_to: "X".to_string(),
            },
            exfor: DbStatus::Ok {
                path: "/data/exfor.sqlite".to_string(),
                size_mb: 1.0,
                how_to: "Y".to_string(),
            },
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"nds":{"status":"not_configured","how_to":"X"},"exfor":{"status":"ok","path":"/data/exfor.sqlite","size_mb":1.0,"how_to":"Y"}}"#
        );
    }
}
