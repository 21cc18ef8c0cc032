//! Rule catalogue (spec.md sections 3 and 6): four named maps keyed by rule
//! id, each carrying a theme tag and three learned scalars. Persisted as a
//! single JSON document matching the shape spec.md section 6 requires.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{TableError, TableResult};
use crate::rules::{ALL_CELL_DATA_RULES, ALL_CELL_NOT_DATA_RULES, ALL_LINE_DATA_RULES, ALL_LINE_NOT_DATA_RULES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Header,
    Aggregation,
    Other,
}

/// One entry of the catalogue. `weight`/`confidence` are explicitly
/// optional ("absent", spec.md design notes) rather than defaulting to
/// zero: arithmetic over them must short-circuit on absence rather than
/// treating an untrained rule as actively disqualifying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    pub weight: Option<f64>,
    pub confidence: Option<f64>,
    pub coverage: f64,
    pub theme: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub rule_type: Option<RuleType>,
}

pub type RuleMap = HashMap<String, RuleEntry>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CellRules {
    data: RuleMap,
    not_data: RuleMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineRules {
    data: RuleMap,
    not_data: RuleMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogueDocument {
    cell: CellRules,
    line: LineRules,
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    pub cell_data: RuleMap,
    pub cell_not_data: RuleMap,
    pub line_data: RuleMap,
    pub line_not_data: RuleMap,
}

const DEFAULT_CATALOGUE_JSON: &str = include_str!("../assets/default_catalogue.json");

impl Catalogue {
    pub fn from_json(text: &str) -> TableResult<Catalogue> {
        let doc: CatalogueDocument = serde_json::from_str(text)?;
        let catalogue = Catalogue {
            cell_data: doc.cell.data,
            cell_not_data: doc.cell.not_data,
            line_data: doc.line.data,
            line_not_data: doc.line.not_data,
        };
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn to_json_pretty(&self) -> TableResult<String> {
        let doc = CatalogueDocument {
            cell: CellRules {
                data: self.cell_data.clone(),
                not_data: self.cell_not_data.clone(),
            },
            line: LineRules {
                data: self.line_data.clone(),
                not_data: self.line_not_data.clone(),
            },
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// The weights bundled with the system (spec.md section 6).
    pub fn default_catalogue() -> Catalogue {
        Catalogue::from_json(DEFAULT_CATALOGUE_JSON)
            .expect("bundled default catalogue must parse and be complete")
    }

    /// Confirms every rule id the engine references exists in this
    /// catalogue (spec.md section 7, `InvalidInput`).
    pub fn validate(&self) -> TableResult<()> {
        check_complete(&self.cell_data, ALL_CELL_DATA_RULES, "cell.data")?;
        check_complete(&self.cell_not_data, ALL_CELL_NOT_DATA_RULES, "cell.not_data")?;
        check_complete(&self.line_data, ALL_LINE_DATA_RULES, "line.data")?;
        check_complete(&self.line_not_data, ALL_LINE_NOT_DATA_RULES, "line.not_data")?;
        Ok(())
    }
}

fn check_complete(map: &RuleMap, required: &[&str], catalogue_name: &str) -> TableResult<()> {
    for rule_id in required {
        if !map.contains_key(*rule_id) {
            return Err(TableError::InvalidInput(format!(
                "rule catalogue `{catalogue_name}` is missing required rule `{rule_id}`"
            )));
        }
    }
    Ok(())
}
