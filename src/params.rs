//! Tunable parameters for the core (spec.md section 6). All fields have the
//! documented defaults; `Parameters::default()` matches the table in
//! spec.md exactly.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInput {
    ValuesAndLines,
    Values,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinedLabelWeight {
    Confidence,
    ConfusionIndex,
    Difference,
}

/// Optional prior over row-label sequences (spec.md section 6,
/// `markov_model` / `markov_approximation_probabilities`). The training
/// driver that fits this table is out of scope (spec.md section 1); the
/// core only ever reads from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkovModel {
    /// `P(state | previous state)`, keyed by `"previous->state"`.
    pub transitions: HashMap<String, f64>,
}

impl MarkovModel {
    pub fn probability(&self, previous: &str, state: &str) -> Option<f64> {
        self.transitions
            .get(&format!("{previous}->{state}"))
            .copied()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub undersample_data_limit: usize,
    pub max_candidates: usize,
    pub max_summary_strength: usize,
    pub max_line_depth: usize,
    pub max_attributes: usize,
    pub ignore_left: usize,
    pub outlier_sensitive: bool,
    pub normalize_decimals: bool,
    pub impute_nulls: bool,
    pub summary_population_factor: bool,
    pub weight_input: WeightInput,
    pub weight_lower_bound: f64,
    pub not_data_weight_lower_bound: f64,
    pub p: f64,
    pub markov_model: Option<MarkovModel>,
    pub markov_approximation_probabilities: bool,
    pub combined_label_weight: CombinedLabelWeight,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            undersample_data_limit: 2,
            max_candidates: 100,
            max_summary_strength: 6,
            max_line_depth: 30,
            max_attributes: 20,
            ignore_left: 4,
            outlier_sensitive: true,
            normalize_decimals: true,
            impute_nulls: true,
            summary_population_factor: true,
            weight_input: WeightInput::ValuesAndLines,
            weight_lower_bound: 0.4,
            not_data_weight_lower_bound: 0.6,
            p: 0.3,
            markov_model: None,
            markov_approximation_probabilities: false,
            combined_label_weight: CombinedLabelWeight::Confidence,
        }
    }
}

impl Parameters {
    /// Loads overrides from a TOML document; any field not present keeps
    /// its default, mirroring the teacher's `Config::delimiter(mut self,
    /// ...) -> Config` builder chaining, but as a single batch parse since
    /// there is no interactive flag-by-flag construction here.
    pub fn from_toml_str(input: &str) -> Result<Parameters, crate::errors::TableError> {
        toml::from_str(input).map_err(|err| crate::errors::TableError::Toml(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let params = Parameters::default();
        assert_eq!(params.undersample_data_limit, 2);
        assert_eq!(params.max_candidates, 100);
        assert_eq!(params.max_summary_strength, 6);
        assert_eq!(params.max_line_depth, 30);
        assert_eq!(params.max_attributes, 20);
        assert_eq!(params.ignore_left, 4);
        assert!(params.outlier_sensitive);
        assert!(params.normalize_decimals);
        assert!(params.impute_nulls);
        assert!(params.summary_population_factor);
        assert_eq!(params.weight_lower_bound, 0.4);
        assert_eq!(params.not_data_weight_lower_bound, 0.6);
        assert_eq!(params.p, 0.3);
    }

    #[test]
    fn overrides_from_toml() {
        let params = Parameters::from_toml_str("max_candidates = 50\n").unwrap();
        assert_eq!(params.max_candidates, 50);
        assert_eq!(params.max_line_depth, 30);
    }
}
