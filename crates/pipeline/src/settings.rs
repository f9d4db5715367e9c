//! Pipeline tunables.

use chrono::NaiveDate;

/// Runtime settings of an import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    /// Partner ids sent per filter call.
    pub batch_size: usize,
    /// Session re-opens allowed per batch after a `Forbidden` filter call.
    pub max_session_retries: u32,
    /// Fixed lower bound of the project date filter.
    pub date_from: NaiveDate,
    /// The upper bound is today plus this many years.
    pub date_to_years_ahead: u32,
    pub borough_layer_id: String,
    pub city_layer_id: String,
}

impl ImportSettings {
    pub fn layer_ids(&self) -> Vec<String> {
        vec![self.borough_layer_id.clone(), self.city_layer_id.clone()]
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_session_retries: 3,
            date_from: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            date_to_years_ahead: 10,
            borough_layer_id: "borough".to_string(),
            city_layer_id: "city".to_string(),
        }
    }
}
