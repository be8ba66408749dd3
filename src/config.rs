use crate::period::Period;

pub const DEFAULT_FLEX_MARKER: &str = "flex";

/// Parameters of a single report run.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    pub period: Period,
    /// Budget to report against; the first one in the ledger when `None`.
    pub budget_name: Option<String>,
    /// Substring in account notes that flags a flex account.
    pub flex_marker: String,
}

impl ReportConfig {
    pub fn new(period: Period) -> ReportConfig {
        ReportConfig {
            period,
            ..ReportConfig::default()
        }
    }

    pub fn with_budget(mut self, name: impl Into<String>) -> ReportConfig {
        self.budget_name = Some(name.into());
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            period: Period::current(),
            budget_name: None,
            flex_marker: DEFAULT_FLEX_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_budget_and_flex_marker() {
        let config = ReportConfig::new(Period::new(2021, 1).unwrap());
        assert_eq!(config.period.month(), 1);
        assert_eq!(config.budget_name, None);
        assert_eq!(config.flex_marker, "flex");
        assert_eq!(config.with_budget("Household").budget_name.as_deref(), Some("Household"));
    }
}
