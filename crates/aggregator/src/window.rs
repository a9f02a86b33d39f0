use crate::error::AggregatorError;
use configuration::PeriodSettings;
use core_types::Period;
use serde::Serialize;
use std::ops::RangeInclusive;

/// The baseline and intervention periods of an analysis run.
///
/// `baseline_end` is the policy cutoff: every year up to and including it is
/// a baseline year, every later year an intervention year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisWindow {
    pub baseline_start: i32,
    pub baseline_end: i32,
    pub intervention_start: i32,
    pub intervention_end: i32,
    pub baseline_representative: i32,
    pub intervention_representative: i32,
}

impl AnalysisWindow {
    /// Builds a window, checking that the periods are ordered and that each
    /// representative year lies in its own period.
    pub fn new(
        baseline: RangeInclusive<i32>,
        intervention: RangeInclusive<i32>,
        baseline_representative: i32,
        intervention_representative: i32,
    ) -> Result<Self, AggregatorError> {
        if baseline.is_empty() || intervention.is_empty() {
            return Err(AggregatorError::InvalidWindow(
                "periods must start no later than they end".to_string(),
            ));
        }
        if *intervention.start() <= *baseline.end() {
            return Err(AggregatorError::InvalidWindow(format!(
                "intervention starts in {} but the baseline runs until {}",
                intervention.start(),
                baseline.end()
            )));
        }
        if !baseline.contains(&baseline_representative) {
            return Err(AggregatorError::InvalidWindow(format!(
                "baseline representative {baseline_representative} is outside the baseline period"
            )));
        }
        if !intervention.contains(&intervention_representative) {
            return Err(AggregatorError::InvalidWindow(format!(
                "intervention representative {intervention_representative} is outside the intervention period"
            )));
        }

        Ok(Self {
            baseline_start: *baseline.start(),
            baseline_end: *baseline.end(),
            intervention_start: *intervention.start(),
            intervention_end: *intervention.end(),
            baseline_representative,
            intervention_representative,
        })
    }

    pub fn from_settings(periods: &PeriodSettings) -> Result<Self, AggregatorError> {
        Self::new(
            periods.baseline_start..=periods.baseline_end,
            periods.intervention_start..=periods.intervention_end,
            periods.baseline_representative,
            periods.intervention_representative,
        )
    }

    pub fn period_of(&self, year: i32) -> Period {
        Period::for_year(year, self.baseline_end)
    }

    /// Every year from the baseline start through the intervention end.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.baseline_start..=self.intervention_end
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years().contains(&year)
    }

    /// `"2007-2019"` style label of the baseline period.
    pub fn baseline_label(&self) -> String {
        format!("{}-{}", self.baseline_start, self.baseline_end)
    }

    pub fn intervention_label(&self) -> String {
        format!("{}-{}", self.intervention_start, self.intervention_end)
    }
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            baseline_start: 2007,
            baseline_end: 2019,
            intervention_start: 2020,
            intervention_end: 2024,
            baseline_representative: 2015,
            intervention_representative: 2022,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_year_is_baseline() {
        let window = AnalysisWindow::default();
        assert_eq!(window.period_of(2019), Period::Baseline);
        assert_eq!(window.period_of(2020), Period::Intervention);
        assert_eq!(window.period_of(1990), Period::Baseline);
        assert_eq!(window.years().count(), 18);
        assert_eq!(window.baseline_label(), "2007-2019");
    }

    #[test]
    fn default_matches_default_settings() {
        let from_settings = AnalysisWindow::from_settings(&PeriodSettings::default()).unwrap();
        assert_eq!(from_settings, AnalysisWindow::default());
    }

    #[test]
    fn overlapping_periods_are_rejected() {
        assert!(AnalysisWindow::new(2007..=2019, 2019..=2024, 2015, 2022).is_err());
        assert!(AnalysisWindow::new(2007..=2019, 2020..=2024, 2021, 2022).is_err());
        assert!(AnalysisWindow::new(2019..=2007, 2020..=2024, 2015, 2022).is_err());
    }
}
