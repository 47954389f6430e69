//! Calibration-range reporting.
//!
//! Published solubility laws are routinely used a little outside their
//! fitted windows, so range violations are advisory data returned alongside
//! results, never errors. Reports are structured per component so a
//! violation in a fugacity sub-model is diagnosable separately from one in
//! the law itself.

use serde::Serialize;

/// One range check: which component, which parameter, inside or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationCheck {
    pub component: &'static str,
    pub parameter: &'static str,
    pub in_range: bool,
}

/// Structured per-component calibration report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub checks: Vec<CalibrationCheck>,
}

impl CalibrationReport {
    pub fn push(&mut self, component: &'static str, parameter: &'static str, in_range: bool) {
        self.checks.push(CalibrationCheck {
            component,
            parameter,
            in_range,
        });
    }

    pub fn extend(&mut self, other: CalibrationReport) {
        self.checks.extend(other.checks);
    }

    pub fn all_in_range(&self) -> bool {
        self.checks.iter().all(|c| c.in_range)
    }

    /// Look up one check by component and parameter name.
    pub fn check(&self, component: &str, parameter: &str) -> Option<bool> {
        self.checks
            .iter()
            .find(|c| c.component == component && c.parameter == parameter)
            .map(|c| c.in_range)
    }
}

/// A published calibration window in pressure and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationWindow {
    pub pressure_bars: (f64, f64),
    pub temperature_k: (f64, f64),
}

impl CalibrationWindow {
    pub fn report(&self, component: &'static str, p_bars: f64, t_k: f64) -> CalibrationReport {
        let mut report = CalibrationReport::default();
        report.push(
            component,
            "pressure",
            (self.pressure_bars.0..=self.pressure_bars.1).contains(&p_bars),
        );
        report.push(
            component,
            "temperature",
            (self.temperature_k.0..=self.temperature_k.1).contains(&t_k),
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_report() {
        let window = CalibrationWindow {
            pressure_bars: (500.0, 5000.0),
            temperature_k: (1400.0, 1550.0),
        };
        let report = window.report("law", 1000.0, 1300.0);
        assert_eq!(report.check("law", "pressure"), Some(true));
        assert_eq!(report.check("law", "temperature"), Some(false));
        assert!(!report.all_in_range());
    }

    #[test]
    fn merged_reports_stay_separable() {
        let mut a = CalibrationReport::default();
        a.push("law", "pressure", true);
        let mut b = CalibrationReport::default();
        b.push("fugacity", "temperature", false);
        a.extend(b);
        assert_eq!(a.check("law", "pressure"), Some(true));
        assert_eq!(a.check("fugacity", "temperature"), Some(false));
        assert_eq!(a.check("activity", "pressure"), None);
    }
}
