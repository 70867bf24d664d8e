//! Seasonality selection and the shared day-count time axis.

use chrono::NaiveDate;

use crate::domain::{ForecastConfig, HistoryPoint, SeasonalitySpec, SeasonalityToggle};

pub const YEARLY: &str = "yearly";
pub const WEEKLY: &str = "weekly";
pub const YEARLY_PERIOD_DAYS: f64 = 365.25;
pub const WEEKLY_PERIOD_DAYS: f64 = 7.0;

/// Days since 1970-01-01; the time axis for Fourier terms.
pub fn days_since_epoch(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as f64
}

/// Decide which seasonal terms to fit.
///
/// `Auto` rules:
/// - yearly: the history spans at least two years
/// - weekly: the history spans at least two weeks and is sampled more often than weekly
pub fn resolve_seasonalities(history: &[HistoryPoint], config: &ForecastConfig) -> Vec<SeasonalitySpec> {
    let span_days = match (history.first(), history.last()) {
        (Some(a), Some(b)) => (b.ds - a.ds).num_days(),
        _ => 0,
    };
    let min_spacing = history
        .windows(2)
        .map(|w| (w[1].ds - w[0].ds).num_days())
        .filter(|d| *d > 0)
        .min()
        .unwrap_or(i64::MAX);

    let yearly_auto = span_days >= 2 * 365;
    let weekly_auto = span_days >= 14 && min_spacing < 7;

    let mut out = Vec::new();
    if enabled(config.yearly, yearly_auto) && config.yearly_order > 0 {
        out.push(SeasonalitySpec {
            name: YEARLY.to_string(),
            period: YEARLY_PERIOD_DAYS,
            order: config.yearly_order,
        });
    }
    if enabled(config.weekly, weekly_auto) && config.weekly_order > 0 {
        out.push(SeasonalitySpec {
            name: WEEKLY.to_string(),
            period: WEEKLY_PERIOD_DAYS,
            order: config.weekly_order,
        });
    }
    out
}

fn enabled(toggle: SeasonalityToggle, auto: bool) -> bool {
    match toggle {
        SeasonalityToggle::Auto => auto,
        SeasonalityToggle::On => true,
        SeasonalityToggle::Off => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(n: i64) -> Vec<HistoryPoint> {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        (0..n)
            .map(|i| HistoryPoint {
                ds: start + chrono::Duration::days(i),
                y: 1.0,
            })
            .collect()
    }

    #[test]
    fn auto_rules_follow_history_span() {
        let config = ForecastConfig::default();

        let names = |h: &[HistoryPoint]| {
            resolve_seasonalities(h, &config)
                .into_iter()
                .map(|s| s.name)
                .collect::<Vec<_>>()
        };

        assert!(names(&daily(10)).is_empty());
        assert_eq!(names(&daily(60)), vec![WEEKLY]);
        assert_eq!(names(&daily(800)), vec![YEARLY, WEEKLY]);
    }

    #[test]
    fn toggles_override_auto() {
        let config = ForecastConfig {
            yearly: SeasonalityToggle::On,
            weekly: SeasonalityToggle::Off,
            ..ForecastConfig::default()
        };
        let specs = resolve_seasonalities(&daily(60), &config);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, YEARLY);
        assert_eq!(specs[0].order, 10);
    }

    #[test]
    fn weekly_sampling_disables_weekly_seasonality() {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let weekly: Vec<HistoryPoint> = (0..20)
            .map(|i| HistoryPoint {
                ds: start + chrono::Duration::weeks(i),
                y: 1.0,
            })
            .collect();
        assert!(resolve_seasonalities(&weekly, &ForecastConfig::default()).is_empty());
    }

    #[test]
    fn epoch_axis() {
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1.0);
    }
}
