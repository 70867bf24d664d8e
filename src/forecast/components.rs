//! Per-component series for the "forecast components" charts.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::{FittedModel, ForecastRow};
use crate::forecast::predict::seasonal_at;
use crate::forecast::seasonality::{WEEKLY, YEARLY};

/// Trend over the forecast frame plus one period of each seasonality.
#[derive(Debug, Clone)]
pub struct Components {
    /// `(ds, trend, trend_lower, trend_upper)`.
    pub trend: Vec<(NaiveDate, f64, f64, f64)>,
    /// Sunday through Saturday.
    pub weekly: Option<Vec<(Weekday, f64)>>,
    /// One value per day of a 365-day year starting January 1st.
    pub yearly: Option<Vec<(NaiveDate, f64)>>,
}

/// Reference year for the seasonal profiles; 2017-01-01 is a Sunday.
fn reference_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default()
}

pub fn components(model: &FittedModel, rows: &[ForecastRow]) -> Components {
    let trend = rows
        .iter()
        .map(|r| (r.ds, r.trend, r.trend_lower, r.trend_upper))
        .collect();

    let start = reference_start();

    let weekly = model.seasonality(WEEKLY).map(|_| {
        (0..7)
            .map(|d| {
                let date = start + Duration::days(d);
                (date.weekday(), seasonal_at(model, WEEKLY, date))
            })
            .collect()
    });

    let yearly = model.seasonality(YEARLY).map(|_| {
        (0..365)
            .map(|d| {
                let date = start + Duration::days(d);
                (date, seasonal_at(model, YEARLY, date))
            })
            .collect()
    });

    Components { trend, weekly, yearly }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastConfig, HistoryPoint, SeasonalityToggle};
    use crate::forecast::{fit, make_future_dates, predict};

    #[test]
    fn weekly_profile_starts_on_sunday() {
        let start = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        let history: Vec<HistoryPoint> = (0..70)
            .map(|i| HistoryPoint {
                ds: start + Duration::days(i),
                y: if i % 7 == 0 { 50.0 } else { 10.0 },
            })
            .collect();
        let config = ForecastConfig {
            uncertainty_samples: 0,
            yearly: SeasonalityToggle::Off,
            ..ForecastConfig::default()
        };
        let model = fit(&history, &config).unwrap();
        let rows = predict(&model, &make_future_dates(&history, 7), &config).unwrap();
        let comps = components(&model, &rows);

        assert_eq!(comps.trend.len(), 77);
        assert!(comps.yearly.is_none());
        let weekly = comps.weekly.unwrap();
        assert_eq!(weekly.len(), 7);
        assert_eq!(weekly[0].0, Weekday::Sun);
        assert_eq!(weekly[6].0, Weekday::Sat);

        // 2016-03-01 is a Tuesday: the spike day must be the weekly maximum.
        let (peak_day, _) = weekly
            .iter()
            .copied()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert_eq!(peak_day, Weekday::Tue);
    }
}
