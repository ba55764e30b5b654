//! Down-sampling of the provider's 3-hour forecast into one point per day.

use crate::model::{ForecastPoint, RawForecast, round_celsius};

/// Samples per day at the provider's fixed 3-hour spacing.
pub const SAMPLES_PER_DAY: usize = 8;

/// Keep every 8th sample starting with the first, dated in the city's local time,
/// with its temperature rounded to whole degrees.
pub fn reduce(raw: &RawForecast) -> Vec<ForecastPoint> {
    raw.samples
        .iter()
        .step_by(SAMPLES_PER_DAY)
        .map(|sample| ForecastPoint {
            date: sample.at.with_timezone(&raw.utc_offset).date_naive(),
            temperature_c: round_celsius(sample.temperature_c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::model::RawForecastSample;

    fn series(start: DateTime<Utc>, temps: &[f64]) -> Vec<RawForecastSample> {
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| RawForecastSample {
                at: start + Duration::hours(3 * i as i64),
                temperature_c: *t,
            })
            .collect()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn forty_samples_give_five_days() {
        let temps: Vec<f64> = (0..40).map(|i| 10.0 + i as f64 * 0.3).collect();
        let points = reduce(&RawForecast::utc(series(start(), &temps)));

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(points[4].date, NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }

    #[test]
    fn point_count_is_ceiling_of_n_over_eight() {
        for n in 0..=41usize {
            let temps = vec![15.0; n];
            let points = reduce(&RawForecast::utc(series(start(), &temps)));
            assert_eq!(points.len(), n.div_ceil(SAMPLES_PER_DAY), "n = {n}");
        }
    }

    #[test]
    fn picks_first_of_every_eight_and_rounds() {
        let mut temps = vec![0.0; 17];
        temps[0] = 21.4;
        temps[8] = -2.6;
        temps[16] = 18.5;
        temps[1] = 99.0;

        let points = reduce(&RawForecast::utc(series(start(), &temps)));
        let values: Vec<i32> = points.iter().map(|p| p.temperature_c).collect();

        assert_eq!(values, vec![21, -3, 19]);
    }

    #[test]
    fn dates_are_strictly_increasing() {
        let temps = vec![20.0; 40];
        let points = reduce(&RawForecast::utc(series(start(), &temps)));

        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn dates_use_city_offset() {
        // 22:00 UTC is already the next day at UTC+3.
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 22, 0, 0).unwrap();
        let raw = RawForecast {
            utc_offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            samples: series(late, &[12.0]),
        };

        let points = reduce(&raw);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn same_input_same_output() {
        let raw = RawForecast::utc(series(start(), &[1.2, 3.4, 5.6, 7.8, 9.0, 1.1, 2.2, 3.3, 4.4]));
        assert_eq!(reduce(&raw), reduce(&raw));
    }
}
