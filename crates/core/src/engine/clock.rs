use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::DomainError;

const MAX_HOUR: f64 = 23.99;

/// Mixture of ordering peaks: (cumulative share, mean hour, std dev).
const PEAKS: [(f64, f64, f64); 5] = [
    (0.35, 12.5, 1.2), // lunch
    (0.70, 19.5, 1.5), // dinner
    (0.82, 8.0, 0.8),  // breakfast
    (0.92, 16.0, 0.8), // snacks
    (1.00, 23.0, 1.0), // late night
];

/// Draws a fractional hour of day from the peak mixture, clamped to a valid
/// clock range.
pub fn sample_hour<R: Rng>(rng: &mut R) -> Result<f64, DomainError> {
    let choice = rng.gen::<f64>();
    let (_, mean, std_dev) =
        PEAKS.iter().copied().find(|(cumulative, _, _)| choice < *cumulative).unwrap_or(PEAKS[4]);
    let normal = Normal::new(mean, std_dev).map_err(|error| {
        DomainError::InvariantViolation(format!("invalid ordering peak: {error}"))
    })?;
    Ok(normal.sample(rng).clamp(0.0, MAX_HOUR))
}

/// Places a fractional hour on `date`, keeping whole minutes.
pub fn timestamp_at(date: NaiveDate, hour: f64) -> NaiveDateTime {
    let hour = hour.clamp(0.0, MAX_HOUR);
    let whole_hour = hour.trunc() as u32;
    let minute = (hour.fract() * 60.0) as u32;
    let time = NaiveTime::from_hms_opt(whole_hour, minute.min(59), 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

pub fn sample_timestamp<R: Rng>(rng: &mut R, date: NaiveDate) -> Result<NaiveDateTime, DomainError> {
    Ok(timestamp_at(date, sample_hour(rng)?))
}

/// Sorted day offsets for a user's orders, drawn with replacement.
pub fn sample_order_days<R: Rng>(rng: &mut R, num_orders: u32, days: u32) -> Vec<u32> {
    if days == 0 {
        return Vec::new();
    }
    let mut offsets: Vec<u32> = (0..num_orders).map(|_| rng.gen_range(0..days)).collect();
    offsets.sort_unstable();
    offsets
}

pub fn date_for_offset(start: NaiveDate, offset: u32) -> NaiveDate {
    start + Duration::days(i64::from(offset))
}

pub fn is_weekend(timestamp: &NaiveDateTime) -> bool {
    matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::{is_weekend, sample_hour, sample_order_days, timestamp_at};
    use crate::rng::stream;

    #[test]
    fn sampled_hours_stay_in_clock_range() {
        let mut rng = stream(3, b"clock");
        for _ in 0..5_000 {
            let hour = sample_hour(&mut rng).expect("valid peaks");
            assert!((0.0..=23.99).contains(&hour));
        }
    }

    #[test]
    fn fractional_hour_becomes_whole_minutes() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("date");
        let stamp = timestamp_at(date, 19.75);
        assert_eq!(stamp.hour(), 19);
        assert_eq!(stamp.minute(), 45);

        let clamped = timestamp_at(date, 31.0);
        assert_eq!(clamped.hour(), 23);
    }

    #[test]
    fn order_days_are_sorted_and_inside_window() {
        let mut rng = stream(5, b"days");
        let days = sample_order_days(&mut rng, 40, 30);
        assert_eq!(days.len(), 40);
        assert!(days.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(days.iter().all(|day| *day < 30));
    }

    #[test]
    fn weekend_detection_uses_calendar_day() {
        // 2025-01-04 is a Saturday
        let saturday = timestamp_at(NaiveDate::from_ymd_opt(2025, 1, 4).expect("date"), 12.0);
        let monday = timestamp_at(NaiveDate::from_ymd_opt(2025, 1, 6).expect("date"), 12.0);
        assert!(is_weekend(&saturday));
        assert!(!is_weekend(&monday));
    }
}
