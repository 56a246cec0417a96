use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::debug;

use crate::aggregator::period::aggregate;
use crate::config::CALENDAR_WEEKS;
use crate::generator::{first_of_month, last_of_month, Generator, MonthData, RandomSource};
use crate::types::{DailyRecord, PeriodSummary, ViewMode};

// ---------------------------------------------------------------------------
// Month sources
// ---------------------------------------------------------------------------

/// Anything that can hand out a full generated month for an instrument.
pub trait MonthSource {
    fn month_data(&mut self, anchor: NaiveDate, instrument: &str) -> MonthData;
}

impl<S: RandomSource> MonthSource for Generator<S> {
    fn month_data(&mut self, anchor: NaiveDate, instrument: &str) -> MonthData {
        self.generate_month(anchor, instrument)
    }
}

// ---------------------------------------------------------------------------
// Date-range resolver
// ---------------------------------------------------------------------------

/// Available records for every day in `start..=end`, ascending.
///
/// Fetches each calendar month the range touches exactly once and merges them
/// by date. Unavailable (future) days are dropped. An inverted range is empty.
pub fn resolve_range<M: MonthSource>(
    months: &mut M,
    start: NaiveDate,
    end: NaiveDate,
    instrument: &str,
) -> Vec<DailyRecord> {
    let mut records = Vec::new();
    if end < start {
        return records;
    }

    let mut month = first_of_month(start);
    let mut fetched = 0usize;
    while month <= end {
        let data = months.month_data(month, instrument);
        fetched += 1;
        records.extend(
            data.range(start..=end)
                .map(|(_, r)| r)
                .filter(|r| !r.unavailable)
                .cloned(),
        );
        match last_of_month(month).succ_opt() {
            Some(next) => month = next,
            None => break,
        }
    }

    debug!(%start, %end, instrument, months = fetched, days = records.len(), "resolved range");
    records
}

/// Summary of the `view` period containing `day`, or `None` when it has no available days.
pub fn summarize_period<M: MonthSource>(
    months: &mut M,
    view: ViewMode,
    day: NaiveDate,
    instrument: &str,
) -> Option<PeriodSummary> {
    let (start, end) = period_bounds(view, day);
    aggregate(&resolve_range(months, start, end, instrument))
}

// ---------------------------------------------------------------------------
// Period arithmetic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Monday on or before `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Inclusive bounds of the period containing `day`. Weeks run Monday to Sunday.
pub fn period_bounds(view: ViewMode, day: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        ViewMode::Day => (day, day),
        ViewMode::Week => {
            let start = week_start(day);
            (start, start + Duration::days(6))
        }
        ViewMode::Month => (first_of_month(day), last_of_month(day)),
    }
}

/// Move one period. Month steps clamp to the last valid day (Jan 31 -> Feb 29).
/// Returns `day` unchanged if the step would leave chrono's date range.
pub fn step(view: ViewMode, day: NaiveDate, direction: Direction) -> NaiveDate {
    let moved = match (view, direction) {
        (ViewMode::Day, Direction::Prev) => day.pred_opt(),
        (ViewMode::Day, Direction::Next) => day.succ_opt(),
        (ViewMode::Week, Direction::Prev) => day.checked_sub_signed(Duration::days(7)),
        (ViewMode::Week, Direction::Next) => day.checked_add_signed(Duration::days(7)),
        (ViewMode::Month, Direction::Prev) => day.checked_sub_months(Months::new(1)),
        (ViewMode::Month, Direction::Next) => day.checked_add_months(Months::new(1)),
    };
    moved.unwrap_or(day)
}

/// Header for the period containing `day`, e.g. "October 16, 2026", "Week of Oct 12", "October 2026".
pub fn period_title(view: ViewMode, day: NaiveDate) -> String {
    match view {
        ViewMode::Day => day.format("%B %-d, %Y").to_string(),
        ViewMode::Week => format!("Week of {}", week_start(day).format("%b %-d")),
        ViewMode::Month => day.format("%B %Y").to_string(),
    }
}

/// Fixed six-week grid for `anchor`'s month, starting on the Monday on or before the 1st.
/// Leading and trailing days belong to the adjacent months.
pub fn calendar_weeks(anchor: NaiveDate) -> Vec<[NaiveDate; 7]> {
    let start = week_start(first_of_month(anchor));
    (0..CALENDAR_WEEKS)
        .map(|w| std::array::from_fn(|d| start + Duration::days((w * 7 + d) as i64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SineSeries;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Wraps a generator and records which months were requested.
    struct Recording {
        generator: Generator<SineSeries>,
        requested: Vec<NaiveDate>,
    }

    impl MonthSource for Recording {
        fn month_data(&mut self, anchor: NaiveDate, instrument: &str) -> MonthData {
            self.requested.push(anchor);
            self.generator.generate_month(anchor, instrument)
        }
    }

    fn recording(today: NaiveDate) -> Recording {
        Recording {
            generator: Generator::seeded().with_today(today),
            requested: Vec::new(),
        }
    }

    #[test]
    fn week_spanning_months_fetches_both_once() {
        // Mon 2024-01-29 .. Sun 2024-02-04
        let mut src = recording(ymd(2025, 1, 1));
        let (start, end) = period_bounds(ViewMode::Week, ymd(2024, 2, 1));
        assert_eq!((start, end), (ymd(2024, 1, 29), ymd(2024, 2, 4)));

        let records = resolve_range(&mut src, start, end, "btc");
        assert_eq!(records.len(), 7);
        assert_eq!(src.requested, vec![ymd(2024, 1, 1), ymd(2024, 2, 1)]);
        assert!(records.windows(2).all(|w| w[0].date < w[1].date));

        let mut fresh = Generator::seeded().with_today(ymd(2025, 1, 1));
        assert_eq!(records[0], fresh.generate_day(ymd(2024, 1, 29), "btc"));
        assert_eq!(records[6], fresh.generate_day(ymd(2024, 2, 4), "btc"));
    }

    #[test]
    fn future_days_are_excluded_from_range() {
        let mut src = recording(ymd(2024, 3, 13));
        let (start, end) = period_bounds(ViewMode::Week, ymd(2024, 3, 13));
        let records = resolve_range(&mut src, start, end, "eth");
        // Mon 11, Tue 12, Wed 13
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.unavailable));
    }

    #[test]
    fn month_entirely_in_future_has_no_summary() {
        let mut src = recording(ymd(2024, 3, 13));
        assert!(summarize_period(&mut src, ViewMode::Month, ymd(2024, 5, 2), "btc").is_none());
    }

    #[test]
    fn day_summary_equals_record() {
        let mut src = recording(ymd(2025, 1, 1));
        let day = ymd(2024, 8, 8);
        let summary = summarize_period(&mut src, ViewMode::Day, day, "tsla").unwrap();
        let record = Generator::seeded().with_today(ymd(2025, 1, 1)).generate_day(day, "tsla");
        assert_eq!(summary.performance, record.performance);
        assert_eq!(summary.price, record.price);
    }

    #[test]
    fn span_with_one_available_day_reports_day_percent() {
        // Monday 2024-05-13 opens its week, 2024-05-01 opens its month
        for (today, view) in [
            (ymd(2024, 5, 13), ViewMode::Week),
            (ymd(2024, 5, 1), ViewMode::Month),
        ] {
            let mut src = recording(today);
            let day = summarize_period(&mut src, ViewMode::Day, today, "btc").unwrap();
            let span = summarize_period(&mut src, view, today, "btc").unwrap();
            assert_eq!(span.days, 1, "{view}");
            assert_eq!(span.performance_pct(), day.performance_pct(), "{view}");
            assert!(span.performance_pct().abs() < 2.5, "{view}");
        }
    }

    #[test]
    fn multi_day_span_percent_is_fraction_times_hundred() {
        let mut src = recording(ymd(2025, 1, 1));
        let span = summarize_period(&mut src, ViewMode::Week, ymd(2024, 5, 15), "btc").unwrap();
        assert_eq!(span.days, 7);
        let expected = (span.price.close - span.price.open) / span.price.open * 100.0;
        assert!((span.performance_pct() - expected).abs() < 1e-9);
    }

    #[test]
    fn inverted_range_is_empty() {
        let mut src = recording(ymd(2025, 1, 1));
        assert!(resolve_range(&mut src, ymd(2024, 2, 2), ymd(2024, 2, 1), "btc").is_empty());
        assert!(src.requested.is_empty());
    }

    #[test]
    fn stepping_periods() {
        assert_eq!(step(ViewMode::Day, ymd(2024, 3, 1), Direction::Prev), ymd(2024, 2, 29));
        assert_eq!(step(ViewMode::Week, ymd(2024, 12, 30), Direction::Next), ymd(2025, 1, 6));
        assert_eq!(step(ViewMode::Month, ymd(2024, 1, 31), Direction::Next), ymd(2024, 2, 29));
        assert_eq!(step(ViewMode::Month, ymd(2024, 3, 31), Direction::Prev), ymd(2024, 2, 29));
    }

    #[test]
    fn titles() {
        let day = ymd(2026, 10, 16);
        assert_eq!(period_title(ViewMode::Day, day), "October 16, 2026");
        assert_eq!(period_title(ViewMode::Week, day), "Week of Oct 12");
        assert_eq!(period_title(ViewMode::Month, day), "October 2026");
    }

    #[test]
    fn calendar_grid_is_six_iso_weeks() {
        let weeks = calendar_weeks(ymd(2024, 9, 18));
        assert_eq!(weeks.len(), 6);
        // 2024-09-01 is a Sunday, so the grid opens on Mon Aug 26
        assert_eq!(weeks[0][0], ymd(2024, 8, 26));
        assert_eq!(weeks[0][6], ymd(2024, 9, 1));
        assert_eq!(weeks[5][6], ymd(2024, 10, 6));
        assert!(weeks.iter().all(|w| w[0].weekday() == chrono::Weekday::Mon));
    }
}
