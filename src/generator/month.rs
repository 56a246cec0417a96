use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate, NaiveTime, TimeZone};
use tracing::debug;

use crate::config::{draw_scales::*, HISTORY_MONTHS, MONTH_LABELS};
use crate::generator::random::{RandomSource, SineSeries, UniformSource};
use crate::types::{DailyRecord, DrawMode, MonthlyHistoryPoint, PriceBar};

/// Every day of one calendar month, ascending. Keys display as `yyyy-MM-dd`.
pub type MonthData = BTreeMap<NaiveDate, DailyRecord>;

/// ISO `yyyy-MM-dd` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Seed key
// ---------------------------------------------------------------------------

/// Sum of the instrument's UTF-16 code units. Empty symbols contribute 0.
pub fn symbol_sum(instrument: &str) -> i64 {
    instrument.encode_utf16().map(i64::from).sum()
}

/// Epoch milliseconds of `date` at midnight in `zone`.
///
/// When a DST jump skips midnight, the first instant of the day is one hour later.
pub fn midnight_millis<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    zone.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(midnight + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}

/// `midnight_millis(zone, date) + symbol_sum(instrument)`.
pub fn seed_key_in<Tz: TimeZone>(zone: &Tz, date: NaiveDate, instrument: &str) -> i64 {
    midnight_millis(zone, date) + symbol_sum(instrument)
}

/// Seed key using the local time zone.
pub fn seed_key(date: NaiveDate, instrument: &str) -> i64 {
    seed_key_in(&Local, date, instrument)
}

// ---------------------------------------------------------------------------
// Month helpers
// ---------------------------------------------------------------------------

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.day0()))
}

/// Every date in `anchor`'s calendar month, ascending.
pub fn days_of_month(anchor: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = first_of_month(anchor);
    first.iter_days().take_while(move |d| d.month() == first.month())
}

pub fn last_of_month(anchor: NaiveDate) -> NaiveDate {
    days_of_month(anchor).last().unwrap_or(anchor)
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Synthesizes daily records from an injected random source.
///
/// Dates strictly after "today" get the unavailable sentinel and consume no draws.
/// Today defaults to the local wall-clock date, read once per generation call.
pub struct Generator<S> {
    source: S,
    today: Option<NaiveDate>,
}

impl Generator<SineSeries> {
    pub fn seeded() -> Self {
        Self::new(SineSeries::default())
    }
}

impl Generator<UniformSource<rand::rngs::ThreadRng>> {
    pub fn unseeded() -> Self {
        Self::new(UniformSource::thread())
    }
}

impl Generator<Box<dyn RandomSource>> {
    pub fn for_mode(mode: DrawMode) -> Self {
        let source: Box<dyn RandomSource> = match mode {
            DrawMode::Seeded => Box::new(SineSeries::default()),
            DrawMode::Unseeded => Box::new(UniformSource::thread()),
        };
        Self::new(source)
    }
}

impl<S: RandomSource> Generator<S> {
    pub fn new(source: S) -> Self {
        Self { source, today: None }
    }

    /// Pins "today" instead of reading the wall clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn generate_day(&mut self, date: NaiveDate, instrument: &str) -> DailyRecord {
        let today = self.today();
        self.generate_day_at(date, instrument, today)
    }

    pub fn generate_month(&mut self, anchor: NaiveDate, instrument: &str) -> MonthData {
        let today = self.today();
        let data: MonthData = days_of_month(anchor)
            .map(|day| (day, self.generate_day_at(day, instrument, today)))
            .collect();
        debug!(
            month = %first_of_month(anchor).format("%Y-%m"),
            instrument,
            days = data.len(),
            unavailable = data.values().filter(|r| r.unavailable).count(),
            "generated month"
        );
        data
    }

    fn generate_day_at(&mut self, date: NaiveDate, instrument: &str, today: NaiveDate) -> DailyRecord {
        if date > today {
            return DailyRecord::unavailable(date);
        }

        let src = &mut self.source;
        src.begin_day(seed_key(date, instrument));

        let volatility = src.next_unit();
        let liquidity = src.next_unit();
        let performance = (src.next_unit() - 0.5) * PERFORMANCE_SPAN;
        let open = OPEN_BASE + src.next_unit() * OPEN_SPAN;
        let close = open + (performance / 100.0) * open;
        let high = open.max(close) + src.next_unit() * WICK_SPAN;
        let low = open.min(close) - src.next_unit() * WICK_SPAN;

        let history = MONTH_LABELS
            .iter()
            .take(HISTORY_MONTHS)
            .map(|label| MonthlyHistoryPoint {
                month: (*label).to_string(),
                volatility: src.next_unit() * HISTORY_VOL_SPAN + HISTORY_VOL_BASE,
                liquidity: src.next_unit() * HISTORY_LIQ_SPAN + HISTORY_LIQ_BASE,
            })
            .collect();

        DailyRecord {
            date,
            volatility,
            liquidity,
            performance,
            price: PriceBar {
                open,
                high,
                low,
                close,
            },
            history,
            unavailable: false,
        }
    }
}
