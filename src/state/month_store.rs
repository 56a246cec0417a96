use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::aggregator::MonthSource;
use crate::generator::{Generator, MonthData, RandomSource};
use crate::types::DailyRecord;

/// Cache key: (year, month, instrument).
type MonthKey = (i32, u32, String);

fn month_key(anchor: NaiveDate, instrument: &str) -> MonthKey {
    (anchor.year(), anchor.month(), instrument.to_string())
}

#[derive(Debug)]
struct CachedMonth {
    data: MonthData,
    /// "Today" when `data` was generated. Sentinels after it go stale once the date moves.
    generated_on: NaiveDate,
}

// ---------------------------------------------------------------------------
// MonthStore
// ---------------------------------------------------------------------------

/// Generated months keyed by (month, instrument).
///
/// A day is generated at most once per store. That keeps unseeded draws stable
/// across redraws. When the local date advances, only the days that were still
/// unavailable get generated and spliced in. Days already shown are never replaced.
pub struct MonthStore<S> {
    generator: Generator<S>,
    months: HashMap<MonthKey, CachedMonth>,
}

impl<S: RandomSource> MonthStore<S> {
    pub fn new(generator: Generator<S>) -> Self {
        Self {
            generator,
            months: HashMap::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.generator.today()
    }

    /// Full month for `anchor`, generating or refreshing it as needed.
    pub fn month(&mut self, anchor: NaiveDate, instrument: &str) -> &MonthData {
        let today = self.generator.today();
        let key = month_key(anchor, instrument);

        let stale = self
            .months
            .get(&key)
            .is_some_and(|m| m.generated_on < today && m.data.values().any(|r| r.unavailable));

        if stale {
            let fresh = self.generator.generate_month(anchor, instrument);
            if let Some(cached) = self.months.get_mut(&key) {
                let mut filled = 0usize;
                for (day, record) in fresh {
                    if let Some(slot) = cached.data.get_mut(&day) {
                        if slot.unavailable && !record.unavailable {
                            *slot = record;
                            filled += 1;
                        }
                    }
                }
                cached.generated_on = today;
                debug!(year = key.0, month = key.1, instrument, filled, "filled days that became available");
            }
        }

        let generator = &mut self.generator;
        &self
            .months
            .entry(key)
            .or_insert_with(|| CachedMonth {
                data: generator.generate_month(anchor, instrument),
                generated_on: today,
            })
            .data
    }

    pub fn day(&mut self, date: NaiveDate, instrument: &str) -> Option<&DailyRecord> {
        self.month(date, instrument).get(&date)
    }

    pub fn cached_month_count(&self) -> usize {
        self.months.len()
    }
}

impl<S: RandomSource> MonthSource for MonthStore<S> {
    fn month_data(&mut self, anchor: NaiveDate, instrument: &str) -> MonthData {
        self.month(anchor, instrument).clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
