use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::aggregator::{period_title, summarize_period, MonthSource};
use crate::error::{AppError, Result};
use crate::types::{DailyRecord, PeriodSummary, ViewMode};

/// What gets written for a period: the full record for a day (history included),
/// the aggregate otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PeriodExport {
    Day(DailyRecord),
    Span(PeriodSummary),
}

/// Export payload for the `view` period containing `day`. `None` when nothing is available.
pub fn build_export<M: MonthSource>(
    months: &mut M,
    view: ViewMode,
    day: NaiveDate,
    instrument: &str,
) -> Option<PeriodExport> {
    match view {
        ViewMode::Day => months
            .month_data(day, instrument)
            .remove(&day)
            .filter(|r| !r.unavailable)
            .map(PeriodExport::Day),
        ViewMode::Week | ViewMode::Month => {
            summarize_period(months, view, day, instrument).map(PeriodExport::Span)
        }
    }
}

/// `market_data_<title with spaces as underscores>.json`
pub fn export_file_name(title: &str) -> String {
    format!("market_data_{}.json", title.replace(' ', "_"))
}

/// Writes `payload` as pretty JSON into `dir`, returning the file path.
pub fn write_export<T: Serialize>(dir: &Path, title: &str, payload: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(title));
    let json = serde_json::to_string_pretty(payload)?;
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "export written");
    Ok(path)
}

/// Builds and writes the export for a period in one go.
pub fn export_period<M: MonthSource>(
    months: &mut M,
    dir: &Path,
    view: ViewMode,
    day: NaiveDate,
    instrument: &str,
) -> Result<PathBuf> {
    let title = period_title(view, day);
    let payload = build_export(months, view, day, instrument)
        .ok_or_else(|| AppError::NoData(format!("{title} ({instrument})")))?;
    write_export(dir, &title, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("seasonality-{tag}-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(export_file_name("Week of Oct 12"), "market_data_Week_of_Oct_12.json");
    }

    #[test]
    fn day_export_keeps_history_and_iso_date() {
        let mut g = Generator::seeded().with_today(ymd(2025, 1, 1));
        let payload = build_export(&mut g, ViewMode::Day, ymd(2024, 4, 2), "btc").unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["date"], "2024-04-02");
        assert_eq!(json["history"].as_array().unwrap().len(), 12);
        assert!(json["price"]["high"].as_f64().unwrap() >= json["price"]["open"].as_f64().unwrap());
    }

    #[test]
    fn month_export_is_flat_summary() {
        let mut g = Generator::seeded().with_today(ymd(2025, 1, 1));
        let payload = build_export(&mut g, ViewMode::Month, ymd(2024, 4, 2), "btc").unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("date").is_none());
        assert!(json["liquidity"].as_f64().unwrap() > 1.0, "30 days summed");
        assert!(json["price"]["low"].is_number());
    }

    #[test]
    fn span_export_carries_day_count() {
        // Monday 2024-05-13 as today: its week has one available day
        let mut g = Generator::seeded().with_today(ymd(2024, 5, 13));
        let day = build_export(&mut g, ViewMode::Day, ymd(2024, 5, 13), "btc").unwrap();
        let week = build_export(&mut g, ViewMode::Week, ymd(2024, 5, 13), "btc").unwrap();
        let day = serde_json::to_value(&day).unwrap();
        let week = serde_json::to_value(&week).unwrap();
        assert_eq!(week["days"], 1);
        assert_eq!(week["performance"], day["performance"]);

        let full = build_export(&mut g, ViewMode::Week, ymd(2024, 5, 8), "btc").unwrap();
        let full = serde_json::to_value(&full).unwrap();
        assert_eq!(full["days"], 7);
        let (open, close) = (
            full["price"]["open"].as_f64().unwrap(),
            full["price"]["close"].as_f64().unwrap(),
        );
        let performance = full["performance"].as_f64().unwrap();
        assert!((performance - (close - open) / open).abs() < 1e-12);
    }

    #[test]
    fn future_day_has_nothing_to_export() {
        let mut g = Generator::seeded().with_today(ymd(2024, 4, 1));
        assert!(build_export(&mut g, ViewMode::Day, ymd(2024, 4, 2), "btc").is_none());
        let dir = temp_dir("none");
        let err = export_period(&mut g, &dir, ViewMode::Day, ymd(2024, 4, 2), "btc").unwrap_err();
        assert!(matches!(err, AppError::NoData(_)));
    }

    #[test]
    fn writes_pretty_json_file() {
        let mut g = Generator::seeded().with_today(ymd(2025, 1, 1));
        let dir = temp_dir("write");
        let path = export_period(&mut g, &dir, ViewMode::Week, ymd(2024, 4, 2), "eth").unwrap();
        assert_eq!(path.file_name().unwrap(), "market_data_Week_of_Apr_1.json");
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("\n  \"volatility\""));
        let _ = std::fs::remove_dir_all(dir);
    }
}
