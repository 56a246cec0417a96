use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::types::{DrawMode, ViewMode};

pub const DEFAULT_INSTRUMENT: &str = "btc";

pub const DEFAULT_TUI_LOG_FILE: &str = "seasonality-tui.log";

/// Number of synthetic trailing history points attached to every available day.
pub const HISTORY_MONTHS: usize = 12;

/// Fixed short labels for the history points, January first.
pub const MONTH_LABELS: [&str; HISTORY_MONTHS] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Rows in the calendar grid. Always six so the layout never jumps between months.
pub const CALENDAR_WEEKS: usize = 6;

/// Raw liquidity is in [0,1); the display unit is millions.
pub const LIQUIDITY_DISPLAY_SCALE: f64 = 1000.0;

/// Scales for the per-day draws. Each draw `r` is in [0,1).
pub mod draw_scales {
    /// `performance = (r - 0.5) * PERFORMANCE_SPAN`, in percentage points.
    pub const PERFORMANCE_SPAN: f64 = 5.0;
    /// `open = OPEN_BASE + r * OPEN_SPAN`. Keeps open strictly positive.
    pub const OPEN_BASE: f64 = 100.0;
    pub const OPEN_SPAN: f64 = 10.0;
    /// Max distance of high/low beyond the open/close body.
    pub const WICK_SPAN: f64 = 2.0;
    /// History volatility in [HISTORY_VOL_BASE, HISTORY_VOL_BASE + HISTORY_VOL_SPAN).
    pub const HISTORY_VOL_BASE: f64 = 0.1;
    pub const HISTORY_VOL_SPAN: f64 = 0.8;
    /// History liquidity in [HISTORY_LIQ_BASE, HISTORY_LIQ_BASE + HISTORY_LIQ_SPAN).
    pub const HISTORY_LIQ_BASE: f64 = 200.0;
    pub const HISTORY_LIQ_SPAN: f64 = 800.0;
}

/// Calendar shading thresholds on daily volatility.
pub mod heat_thresholds {
    pub const MEDIUM_ABOVE: f64 = 0.3;
    pub const HIGH_ABOVE: f64 = 0.7;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Instrument symbol (INSTRUMENT). Any string is accepted, the dashboard cycles the known ones.
    pub instrument: String,
    /// Initial view (VIEW_MODE): day, week or month.
    pub view_mode: ViewMode,
    /// Selected day (ANCHOR_DATE, yyyy-MM-dd). None means today in local time.
    pub anchor_date: Option<NaiveDate>,
    /// Seeded (reproducible) or unseeded draws (DRAW_MODE).
    pub draw_mode: DrawMode,
    /// Where JSON exports are written (EXPORT_DIR).
    pub export_dir: PathBuf,
    /// Log destination for the terminal dashboard (SEASONALITY_LOG_FILE).
    pub tui_log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Missing keys take their defaults.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let view_mode = match var("VIEW_MODE") {
            Some(v) => v.parse::<ViewMode>().map_err(AppError::Config)?,
            None => ViewMode::Day,
        };
        let draw_mode = match var("DRAW_MODE") {
            Some(v) => v.parse::<DrawMode>().map_err(AppError::Config)?,
            None => DrawMode::Seeded,
        };
        let anchor_date = match var("ANCHOR_DATE").filter(|s| !s.trim().is_empty()) {
            Some(v) => Some(NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::Config(format!("ANCHOR_DATE must be yyyy-MM-dd, got {v:?}"))
            })?),
            None => None,
        };

        Ok(Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            instrument: var("INSTRUMENT")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string()),
            view_mode,
            anchor_date,
            draw_mode,
            export_dir: var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            tui_log_file: var("SEASONALITY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TUI_LOG_FILE)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = Config::from_vars(lookup(&[])).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.instrument, "btc");
        assert_eq!(cfg.view_mode, ViewMode::Day);
        assert_eq!(cfg.draw_mode, DrawMode::Seeded);
        assert!(cfg.anchor_date.is_none());
        assert_eq!(cfg.export_dir, PathBuf::from("."));
    }

    #[test]
    fn parses_all_fields() {
        let cfg = Config::from_vars(lookup(&[
            ("INSTRUMENT", " ETH "),
            ("VIEW_MODE", "week"),
            ("DRAW_MODE", "unseeded"),
            ("ANCHOR_DATE", "2024-02-29"),
            ("EXPORT_DIR", "/tmp/exports"),
        ]))
        .unwrap();
        assert_eq!(cfg.instrument, "eth");
        assert_eq!(cfg.view_mode, ViewMode::Week);
        assert_eq!(cfg.draw_mode, DrawMode::Unseeded);
        assert_eq!(cfg.anchor_date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_vars(lookup(&[("VIEW_MODE", "year")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(lookup(&[("DRAW_MODE", "chaos")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(lookup(&[("ANCHOR_DATE", "16/10/2026")])),
            Err(AppError::Config(_))
        ));
    }
}
