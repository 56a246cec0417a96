use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Instruments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    /// Seed symbol. Its character codes feed the seed key.
    pub symbol: &'static str,
    pub label: &'static str,
}

/// Instruments offered by the dashboard selector, in display order.
pub const INSTRUMENTS: [Instrument; 5] = [
    Instrument { symbol: "btc", label: "BTC/USD" },
    Instrument { symbol: "eth", label: "ETH/USD" },
    Instrument { symbol: "sol", label: "SOL/USD" },
    Instrument { symbol: "tsla", label: "TSLA" },
    Instrument { symbol: "aapl", label: "AAPL" },
];

/// Display label for a symbol; unknown symbols are shown upper-cased.
pub fn instrument_label(symbol: &str) -> String {
    INSTRUMENTS
        .iter()
        .find(|i| i.symbol == symbol)
        .map(|i| i.label.to_string())
        .unwrap_or_else(|| symbol.to_uppercase())
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Day => ViewMode::Week,
            ViewMode::Week => ViewMode::Month,
            ViewMode::Month => ViewMode::Day,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(format!("unknown view mode {other:?} (expected day, week or month)")),
        }
    }
}

/// Whether per-day draws are reproducible from the seed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Seeded,
    /// Ignores the seed. Every generation yields new values.
    Unseeded,
}

impl std::fmt::Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawMode::Seeded => write!(f, "seeded"),
            DrawMode::Unseeded => write!(f, "unseeded"),
        }
    }
}

impl std::str::FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seeded" => Ok(DrawMode::Seeded),
            "unseeded" | "random" => Ok(DrawMode::Unseeded),
            other => Err(format!("unknown draw mode {other:?} (expected seeded or unseeded)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyHistoryPoint {
    pub month: String,
    pub volatility: f64,
    pub liquidity: f64,
}

/// One calendar day of synthetic metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// In [0,1).
    pub volatility: f64,
    /// Raw, in [0,1). Multiply by `LIQUIDITY_DISPLAY_SCALE` for millions.
    pub liquidity: f64,
    /// Percentage points, in [-2.5, 2.5).
    pub performance: f64,
    pub price: PriceBar,
    pub history: Vec<MonthlyHistoryPoint>,
    pub unavailable: bool,
}

impl DailyRecord {
    /// Zero-filled sentinel for a date with no data (future dates).
    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            volatility: 0.0,
            liquidity: 0.0,
            performance: 0.0,
            price: PriceBar::default(),
            history: Vec::new(),
            unavailable: true,
        }
    }
}

/// Aggregate over a contiguous run of available daily records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Mean of daily volatility.
    pub volatility: f64,
    /// Sum of daily liquidity.
    pub liquidity: f64,
    /// `(last close - first open) / first open` as a fraction, or the day's own
    /// percentage points when `days == 1`. Use `performance_pct` for display.
    pub performance: f64,
    pub price: PriceBar,
    /// Number of daily records aggregated. Tells the unit of `performance`.
    pub days: usize,
}

impl PeriodSummary {
    /// Performance in percent regardless of how many days were aggregated.
    pub fn performance_pct(&self) -> f64 {
        if self.days == 1 {
            self.performance
        } else {
            self.performance * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Calendar shading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    /// volatility <= 0.3
    Low,
    /// volatility in (0.3, 0.7]
    Medium,
    /// volatility > 0.7
    High,
}

impl HeatLevel {
    pub fn from_volatility(volatility: f64) -> Self {
        use crate::config::heat_thresholds::*;
        if volatility > HIGH_ABOVE {
            HeatLevel::High
        } else if volatility > MEDIUM_ABOVE {
            HeatLevel::Medium
        } else {
            HeatLevel::Low
        }
    }
}

impl std::fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HeatLevel::Low => "low",
            HeatLevel::Medium => "medium",
            HeatLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Zero counts as up.
    pub fn from_performance(performance: f64) -> Self {
        if performance >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}
