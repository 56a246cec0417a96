use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use tracing::{info, warn};

use seasonality::aggregator::{calendar_weeks, period_title, step, summarize_period, Direction};
use seasonality::config::LIQUIDITY_DISPLAY_SCALE;
use seasonality::export::export_period;
use seasonality::generator::{first_of_month, Generator, RandomSource};
use seasonality::state::MonthStore;
use seasonality::types::{instrument_label, DailyRecord, PeriodSummary, ViewMode, INSTRUMENTS};

// ---------------------------------------------------------------------------
// Calendar cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CalendarCell {
    pub date: NaiveDate,
    /// False for leading/trailing days of the adjacent months. Those carry no record.
    pub in_month: bool,
    pub record: Option<DailyRecord>,
    pub selected: bool,
    pub today: bool,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

pub struct AppState {
    store: MonthStore<Box<dyn RandomSource>>,
    pub instrument: String,
    pub view: ViewMode,
    pub selected: NaiveDate,
    pub today: NaiveDate,
    /// Record for the selected day. None when it is unavailable.
    pub selected_record: Option<DailyRecord>,
    pub summary: Option<PeriodSummary>,
    pub weeks: Vec<[CalendarCell; 7]>,
    pub status: Option<String>,
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        generator: Generator<Box<dyn RandomSource>>,
        instrument: String,
        view: ViewMode,
        selected: Option<NaiveDate>,
        export_dir: PathBuf,
    ) -> Self {
        let store = MonthStore::new(generator);
        let today = store.today();
        let mut app = Self {
            store,
            instrument,
            view,
            selected: selected.unwrap_or(today),
            today,
            selected_record: None,
            summary: None,
            weeks: Vec::new(),
            status: None,
            export_dir,
        };
        app.refresh();
        app
    }

    /// Recompute everything derived from (instrument, view, selected day).
    pub fn refresh(&mut self) {
        self.today = self.store.today();
        let instrument = self.instrument.clone();

        self.selected_record = self
            .store
            .day(self.selected, &instrument)
            .filter(|r| !r.unavailable)
            .cloned();

        self.summary = summarize_period(&mut self.store, self.view, self.selected, &instrument);

        let month = self.store.month(self.selected, &instrument).clone();
        let displayed = self.selected.month();
        self.weeks = calendar_weeks(self.selected)
            .into_iter()
            .map(|week| {
                week.map(|date| {
                    let in_month = date.month() == displayed;
                    CalendarCell {
                        date,
                        in_month,
                        record: if in_month { month.get(&date).cloned() } else { None },
                        selected: date == self.selected,
                        today: date == self.today,
                    }
                })
            })
            .collect();
    }

    pub fn title(&self) -> String {
        period_title(self.view, self.selected)
    }

    pub fn instrument_label(&self) -> String {
        instrument_label(&self.instrument)
    }

    pub fn displayed_month(&self) -> NaiveDate {
        first_of_month(self.selected)
    }

    /// Select `day`. Future days are refused and leave the selection unchanged.
    pub fn select(&mut self, day: NaiveDate) -> bool {
        if day > self.store.today() {
            self.status = Some("No data available for future dates".to_string());
            return false;
        }
        self.selected = day;
        self.status = None;
        self.refresh();
        true
    }

    /// Calendar movement by whole days (arrow keys).
    pub fn move_days(&mut self, days: i64) -> bool {
        match self.selected.checked_add_signed(chrono::Duration::days(days)) {
            Some(day) => self.select(day),
            None => false,
        }
    }

    /// Previous/next period of the current view (panel chevrons).
    pub fn step_period(&mut self, direction: Direction) -> bool {
        self.select(step(self.view, self.selected, direction))
    }

    pub fn step_month(&mut self, direction: Direction) -> bool {
        self.select(step(ViewMode::Month, self.selected, direction))
    }

    pub fn jump_today(&mut self) {
        let today = self.store.today();
        self.select(today);
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.refresh();
    }

    /// Advance to the next known instrument. Unknown symbols restart at the first.
    pub fn cycle_instrument(&mut self) {
        let next = INSTRUMENTS
            .iter()
            .position(|i| i.symbol == self.instrument)
            .map_or(0, |i| (i + 1) % INSTRUMENTS.len());
        self.instrument = INSTRUMENTS[next].symbol.to_string();
        info!(instrument = %self.instrument, "instrument changed");
        self.refresh();
    }

    pub fn export(&mut self) {
        let instrument = self.instrument.clone();
        match export_period(&mut self.store, &self.export_dir, self.view, self.selected, &instrument) {
            Ok(path) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => {
                warn!("export failed: {e}");
                self.status = Some(format!("Export failed: {e}"));
            }
        }
    }

    pub fn performance_pct(&self) -> Option<f64> {
        self.summary.map(|s| s.performance_pct())
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// US-dollar price with thousands separators.
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Fraction in [0,1) as percent with one decimal.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_performance(pct: f64) -> String {
    format!("{pct:+.2}%")
}

/// Raw liquidity in display millions.
pub fn format_liquidity(raw: f64) -> String {
    format!("{:.0}M", raw * LIQUIDITY_DISPLAY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app(today: NaiveDate, view: ViewMode) -> AppState {
        let generator: Generator<Box<dyn RandomSource>> =
            Generator::for_mode(seasonality::types::DrawMode::Seeded).with_today(today);
        AppState::new(generator, "btc".to_string(), view, None, std::env::temp_dir())
    }

    #[test]
    fn starts_on_today_with_data() {
        let a = app(ymd(2024, 5, 15), ViewMode::Day);
        assert_eq!(a.selected, ymd(2024, 5, 15));
        assert!(a.selected_record.is_some());
        assert!(a.summary.is_some());
        assert_eq!(a.weeks.len(), 6);
    }

    #[test]
    fn future_selection_is_refused() {
        let mut a = app(ymd(2024, 5, 15), ViewMode::Day);
        assert!(!a.move_days(1));
        assert_eq!(a.selected, ymd(2024, 5, 15));
        assert!(a.status.is_some());
        assert!(a.move_days(-7));
        assert_eq!(a.selected, ymd(2024, 5, 8));
    }

    #[test]
    fn calendar_marks_outside_and_future_days() {
        let a = app(ymd(2024, 5, 15), ViewMode::Day);
        let cells: Vec<&CalendarCell> = a.weeks.iter().flatten().collect();
        // May 2024 opens on a Wednesday: Mon 29 and Tue 30 April lead the grid
        assert!(!cells[0].in_month && cells[0].record.is_none());
        assert!(cells.iter().any(|c| c.selected && c.today));
        let future = cells.iter().find(|c| c.date == ymd(2024, 5, 16)).unwrap();
        assert!(future.record.as_ref().unwrap().unavailable);
    }

    #[test]
    fn month_step_crosses_into_previous_month() {
        let mut a = app(ymd(2024, 5, 15), ViewMode::Month);
        assert!(a.step_period(Direction::Prev));
        assert_eq!(a.displayed_month(), ymd(2024, 4, 1));
        assert_eq!(a.title(), "April 2024");
        assert!(a.step_month(Direction::Next));
        assert!(!a.step_month(Direction::Next), "June 2024 is after today");
    }

    #[test]
    fn single_day_week_and_month_show_day_percent() {
        // Monday: the week so far is one day
        let day = app(ymd(2024, 5, 13), ViewMode::Day).performance_pct().unwrap();
        let week = app(ymd(2024, 5, 13), ViewMode::Week).performance_pct().unwrap();
        assert_eq!(week, day);

        // The 1st: the month so far is one day
        let day = app(ymd(2024, 5, 1), ViewMode::Day).performance_pct().unwrap();
        let month = app(ymd(2024, 5, 1), ViewMode::Month).performance_pct().unwrap();
        assert_eq!(month, day);
        assert!(month.abs() < 2.5);
    }

    #[test]
    fn cycling_instrument_changes_data() {
        let mut a = app(ymd(2024, 5, 15), ViewMode::Week);
        let before = a.summary;
        a.cycle_instrument();
        assert_eq!(a.instrument, "eth");
        assert_ne!(before, a.summary);
        a.cycle_view();
        assert_eq!(a.view, ViewMode::Month);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_price(104.567), "$104.57");
        assert_eq!(format_price(1234567.0), "$1,234,567.00");
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_performance(-1.234), "-1.23%");
        assert_eq!(format_performance(0.5), "+0.50%");
        assert_eq!(format_liquidity(0.4567), "457M");
    }
}
