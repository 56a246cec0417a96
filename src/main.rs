use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use seasonality::aggregator::{period_bounds, period_title, summarize_period};
use seasonality::config::{Config, LIQUIDITY_DISPLAY_SCALE};
use seasonality::error::Result;
use seasonality::export::export_period;
use seasonality::generator::Generator;
use seasonality::state::MonthStore;
use seasonality::types::{instrument_label, DrawMode, HeatLevel, PeriodSummary, ViewMode};

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: Config) -> Result<()> {
    let mut store = MonthStore::new(Generator::for_mode(cfg.draw_mode));
    let day = cfg.anchor_date.unwrap_or_else(|| store.today());
    let instrument = cfg.instrument.as_str();

    if cfg.draw_mode == DrawMode::Unseeded {
        warn!("DRAW_MODE=unseeded: values are not reproducible between runs");
    }
    if day > store.today() {
        warn!("{day} is in the future: no data will be available");
    }

    // --- Month overview: calendar shading counts ---
    let month = store.month(day, instrument);
    let (mut low, mut medium, mut high, mut unavailable) = (0, 0, 0, 0);
    for record in month.values() {
        if record.unavailable {
            unavailable += 1;
            continue;
        }
        match HeatLevel::from_volatility(record.volatility) {
            HeatLevel::Low => low += 1,
            HeatLevel::Medium => medium += 1,
            HeatLevel::High => high += 1,
        }
    }
    info!(
        instrument = %instrument_label(instrument),
        month = %day.format("%Y-%m"),
        low, medium, high, unavailable,
        "Month heat: {low} low | {medium} medium | {high} high | {unavailable} unavailable",
    );

    // --- Selected period ---
    let title = period_title(cfg.view_mode, day);
    let (start, end) = period_bounds(cfg.view_mode, day);
    match summarize_period(&mut store, cfg.view_mode, day, instrument) {
        Some(summary) => log_summary(&title, cfg.view_mode, &summary),
        None => warn!(%start, %end, "No available days in {title}"),
    }

    let path = export_period(&mut store, &cfg.export_dir, cfg.view_mode, day, instrument)?;
    info!("Exported {title} to {}", path.display());
    Ok(())
}

fn log_summary(title: &str, view: ViewMode, s: &PeriodSummary) {
    let performance_pct = s.performance_pct();
    info!(
        event = "PERIOD_SUMMARY",
        view = %view,
        days = s.days,
        performance_pct,
        volatility = s.volatility,
        liquidity = s.liquidity,
        open = s.price.open,
        high = s.price.high,
        low = s.price.low,
        close = s.price.close,
        "{title} | perf: {:+.2}% | vol: {:.1}% | liq: {:.0}M | O {:.2} H {:.2} L {:.2} C {:.2}",
        performance_pct,
        s.volatility * 100.0,
        s.liquidity * LIQUIDITY_DISPLAY_SCALE,
        s.price.open, s.price.high, s.price.low, s.price.close,
    );
}
