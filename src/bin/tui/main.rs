mod app;

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Sparkline, Table},
    Frame, Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{format_liquidity, format_percent, format_performance, format_price, AppState, CalendarCell};
use seasonality::aggregator::Direction;
use seasonality::config::Config;
use seasonality::generator::Generator;
use seasonality::types::{HeatLevel, Trend, ViewMode, INSTRUMENTS};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> io::Result<()> {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // stdout belongs to the terminal UI
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.tui_log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    info!(instrument = %cfg.instrument, view = %cfg.view_mode, draw_mode = %cfg.draw_mode, "dashboard starting");

    let mut app = AppState::new(
        Generator::for_mode(cfg.draw_mode),
        cfg.instrument.clone(),
        cfg.view_mode,
        cfg.anchor_date,
        cfg.export_dir.clone(),
    );

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> io::Result<()> {
    // Picks up a date rollover while the dashboard stays open.
    let tick = Duration::from_secs(60);

    loop {
        terminal.draw(|f| render(f, app))?;

        if !event::poll(tick)? {
            app.refresh();
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
            KeyCode::Left | KeyCode::Char('h') => {
                app.move_days(-1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.move_days(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.move_days(-7);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.move_days(7);
            }
            KeyCode::Char('[') => {
                app.step_period(Direction::Prev);
            }
            KeyCode::Char(']') => {
                app.step_period(Direction::Next);
            }
            KeyCode::PageUp | KeyCode::Char('<') => {
                app.step_month(Direction::Prev);
            }
            KeyCode::PageDown | KeyCode::Char('>') => {
                app.step_month(Direction::Next);
            }
            KeyCode::Char('t') => app.jump_today(),
            KeyCode::Char('v') | KeyCode::Tab => app.cycle_view(),
            KeyCode::Char('i') => app.cycle_instrument(),
            KeyCode::Char('e') => app.export(),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    // Outer vertical split: header | body | footer
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " Market Seasonality  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ];
    for instrument in INSTRUMENTS.iter() {
        let style = if instrument.symbol == app.instrument {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{} ", instrument.label), style));
    }
    if !INSTRUMENTS.iter().any(|i| i.symbol == app.instrument) {
        spans.push(Span::styled(
            format!("{} ", app.instrument_label()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(" │  "));
    for view in [ViewMode::Day, ViewMode::Week, ViewMode::Month] {
        let style = if view == app.view {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {view} "), style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, area: Rect) {
    // Horizontal split: calendar (60%) | insights panel (40%)
    let halves = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_calendar(f, app, halves[0]);
    render_panel(f, app, halves[1]);
}

fn heat_color(level: HeatLevel) -> Color {
    match level {
        HeatLevel::Low => Color::Green,
        HeatLevel::Medium => Color::Yellow,
        HeatLevel::High => Color::Red,
    }
}

fn liquidity_gauge(liquidity: f64, width: usize) -> String {
    let filled = ((liquidity * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn calendar_cell(cell: &CalendarCell) -> Cell<'static> {
    let day = cell.date.format("%-d").to_string();

    let (text, mut style) = match (&cell.record, cell.in_month) {
        (Some(r), true) if !r.unavailable => {
            let arrow = match Trend::from_performance(r.performance) {
                Trend::Up => "▲",
                Trend::Down => "▼",
            };
            let text = Text::from(vec![
                Line::from(format!("{day:<3}{arrow:>3}")),
                Line::from(liquidity_gauge(r.liquidity, 6)),
            ]);
            let bg = heat_color(HeatLevel::from_volatility(r.volatility));
            (text, Style::default().fg(Color::Black).bg(bg))
        }
        (Some(_), true) => (
            Text::from(vec![Line::from(format!("{day:<3}  ⊘")), Line::from("")]),
            Style::default().fg(Color::DarkGray),
        ),
        _ => (
            Text::from(vec![Line::from(day), Line::from("")]),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        ),
    };

    if cell.today {
        style = style.add_modifier(Modifier::BOLD);
    }
    if cell.selected {
        style = style.add_modifier(Modifier::REVERSED | Modifier::UNDERLINED);
    }
    Cell::from(text).style(style)
}

fn render_calendar(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .weeks
        .iter()
        .map(|week| Row::new(week.iter().map(calendar_cell)).height(2).bottom_margin(1))
        .collect();

    let title = format!(
        " {} · {} ",
        app.displayed_month().format("%B %Y"),
        app.instrument_label()
    );
    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(
                    title,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

    f.render_widget(table, area);
}

fn render_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" ◀ {} ▶ ", app.title()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (Some(summary), Some(perf_pct)) = (app.summary, app.performance_pct()) else {
        let msg = Paragraph::new(vec![
            Line::from(Span::styled("Market Insights", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("No data for this period. Select a past date on the calendar,"),
            Line::from("or use the controls to change the instrument or view."),
        ]);
        f.render_widget(msg, inner);
        return;
    };

    let show_history = app.view == ViewMode::Day
        && app.selected_record.as_ref().is_some_and(|r| !r.history.is_empty());
    let constraints: Vec<Constraint> = if show_history {
        vec![
            Constraint::Length(4),  // metrics
            Constraint::Length(10), // price action
            Constraint::Length(6),  // history volatility
            Constraint::Min(6),     // history liquidity
        ]
    } else {
        vec![Constraint::Length(4), Constraint::Min(10)]
    };
    let parts = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints(constraints)
        .split(inner);

    let perf_color = match Trend::from_performance(perf_pct) {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
    };
    let metrics = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Detailed metrics for the selected {}", app.view),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::raw("Performance "),
            Span::styled(
                format_performance(perf_pct),
                Style::default().fg(perf_color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   Volatility "),
            Span::styled(
                format_percent(summary.volatility),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Liquidity "),
            Span::styled(format_liquidity(summary.liquidity), Style::default().fg(Color::Magenta)),
        ]),
    ]);
    f.render_widget(metrics, parts[0]);

    render_price_action(f, &summary.price, parts[1]);

    if show_history {
        if let Some(record) = &app.selected_record {
            render_history(f, record, parts[2], parts[3]);
        }
    }
}

fn render_price_action(f: &mut Frame, price: &seasonality::types::PriceBar, area: Rect) {
    // Bars are drawn above a floor just under the low so differences stay visible.
    let floor = (price.low - 1.0).max(0.0);
    let bars: Vec<Bar> = [
        ("Open", price.open),
        ("High", price.high),
        ("Low", price.low),
        ("Close", price.close),
    ]
    .into_iter()
    .map(|(name, value)| {
        Bar::default()
            .value(((value - floor) * 100.0).round().max(0.0) as u64)
            .label(Line::from(name))
            .text_value(format_price(value))
    })
    .collect();

    let chart = BarChart::default()
        .block(Block::default().title(Span::styled(
            "Price Action",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}

fn render_history(f: &mut Frame, record: &seasonality::types::DailyRecord, vol_area: Rect, liq_area: Rect) {
    let vols: Vec<u64> = record
        .history
        .iter()
        .map(|h| (h.volatility * 1000.0).round() as u64)
        .collect();
    let sparkline = Sparkline::default()
        .block(Block::default().title(Span::styled(
            "Historical Volatility (12m)",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .data(&vols)
        .max(1000)
        .style(Style::default().fg(Color::Blue));
    f.render_widget(sparkline, vol_area);

    let bars: Vec<Bar> = record
        .history
        .iter()
        .map(|h| {
            Bar::default()
                .value(h.liquidity.round() as u64)
                .label(Line::from(h.month.clone()))
                .text_value(format!("{:.0}", h.liquidity))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(Span::styled(
            "Historical Liquidity (12m, M)",
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(chart, liq_area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[←→↑↓] ", Style::default().fg(Color::Yellow)),
        Span::raw("day  "),
        Span::styled("[ [ ] ] ", Style::default().fg(Color::Yellow)),
        Span::raw("period  "),
        Span::styled("[< >] ", Style::default().fg(Color::Yellow)),
        Span::raw("month  "),
        Span::styled("[v] ", Style::default().fg(Color::Yellow)),
        Span::raw("view  "),
        Span::styled("[i] ", Style::default().fg(Color::Yellow)),
        Span::raw("instrument  "),
        Span::styled("[t] ", Style::default().fg(Color::Yellow)),
        Span::raw("today  "),
        Span::styled("[e] ", Style::default().fg(Color::Yellow)),
        Span::raw("export  "),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::DarkGray)));
    }
    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
