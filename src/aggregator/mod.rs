pub mod period;
pub mod range;

pub use period::aggregate;
pub use range::{
    calendar_weeks, period_bounds, period_title, resolve_range, step, summarize_period, week_start,
    Direction, MonthSource,
};
