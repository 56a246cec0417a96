use crate::types::{DailyRecord, PeriodSummary, PriceBar};

/// Roll an ordered run of available daily records into one summary.
///
/// Returns `None` for an empty slice. The caller filters out unavailable days;
/// they are not skipped here.
///
/// - volatility is the mean (a level quantity)
/// - liquidity is the sum (a flow quantity)
/// - performance is first open to last close, `(close - open) / open`, and 0 if that open is 0
/// - high and low are the extremes over every record, not the boundary days
///
/// A single record summarizes to its own metrics, so its performance stays in
/// percentage points. `days` records which unit applies.
pub fn aggregate(records: &[DailyRecord]) -> Option<PeriodSummary> {
    let (first, last) = match records {
        [] => return None,
        [only] => {
            return Some(PeriodSummary {
                volatility: only.volatility,
                liquidity: only.liquidity,
                performance: only.performance,
                price: only.price,
                days: 1,
            })
        }
        [first, .., last] => (first, last),
    };

    let total_volatility: f64 = records.iter().map(|r| r.volatility).sum();
    let total_liquidity: f64 = records.iter().map(|r| r.liquidity).sum();
    let high = records
        .iter()
        .map(|r| r.price.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let low = records
        .iter()
        .map(|r| r.price.low)
        .fold(f64::INFINITY, f64::min);

    let open = first.price.open;
    let close = last.price.close;
    let performance = if open == 0.0 { 0.0 } else { (close - open) / open };

    Some(PeriodSummary {
        volatility: total_volatility / records.len() as f64,
        liquidity: total_liquidity,
        performance,
        price: PriceBar {
            open,
            high,
            low,
            close,
        },
        days: records.len(),
    })
}
