use chrono::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use super::TimeSeriesTable;

/// Stand-in for zero samples so `ln` stays finite.
const ZERO_FLOOR: f64 = 0.0001;
/// Multipliers outside `[1/CLAMP, CLAMP]` are replaced with 1.
const CLAMP: f64 = 1000.0;

/// Why a single `(date, region)` cell produced no growth estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("window of {0} samples is too short for a slope")]
    WindowTooShort(usize),
    #[error("sample {value} at offset {index} is negative")]
    NegativeSample { index: usize, value: f64 },
    #[error("weighted design matrix is singular")]
    Singular,
    #[error("fitted slope is not finite")]
    NonFinite,
}

/// Slope of `ln(y) = a + slope * x` for `x = 0..y.len()`, fitted by weighted
/// least squares where each squared residual is weighted by `y` (a polyfit
/// weight of `sqrt(y)`). This is the LOGEST-style exponential trend fit.
pub fn log_linear_slope(y: &[f64]) -> Result<f64, FitError> {
    if y.len() < 2 {
        return Err(FitError::WindowTooShort(y.len()));
    }
    if let Some((index, &value)) = y.iter().enumerate().find(|(_, v)| **v < 0.0) {
        return Err(FitError::NegativeSample { index, value });
    }

    // Moments are taken about the weighted means; zero-filled windows put
    // nearly all weight on a single sample.
    let s: f64 = y.iter().sum();
    let xbar = y.iter().enumerate().map(|(i, &v)| v * i as f64).sum::<f64>() / s;
    let zbar = y.iter().map(|&v| v * v.ln()).sum::<f64>() / s;

    let (mut sxx, mut sxz) = (0.0, 0.0);
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - xbar;
        sxx += v * dx * dx;
        sxz += v * dx * (v.ln() - zbar);
    }

    if !sxx.is_finite() || sxx <= 0.0 {
        return Err(FitError::Singular);
    }
    let slope = sxz / sxx;
    if slope.is_finite() {
        Ok(slope)
    } else {
        Err(FitError::NonFinite)
    }
}

/// Growth multiplier for one cell: `exp(slope)^delay`, clamped to 1 when it
/// leaves `[1/1000, 1000]`.
pub fn growth_factor(samples: &[f64], delay: i32) -> Result<f64, FitError> {
    let val = log_linear_slope(samples)?.exp().powi(delay);
    if val.is_nan() {
        return Err(FitError::NonFinite);
    }
    if val > CLAMP || val < 1.0 / CLAMP {
        return Ok(1.0);
    }
    Ok(val)
}

/// Exponential growth estimate over a trailing `window` of days.
///
/// Every region present on a date gets a trailing sample of `window` days
/// ending on that date. Missing or zero days count as [`ZERO_FLOOR`], so early
/// dates with partial history still produce a value. Cells whose fit fails
/// are omitted.
pub fn growth_rate(
    table: &TimeSeriesTable<i64>,
    window: usize,
    delay: i32,
) -> TimeSeriesTable<f64> {
    let mut out = TimeSeriesTable::new();
    let mut skipped = 0usize;
    let mut y = Vec::with_capacity(window);

    for d in table.dates() {
        for (region, _) in table.row(d) {
            y.clear();
            for i in 0..window {
                let dd = d - Duration::days((window - 1 - i) as i64);
                let v = table.get(dd, region).unwrap_or(0) as f64;
                y.push(if v == 0.0 { ZERO_FLOOR } else { v });
            }

            match growth_factor(&y, delay) {
                Ok(val) => out.insert(d, region, val),
                Err(e) => {
                    trace!(date=%d, region, error=%e, "growth fit skipped");
                    skipped += 1;
                }
            }
        }
    }

    debug!(window, delay, cells = out.len(), skipped, "growth rate computed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::day;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn exact_exponential_recovers_multiplier() {
        let y: Vec<f64> = (0..7).map(|x| 10.0 * 2f64.powi(x)).collect();
        let slope = log_linear_slope(&y).unwrap();
        assert!(approx(slope, 2f64.ln()));
        assert!(approx(growth_factor(&y, 1).unwrap(), 2.0));
        // compounded over a five day delay: 2^5
        assert!(approx(growth_factor(&y, 5).unwrap(), 32.0));
    }

    #[test]
    fn noisy_series_uses_count_weighting() {
        // numpy.polyfit(x, log(y), 1, w=sqrt(y)); an unweighted fit gives 0.34849
        let y = [3.0, 7.0, 2.0, 9.0, 14.0, 11.0, 30.0];
        let slope = log_linear_slope(&y).unwrap();
        assert!((slope - 0.3466563178130085).abs() < 1e-12, "{slope}");
    }

    #[test]
    fn flat_series_is_one() {
        let t: TimeSeriesTable<i64> = (0..10).map(|i| (day(i), "X", 50)).collect();
        let r = growth_rate(&t, 7, 1);
        assert_eq!(r.len(), 10);
        // from day 6 on the window holds no zero-filled days
        for i in 6..10 {
            assert!(approx(r.get(day(i), "X").unwrap(), 1.0));
        }
        assert!(r.get(day(0), "X").unwrap() > 1.0);
    }

    #[test]
    fn partial_history_is_zero_filled_not_skipped() {
        let t: TimeSeriesTable<i64> = [(day(0), "X", 100)].into_iter().collect();
        let r = growth_rate(&t, 7, 1);
        let v = r.get(day(0), "X").expect("first date still estimated");
        assert!(v > 1.0 && v <= CLAMP);
    }

    #[test]
    fn degenerate_growth_is_clamped_to_one() {
        let mut y = vec![ZERO_FLOOR; 6];
        y.push(1_000_000.0);
        let slope = log_linear_slope(&y).unwrap();
        assert!((slope - 5.313657906296222).abs() < 1e-12, "{slope}");
        // exp(slope) is ~203, so five days of compounding leaves the range.
        let daily = growth_factor(&y, 1).unwrap();
        assert!((daily - 203.0918).abs() < 1e-3, "{daily}");
        assert_eq!(growth_factor(&y, 5).unwrap(), 1.0);

        let mut down = vec![1_000_000.0];
        down.extend(vec![ZERO_FLOOR; 6]);
        assert_eq!(growth_factor(&down, 5).unwrap(), 1.0);
    }

    #[test]
    fn failures_are_explicit() {
        assert_eq!(log_linear_slope(&[3.0]), Err(FitError::WindowTooShort(1)));
        assert_eq!(
            log_linear_slope(&[1.0, -2.0, 3.0]),
            Err(FitError::NegativeSample {
                index: 1,
                value: -2.0
            })
        );
    }

    #[test]
    fn negative_window_cell_is_omitted() {
        let t: TimeSeriesTable<i64> = [
            (day(0), "X", 5),
            (day(1), "X", -2),
            (day(2), "X", 8),
            (day(2), "Y", 8),
        ]
        .into_iter()
        .collect();

        let r = growth_rate(&t, 3, 1);

        assert_eq!(r.get(day(2), "X"), None);
        assert!(r.get(day(2), "Y").is_some());
        assert!(r.get(day(0), "X").is_some());
    }

    #[test]
    fn output_stays_in_range() {
        let t: TimeSeriesTable<i64> = (0..40)
            .flat_map(|i| {
                let burst = if i % 9 == 0 { 5_000 } else { (i as i64 * 37) % 11 };
                [(day(i), "A", burst), (day(i), "B", 1 + i as i64 * i as i64)]
            })
            .collect();

        for delay in [1, 5] {
            for (_, _, v) in growth_rate(&t, 7, delay).iter() {
                assert!(v == 1.0 || (1.0 / CLAMP..=CLAMP).contains(&v), "{v}");
            }
        }
    }
}
