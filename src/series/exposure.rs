use chrono::Duration;
use std::f64::consts::PI;
use tracing::debug;

use super::TimeSeriesTable;

/// Spread of the exposure kernel, in days.
const KERNEL_SIGMA: f64 = 3.0;

fn normal_pdf(x: f64, sigma: f64) -> f64 {
    let u = x / sigma;
    (-0.5 * u * u).exp() / (sigma * (2.0 * PI).sqrt())
}

/// `2 * half_width + 1` weights of a zero-mean Gaussian sampled at
/// `-half_width ..= half_width`.
pub fn exposure_kernel(half_width: usize) -> Vec<f64> {
    (0..=2 * half_width)
        .map(|i| normal_pdf(i as f64 - half_width as f64, KERNEL_SIGMA))
        .collect()
}

/// Back-project daily positives onto an estimated exposure date.
///
/// Each report date `d` at least `half_width` days after the first date in
/// `daily` is smoothed over the `2 * half_width + 1` days ending at `d` and
/// written to `d - (offset + half_width)`. Days missing from `daily`
/// contribute nothing to the sum.
pub fn project_exposure(
    daily: &TimeSeriesTable<i64>,
    offset: i64,
    half_width: usize,
) -> TimeSeriesTable<f64> {
    let mut out = TimeSeriesTable::new();
    let Some(first) = daily.first_date() else {
        return out;
    };
    let kernel = exposure_kernel(half_width);
    let start = first + Duration::days(half_width as i64);
    let shift = Duration::days(offset + half_width as i64);

    for d in daily.dates().filter(|d| *d >= start) {
        let dout = d - shift;
        for (region, _) in daily.row(d) {
            let v: f64 = kernel
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    let dd = d - Duration::days(i as i64);
                    daily.get(dd, region).unwrap_or(0) as f64 * k
                })
                .sum();
            out.insert(dout, region, v);
        }
    }

    debug!(offset, half_width, cells = out.len(), "exposure projected");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::day;

    #[test]
    fn kernel_is_symmetric_gaussian() {
        let k = exposure_kernel(5);
        assert_eq!(k.len(), 11);
        for i in 0..5 {
            assert!((k[i] - k[10 - i]).abs() < 1e-15);
            assert!(k[i] < k[i + 1]);
        }
        // N(0, 3) density at its mean
        assert!((k[5] - 0.132_980_760_133_810_8).abs() < 1e-12);
    }

    #[test]
    fn output_is_shifted_and_starts_after_half_width() {
        let daily: TimeSeriesTable<i64> = (0..20).map(|i| (day(i), "X", 10)).collect();

        let exp = project_exposure(&daily, 7, 5);

        // first usable report date is day 5, mapped 12 days back
        let first = exp.first_date().unwrap();
        assert_eq!(first, day(5) - Duration::days(12));
        assert_eq!(exp.dates().count(), 15);
        assert_eq!(exp.dates().last(), Some(day(19) - Duration::days(12)));
    }

    #[test]
    fn weighted_sum_treats_missing_days_as_zero() {
        let daily: TimeSeriesTable<i64> = [
            (day(0), "X", 100),
            (day(1), "Y", 1),
            (day(2), "X", 0),
        ]
        .into_iter()
        .collect();
        let k = exposure_kernel(1);

        let exp = project_exposure(&daily, 0, 1);

        // day 1 only has Y; X on day 1 is absent entirely
        assert_eq!(exp.get(day(0), "Y"), Some(1.0 * k[0]));
        assert_eq!(exp.get(day(0), "X"), None);
        // day 2 X: k0*0 + k1*(absent) + k2*100
        let v = exp.get(day(1), "X").unwrap();
        assert!((v - 100.0 * k[2]).abs() < 1e-12);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let daily = TimeSeriesTable::<i64>::new();
        assert!(project_exposure(&daily, 7, 5).is_empty());
    }
}
