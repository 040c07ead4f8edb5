use super::TimeSeriesTable;
use crate::regions::RegionRegistry;

/// Scale a value to "per `unit` inhabitants" of a region with `population`
/// people, rounding toward negative infinity.
///
/// `population` is never zero here; [`normalize`] filters the sentinel out.
pub trait PerUnit: Copy {
    fn per_unit(self, unit: u64, population: u64) -> Self;
}

impl PerUnit for i64 {
    fn per_unit(self, unit: u64, population: u64) -> Self {
        // i128 so large cumulative counts times `unit` cannot overflow.
        let scaled = self as i128 * unit as i128;
        scaled.div_euclid(population as i128) as i64
    }
}

impl PerUnit for f64 {
    fn per_unit(self, unit: u64, population: u64) -> Self {
        (self * unit as f64 / population as f64).floor()
    }
}

/// Per-capita rescaling of every cell.
///
/// Regions unknown to `registry`, or registered with population `0`, are
/// dropped from the output.
pub fn normalize<V: PerUnit>(
    table: &TimeSeriesTable<V>,
    registry: &RegionRegistry,
    unit: u64,
) -> TimeSeriesTable<V> {
    table
        .iter()
        .filter_map(|(d, region, value)| match registry.population(region) {
            Some(pop) if pop > 0 => Some((d, region, value.per_unit(unit, pop))),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::day;

    fn registry() -> RegionRegistry {
        RegionRegistry::from_pairs([("X", 1000), ("Z", 0), ("Y", 3)])
    }

    #[test]
    fn per_hundred_thousand() {
        let t: TimeSeriesTable<i64> = [(day(0), "X", 5)].into_iter().collect();
        let n = normalize(&t, &registry(), 100_000);
        assert_eq!(n.get(day(0), "X"), Some(500));
    }

    #[test]
    fn floors_instead_of_rounding() {
        let t: TimeSeriesTable<i64> = [(day(0), "Y", 2), (day(1), "Y", -2)]
            .into_iter()
            .collect();
        let n = normalize(&t, &registry(), 1);
        // 2/3 -> 0, -2/3 -> -1
        assert_eq!(n.get(day(0), "Y"), Some(0));
        assert_eq!(n.get(day(1), "Y"), Some(-1));

        let f: TimeSeriesTable<f64> = [(day(0), "Y", 2.5)].into_iter().collect();
        assert_eq!(normalize(&f, &registry(), 1).get(day(0), "Y"), Some(0.0));
    }

    #[test]
    fn zero_population_and_unknown_regions_are_dropped() {
        let t: TimeSeriesTable<i64> = [
            (day(0), "Z", 1_000_000),
            (day(0), "Q", 10),
            (day(0), "X", 1),
        ]
        .into_iter()
        .collect();

        let n = normalize(&t, &registry(), 100_000);

        assert_eq!(n.get(day(0), "Z"), None);
        assert_eq!(n.get(day(0), "Q"), None);
        assert_eq!(n.regions().into_iter().collect::<Vec<_>>(), vec!["X"]);
    }
}
