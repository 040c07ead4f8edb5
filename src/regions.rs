use once_cell::sync::Lazy;

/// Synthetic region holding the nationwide sum of every county.
pub const AGGREGATE_REGION: &str = "Kokku";

/// County populations used for per-capita normalization.
/// A population of `0` marks a region that is never normalized.
static ESTONIA: &[(&str, u64)] = &[
    ("Harju", 598059),
    ("Hiiu", 9387),
    ("Ida-Viru", 136240),
    ("Järva", 28734),
    ("Jõgeva", 30286),
    ("Lääne", 20507),
    ("Lääne-Viru", 59325),
    ("Pärnu", 25006),
    ("Põlva", 85938),
    ("Rapla", 33311),
    ("Saare", 33108),
    ("Tartu", 152977),
    ("Valga", 28370),
    ("Viljandi", 46371),
    ("Võru", 35782),
    ("Tundmatu", 0),
    ("Välismaa", 0),
    (AGGREGATE_REGION, 1323401),
];

static DEFAULT_REGISTRY: Lazy<RegionRegistry> =
    Lazy::new(|| RegionRegistry::from_pairs(ESTONIA.iter().copied()));

/// Region → reference population, in a fixed display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRegistry {
    entries: Vec<(String, u64)>,
}

impl RegionRegistry {
    /// Later duplicates replace the earlier population but keep its position.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut entries: Vec<(String, u64)> = Vec::new();
        for (name, pop) in pairs {
            let name = name.into();
            match entries.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = pop,
                None => entries.push((name, pop)),
            }
        }
        Self { entries }
    }

    /// The built-in Estonian county table.
    pub fn estonia() -> &'static RegionRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn population(&self, region: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == region)
            .map(|(_, p)| *p)
    }

    /// Region names in registry order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estonia_has_sentinels_and_aggregate() {
        let reg = RegionRegistry::estonia();
        assert_eq!(reg.population("Harju"), Some(598059));
        assert_eq!(reg.population("Tundmatu"), Some(0));
        assert_eq!(reg.population(AGGREGATE_REGION), Some(1323401));
        assert_eq!(reg.population("Atlantis"), None);
        assert_eq!(reg.names().next(), Some("Harju"));
        assert_eq!(reg.names().last(), Some(AGGREGATE_REGION));
    }

    #[test]
    fn duplicate_keeps_first_position() {
        let reg = RegionRegistry::from_pairs([("A", 1), ("B", 2), ("A", 3)]);
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(reg.population("A"), Some(3));
        assert_eq!(reg.len(), 2);
    }
}
