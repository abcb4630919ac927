use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// A single demo to play back and the result file it is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCase {
    pub demo_file: String,
    pub result_file: String,
}

impl DemoCase {
    #[must_use]
    pub fn new(demo_file: impl Into<String>, result_file: impl Into<String>) -> Self {
        Self {
            demo_file: demo_file.into(),
            result_file: result_file.into(),
        }
    }
}

/// Named, ordered list of demo cases. Order only affects reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSet {
    name: &'static str,
    description: &'static str,
    cases: Vec<DemoCase>,
}

impl DemoSet {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    #[must_use]
    pub fn cases(&self) -> &[DemoCase] {
        &self.cases
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Demo sets recorded one per map, named `<PREFIX>_MAPnn.LMP` with a matching
/// `<PREFIX>_MAPnn.result.json`.
struct MapSeries {
    name: &'static str,
    description: &'static str,
    file_prefix: &'static str,
    maps: RangeInclusive<u8>,
}

impl MapSeries {
    fn build(&self) -> DemoSet {
        let cases = self
            .maps
            .clone()
            .map(|map| {
                DemoCase::new(
                    format!("{}_MAP{map:02}.LMP", self.file_prefix),
                    format!("{}_MAP{map:02}.result.json", self.file_prefix),
                )
            })
            .collect();

        DemoSet {
            name: self.name,
            description: self.description,
            cases,
        }
    }
}

const MAP_SERIES: &[MapSeries] = &[MapSeries {
    name: "doom",
    description: "PSX DOOM: 'Greatest Hits' edition (v1.1)",
    file_prefix: "DOOM",
    maps: 1..=59,
}];

type DemoSetRegistry = BTreeMap<&'static str, DemoSet>;

fn registry() -> &'static DemoSetRegistry {
    static REGISTRY: OnceLock<DemoSetRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        MAP_SERIES
            .iter()
            .map(|series| (series.name, series.build()))
            .collect()
    })
}

/// Look up a demo set by its exact (case-sensitive) name.
#[must_use]
pub fn get_demoset(name: &str) -> Option<&'static DemoSet> {
    registry().get(name)
}

/// Names of every registered demo set, sorted.
#[must_use]
pub fn demoset_names() -> Vec<&'static str> {
    registry().keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doom_set_covers_maps_1_through_59_in_order() {
        let set = get_demoset("doom").expect("doom demo set is registered");
        assert_eq!(set.len(), 59);
        assert_eq!(
            set.cases().first(),
            Some(&DemoCase::new("DOOM_MAP01.LMP", "DOOM_MAP01.result.json"))
        );
        assert_eq!(
            set.cases().last(),
            Some(&DemoCase::new("DOOM_MAP59.LMP", "DOOM_MAP59.result.json"))
        );
        assert_eq!(set.cases()[6].demo_file, "DOOM_MAP07.LMP");
    }

    #[test]
    fn every_case_pairs_demo_with_matching_result() {
        for name in demoset_names() {
            let set = get_demoset(name).unwrap();
            assert!(!set.is_empty(), "{name} should not be empty");
            for case in set.cases() {
                let stem = case.demo_file.trim_end_matches(".LMP");
                assert_eq!(case.result_file, format!("{stem}.result.json"));
            }
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(get_demoset("doom").is_some());
        assert!(get_demoset("DOOM").is_none());
        assert!(get_demoset("final_doom").is_none());
        assert!(get_demoset("").is_none());
    }

    #[test]
    fn registry_is_shared_across_lookups() {
        let first = get_demoset("doom").unwrap();
        let second = get_demoset("doom").unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(demoset_names(), vec!["doom"]);
        assert_eq!(first.name(), "doom");
        assert!(first.description().contains("Greatest Hits"));
    }
}
