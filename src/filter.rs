use serde::Serialize;

use crate::data::{CountryRecord, Region, VisaCategory};

/// Region tab selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    /// "All" first, then the regions in their fixed order
    pub fn tabs() -> Vec<RegionFilter> {
        std::iter::once(RegionFilter::All)
            .chain(Region::ALL.into_iter().map(RegionFilter::Only))
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            RegionFilter::All => "全部区域",
            RegionFilter::Only(r) => r.label(),
        }
    }

    pub fn matches(self, record: &CountryRecord) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(r) => record.region == r,
        }
    }
}

impl From<Option<Region>> for RegionFilter {
    fn from(r: Option<Region>) -> Self {
        r.map_or(RegionFilter::All, RegionFilter::Only)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub region: RegionFilter,
    pub search: String,
}

impl FilterState {
    pub fn new(region: RegionFilter, search: impl Into<String>) -> Self {
        Self { region, search: search.into() }
    }

    /// Whitespace-only input does not filter; otherwise the raw query is
    /// matched case-insensitively against the display name.
    pub fn matches(&self, record: &CountryRecord) -> bool {
        if !self.region.matches(record) {
            return false;
        }
        if self.search.trim().is_empty() {
            return true;
        }
        record.name.to_lowercase().contains(&self.search.to_lowercase())
    }
}

/// Records passing the filter, in table order
pub fn filtered<'a>(records: &'a [CountryRecord], filter: &FilterState) -> Vec<&'a CountryRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Header counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub visa_free: usize,
    pub voa: usize,
}

impl Stats {
    pub fn of(records: &[CountryRecord]) -> Self {
        Self {
            total: records.len(),
            visa_free: records.iter().filter(|r| r.category.is_visa_free()).count(),
            voa: records
                .iter()
                .filter(|r| r.category == VisaCategory::VisaOnArrival)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::COUNTRIES;
    use proptest::prelude::*;

    fn ids(v: &[&CountryRecord]) -> Vec<&'static str> {
        v.iter().map(|r| r.id).collect()
    }

    #[test]
    fn search_thailand() {
        let view = filtered(COUNTRIES, &FilterState::new(RegionFilter::All, "泰国"));
        assert_eq!(ids(&view), vec!["THA"]);
    }

    #[test]
    fn asia_tab_keeps_table_order() {
        let view = filtered(COUNTRIES, &FilterState::new(RegionFilter::Only(Region::Asia), ""));
        let expected: Vec<_> = COUNTRIES
            .iter()
            .filter(|r| r.region == Region::Asia)
            .map(|r| r.id)
            .collect();
        assert_eq!(ids(&view), expected);
        assert_eq!(view.len(), 19);
        assert_eq!(view[0].id, "THA");
        assert_eq!(view[18].id, "VNM");
    }

    #[test]
    fn no_match_is_empty() {
        let view = filtered(COUNTRIES, &FilterState::new(RegionFilter::All, "zzz_no_match"));
        assert!(view.is_empty());
    }

    #[test]
    fn whitespace_query_does_not_filter() {
        let view = filtered(COUNTRIES, &FilterState::new(RegionFilter::All, "   "));
        assert_eq!(view.len(), COUNTRIES.len());
    }

    #[test]
    fn region_and_text_intersect() {
        // "岛" appears in Jeju (Asia) and Saipan (Americas & Oceania)
        let all = filtered(COUNTRIES, &FilterState::new(RegionFilter::All, "岛"));
        assert_eq!(ids(&all), vec!["KOR_JEJU", "MNP"]);
        let asia = filtered(COUNTRIES, &FilterState::new(RegionFilter::Only(Region::Asia), "岛"));
        assert_eq!(ids(&asia), vec!["KOR_JEJU"]);
    }

    #[test]
    fn tabs_are_all_then_regions() {
        let labels: Vec<_> = RegionFilter::tabs().into_iter().map(RegionFilter::label).collect();
        assert_eq!(labels, vec!["全部区域", "亚洲", "非洲", "欧洲", "美洲与大洋洲"]);
    }

    #[test]
    fn stats_of_table() {
        let s = Stats::of(COUNTRIES);
        assert_eq!(s.total, 45);
        assert_eq!(s.visa_free, 34);
        assert_eq!(s.voa, 9);
    }

    fn region_filter() -> impl Strategy<Value = RegionFilter> {
        prop_oneof![
            Just(RegionFilter::All),
            Just(RegionFilter::Only(Region::Asia)),
            Just(RegionFilter::Only(Region::Africa)),
            Just(RegionFilter::Only(Region::Europe)),
            Just(RegionFilter::Only(Region::AmericasOceania)),
        ]
    }

    fn query() -> impl Strategy<Value = String> {
        // mix of name fragments and arbitrary text
        let fragments: Vec<String> = COUNTRIES
            .iter()
            .flat_map(|r| r.name.chars().map(|c| c.to_string()))
            .collect();
        prop_oneof![
            proptest::sample::select(fragments),
            "[a-zA-Z ()]{0,6}",
            Just(String::new()),
        ]
    }

    proptest! {
        /// The view is an order-preserving subset matching exactly the predicate.
        #[test]
        fn view_is_the_ordered_predicate_subset(region in region_filter(), q in query()) {
            let filter = FilterState::new(region, q.clone());
            let view = filtered(COUNTRIES, &filter);
            let expected: Vec<&CountryRecord> = COUNTRIES
                .iter()
                .filter(|r| {
                    let region_ok = match region {
                        RegionFilter::All => true,
                        RegionFilter::Only(g) => r.region == g,
                    };
                    let text_ok = q.trim().is_empty()
                        || r.name.to_lowercase().contains(&q.to_lowercase());
                    region_ok && text_ok
                })
                .collect();
            prop_assert_eq!(ids(&view), ids(&expected));
        }

        /// Selecting a record by exact name always keeps it in view.
        #[test]
        fn exact_name_is_reflexive(idx in 0..COUNTRIES.len()) {
            let r = &COUNTRIES[idx];
            let view = filtered(COUNTRIES, &FilterState::new(RegionFilter::All, r.name));
            prop_assert!(view.iter().any(|v| v.id == r.id));
        }

        /// Categories are disjoint, so the counters never exceed the total.
        #[test]
        fn stats_are_bounded(mask in proptest::collection::vec(any::<bool>(), COUNTRIES.len())) {
            let subset: Vec<CountryRecord> = COUNTRIES
                .iter()
                .zip(&mask)
                .filter(|(_, keep)| **keep)
                .map(|(r, _)| r.clone())
                .collect();
            let s = Stats::of(&subset);
            prop_assert!(s.visa_free <= s.total);
            prop_assert!(s.voa <= s.total);
            prop_assert!(s.visa_free + s.voa <= s.total);
        }
    }
}
