//! Structured filtering and multi-term search over an activity snapshot.
//!
//! Both entry points are pure: they read a slice and return clones in the slice's order
//! (newest first for a log snapshot).

use activity_types::{ActivityRecord, FilterCriteria};

fn set(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

fn active(value: &Option<String>) -> Option<String> {
    set(value).map(|s| s.to_lowercase())
}

fn contains_ci(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.to_lowercase().contains(needle))
}

/// Lower-cased criteria, with unset or empty strings removed. Values are not trimmed.
struct Prepared<'a> {
    criteria: &'a FilterCriteria,
    section: Option<String>,
    user_id: Option<String>,
    entity_type: Option<String>,
    search: Option<String>,
    facets: [Option<String>; 6],
}

impl<'a> Prepared<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            section: set(&criteria.section),
            user_id: set(&criteria.user_id),
            entity_type: set(&criteria.entity_type),
            search: active(&criteria.search),
            facets: [
                active(&criteria.vin_number),
                active(&criteria.part_number),
                active(&criteria.car_model),
                active(&criteria.car_brand),
                active(&criteria.category),
                active(&criteria.location),
            ],
        }
    }

    fn matches(&self, r: &ActivityRecord) -> bool {
        if let Some(ref s) = self.section {
            if &r.section != s {
                return false;
            }
        }
        let action = self
            .criteria
            .action
            .as_ref()
            .filter(|a| !a.as_str().is_empty());
        if let Some(action) = action {
            if &r.action != action {
                return false;
            }
        }
        if let Some(ref uid) = self.user_id {
            if &r.user_id != uid {
                return false;
            }
        }
        if let Some(ref et) = self.entity_type {
            if &r.entity_type != et {
                return false;
            }
        }
        if let Some(from) = self.criteria.date_from {
            if r.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.criteria.date_to {
            if r.timestamp > to {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            if !r.text_fields().into_iter().any(|f| contains_ci(f, needle)) {
                return false;
            }
        }
        let values = [
            r.vin_number.as_deref(),
            r.part_number.as_deref(),
            r.car_model.as_deref(),
            r.car_brand.as_deref(),
            r.category.as_deref(),
            r.location.as_deref(),
        ];
        for (facet, value) in self.facets.iter().zip(values) {
            if let Some(needle) = facet {
                if !contains_ci(value, needle) {
                    return false;
                }
            }
        }
        true
    }
}

/// Records matching every set criterion.
pub fn filter(records: &[ActivityRecord], criteria: &FilterCriteria) -> Vec<ActivityRecord> {
    let prepared = Prepared::new(criteria);
    records
        .iter()
        .filter(|r| prepared.matches(r))
        .cloned()
        .collect()
}

fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Records whose searchable text contains every whitespace-separated term of `query`.
/// A blank query matches everything.
pub fn advanced_search(records: &[ActivityRecord], query: &str) -> Vec<ActivityRecord> {
    let terms = tokenize(query);
    records
        .iter()
        .filter(|r| {
            let text = r.searchable_text();
            terms.iter().all(|t| text.contains(t.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_types::fixtures::record_at;
    use activity_types::ActivityAction;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashSet;

    fn t0() -> DateTime<Utc> {
        "2024-05-10T12:00:00Z".parse().unwrap()
    }

    fn fixture() -> Vec<ActivityRecord> {
        let mut a = record_at("a", "alice", "inventory", t0() + Duration::minutes(3));
        a.action = ActivityAction::Update;
        a.details = "Moved BMW X5 to Showroom North".to_string();
        a.car_brand = Some("BMW".to_string());
        a.car_model = Some("X5".to_string());
        a.vin_number = Some("WBAFR9C50BC123456".to_string());
        a.location = Some("Showroom North".to_string());

        let mut b = record_at("b", "bob", "garage", t0() + Duration::minutes(2));
        b.action = ActivityAction::Scan;
        b.details = "Scanned brake pads".to_string();
        b.part_number = Some("BP-2201".to_string());
        b.category = Some("Brakes".to_string());
        b.entity_type = "part".to_string();

        let mut c = record_at("c", "alice", "garage", t0() + Duration::minutes(1));
        c.action = ActivityAction::Update;
        c.details = "Updated repair order for Audi A4".to_string();
        c.car_brand = Some("Audi".to_string());

        let mut d = record_at("d", "carol", "inventory", t0());
        d.action = ActivityAction::Create;
        d.details = "Added alpha unit".to_string();
        d.entity_name = Some("Beta trim".to_string());

        vec![a, b, c, d]
    }

    fn ids(records: &[ActivityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_criteria_returns_everything_in_order() {
        let records = fixture();
        let out = filter(&records, &FilterCriteria::default());
        assert_eq!(ids(&out), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn filter_does_not_touch_input_and_is_repeatable() {
        let records = fixture();
        let criteria = FilterCriteria {
            user_id: Some("alice".to_string()),
            ..Default::default()
        };
        let first = filter(&records, &criteria);
        let second = filter(&records, &criteria);
        assert_eq!(first, second);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn combined_criteria_are_subset_of_each() {
        let records = fixture();
        let by_section = FilterCriteria {
            section: Some("garage".to_string()),
            ..Default::default()
        };
        let by_action = FilterCriteria {
            action: Some(ActivityAction::Update),
            ..Default::default()
        };
        let both = FilterCriteria {
            section: Some("garage".to_string()),
            action: Some(ActivityAction::Update),
            ..Default::default()
        };
        let a: HashSet<String> = filter(&records, &by_section).into_iter().map(|r| r.id).collect();
        let b: HashSet<String> = filter(&records, &by_action).into_iter().map(|r| r.id).collect();
        let ab: HashSet<String> = filter(&records, &both).into_iter().map(|r| r.id).collect();
        assert!(ab.is_subset(&a.intersection(&b).cloned().collect()));
        assert_eq!(ab, HashSet::from(["c".to_string()]));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let records = fixture();
        let criteria = FilterCriteria {
            date_from: Some(t0() + Duration::minutes(1)),
            date_to: Some(t0() + Duration::minutes(2)),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &criteria)), vec!["b", "c"]);
    }

    #[test]
    fn free_text_and_facets_are_case_insensitive() {
        let records = fixture();
        let text = FilterCriteria {
            search: Some("showroom".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &text)), vec!["a"]);

        let vin = FilterCriteria {
            vin_number: Some("bc1234".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &vin)), vec!["a"]);

        let part = FilterCriteria {
            part_number: Some("bp-22".to_string()),
            category: Some("BRAKES".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &part)), vec!["b"]);
    }

    #[test]
    fn facet_filter_excludes_records_without_the_facet() {
        let records = fixture();
        let brand = FilterCriteria {
            car_brand: Some("a".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&records, &brand)), vec!["c"]);
    }

    #[test]
    fn empty_strings_are_ignored() {
        let records = fixture();
        let criteria = FilterCriteria {
            section: Some(String::new()),
            user_id: Some(String::new()),
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &criteria).len(), 4);
    }

    #[test]
    fn whitespace_criteria_are_compared_as_given() {
        let records = fixture();
        let padded = FilterCriteria {
            section: Some(" garage ".to_string()),
            ..Default::default()
        };
        assert!(filter(&records, &padded).is_empty());

        let blank = FilterCriteria {
            user_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(filter(&records, &blank).is_empty());
    }

    #[test]
    fn unmatched_criteria_match_nothing() {
        let records = fixture();
        let criteria = FilterCriteria {
            section: Some("calendar".to_string()),
            ..Default::default()
        };
        assert!(filter(&records, &criteria).is_empty());
    }

    #[test]
    fn advanced_search_requires_every_term() {
        let records = fixture();
        assert_eq!(ids(&advanced_search(&records, "ALPHA beta")), vec!["d"]);
        assert!(advanced_search(&records, "alpha brakes").is_empty());
        assert_eq!(ids(&advanced_search(&records, "alpha")), vec!["d"]);
        assert_eq!(ids(&advanced_search(&records, "bmw x5")), vec!["a"]);
        assert_eq!(advanced_search(&records, "   ").len(), 4);
    }
}
