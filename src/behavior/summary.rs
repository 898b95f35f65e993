use std::collections::BTreeMap;

use serde::Serialize;

use crate::behavior::{sort_by_observed_desc, BehaviorCategory, BehaviorRecord, BehaviorType};
use crate::filters::contains_ci;
use crate::store::Record;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSummary {
    pub student_name: String,
    pub total: usize,
    /// Only types that occur are present.
    pub type_counts: BTreeMap<BehaviorType, usize>,
    pub category_counts: BTreeMap<BehaviorCategory, usize>,
    pub recent_records: Vec<Record<BehaviorRecord>>,
}

/// Tallies every record whose student name contains `student_name`
/// and keeps the `recent_limit` most recent observations.
pub fn summarize_student(
    student_name: &str,
    records: Vec<Record<BehaviorRecord>>,
    recent_limit: usize,
) -> BehaviorSummary {
    let needle = student_name.trim();
    let mut matching: Vec<Record<BehaviorRecord>> = records
        .into_iter()
        .filter(|record| contains_ci(&record.body.student_name, needle))
        .collect();

    let mut type_counts = BTreeMap::new();
    let mut category_counts = BTreeMap::new();
    for record in &matching {
        *type_counts.entry(record.body.behavior_type).or_insert(0) += 1;
        if let Some(category) = record.body.category {
            *category_counts.entry(category).or_insert(0) += 1;
        }
    }

    let total = matching.len();
    sort_by_observed_desc(&mut matching);
    matching.truncate(recent_limit);

    BehaviorSummary {
        student_name: needle.to_string(),
        total,
        type_counts,
        category_counts,
        recent_records: matching,
    }
}
