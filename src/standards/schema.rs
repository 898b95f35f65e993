use serde::{Deserialize, Serialize};

use crate::error::Violations;
use crate::filters::{contains_ci, matches_text};
use crate::store::{Collection, Document, Record};

/// A single educational objective identified by a code such as `MATH.5.NBT.1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CurriculumStandard {
    pub standard_id: String,
    pub subject: String,
    pub grade_level: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub keywords: Vec<String>,
}

impl Document for CurriculumStandard {
    const COLLECTION: Collection = Collection::Curriculum;
    const ENTITY: &'static str = "Curriculum standard";

    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations.require_text("standardId", &self.standard_id);
        violations.require_text("subject", &self.subject);
        violations.require_text("gradeLevel", &self.grade_level);
        violations.require_text("description", &self.description);
        if self.objectives.iter().any(|o| o.trim().is_empty()) {
            violations.push("objectives cannot contain blank entries");
        }
        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            violations.push("keywords cannot contain blank entries");
        }
        violations
    }

    fn apply_defaults(&mut self, _now: chrono::DateTime<chrono::Utc>) {
        self.standard_id = self.standard_id.trim().to_string();
        self.subject = self.subject.trim().to_string();
        self.grade_level = self.grade_level.trim().to_string();
        // keywords form a set; keep first occurrence order
        let mut seen = Vec::with_capacity(self.keywords.len());
        self.keywords.retain(|keyword| {
            if seen.contains(keyword) {
                false
            } else {
                seen.push(keyword.clone());
                true
            }
        });
    }
}

/// Reference from another entity to a stored standard.
///
/// Stored documents always hold `Id`; responses expand resolvable ids into
/// `Inline` records and leave orphans as bare ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StandardRef {
    Id(String),
    Inline(Box<Record<CurriculumStandard>>),
}

impl StandardRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Inline(record) => &record.id,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Inline(_))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurriculumFilter {
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub keywords: Option<String>,
    pub standard_id: Option<String>,
}

impl CurriculumFilter {
    pub fn matches(&self, record: &Record<CurriculumStandard>) -> bool {
        let standard = &record.body;
        matches_text(&self.subject, &standard.subject)
            && matches_text(&self.grade_level, &standard.grade_level)
            && matches_text(&self.standard_id, &standard.standard_id)
            && self.keywords.as_deref().map_or(true, |term| {
                standard.keywords.iter().any(|k| contains_ci(k, term))
                    || contains_ci(&standard.description, term)
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{CurriculumFilter, CurriculumStandard, StandardRef};
    use crate::store::{Document, Record};

    fn record(standard: CurriculumStandard) -> Record<CurriculumStandard> {
        let now = Utc::now();
        Record {
            id: "std-1".to_string(),
            created_at: now,
            updated_at: now,
            body: standard,
        }
    }

    #[test]
    fn keyword_filter_matches_keywords_or_description() {
        let standard = record(CurriculumStandard {
            standard_id: "MATH.5.NF.1".to_string(),
            subject: "Mathematics".to_string(),
            grade_level: "5".to_string(),
            description: "Use equivalent fractions".to_string(),
            objectives: vec![],
            keywords: vec!["Denominator".to_string()],
        });

        let by_keyword = CurriculumFilter {
            keywords: Some("denom".to_string()),
            ..CurriculumFilter::default()
        };
        let by_description = CurriculumFilter {
            keywords: Some("EQUIVALENT".to_string()),
            ..CurriculumFilter::default()
        };
        let miss = CurriculumFilter {
            keywords: Some("geometry".to_string()),
            subject: Some("math".to_string()),
            ..CurriculumFilter::default()
        };
        assert!(by_keyword.matches(&standard));
        assert!(by_description.matches(&standard));
        assert!(!miss.matches(&standard));
        assert!(CurriculumFilter::default().matches(&standard));
    }

    #[test]
    fn defaults_dedupe_keywords_and_trim_codes() {
        let mut standard = CurriculumStandard {
            standard_id: "  ELA.3.RL.2 ".to_string(),
            keywords: vec!["theme".into(), "moral".into(), "theme".into()],
            ..CurriculumStandard::default()
        };
        standard.apply_defaults(Utc::now());
        assert_eq!(standard.standard_id, "ELA.3.RL.2");
        assert_eq!(standard.keywords, vec!["theme", "moral"]);
    }

    #[test]
    fn reference_accepts_bare_id_or_inline_record() {
        let bare: StandardRef = serde_json::from_str("\"abc\"").expect("bare id");
        assert_eq!(bare.id(), "abc");
        assert!(!bare.is_resolved());

        let inline = serde_json::to_value(StandardRef::Inline(Box::new(record(
            CurriculumStandard {
                standard_id: "SCI.4.1".to_string(),
                ..CurriculumStandard::default()
            },
        ))))
        .expect("serialize inline");
        assert_eq!(inline["standardId"], "SCI.4.1");
        let parsed: StandardRef = serde_json::from_value(inline).expect("inline");
        assert_eq!(parsed.id(), "std-1");
        assert!(parsed.is_resolved());
    }

    #[test]
    fn inline_reference_without_timestamps_is_accepted() {
        let parsed: StandardRef =
            serde_json::from_str(r#"{"id":"std-9","standardId":"MATH.5.NF.1"}"#)
                .expect("inline without timestamps");
        assert_eq!(parsed.id(), "std-9");
        match parsed {
            StandardRef::Inline(record) => {
                assert_eq!(record.body.standard_id, "MATH.5.NF.1");
                assert_eq!(record.created_at, chrono::DateTime::<Utc>::default());
            }
            other => panic!("expected inline reference, got {other:?}"),
        }
    }
}
