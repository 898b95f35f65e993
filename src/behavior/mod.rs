pub mod summary;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Violations;
use crate::filters::{blank_as_none, matches_text, matches_value, optional_timestamp};
use crate::store::{Collection, Document, Record};

pub use summary::{summarize_student, BehaviorSummary};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub enum BehaviorType {
    Positive,
    Concerning,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BehaviorCategory {
    #[serde(rename = "Academic Engagement")]
    AcademicEngagement,
    #[serde(rename = "Classroom Conduct")]
    ClassroomConduct,
    #[serde(rename = "Social Interaction")]
    SocialInteraction,
    #[serde(rename = "Emotional Regulation")]
    EmotionalRegulation,
    Other,
}

impl Display for BehaviorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Positive => "Positive",
            Self::Concerning => "Concerning",
            Self::Neutral => "Neutral",
        };
        write!(f, "{label}")
    }
}

impl Display for BehaviorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::AcademicEngagement => "Academic Engagement",
            Self::ClassroomConduct => "Classroom Conduct",
            Self::SocialInteraction => "Social Interaction",
            Self::EmotionalRegulation => "Emotional Regulation",
            Self::Other => "Other",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
#[error("unknown behavior type: {0}")]
pub struct BehaviorTypeParseError(pub String);

impl FromStr for BehaviorType {
    type Err = BehaviorTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "concerning" => Ok(Self::Concerning),
            "neutral" => Ok(Self::Neutral),
            _ => Err(BehaviorTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown behavior category: {0}")]
pub struct BehaviorCategoryParseError(pub String);

impl FromStr for BehaviorCategory {
    type Err = BehaviorCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "academic engagement" => Ok(Self::AcademicEngagement),
            "classroom conduct" => Ok(Self::ClassroomConduct),
            "social interaction" => Ok(Self::SocialInteraction),
            "emotional regulation" => Ok(Self::EmotionalRegulation),
            "other" => Ok(Self::Other),
            _ => Err(BehaviorCategoryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorRecord {
    pub student_name: String,
    pub grade_level: String,
    #[serde(deserialize_with = "optional_timestamp")]
    pub date: Option<DateTime<Utc>>,
    pub behavior_type: BehaviorType,
    pub category: Option<BehaviorCategory>,
    pub description: String,
    pub action_taken: String,
    pub follow_up_needed: bool,
    pub follow_up_notes: String,
    pub parent_notified: bool,
}

impl BehaviorRecord {
    /// Observation time, falling back to when the record was filed.
    pub fn observed_at(record: &Record<BehaviorRecord>) -> DateTime<Utc> {
        record.body.date.unwrap_or(record.created_at)
    }
}

impl Document for BehaviorRecord {
    const COLLECTION: Collection = Collection::BehaviorRecords;
    const ENTITY: &'static str = "Behavior record";

    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations.require_text("studentName", &self.student_name);
        violations.require_text("gradeLevel", &self.grade_level);
        violations.require("date", &self.date);
        violations.require("category", &self.category);
        violations.require_text("description", &self.description);
        violations
    }

    fn apply_defaults(&mut self, now: DateTime<Utc>) {
        if self.date.is_none() {
            self.date = Some(now);
        }
        self.student_name = self.student_name.trim().to_string();
    }
}

/// Newest observation first.
pub fn sort_by_observed_desc(records: &mut [Record<BehaviorRecord>]) {
    records.sort_by(|a, b| BehaviorRecord::observed_at(b).cmp(&BehaviorRecord::observed_at(a)));
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorFilter {
    pub student_name: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub behavior_type: Option<BehaviorType>,
    #[serde(deserialize_with = "blank_as_none")]
    pub category: Option<BehaviorCategory>,
    #[serde(deserialize_with = "blank_as_none")]
    pub follow_up_needed: Option<bool>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
}

impl BehaviorFilter {
    pub fn matches(&self, record: &Record<BehaviorRecord>) -> bool {
        let behavior = &record.body;
        let observed = BehaviorRecord::observed_at(record);
        matches_text(&self.student_name, &behavior.student_name)
            && matches_value(&self.behavior_type, &behavior.behavior_type)
            && self
                .category
                .map_or(true, |category| behavior.category == Some(category))
            && matches_value(&self.follow_up_needed, &behavior.follow_up_needed)
            && self.start_date.map_or(true, |start| observed >= start)
            && self.end_date.map_or(true, |end| observed <= end)
    }
}
