pub mod suggestions;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Violations;
use crate::filters::{blank_as_none, contains_ci, matches_text, matches_value, optional_timestamp};
use crate::standards::StandardRef;
use crate::store::{Collection, Document, Record};

pub use suggestions::{suggest_plan, PlanDraft, SuggestionRequest};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RemediationPlan {
    pub student_name: String,
    pub student_id: String,
    pub grade_level: String,
    pub subject: String,
    pub target_areas: Vec<TargetArea>,
    pub goals: Vec<PlanGoal>,
    pub activities: Vec<PlanActivity>,
    pub progress: PlanProgress,
    #[serde(deserialize_with = "optional_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetArea {
    pub area: String,
    pub description: String,
    pub curriculum_standard: Option<StandardRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanGoal {
    pub description: String,
    pub success_criteria: String,
    #[serde(deserialize_with = "optional_timestamp")]
    pub target_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanActivity {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    Practice,
    Assessment,
    Game,
    Project,
    Reading,
    Other,
}

impl ActivityType {
    /// Rotation used when drafting activities.
    pub const SUGGESTED: [ActivityType; 5] = [
        ActivityType::Practice,
        ActivityType::Assessment,
        ActivityType::Game,
        ActivityType::Project,
        ActivityType::Reading,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Practice => "Practice",
            Self::Assessment => "Assessment",
            Self::Game => "Game",
            Self::Project => "Project",
            Self::Reading => "Reading",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PlanProgress {
    pub status: PlanStatus,
    /// Append-only, in insertion order.
    pub notes: Vec<ProgressNote>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Error)]
#[error("unknown plan status: {0}")]
pub struct PlanStatusParseError(pub String);

impl FromStr for PlanStatus {
    type Err = PlanStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(PlanStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    pub date: DateTime<Utc>,
    pub content: String,
    pub progress_indicator: ProgressIndicator,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgressIndicator {
    SignificantProgress,
    SomeProgress,
    LittleProgress,
    NoProgress,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressNoteRequest {
    pub content: String,
    pub progress_indicator: Option<ProgressIndicator>,
}

impl ProgressNoteRequest {
    pub fn into_note(self, now: DateTime<Utc>) -> Result<ProgressNote, Violations> {
        let mut violations = Violations::new();
        violations.require_text("content", &self.content);
        violations.require("progressIndicator", &self.progress_indicator);
        match self.progress_indicator {
            Some(progress_indicator) if violations.is_empty() => Ok(ProgressNote {
                date: now,
                content: self.content,
                progress_indicator,
            }),
            _ => Err(violations),
        }
    }
}

impl Document for RemediationPlan {
    const COLLECTION: Collection = Collection::RemediationPlans;
    const ENTITY: &'static str = "Remediation plan";

    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations.require_text("studentName", &self.student_name);
        violations.require_text("studentId", &self.student_id);
        violations.require_text("gradeLevel", &self.grade_level);
        violations.require_text("subject", &self.subject);
        violations.require("startDate", &self.start_date);
        for (index, area) in self.target_areas.iter().enumerate() {
            violations.require_text(&format!("targetAreas[{index}].area"), &area.area);
            violations.require_text(
                &format!("targetAreas[{index}].description"),
                &area.description,
            );
        }
        for (index, goal) in self.goals.iter().enumerate() {
            violations.require_text(&format!("goals[{index}].description"), &goal.description);
            violations.require_text(
                &format!("goals[{index}].successCriteria"),
                &goal.success_criteria,
            );
            violations.require(&format!("goals[{index}].targetDate"), &goal.target_date);
        }
        for (index, activity) in self.activities.iter().enumerate() {
            violations.require_text(&format!("activities[{index}].title"), &activity.title);
            violations.require_text(
                &format!("activities[{index}].description"),
                &activity.description,
            );
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                violations.push("endDate cannot be before startDate");
            }
        }
        violations
    }

    fn apply_defaults(&mut self, now: DateTime<Utc>) {
        if self.start_date.is_none() {
            self.start_date = Some(now);
        }
    }

    fn standard_refs(&self) -> Vec<&StandardRef> {
        self.target_areas
            .iter()
            .filter_map(|area| area.curriculum_standard.as_ref())
            .collect()
    }

    fn standard_refs_mut(&mut self) -> Vec<&mut StandardRef> {
        self.target_areas
            .iter_mut()
            .filter_map(|area| area.curriculum_standard.as_mut())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemediationFilter {
    /// Free text over student name, subject and goal descriptions.
    pub query: Option<String>,
    pub student_name: Option<String>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<PlanStatus>,
}

impl RemediationFilter {
    pub fn matches(&self, record: &Record<RemediationPlan>) -> bool {
        let plan = &record.body;
        let query_hit = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                contains_ci(&plan.student_name, term)
                    || contains_ci(&plan.subject, term)
                    || plan
                        .goals
                        .iter()
                        .any(|goal| contains_ci(&goal.description, term))
            }
        };
        query_hit
            && matches_text(&self.student_name, &plan.student_name)
            && matches_text(&self.subject, &plan.subject)
            && matches_text(&self.grade_level, &plan.grade_level)
            && matches_value(&self.status, &plan.progress.status)
    }
}
