pub mod rubric;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Violations;
use crate::filters::{matches_text, optional_timestamp};
use crate::standards::StandardRef;
use crate::store::{Collection, Document, Record};

pub use rubric::{generate_rubric, RubricRequest};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Assignment {
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub subject: String,
    pub grade_level: String,
    #[serde(deserialize_with = "optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    pub points_possible: Option<u32>,
    pub curriculum_standards: Vec<StandardRef>,
    pub rubric: Vec<RubricCriterion>,
}

/// One weighted dimension of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RubricCriterion {
    pub name: String,
    pub description: String,
    pub points_possible: u32,
    pub levels: Vec<RubricLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RubricLevel {
    pub score: u32,
    pub description: String,
}

impl RubricLevel {
    pub fn new(score: u32, description: impl Into<String>) -> Self {
        Self {
            score,
            description: description.into(),
        }
    }
}

impl Document for Assignment {
    const COLLECTION: Collection = Collection::Assignments;
    const ENTITY: &'static str = "Assignment";

    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations.require_text("title", &self.title);
        violations.require_text("description", &self.description);
        violations.require_text("instructions", &self.instructions);
        violations.require_text("subject", &self.subject);
        violations.require_text("gradeLevel", &self.grade_level);
        violations.require("pointsPossible", &self.points_possible);
        for (index, criterion) in self.rubric.iter().enumerate() {
            violations.require_text(&format!("rubric[{index}].name"), &criterion.name);
            violations.require_text(
                &format!("rubric[{index}].description"),
                &criterion.description,
            );
        }
        violations
    }

    fn standard_refs(&self) -> Vec<&StandardRef> {
        self.curriculum_standards.iter().collect()
    }

    fn standard_refs_mut(&mut self) -> Vec<&mut StandardRef> {
        self.curriculum_standards.iter_mut().collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentFilter {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    /// Record id of a referenced standard.
    pub curriculum_standard: Option<String>,
}

impl AssignmentFilter {
    pub fn matches(&self, record: &Record<Assignment>) -> bool {
        let assignment = &record.body;
        matches_text(&self.title, &assignment.title)
            && matches_text(&self.subject, &assignment.subject)
            && matches_text(&self.grade_level, &assignment.grade_level)
            && match self.curriculum_standard.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(id) => assignment.references_standard(id),
            }
    }
}
