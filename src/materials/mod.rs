pub mod differentiate;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Violations;
use crate::filters::{blank_as_none, matches_text, matches_value};
use crate::standards::StandardRef;
use crate::store::{Collection, Document, Record};

pub use differentiate::{differentiate, DifferentiatedVersions};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningLevel {
    Basic,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Display for LearningLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Error)]
#[error("unknown learning level: {0}")]
pub struct LearningLevelParseError(pub String);

impl FromStr for LearningLevel {
    type Err = LearningLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(LearningLevelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyMaterial {
    pub title: String,
    pub subject: String,
    pub grade_level: String,
    pub topic: String,
    pub learning_level: LearningLevel,
    pub content: String,
    pub resources: Vec<String>,
    pub activities: Vec<MaterialActivity>,
    pub curriculum_standards: Vec<StandardRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialActivity {
    pub title: String,
    pub description: String,
    pub difficulty_level: DifficultyLevel,
}

impl Document for StudyMaterial {
    const COLLECTION: Collection = Collection::StudyMaterials;
    const ENTITY: &'static str = "Study material";

    fn validate(&self) -> Violations {
        let mut violations = Violations::new();
        violations.require_text("title", &self.title);
        violations.require_text("subject", &self.subject);
        violations.require_text("gradeLevel", &self.grade_level);
        violations.require_text("topic", &self.topic);
        violations.require_text("content", &self.content);
        for (index, activity) in self.activities.iter().enumerate() {
            violations.require_text(&format!("activities[{index}].title"), &activity.title);
            violations.require_text(
                &format!("activities[{index}].description"),
                &activity.description,
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
pub struct StudyMaterialFilter {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub topic: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub learning_level: Option<LearningLevel>,
}

impl StudyMaterialFilter {
    pub fn matches(&self, record: &Record<StudyMaterial>) -> bool {
        let material = &record.body;
        matches_text(&self.title, &material.title)
            && matches_text(&self.subject, &material.subject)
            && matches_text(&self.grade_level, &material.grade_level)
            && matches_text(&self.topic, &material.topic)
            && matches_value(&self.learning_level, &material.learning_level)
    }
}
