use serde::Serialize;

use crate::materials::{DifficultyLevel, LearningLevel, MaterialActivity, StudyMaterial};
use crate::store::Record;

pub const SIMPLIFIED_BANNER: &str = "SIMPLIFIED VERSION:";
pub const ADVANCED_BANNER: &str = "ADVANCED VERSION:";
pub const ADVANCED_RESOURCE_PLACEHOLDER: &str =
    "Additional advanced resources would be added here";

const SIMPLIFIED_NOTE: &str = "This version has been simplified for basic learning levels, with:
- Simplified vocabulary
- More step-by-step instructions
- Additional explanations of concepts
- Visual aids and examples";

const ADVANCED_NOTE: &str = "This version has been enhanced for advanced learning levels, with:
- More complex vocabulary
- Additional challenging concepts
- Extended examples and applications
- Open-ended questions and scenarios
- Connections to other topics and subjects";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DifferentiatedVersions {
    pub original: Record<StudyMaterial>,
    pub basic: StudyMaterial,
    pub advanced: StudyMaterial,
}

/// Templated basic and advanced variants of a stored material.
///
/// The original content is carried verbatim between a fixed banner and a
/// fixed note; nothing is rewritten.
pub fn differentiate(material: &Record<StudyMaterial>) -> DifferentiatedVersions {
    let source = &material.body;

    let basic = StudyMaterial {
        title: format!("{} (Basic)", source.title),
        learning_level: LearningLevel::Basic,
        content: wrap_content(SIMPLIFIED_BANNER, &source.content, SIMPLIFIED_NOTE),
        activities: activities_at(
            &source.activities,
            &[DifficultyLevel::Easy, DifficultyLevel::Medium],
        ),
        ..source.clone()
    };

    let mut advanced_resources = source.resources.clone();
    advanced_resources.push(ADVANCED_RESOURCE_PLACEHOLDER.to_string());
    let advanced = StudyMaterial {
        title: format!("{} (Advanced)", source.title),
        learning_level: LearningLevel::Advanced,
        content: wrap_content(ADVANCED_BANNER, &source.content, ADVANCED_NOTE),
        resources: advanced_resources,
        activities: activities_at(
            &source.activities,
            &[DifficultyLevel::Medium, DifficultyLevel::Hard],
        ),
        ..source.clone()
    };

    DifferentiatedVersions {
        original: material.clone(),
        basic,
        advanced,
    }
}

fn wrap_content(banner: &str, content: &str, note: &str) -> String {
    format!("{banner}\n\n{content}\n\n{note}")
}

fn activities_at(
    activities: &[MaterialActivity],
    levels: &[DifficultyLevel],
) -> Vec<MaterialActivity> {
    activities
        .iter()
        .filter(|activity| levels.contains(&activity.difficulty_level))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{differentiate, ADVANCED_BANNER, ADVANCED_RESOURCE_PLACEHOLDER, SIMPLIFIED_BANNER};
    use crate::materials::{DifficultyLevel, LearningLevel, MaterialActivity, StudyMaterial};
    use crate::standards::StandardRef;
    use crate::store::Record;

    fn activity(title: &str, level: DifficultyLevel) -> MaterialActivity {
        MaterialActivity {
            title: title.to_string(),
            description: format!("{title} description"),
            difficulty_level: level,
        }
    }

    fn material() -> Record<StudyMaterial> {
        let now = Utc::now();
        Record {
            id: "m1".to_string(),
            created_at: now,
            updated_at: now,
            body: StudyMaterial {
                title: "The Water Cycle".to_string(),
                subject: "Science".to_string(),
                grade_level: "4".to_string(),
                topic: "Earth systems".to_string(),
                learning_level: LearningLevel::Intermediate,
                content: "Water evaporates, condenses, and precipitates.".to_string(),
                resources: vec!["Textbook ch. 3".to_string()],
                activities: vec![
                    activity("Label diagram", DifficultyLevel::Easy),
                    activity("Build a terrarium", DifficultyLevel::Medium),
                    activity("Model climate data", DifficultyLevel::Hard),
                ],
                curriculum_standards: vec![StandardRef::Id("std-1".to_string())],
            },
        }
    }

    fn titles(activities: &[MaterialActivity]) -> Vec<&str> {
        activities.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn filters_activities_by_tier_and_shares_medium() {
        let versions = differentiate(&material());
        assert_eq!(
            titles(&versions.basic.activities),
            vec!["Label diagram", "Build a terrarium"]
        );
        assert_eq!(
            titles(&versions.advanced.activities),
            vec!["Build a terrarium", "Model climate data"]
        );
        assert!(versions
            .basic
            .activities
            .iter()
            .all(|a| a.difficulty_level != DifficultyLevel::Hard));
        assert!(versions
            .advanced
            .activities
            .iter()
            .all(|a| a.difficulty_level != DifficultyLevel::Easy));
    }

    #[test]
    fn content_is_templated_around_the_original() {
        let source = material();
        let versions = differentiate(&source);
        assert!(versions.basic.content.starts_with(SIMPLIFIED_BANNER));
        assert!(versions.advanced.content.starts_with(ADVANCED_BANNER));
        assert!(versions.basic.content.contains(&source.body.content));
        assert!(versions.advanced.content.contains(&source.body.content));
        assert_eq!(versions.basic.title, "The Water Cycle (Basic)");
        assert_eq!(versions.advanced.title, "The Water Cycle (Advanced)");
        assert_eq!(versions.basic.learning_level, LearningLevel::Basic);
        assert_eq!(versions.advanced.learning_level, LearningLevel::Advanced);
    }

    #[test]
    fn metadata_is_copied_and_advanced_gets_placeholder_resource() {
        let source = material();
        let versions = differentiate(&source);
        assert_eq!(versions.original, source);
        assert_eq!(versions.basic.resources, source.body.resources);
        assert_eq!(
            versions.advanced.resources,
            vec!["Textbook ch. 3", ADVANCED_RESOURCE_PLACEHOLDER]
        );
        for variant in [&versions.basic, &versions.advanced] {
            assert_eq!(variant.subject, "Science");
            assert_eq!(variant.grade_level, "4");
            assert_eq!(variant.topic, "Earth systems");
            assert_eq!(variant.curriculum_standards, source.body.curriculum_standards);
        }
    }
}
