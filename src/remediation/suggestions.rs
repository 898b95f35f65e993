use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, ToolResult, Violations};
use crate::filters::contains_ci;
use crate::remediation::{ActivityType, PlanActivity, PlanGoal, PlanProgress, TargetArea};
use crate::standards::{CurriculumStandard, StandardRef};
use crate::store::Record;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub subject: String,
    pub grade_level: String,
    pub areas: Vec<String>,
}

/// Skeleton plan a teacher edits before saving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub target_areas: Vec<TargetArea>,
    pub goals: Vec<PlanGoal>,
    pub activities: Vec<PlanActivity>,
    pub progress: PlanProgress,
}

#[derive(Debug, Clone, Copy)]
pub struct DraftSettings {
    pub goal_horizon_days: i64,
    pub activities_per_area: usize,
}

/// Fills the canned goal and activity templates for each concern area.
///
/// Standards are narrowed by subject and grade substring first; each area then
/// links the first remaining standard whose description or an objective
/// mentions it.
pub fn suggest_plan(
    request: &SuggestionRequest,
    standards: &[Record<CurriculumStandard>],
    settings: DraftSettings,
    now: DateTime<Utc>,
) -> ToolResult<PlanDraft> {
    let areas: Vec<&str> = request
        .areas
        .iter()
        .map(|area| area.trim())
        .filter(|area| !area.is_empty())
        .collect();

    let mut violations = Violations::new();
    violations.require_text("subject", &request.subject);
    violations.require_text("gradeLevel", &request.grade_level);
    if areas.is_empty() {
        violations.push("at least one area of concern is required");
    }
    violations.into_result()?;

    let candidates: Vec<&Record<CurriculumStandard>> = standards
        .iter()
        .filter(|record| {
            contains_ci(&record.body.subject, request.subject.trim())
                && contains_ci(&record.body.grade_level, request.grade_level.trim())
        })
        .collect();

    let target_areas: Vec<TargetArea> = areas
        .iter()
        .map(|area| TargetArea {
            area: area.to_string(),
            description: format!("Improve skills in {area}"),
            curriculum_standard: candidates
                .iter()
                .find(|record| mentions(&record.body, area))
                .map(|record| StandardRef::Id(record.id.clone())),
        })
        .collect();

    let target_date = Duration::try_days(settings.goal_horizon_days)
        .and_then(|horizon| now.checked_add_signed(horizon))
        .ok_or_else(|| {
            ToolError::Store(anyhow!(
                "goal horizon of {} days is out of range",
                settings.goal_horizon_days
            ))
        })?;

    let goals = areas
        .iter()
        .map(|area| PlanGoal {
            description: format!("Master concepts related to {area}"),
            success_criteria: format!(
                "Student can demonstrate understanding of {area} through assessment with 80% accuracy"
            ),
            target_date: Some(target_date),
        })
        .collect();

    let per_area = settings.activities_per_area;
    let activities = areas
        .iter()
        .flat_map(|area| {
            ActivityType::SUGGESTED
                .into_iter()
                .take(per_area)
                .map(move |activity_type| PlanActivity {
                    title: format!("{} activity for {area}", activity_type.label()),
                    description: format!(
                        "{} activity to improve skills in {area}",
                        activity_type.label()
                    ),
                    activity_type,
                    resources: vec![format!("Sample resource for {area}")],
                })
        })
        .collect();

    Ok(PlanDraft {
        target_areas,
        goals,
        activities,
        progress: PlanProgress::default(),
    })
}

fn mentions(standard: &CurriculumStandard, area: &str) -> bool {
    contains_ci(&standard.description, area)
        || standard
            .objectives
            .iter()
            .any(|objective| contains_ci(objective, area))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{suggest_plan, DraftSettings, SuggestionRequest};
    use crate::error::ToolError;
    use crate::remediation::{ActivityType, PlanStatus};
    use crate::standards::{CurriculumStandard, StandardRef};
    use crate::store::Record;

    fn settings() -> DraftSettings {
        DraftSettings {
            goal_horizon_days: 30,
            activities_per_area: 3,
        }
    }

    fn standard(id: &str, subject: &str, grade: &str, description: &str) -> Record<CurriculumStandard> {
        let now = Utc::now();
        Record {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
            body: CurriculumStandard {
                standard_id: id.to_uppercase(),
                subject: subject.to_string(),
                grade_level: grade.to_string(),
                description: description.to_string(),
                objectives: vec!["Interpret multiplication as scaling".to_string()],
                keywords: vec![],
            },
        }
    }

    fn request(areas: &[&str]) -> SuggestionRequest {
        SuggestionRequest {
            subject: "math".to_string(),
            grade_level: "5".to_string(),
            areas: areas.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn links_first_standard_mentioning_each_area() {
        let standards = vec![
            standard("s-reading", "Reading", "5", "Fractions in recipes"),
            standard("s-frac", "Mathematics", "Grade 5", "Add and subtract fractions"),
            standard("s-mult", "Mathematics", "Grade 5", "Multi-digit arithmetic"),
        ];
        let now = Utc::now();
        let draft = suggest_plan(&request(&["Fractions", "scaling", "geometry"]), &standards, settings(), now)
            .expect("draft failed");

        let refs: Vec<Option<&str>> = draft
            .target_areas
            .iter()
            .map(|area| area.curriculum_standard.as_ref().map(StandardRef::id))
            .collect();
        assert_eq!(refs, vec![Some("s-frac"), Some("s-frac"), None]);
        assert_eq!(draft.target_areas[0].description, "Improve skills in Fractions");
    }

    #[test]
    fn one_goal_and_three_activities_per_area() {
        let now = Utc::now();
        let draft = suggest_plan(&request(&["decimals", "  ", "ratios"]), &[], settings(), now)
            .expect("draft failed");
        assert_eq!(draft.target_areas.len(), 2);
        assert_eq!(draft.goals.len(), 2);
        assert_eq!(draft.goals[1].description, "Master concepts related to ratios");
        assert_eq!(draft.goals[0].target_date, Some(now + Duration::days(30)));
        assert_eq!(draft.activities.len(), 6);
        let kinds: Vec<ActivityType> = draft.activities[..3]
            .iter()
            .map(|a| a.activity_type)
            .collect();
        assert_eq!(
            kinds,
            vec![ActivityType::Practice, ActivityType::Assessment, ActivityType::Game]
        );
        assert_eq!(draft.activities[0].title, "Practice activity for decimals");
        assert_eq!(draft.progress.status, PlanStatus::NotStarted);
        assert!(draft.progress.notes.is_empty());
    }

    #[test]
    fn activity_count_is_capped_by_known_types() {
        let draft = suggest_plan(
            &request(&["place value"]),
            &[],
            DraftSettings {
                goal_horizon_days: 7,
                activities_per_area: 12,
            },
            Utc::now(),
        )
        .expect("draft failed");
        assert_eq!(draft.activities.len(), 5);
    }

    #[test]
    fn unrepresentable_horizon_is_an_error() {
        let result = suggest_plan(
            &request(&["fractions"]),
            &[],
            DraftSettings {
                goal_horizon_days: 100_000_000,
                activities_per_area: 3,
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(ToolError::Store(_))));
    }

    #[test]
    fn requires_subject_grade_and_an_area() {
        let err = suggest_plan(
            &SuggestionRequest {
                areas: vec![" ".to_string()],
                ..SuggestionRequest::default()
            },
            &[],
            settings(),
            Utc::now(),
        )
        .expect_err("expected validation error");
        match err {
            ToolError::Validation(messages) => assert_eq!(messages.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
