use serde::Deserialize;

use crate::assignments::{RubricCriterion, RubricLevel};
use crate::error::{ToolResult, Violations};
use crate::standards::{CurriculumStandard, StandardRef};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RubricRequest {
    pub title: String,
    pub description: String,
    pub points_possible: Option<u32>,
    pub curriculum_standards: Vec<StandardRef>,
}

/// Builds an ordered rubric for an assignment worth `points_possible`.
///
/// Without standards the rubric is the fixed 40/30/30 split; with standards
/// there is one criterion per standard worth `points / standards.len()`.
/// Both allocations round down and never redistribute the remainder, so the
/// criteria can total less than `points_possible`.
pub fn generate_rubric(
    title: &str,
    description: &str,
    points_possible: Option<u32>,
    standards: &[CurriculumStandard],
) -> ToolResult<Vec<RubricCriterion>> {
    let mut violations = Violations::new();
    violations.require_text("title", title);
    violations.require_text("description", description);
    match points_possible {
        None => violations.push("pointsPossible is required"),
        Some(0) => violations.push("pointsPossible must be a positive integer"),
        Some(_) => {}
    }
    violations.into_result()?;
    let points = points_possible.unwrap_or_default();

    if standards.is_empty() {
        return Ok(default_criteria(points));
    }
    let per_standard = points / standards.len() as u32;
    Ok(standards
        .iter()
        .map(|standard| standard_criterion(standard, per_standard))
        .collect())
}

fn default_criteria(points: u32) -> Vec<RubricCriterion> {
    vec![
        RubricCriterion {
            name: "Content Quality".to_string(),
            description: "The quality and accuracy of the content".to_string(),
            points_possible: share(points, 40),
            levels: vec![
                RubricLevel::new(1, "Poor content quality with many errors"),
                RubricLevel::new(2, "Basic content with some errors"),
                RubricLevel::new(3, "Good content with minor errors"),
                RubricLevel::new(4, "Excellent content with no errors"),
            ],
        },
        RubricCriterion {
            name: "Organization".to_string(),
            description: "The structure and organization of the work".to_string(),
            points_possible: share(points, 30),
            levels: vec![
                RubricLevel::new(1, "Poorly organized and difficult to follow"),
                RubricLevel::new(2, "Basic organization with some logical flow"),
                RubricLevel::new(3, "Well organized with good flow"),
                RubricLevel::new(4, "Exceptionally well organized and easy to follow"),
            ],
        },
        RubricCriterion {
            name: "Presentation".to_string(),
            description: "The presentation and format of the work".to_string(),
            points_possible: share(points, 30),
            levels: vec![
                RubricLevel::new(1, "Poor presentation with many formatting issues"),
                RubricLevel::new(2, "Basic presentation with some formatting issues"),
                RubricLevel::new(3, "Good presentation with minimal formatting issues"),
                RubricLevel::new(4, "Excellent presentation with no formatting issues"),
            ],
        },
    ]
}

fn standard_criterion(standard: &CurriculumStandard, points: u32) -> RubricCriterion {
    let code = &standard.standard_id;
    RubricCriterion {
        name: format!("Standard: {code}"),
        description: standard.description.clone(),
        points_possible: points,
        levels: vec![
            RubricLevel::new(1, format!("Does not meet the standard: {code}")),
            RubricLevel::new(2, format!("Partially meets the standard: {code}")),
            RubricLevel::new(3, format!("Meets the standard: {code}")),
            RubricLevel::new(4, format!("Exceeds the standard: {code}")),
        ],
    }
}

/// floor(points * percent / 100)
fn share(points: u32, percent: u64) -> u32 {
    (u64::from(points) * percent / 100) as u32
}
