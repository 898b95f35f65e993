use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::assignments::RubricCriterion;
use crate::behavior::BehaviorSummary;
use crate::controllers::AlignmentCheck;
use crate::materials::{DifferentiatedVersions, StudyMaterial};
use crate::standards::AlignmentTier;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn tier_color(tier: AlignmentTier) -> Color {
    match tier {
        AlignmentTier::Low => Color::Red,
        AlignmentTier::Moderate => Color::Yellow,
        AlignmentTier::Good => Color::Cyan,
        AlignmentTier::Excellent => Color::Green,
    }
}

pub fn render_alignment_table(check: &AlignmentCheck) -> String {
    let mut table = new_table();
    table.set_header(vec!["Standard", "Score", "Matched Terms", "Suggestions"]);
    table.add_row(Row::from(vec![
        Cell::new(&check.curriculum.body.standard_id),
        Cell::new(check.alignment_score.to_string()).fg(tier_color(check.tier)),
        Cell::new(if check.matched_keywords.is_empty() {
            "-".to_string()
        } else {
            check.matched_keywords.join(", ")
        }),
        Cell::new(check.suggestions.join("\n")),
    ]));
    table.to_string()
}

pub fn render_rubric_table(rubric: &[RubricCriterion]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Criterion", "Points", "Levels"]);
    for criterion in rubric {
        let levels = criterion
            .levels
            .iter()
            .map(|level| format!("{}. {}", level.score, level.description))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            criterion.name.clone(),
            criterion.points_possible.to_string(),
            levels,
        ]);
    }
    let total: u32 = rubric.iter().map(|c| c.points_possible).sum();
    table.add_row(vec!["Total".to_string(), total.to_string(), String::new()]);
    table.to_string()
}

pub fn render_differentiation_table(versions: &DifferentiatedVersions) -> String {
    let mut table = new_table();
    table.set_header(vec!["Version", "Title", "Level", "Activities", "Resources"]);
    let original = &versions.original.body;
    for (label, material) in [
        ("Original", original),
        ("Basic", &versions.basic),
        ("Advanced", &versions.advanced),
    ] {
        table.add_row(material_row(label, material));
    }
    table.to_string()
}

fn material_row(label: &str, material: &StudyMaterial) -> Vec<String> {
    let activities = material
        .activities
        .iter()
        .map(|activity| format!("{} ({:?})", activity.title, activity.difficulty_level))
        .collect::<Vec<_>>()
        .join("\n");
    vec![
        label.to_string(),
        material.title.clone(),
        material.learning_level.to_string(),
        activities,
        material.resources.len().to_string(),
    ]
}

pub fn render_behavior_summary_table(summary: &BehaviorSummary) -> String {
    let mut counts = new_table();
    counts.set_header(vec!["Kind", "Value", "Count"]);
    for (behavior_type, count) in &summary.type_counts {
        counts.add_row(vec![
            "Type".to_string(),
            behavior_type.to_string(),
            count.to_string(),
        ]);
    }
    for (category, count) in &summary.category_counts {
        counts.add_row(vec![
            "Category".to_string(),
            category.to_string(),
            count.to_string(),
        ]);
    }

    let mut recent = new_table();
    recent.set_header(vec!["Date", "Student", "Type", "Category", "Follow-up"]);
    for record in &summary.recent_records {
        let behavior = &record.body;
        let follow_up = if behavior.follow_up_needed {
            Cell::new("YES").fg(Color::Yellow)
        } else {
            Cell::new("no")
        };
        recent.add_row(Row::from(vec![
            Cell::new(
                behavior
                    .date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&behavior.student_name),
            Cell::new(behavior.behavior_type.to_string()),
            Cell::new(
                behavior
                    .category
                    .map(|category| category.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            follow_up,
        ]));
    }

    format!(
        "{} record(s) matching \"{}\"\n{counts}\n{recent}",
        summary.total, summary.student_name
    )
}
