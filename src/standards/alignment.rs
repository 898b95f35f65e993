use serde::{Deserialize, Serialize};

use crate::standards::CurriculumStandard;

pub const KEYWORD_POINTS: u32 = 10;
pub const OBJECTIVE_TOKEN_POINTS: u32 = 5;
/// Assumed tokens per objective when sizing the maximum; not a real count.
pub const ASSUMED_TOKENS_PER_OBJECTIVE: u32 = 5;
/// Objective tokens this short or shorter are treated as stop words.
pub const STOP_WORD_MAX_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentTier {
    Low,
    Moderate,
    Good,
    Excellent,
}

impl AlignmentTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => Self::Low,
            30..=59 => Self::Moderate,
            60..=89 => Self::Good,
            _ => Self::Excellent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentReport {
    /// 0..=100.
    pub score: u32,
    pub tier: AlignmentTier,
    pub raw_points: u32,
    pub max_possible: u32,
    pub matched_terms: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Keyword/objective-token overlap between `content` and `standard`.
///
/// Matching is plain case-insensitive substring search; punctuation is left
/// in place on both sides.
pub fn score_alignment(content: &str, standard: &CurriculumStandard) -> AlignmentReport {
    let max_possible = max_possible_points(standard);
    if content.is_empty() {
        return report(0, max_possible, Vec::new(), standard);
    }

    let content_lower = content.to_lowercase();
    let mut raw_points = 0;
    let mut matched_terms: Vec<String> = Vec::new();

    for keyword in &standard.keywords {
        if content_lower.contains(&keyword.to_lowercase()) {
            raw_points += KEYWORD_POINTS;
            matched_terms.push(keyword.clone());
        }
    }

    for objective in &standard.objectives {
        for token in objective_tokens(objective) {
            if content_lower.contains(&token) {
                raw_points += OBJECTIVE_TOKEN_POINTS;
                if !matched_terms.contains(&token) {
                    matched_terms.push(token);
                }
            }
        }
    }

    report(raw_points, max_possible, matched_terms, standard)
}

pub fn max_possible_points(standard: &CurriculumStandard) -> u32 {
    standard.keywords.len() as u32 * KEYWORD_POINTS
        + standard.objectives.len() as u32 * OBJECTIVE_TOKEN_POINTS * ASSUMED_TOKENS_PER_OBJECTIVE
}

/// `round(min(100, raw / max(max_possible, 1) * 100))`.
pub fn normalize_score(raw_points: u32, max_possible: u32) -> u32 {
    let ratio = f64::from(raw_points) / f64::from(max_possible.max(1));
    (ratio * 100.0).round().min(100.0) as u32
}

pub fn alignment_suggestions(score: u32, standard: &CurriculumStandard) -> Vec<String> {
    match AlignmentTier::from_score(score) {
        AlignmentTier::Low => vec![
            "The content has very low alignment with the curriculum standard.".to_string(),
            format!(
                "Consider incorporating these objectives: {}",
                standard.objectives.join(", ")
            ),
            format!("Include these keywords: {}", standard.keywords.join(", ")),
        ],
        AlignmentTier::Moderate => vec![
            "The content has moderate alignment with the curriculum standard.".to_string(),
            "Consider expanding on the key concepts mentioned in the objectives.".to_string(),
        ],
        AlignmentTier::Good => vec![
            "The content has good alignment with the curriculum standard.".to_string(),
            "For perfect alignment, ensure all objectives are thoroughly addressed.".to_string(),
        ],
        AlignmentTier::Excellent => {
            vec!["Excellent alignment with the curriculum standard!".to_string()]
        }
    }
}

fn objective_tokens(objective: &str) -> impl Iterator<Item = String> + '_ {
    objective
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > STOP_WORD_MAX_CHARS)
}

fn report(
    raw_points: u32,
    max_possible: u32,
    matched_terms: Vec<String>,
    standard: &CurriculumStandard,
) -> AlignmentReport {
    let score = normalize_score(raw_points, max_possible);
    AlignmentReport {
        score,
        tier: AlignmentTier::from_score(score),
        raw_points,
        max_possible,
        matched_terms,
        suggestions: alignment_suggestions(score, standard),
    }
}
