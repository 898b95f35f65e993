use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::RemediationConfig;
use crate::controllers::{Crud, ResourceController, TeacherTools};
use crate::error::{ToolError, ToolResult};
use crate::remediation::suggestions::DraftSettings;
use crate::remediation::{
    suggest_plan, PlanDraft, ProgressNoteRequest, RemediationFilter, RemediationPlan,
    SuggestionRequest,
};
use crate::store::{DocumentStore, Record};

pub struct RemediationController {
    crud: Crud<RemediationPlan>,
    settings: DraftSettings,
}

impl RemediationController {
    pub fn new(store: &Arc<dyn DocumentStore>, config: &RemediationConfig) -> Self {
        Self {
            crud: Crud::new(store),
            settings: DraftSettings {
                goal_horizon_days: config.goal_horizon_days,
                activities_per_area: config.activities_per_area,
            },
        }
    }

    pub fn search(&self, filter: &RemediationFilter) -> ToolResult<Vec<Record<RemediationPlan>>> {
        self.crud.search(|record| filter.matches(record))
    }

    /// Appends a timestamped note; earlier notes are never touched.
    pub fn add_progress_note(
        &self,
        id: &str,
        request: ProgressNoteRequest,
    ) -> ToolResult<Record<RemediationPlan>> {
        let mut record = self.crud.repository().get(id)?;
        let now = Utc::now();
        let note = request
            .into_note(now)
            .map_err(|violations| ToolError::Validation(violations.into_messages()))?;
        record.body.progress.notes.push(note);
        record.updated_at = now;
        self.crud.repository().write(&record)?;
        info!(
            id = %record.id,
            notes = record.body.progress.notes.len(),
            "progress note added"
        );
        self.crud.get(id)
    }

    pub fn suggest(&self, request: &SuggestionRequest) -> ToolResult<PlanDraft> {
        let mut standards = self.crud.catalog()?.records();
        // newest first, same as list
        standards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        suggest_plan(request, &standards, self.settings, Utc::now())
    }
}

impl ResourceController for RemediationController {
    type Doc = RemediationPlan;

    fn select(tools: &TeacherTools) -> &Self {
        &tools.remediation
    }

    fn crud(&self) -> &Crud<RemediationPlan> {
        &self.crud
    }

    /// Status is replaceable; stored notes are kept.
    fn update(&self, id: &str, mut body: RemediationPlan) -> ToolResult<Record<RemediationPlan>> {
        let existing = self.crud.repository().get(id)?;
        body.progress.notes = existing.body.progress.notes;
        self.crud.update(id, body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::RemediationController;
    use crate::config::RemediationConfig;
    use crate::controllers::{Crud, ResourceController};
    use crate::error::ToolError;
    use crate::remediation::{
        PlanStatus, ProgressIndicator, ProgressNoteRequest, RemediationFilter, RemediationPlan,
        SuggestionRequest,
    };
    use crate::standards::{CurriculumStandard, StandardRef};
    use crate::store::{DocumentStore, MemoryStore};

    fn setup() -> (Arc<dyn DocumentStore>, RemediationController) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let controller = RemediationController::new(&store, &RemediationConfig::default());
        (store, controller)
    }

    fn plan() -> RemediationPlan {
        RemediationPlan {
            student_name: "Ava Brooks".to_string(),
            student_id: "S-204".to_string(),
            grade_level: "3".to_string(),
            subject: "Math".to_string(),
            ..RemediationPlan::default()
        }
    }

    fn note(content: &str) -> ProgressNoteRequest {
        ProgressNoteRequest {
            content: content.to_string(),
            progress_indicator: Some(ProgressIndicator::SomeProgress),
        }
    }

    #[test]
    fn progress_notes_append_in_order() {
        let (_, controller) = setup();
        let created = controller.create(plan()).expect("create");
        assert!(created.body.start_date.is_some());

        controller
            .add_progress_note(&created.id, note("Completed first worksheet"))
            .expect("first note");
        let updated = controller
            .add_progress_note(&created.id, note("Needs help with regrouping"))
            .expect("second note");

        let contents: Vec<&str> = updated
            .body
            .progress
            .notes
            .iter()
            .map(|n| n.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["Completed first worksheet", "Needs help with regrouping"]
        );
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn progress_note_errors() {
        let (_, controller) = setup();
        assert!(matches!(
            controller.add_progress_note("missing", note("x")),
            Err(ToolError::NotFound { .. })
        ));
        let created = controller.create(plan()).expect("create");
        assert!(matches!(
            controller.add_progress_note(&created.id, ProgressNoteRequest::default()),
            Err(ToolError::Validation(_))
        ));
    }

    #[test]
    fn full_update_keeps_stored_notes() {
        let (_, controller) = setup();
        let created = controller.create(plan()).expect("create");
        controller
            .add_progress_note(&created.id, note("Reviewed place value"))
            .expect("note");

        let mut replacement = plan();
        replacement.progress.status = PlanStatus::InProgress;
        let updated = controller
            .update(&created.id, replacement)
            .expect("update");
        assert_eq!(updated.body.progress.status, PlanStatus::InProgress);
        assert_eq!(updated.body.progress.notes.len(), 1);
    }

    #[test]
    fn suggestions_link_stored_standards() {
        let (store, controller) = setup();
        let standards: Crud<CurriculumStandard> = Crud::new(&store);
        let standard = standards
            .create(CurriculumStandard {
                standard_id: "MATH.3.NBT.2".to_string(),
                subject: "Math".to_string(),
                grade_level: "Grade 3".to_string(),
                description: "Fluently add and subtract within 1000 using regrouping".to_string(),
                ..CurriculumStandard::default()
            })
            .expect("create standard");

        let draft = controller
            .suggest(&SuggestionRequest {
                subject: "math".to_string(),
                grade_level: "3".to_string(),
                areas: vec!["regrouping".to_string()],
            })
            .expect("suggest");
        assert_eq!(
            draft.target_areas[0].curriculum_standard,
            Some(StandardRef::Id(standard.id))
        );
        assert_eq!(draft.activities.len(), 3);
        assert!(draft.goals[0].target_date.expect("target date") > Utc::now());
    }

    #[test]
    fn search_by_status_and_query() {
        let (_, controller) = setup();
        controller.create(plan()).expect("create");
        let mut reading = plan();
        reading.subject = "Reading".to_string();
        reading.progress.status = PlanStatus::Completed;
        controller.create(reading).expect("create");

        let completed = controller
            .search(&RemediationFilter {
                status: Some(PlanStatus::Completed),
                ..RemediationFilter::default()
            })
            .expect("search");
        assert_eq!(completed.len(), 1);
        let by_query = controller
            .search(&RemediationFilter {
                query: Some("ava".to_string()),
                ..RemediationFilter::default()
            })
            .expect("search");
        assert_eq!(by_query.len(), 2);
    }
}
