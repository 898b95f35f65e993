use std::sync::Arc;

use tracing::warn;

use crate::assignments::{generate_rubric, Assignment, AssignmentFilter, RubricCriterion, RubricRequest};
use crate::controllers::{Crud, ResourceController, TeacherTools};
use crate::error::ToolResult;
use crate::store::{DocumentStore, Record};

pub struct AssignmentController {
    crud: Crud<Assignment>,
}

impl AssignmentController {
    pub fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            crud: Crud::new(store),
        }
    }

    pub fn search(&self, filter: &AssignmentFilter) -> ToolResult<Vec<Record<Assignment>>> {
        self.crud.search(|record| filter.matches(record))
    }

    /// Unknown standard ids are skipped; if none resolve the default rubric is used.
    pub fn generate_rubric(&self, request: &RubricRequest) -> ToolResult<Vec<RubricCriterion>> {
        let standards = if request.curriculum_standards.is_empty() {
            Vec::new()
        } else {
            let (found, unknown) = self.crud.catalog()?.resolve(&request.curriculum_standards);
            if !unknown.is_empty() {
                warn!(unknown = ?unknown, "rubric request names unknown curriculum standards");
            }
            found
        };
        generate_rubric(
            &request.title,
            &request.description,
            request.points_possible,
            &standards,
        )
    }
}

impl ResourceController for AssignmentController {
    type Doc = Assignment;

    fn select(tools: &TeacherTools) -> &Self {
        &tools.assignments
    }

    fn crud(&self) -> &Crud<Assignment> {
        &self.crud
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::AssignmentController;
    use crate::assignments::{Assignment, AssignmentFilter, RubricRequest};
    use crate::controllers::{Crud, ResourceController};
    use crate::error::ToolError;
    use crate::standards::{CurriculumStandard, StandardRef};
    use crate::store::{DocumentStore, MemoryStore};

    fn setup() -> (AssignmentController, String) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let standards: Crud<CurriculumStandard> = Crud::new(&store);
        let standard = standards
            .create(CurriculumStandard {
                standard_id: "ELA.6.W.1".to_string(),
                subject: "English".to_string(),
                grade_level: "6".to_string(),
                description: "Write arguments to support claims".to_string(),
                ..CurriculumStandard::default()
            })
            .expect("create standard");
        (AssignmentController::new(&store), standard.id)
    }

    fn request(points: u32, standards: Vec<StandardRef>) -> RubricRequest {
        RubricRequest {
            title: "Argument essay".to_string(),
            description: "Defend a position".to_string(),
            points_possible: Some(points),
            curriculum_standards: standards,
        }
    }

    #[test]
    fn rubric_uses_resolved_standards_only() {
        let (controller, id) = setup();
        let rubric = controller
            .generate_rubric(&request(
                50,
                vec![StandardRef::Id(id), StandardRef::Id("gone".to_string())],
            ))
            .expect("rubric");
        assert_eq!(rubric.len(), 1);
        assert_eq!(rubric[0].name, "Standard: ELA.6.W.1");
        assert_eq!(rubric[0].points_possible, 50);
    }

    #[test]
    fn repeated_standard_yields_one_criterion() {
        let (controller, id) = setup();
        let rubric = controller
            .generate_rubric(&request(
                100,
                vec![StandardRef::Id(id.clone()), StandardRef::Id(id)],
            ))
            .expect("rubric");
        let points: Vec<u32> = rubric.iter().map(|c| c.points_possible).collect();
        assert_eq!(points, vec![100]);
    }

    #[test]
    fn rubric_falls_back_to_defaults_when_nothing_resolves() {
        let (controller, _) = setup();
        let rubric = controller
            .generate_rubric(&request(10, vec![StandardRef::Id("gone".to_string())]))
            .expect("rubric");
        let points: Vec<u32> = rubric.iter().map(|c| c.points_possible).collect();
        assert_eq!(points, vec![4, 3, 3]);
    }

    #[test]
    fn rubric_validation_surfaces() {
        let (controller, _) = setup();
        assert!(matches!(
            controller.generate_rubric(&RubricRequest::default()),
            Err(ToolError::Validation(_))
        ));
    }

    #[test]
    fn search_by_referenced_standard() {
        let (controller, id) = setup();
        let base = Assignment {
            title: "Claims and evidence".to_string(),
            description: "Short response".to_string(),
            instructions: "Cite two sources".to_string(),
            subject: "English".to_string(),
            grade_level: "6".to_string(),
            points_possible: Some(10),
            ..Assignment::default()
        };
        controller
            .create(Assignment {
                curriculum_standards: vec![StandardRef::Id(id.clone())],
                ..base.clone()
            })
            .expect("create linked");
        controller.create(base).expect("create unlinked");

        let linked = controller
            .search(&AssignmentFilter {
                curriculum_standard: Some(id),
                ..AssignmentFilter::default()
            })
            .expect("search");
        assert_eq!(linked.len(), 1);
        assert!(linked[0].body.curriculum_standards[0].is_resolved());
    }
}
