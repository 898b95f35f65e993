use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assignments::Assignment;
use crate::controllers::{Crud, ResourceController, TeacherTools};
use crate::error::{ToolError, ToolResult, Violations};
use crate::materials::StudyMaterial;
use crate::remediation::RemediationPlan;
use crate::standards::{
    score_alignment, AlignmentTier, CurriculumFilter, CurriculumStandard,
};
use crate::store::{Document, DocumentStore, Record, Repository};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlignmentRequest {
    pub curriculum_id: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentCheck {
    pub alignment_score: u32,
    pub tier: AlignmentTier,
    pub matched_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub curriculum: Record<CurriculumStandard>,
}

pub struct CurriculumController {
    crud: Crud<CurriculumStandard>,
    assignments: Repository<Assignment>,
    materials: Repository<StudyMaterial>,
    plans: Repository<RemediationPlan>,
}

impl CurriculumController {
    pub fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            crud: Crud::new(store),
            assignments: Repository::new(Arc::clone(store)),
            materials: Repository::new(Arc::clone(store)),
            plans: Repository::new(Arc::clone(store)),
        }
    }

    pub fn search(&self, filter: &CurriculumFilter) -> ToolResult<Vec<Record<CurriculumStandard>>> {
        self.crud.search(|record| filter.matches(record))
    }

    pub fn check_alignment(&self, request: &AlignmentRequest) -> ToolResult<AlignmentCheck> {
        let id = match request.curriculum_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(ToolError::validation("curriculumId is required")),
        };
        let curriculum = self.crud.get(id)?;
        let report = score_alignment(&request.content, &curriculum.body);
        Ok(AlignmentCheck {
            alignment_score: report.score,
            tier: report.tier,
            matched_keywords: report.matched_terms,
            suggestions: report.suggestions,
            curriculum,
        })
    }

    fn is_referenced(&self, id: &str) -> ToolResult<bool> {
        Ok(referenced_by(&self.assignments, id)?
            || referenced_by(&self.materials, id)?
            || referenced_by(&self.plans, id)?)
    }
}

fn referenced_by<T: Document>(repository: &Repository<T>, id: &str) -> ToolResult<bool> {
    Ok(repository
        .list()?
        .iter()
        .any(|record| record.body.references_standard(id)))
}

impl ResourceController for CurriculumController {
    type Doc = CurriculumStandard;

    fn select(tools: &TeacherTools) -> &Self {
        &tools.curriculum
    }

    fn crud(&self) -> &Crud<CurriculumStandard> {
        &self.crud
    }

    /// A referenced standard keeps its code.
    fn update(
        &self,
        id: &str,
        body: CurriculumStandard,
    ) -> ToolResult<Record<CurriculumStandard>> {
        let existing = self.crud.get(id)?;
        if existing.body.standard_id != body.standard_id.trim() && self.is_referenced(id)? {
            let mut violations = Violations::new();
            violations.push(format!(
                "standardId cannot change while {} is referenced",
                existing.body.standard_id
            ));
            violations.into_result()?;
        }
        self.crud.update(id, body)
    }
}
