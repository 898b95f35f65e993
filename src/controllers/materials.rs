use std::sync::Arc;

use crate::controllers::{Crud, ResourceController, TeacherTools};
use crate::error::ToolResult;
use crate::materials::{differentiate, DifferentiatedVersions, StudyMaterial, StudyMaterialFilter};
use crate::store::{DocumentStore, Record};

pub struct MaterialController {
    crud: Crud<StudyMaterial>,
}

impl MaterialController {
    pub fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            crud: Crud::new(store),
        }
    }

    pub fn search(&self, filter: &StudyMaterialFilter) -> ToolResult<Vec<Record<StudyMaterial>>> {
        self.crud.search(|record| filter.matches(record))
    }

    /// Read-only; neither variant is persisted.
    pub fn differentiate(&self, id: &str) -> ToolResult<DifferentiatedVersions> {
        let material = self.crud.get(id)?;
        Ok(differentiate(&material))
    }
}

impl ResourceController for MaterialController {
    type Doc = StudyMaterial;

    fn select(tools: &TeacherTools) -> &Self {
        &tools.materials
    }

    fn crud(&self) -> &Crud<StudyMaterial> {
        &self.crud
    }
}
