use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::error::{ToolResult, Violations};
use crate::standards::{CurriculumStandard, StandardRef};
use crate::store::{Document, Record, Repository};

/// Snapshot of stored standards keyed by record id.
pub struct StandardCatalog {
    by_id: HashMap<String, Record<CurriculumStandard>>,
}

impl StandardCatalog {
    pub fn load(standards: &Repository<CurriculumStandard>) -> ToolResult<Self> {
        let by_id = standards
            .list()?
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Ok(Self { by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Record<CurriculumStandard>> {
        self.by_id.get(id)
    }

    /// Rewrites every reference to a bare id; unknown ids are violations.
    pub fn normalize<T: Document>(&self, body: &mut T) -> ToolResult<()> {
        let mut violations = Violations::new();
        for reference in body.standard_refs_mut() {
            let id = reference.id().trim().to_string();
            if !self.by_id.contains_key(&id) {
                violations.push(format!("curriculum standard not found: {id}"));
            }
            *reference = StandardRef::Id(id);
        }
        violations.into_result()
    }

    /// Expands resolvable references in place; orphans stay bare ids.
    pub fn populate<T: Document>(&self, record: &mut Record<T>) {
        let owner = record.id.clone();
        for reference in record.body.standard_refs_mut() {
            let id = reference.id().to_string();
            match self.by_id.get(&id) {
                Some(standard) => *reference = StandardRef::Inline(Box::new(standard.clone())),
                None => {
                    warn!(entity = T::ENTITY, id = %owner, standard = %id, "orphan curriculum standard reference");
                    *reference = StandardRef::Id(id);
                }
            }
        }
    }

    /// Distinct standards in first-mention order; the second list holds ids
    /// that did not resolve.
    pub fn resolve(&self, references: &[StandardRef]) -> (Vec<CurriculumStandard>, Vec<String>) {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut unknown = Vec::new();
        for reference in references {
            let id = reference.id().trim();
            if !seen.insert(id) {
                continue;
            }
            match self.by_id.get(id) {
                Some(record) => found.push(record.body.clone()),
                None => unknown.push(id.to_string()),
            }
        }
        (found, unknown)
    }

    pub fn records(&self) -> Vec<Record<CurriculumStandard>> {
        self.by_id.values().cloned().collect()
    }
}
