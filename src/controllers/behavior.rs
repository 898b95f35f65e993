use std::sync::Arc;

use crate::behavior::{
    sort_by_observed_desc, summarize_student, BehaviorFilter, BehaviorRecord, BehaviorSummary,
};
use crate::controllers::{Crud, ResourceController, TeacherTools};
use crate::error::{ToolError, ToolResult};
use crate::store::{DocumentStore, Record};

pub struct BehaviorController {
    crud: Crud<BehaviorRecord>,
    recent_records: usize,
}

impl BehaviorController {
    pub fn new(store: &Arc<dyn DocumentStore>, recent_records: usize) -> Self {
        Self {
            crud: Crud::new(store),
            recent_records,
        }
    }

    pub fn search(&self, filter: &BehaviorFilter) -> ToolResult<Vec<Record<BehaviorRecord>>> {
        let mut records = self.crud.search(|record| filter.matches(record))?;
        sort_by_observed_desc(&mut records);
        Ok(records)
    }

    pub fn summary(&self, student_name: &str) -> ToolResult<BehaviorSummary> {
        if student_name.trim().is_empty() {
            return Err(ToolError::validation("studentName is required"));
        }
        let records = self.crud.list()?;
        Ok(summarize_student(student_name, records, self.recent_records))
    }
}

impl ResourceController for BehaviorController {
    type Doc = BehaviorRecord;

    fn select(tools: &TeacherTools) -> &Self {
        &tools.behavior
    }

    fn crud(&self) -> &Crud<BehaviorRecord> {
        &self.crud
    }

    /// Most recent observation first.
    fn list(&self) -> ToolResult<Vec<Record<BehaviorRecord>>> {
        let mut records = self.crud.list()?;
        sort_by_observed_desc(&mut records);
        Ok(records)
    }
}
