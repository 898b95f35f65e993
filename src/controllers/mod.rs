//! Request-independent handlers for each teacher tool.
//!
//! Controllers validate, resolve standard references and persist through a
//! [`Repository`]; the HTTP layer and the CLI both sit on top of them.

pub mod assignments;
pub mod behavior;
pub mod catalog;
pub mod curriculum;
pub mod materials;
pub mod remediation;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::ToolResult;
use crate::standards::CurriculumStandard;
use crate::store::{Document, DocumentStore, Record, Repository};

pub use assignments::AssignmentController;
pub use behavior::BehaviorController;
pub use catalog::StandardCatalog;
pub use curriculum::{AlignmentCheck, AlignmentRequest, CurriculumController};
pub use materials::MaterialController;
pub use remediation::RemediationController;

pub struct TeacherTools {
    pub curriculum: CurriculumController,
    pub assignments: AssignmentController,
    pub materials: MaterialController,
    pub remediation: RemediationController,
    pub behavior: BehaviorController,
}

impl TeacherTools {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            curriculum: CurriculumController::new(&store),
            assignments: AssignmentController::new(&store),
            materials: MaterialController::new(&store),
            remediation: RemediationController::new(&store, &config.remediation),
            behavior: BehaviorController::new(&store, config.behavior.recent_records),
        }
    }
}

/// CRUD surface shared by every resource.
pub trait ResourceController: Send + Sync + 'static {
    type Doc: Document;

    fn select(tools: &TeacherTools) -> &Self;

    fn crud(&self) -> &Crud<Self::Doc>;

    fn list(&self) -> ToolResult<Vec<Record<Self::Doc>>> {
        self.crud().list()
    }

    fn get(&self, id: &str) -> ToolResult<Record<Self::Doc>> {
        self.crud().get(id)
    }

    fn create(&self, body: Self::Doc) -> ToolResult<Record<Self::Doc>> {
        self.crud().create(body)
    }

    fn update(&self, id: &str, body: Self::Doc) -> ToolResult<Record<Self::Doc>> {
        self.crud().update(id, body)
    }

    fn delete(&self, id: &str) -> ToolResult<String> {
        self.crud().delete(id)
    }
}

/// Persistence plus standard-reference handling for one entity type.
pub struct Crud<T> {
    records: Repository<T>,
    standards: Repository<CurriculumStandard>,
}

impl<T: Document> Crud<T> {
    pub fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            records: Repository::new(Arc::clone(store)),
            standards: Repository::new(Arc::clone(store)),
        }
    }

    pub fn repository(&self) -> &Repository<T> {
        &self.records
    }

    pub fn catalog(&self) -> ToolResult<StandardCatalog> {
        StandardCatalog::load(&self.standards)
    }

    /// Newest first, references populated.
    pub fn list(&self) -> ToolResult<Vec<Record<T>>> {
        let records = self.records.list()?;
        self.populate(records)
    }

    pub fn search(&self, predicate: impl Fn(&Record<T>) -> bool) -> ToolResult<Vec<Record<T>>> {
        let records = self
            .records
            .list()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect();
        self.populate(records)
    }

    pub fn get(&self, id: &str) -> ToolResult<Record<T>> {
        let record = self.records.get(id)?;
        self.populate_one(record)
    }

    pub fn create(&self, mut body: T) -> ToolResult<Record<T>> {
        self.normalize(&mut body)?;
        let record = self.records.create(body)?;
        info!(entity = T::ENTITY, id = %record.id, "created");
        self.populate_one(record)
    }

    pub fn update(&self, id: &str, mut body: T) -> ToolResult<Record<T>> {
        self.records.get(id)?;
        self.normalize(&mut body)?;
        let record = self.records.replace(id, body)?;
        info!(entity = T::ENTITY, id = %record.id, "updated");
        self.populate_one(record)
    }

    pub fn delete(&self, id: &str) -> ToolResult<String> {
        let deleted = self.records.delete(id)?;
        info!(entity = T::ENTITY, id = %deleted, "deleted");
        Ok(deleted)
    }

    fn normalize(&self, body: &mut T) -> ToolResult<()> {
        if body.standard_refs().is_empty() {
            return Ok(());
        }
        self.catalog()?.normalize(body)
    }

    fn populate(&self, mut records: Vec<Record<T>>) -> ToolResult<Vec<Record<T>>> {
        if records
            .iter()
            .all(|record| record.body.standard_refs().is_empty())
        {
            return Ok(records);
        }
        let catalog = self.catalog()?;
        for record in &mut records {
            catalog.populate(record);
        }
        Ok(records)
    }

    fn populate_one(&self, mut record: Record<T>) -> ToolResult<Record<T>> {
        if !record.body.standard_refs().is_empty() {
            self.catalog()?.populate(&mut record);
        }
        Ok(record)
    }
}
