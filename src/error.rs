use thiserror::Error;

/// Failures surfaced by the tool controllers, independent of transport.
#[derive(Debug, Error)]
pub enum ToolError {
    /// One or more required fields are missing or malformed.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The requested id does not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The document store failed, returned something unreadable, or a
    /// configured value could not be applied.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Collects field-level problems before turning them into a single error.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.0.push(format!("{field} is required"));
        }
    }

    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.0.push(format!("{field} is required"));
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    pub fn into_result(self) -> ToolResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ToolError::Validation(self.0))
        }
    }
}
