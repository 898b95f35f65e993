pub mod alignment;
pub mod schema;

pub use alignment::{score_alignment, AlignmentReport, AlignmentTier};
pub use schema::{CurriculumFilter, CurriculumStandard, StandardRef};
