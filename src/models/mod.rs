pub mod audit;
pub mod idents;
pub mod task;

pub use audit::{AuditRecord, ChildRecord};
pub use task::{TaskCandidate, TaskStatus};
