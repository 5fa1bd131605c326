pub mod context;
pub mod loader;

pub use context::KnowledgeContext;
pub use loader::{DocumentKind, KnowledgeLoader};
