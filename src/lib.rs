pub mod config;
pub mod editor;
pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use config::EditorConfig;
pub use editor::{Editor, GestureOutcome, ModifierState, OperationId, RejectReason};
pub use error::{Result, SchematicError};
