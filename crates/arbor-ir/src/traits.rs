//! Traits for language writers.

use crate::error::RenderError;
use crate::node::{Ast, NodeId};

/// A writer emits a tree as source code in a target language.
pub trait Writer: Send + Sync {
    /// Language identifier (e.g., "python").
    fn language(&self) -> &'static str;

    /// File extension for output (e.g., "py").
    fn extension(&self) -> &'static str;

    /// Emit the subtree rooted at `root` as source code.
    fn write(&self, ast: &Ast, root: NodeId) -> Result<String, RenderError>;
}
