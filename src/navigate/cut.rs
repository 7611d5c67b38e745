use crate::coord::{Pos, Span};
use crate::tree::Path;

/// What to cut.
#[derive(Debug, Clone, Copy)]
pub enum CutTarget<'p> {
    /// The current node, which the caller already knows.
    Current(&'p Path),
    /// Whatever node is found at this cursor span.
    Cursor(Span),
}

/// The result of planning a cut. Nothing is modified until the caller applies it.
#[derive(Debug, Clone)]
pub struct CutPlan {
    /// The text to remove.
    pub delete: Span,
    /// Where to put the cursor afterwards.
    pub cursor: Pos,
    /// The path the caller should consider current afterwards, if any. It refers to the tree from
    /// before the cut: once the text changes, re-parse and re-locate before navigating from it.
    pub path: Option<Path>,
}

impl CutPlan {
    /// Remove the planned span from `text`. Returns `None` if the span isn't within `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        self.delete.delete_from(text)
    }
}
