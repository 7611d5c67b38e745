use crate::coord::Span;
use crate::tree::{Path, Preorder, Tree};

/// Find the path whose node best matches `span`.
///
/// Walks the whole tree in pre-order. Among nodes that start on `span`'s first line and end on its
/// last line, and whose columns contain it, the last one visited (the innermost) wins. If there is
/// no such node, falls back to the first (outermost) node that starts on `span`'s first line.
/// Nodes without a span are never chosen.
pub fn locate(tree: &Tree, span: Span) -> Option<Path> {
    let mut exact = None;
    let mut line_fallback = None;

    for path in Preorder::including(tree, &Path::root(tree)) {
        let node_span = match path.span(tree) {
            Some(node_span) => node_span,
            None => continue,
        };
        if node_span.start.line != span.start.line {
            continue;
        }
        if node_span.end.line == span.end.line
            && span.start.column >= node_span.start.column
            && span.end.column <= node_span.end.column
        {
            exact = Some(path.clone());
        }
        if line_fallback.is_none() {
            line_fallback = Some(path);
        }
    }

    exact.or(line_fallback)
}
