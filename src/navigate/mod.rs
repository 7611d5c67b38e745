//! Moving the current node around a tree: outward, inward, to siblings, to the top level, and
//! planning its removal.

mod cut;
mod locate;

use crate::coord::Span;
use crate::log;
use crate::schema::SlotSchema;
use crate::tree::{Path, Postorder, Preorder, Slot, Tree};

pub use cut::{CutPlan, CutTarget};
pub use locate::locate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Next,
    Prev,
}

/// Navigation over one tree. Every operation is a pure query: it takes paths and returns new
/// ones, or `None` when there is nowhere to go.
///
/// Paths from a different tree (e.g. from before the last parse) are rejected with `None`.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    tree: &'a Tree,
    schema: &'a SlotSchema,
}

impl<'a> Navigator<'a> {
    pub fn new(tree: &'a Tree, schema: &'a SlotSchema) -> Navigator<'a> {
        Navigator { tree, schema }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// The path whose node best matches `span`. See [`locate`].
    pub fn locate(&self, span: Span) -> Option<Path> {
        let path = locate(self.tree, span);
        log!(Trace, "locate {} -> {:?}", span, path);
        path
    }

    /// With a current path, its parent (`None` at the root). Without, the path located at
    /// `span`.
    pub fn expand(&self, span: Span, current: Option<&Path>) -> Option<Path> {
        match current {
            Some(path) => {
                if !self.accepts(path) {
                    return None;
                }
                path.parent_path().cloned()
            }
            None => self.locate(span),
        }
    }

    /// The first descendant of the path's node in document order.
    ///
    /// `expand` then `shrink` only returns to where it started from a parent's first child.
    pub fn shrink(&self, path: &Path) -> Option<Path> {
        if !self.accepts(path) {
            return None;
        }
        Preorder::below(self.tree, path).next()
    }

    /// The next node after the path's node: its neighbor in the same list if there is one, or
    /// else the first node in the next field of its parent.
    pub fn next_node(&self, path: &Path) -> Option<Path> {
        let result = self.step(path, Direction::Next);
        log!(Trace, "next {:?} -> {:?}", path, result);
        result
    }

    /// The previous node before the path's node: its neighbor in the same list if there is one,
    /// or else the first node (in exit order) of the previous field of its parent.
    ///
    /// From the first field of a parent with a schema entry, this wraps around to its last field.
    pub fn prev_node(&self, path: &Path) -> Option<Path> {
        let result = self.step(path, Direction::Prev);
        log!(Trace, "prev {:?} -> {:?}", path, result);
        result
    }

    /// The ancestor (or the path itself) whose parent is the root. The root is its own top level.
    pub fn to_top_level(&self, path: &Path) -> Path {
        path.ancestors()
            .find(|ancestor| ancestor.parent_path().map_or(true, Path::is_root))
            .cloned()
            .unwrap_or_else(|| path.clone())
    }

    /// Plan removing a node from the source text.
    ///
    /// For the current node, its own span is removed and there is no current path afterwards.
    /// For a node found at the cursor, its span is removed, the cursor goes to the start of its
    /// parent, and the parent becomes current. Returns `None` if there is no such node, it has no
    /// parent, or spans are missing.
    pub fn cut(&self, target: CutTarget) -> Option<CutPlan> {
        match target {
            CutTarget::Current(path) => {
                if !self.accepts(path) {
                    return None;
                }
                let delete = path.span(self.tree)?;
                Some(CutPlan {
                    delete,
                    cursor: delete.start,
                    path: None,
                })
            }
            CutTarget::Cursor(span) => {
                let path = self.locate(span)?;
                let parent_path = path.parent_path()?;
                let delete = path.span(self.tree)?;
                let parent_span = parent_path.span(self.tree)?;
                Some(CutPlan {
                    delete,
                    cursor: parent_span.start,
                    path: Some(parent_path.clone()),
                })
            }
        }
    }

    fn step(&self, path: &Path, dir: Direction) -> Option<Path> {
        if !self.accepts(path) {
            return None;
        }
        let offset = match dir {
            Direction::Next => 1,
            Direction::Prev => -1,
        };
        if let Some(sibling) = path.list_sibling(self.tree, offset) {
            return Some(sibling);
        }

        let parent_path = path.parent_path()?;
        let slot = path.slot()?;
        let parent_kind = parent_path.kind(self.tree);
        if self.schema.fields(parent_kind).is_some() {
            let target = match dir {
                Direction::Next => self.schema.field_after(parent_kind, slot.name()),
                Direction::Prev => self.schema.field_before(parent_kind, slot.name()),
            }?;
            self.find_below(parent_path, dir, |p| p.slot().map(Slot::name) == Some(target))
        } else {
            let node = path.node();
            self.find_below(parent_path, dir, |p| !p.is_within(node))
        }
    }

    /// The first descendant of `path`'s node satisfying `pred`, in pre-order when moving forward
    /// and in post-order when moving backward.
    fn find_below(
        &self,
        path: &Path,
        dir: Direction,
        mut pred: impl FnMut(&Path) -> bool,
    ) -> Option<Path> {
        match dir {
            Direction::Next => Preorder::below(self.tree, path).find(|p| pred(p)),
            Direction::Prev => Postorder::below(self.tree, path).find(|p| pred(p)),
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        if path.belongs_to(self.tree) {
            true
        } else {
            log!(Warn, "Ignoring path {:?} from a different parse", path);
            false
        }
    }
}
