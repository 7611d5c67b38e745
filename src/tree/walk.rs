//! Document-order traversals that yield [`Path`]s, so that callers can stop at the first match
//! with ordinary iterator adapters (`find`, `take_while`, ...).

use super::node::Tree;
use super::path::Path;

/// Pre-order ("enter") traversal.
pub struct Preorder<'t> {
    tree: &'t Tree,
    stack: Vec<Path>,
}

/// Post-order ("exit") traversal.
pub struct Postorder<'t> {
    tree: &'t Tree,
    // The bool says whether the path's children have already been pushed.
    stack: Vec<(Path, bool)>,
}

impl<'t> Preorder<'t> {
    /// Visits `path` and then all of its descendants.
    pub fn including(tree: &'t Tree, path: &Path) -> Preorder<'t> {
        Preorder {
            tree,
            stack: vec![path.clone()],
        }
    }

    /// Visits the descendants of `path`, but not `path` itself.
    pub fn below(tree: &'t Tree, path: &Path) -> Preorder<'t> {
        Preorder {
            tree,
            stack: path.children(tree).rev().collect(),
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        let path = self.stack.pop()?;
        self.stack.extend(path.children(self.tree).rev());
        Some(path)
    }
}

impl<'t> Postorder<'t> {
    /// Visits the descendants of `path`, but not `path` itself.
    pub fn below(tree: &'t Tree, path: &Path) -> Postorder<'t> {
        Postorder {
            tree,
            stack: path.children(tree).rev().map(|child| (child, false)).collect(),
        }
    }
}

impl<'t> Iterator for Postorder<'t> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        loop {
            let (path, expanded) = self.stack.pop()?;
            if expanded {
                return Some(path);
            }
            let children = path.children(self.tree).rev().collect::<Vec<_>>();
            self.stack.push((path, true));
            self.stack
                .extend(children.into_iter().map(|child| (child, false)));
        }
    }
}
