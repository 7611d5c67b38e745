use super::node::{Node, Slot, Tree, TreeId};
use crate::coord::Span;
use std::fmt;
use std::rc::Rc;

/// A position in a tree: a node, the slot it occupies, and the path to its parent.
///
/// Paths are immutable and cheap to clone; moving around produces new paths that share their
/// ancestry. A path is only meaningful for the tree it was derived from (see
/// [`Path::belongs_to`]).
#[derive(Clone)]
pub struct Path(Rc<PathLink>);

struct PathLink {
    tree: TreeId,
    node: Node,
    /// `None` iff this is the root path.
    slot: Option<Slot>,
    parent: Option<Path>,
}

impl Path {
    /****************
     * Constructors *
     ****************/

    pub fn root(tree: &Tree) -> Path {
        Path(Rc::new(PathLink {
            tree: tree.id(),
            node: tree.root(),
            slot: None,
            parent: None,
        }))
    }

    /// The path to a child of this path's node. The slot must be the one the child occupies.
    pub(crate) fn child(&self, slot: Slot, node: Node) -> Path {
        Path(Rc::new(PathLink {
            tree: self.0.tree,
            node,
            slot: Some(slot),
            parent: Some(self.clone()),
        }))
    }

    /// Paths to the children of this path's node, in document order.
    pub fn children<'t>(&self, tree: &'t Tree) -> impl DoubleEndedIterator<Item = Path> + 't {
        let parent = self.clone();
        self.node()
            .children(tree)
            .iter()
            .map(move |(slot, child)| parent.child(slot.clone(), *child))
    }

    /*************
     * Accessors *
     *************/

    pub fn node(&self) -> Node {
        self.0.node
    }

    pub fn slot(&self) -> Option<&Slot> {
        self.0.slot.as_ref()
    }

    pub fn parent_path(&self) -> Option<&Path> {
        self.0.parent.as_ref()
    }

    /// The parent's node, i.e. `self.parent_path().node()`.
    pub fn parent(&self) -> Option<Node> {
        self.parent_path().map(Path::node)
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    pub fn tree_id(&self) -> TreeId {
        self.0.tree
    }

    /// Whether this path was derived from `tree`. Paths from an older parse must not be used
    /// with a newer tree.
    pub fn belongs_to(&self, tree: &Tree) -> bool {
        self.0.tree == tree.id()
    }

    pub fn kind<'t>(&self, tree: &'t Tree) -> &'t str {
        self.node().kind(tree)
    }

    pub fn span(&self, tree: &Tree) -> Option<Span> {
        self.node().span(tree)
    }

    /// Number of steps to the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// This path, then its parent path, and so on up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Path> {
        std::iter::successors(Some(self), |path| path.parent_path())
    }

    /// Whether `node` is this path's node or one of its ancestors'.
    pub fn is_within(&self, node: Node) -> bool {
        self.ancestors().any(|path| path.node() == node)
    }

    /// The position of each node among its parent's children, from the root down.
    pub fn indices_from_root(&self, tree: &Tree) -> Vec<usize> {
        let mut indices = self
            .ancestors()
            .filter_map(|path| {
                let parent = path.parent()?;
                parent
                    .children(tree)
                    .iter()
                    .position(|(_, child)| *child == path.node())
            })
            .collect::<Vec<_>>();
        indices.reverse();
        indices
    }

    /**************
     * Navigation *
     **************/

    /// The neighbor in the same list-valued field, `offset` elements away. `None` if this path is
    /// not in a list, or the list has no element there.
    pub fn list_sibling(&self, tree: &Tree, offset: isize) -> Option<Path> {
        let slot = self.slot()?;
        let index = slot.index?.checked_add_signed(offset)?;
        let sibling_slot = Slot::list(&slot.field, index);
        let parent_path = self.parent_path()?;
        let sibling = parent_path.node().child_at(tree, &sibling_slot)?;
        Some(parent_path.child(sibling_slot, sibling))
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Path) -> bool {
        self.0.tree == other.0.tree
            && self.depth() == other.depth()
            && self
                .ancestors()
                .zip(other.ancestors())
                .all(|(a, b)| a.node() == b.node())
    }
}

impl Eq for Path {}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let slots = self
            .ancestors()
            .filter_map(|path| path.slot().map(|slot| slot.to_string()))
            .collect::<Vec<_>>();
        write!(f, "Path(")?;
        for (i, slot) in slots.iter().rev().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", slot)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Field, TreeBuilder};

    // Program { body: [ExpressionStatement { expression: Call { callee, arguments: [x, y, z] } }] }
    fn call_tree() -> Tree {
        let mut b = TreeBuilder::new();
        let callee = b.leaf("Identifier", None, Some("f".to_owned()));
        let args = ["x", "y", "z"]
            .iter()
            .map(|name| b.leaf("Identifier", None, Some((*name).to_owned())))
            .collect::<Vec<_>>();
        let call = b.branch(
            "CallExpression",
            None,
            None,
            [
                Field::Single("callee", Some(callee)),
                Field::List("arguments", args),
            ],
        );
        let stmt = b.branch(
            "ExpressionStatement",
            None,
            None,
            [Field::Single("expression", Some(call))],
        );
        let program = b.branch("Program", None, None, [Field::List("body", vec![stmt])]);
        b.finish(program)
    }

    fn descend(tree: &Tree, path: &Path, index: usize) -> Path {
        path.children(tree).nth(index).unwrap()
    }

    #[test]
    fn test_path_chain() {
        let tree = call_tree();
        let root = Path::root(&tree);
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.slot(), None);

        let stmt = descend(&tree, &root, 0);
        let call = descend(&tree, &stmt, 0);
        let y = descend(&tree, &call, 2);
        assert_eq!(y.depth(), 3);
        assert_eq!(y.slot(), Some(&Slot::list("arguments", 1)));
        assert_eq!(y.parent(), Some(call.node()));
        assert_eq!(y.parent_path(), Some(&call));
        assert_eq!(y.indices_from_root(&tree), vec![0, 0, 2]);
        assert!(y.is_within(stmt.node()));
        assert!(!stmt.is_within(y.node()));
        assert_eq!(format!("{:?}", y), "Path(body[0].expression.arguments[1])");
    }

    #[test]
    fn test_list_siblings() {
        let tree = call_tree();
        let call = descend(&tree, &descend(&tree, &Path::root(&tree), 0), 0);
        let callee = descend(&tree, &call, 0);
        let x = descend(&tree, &call, 1);
        let y = descend(&tree, &call, 2);
        let z = descend(&tree, &call, 3);

        assert_eq!(x.list_sibling(&tree, 1), Some(y.clone()));
        assert_eq!(z.list_sibling(&tree, -2), Some(x.clone()));
        assert_eq!(x.list_sibling(&tree, -1), None);
        assert_eq!(z.list_sibling(&tree, 1), None);
        assert_eq!(callee.list_sibling(&tree, 1), None);
    }

    #[test]
    fn test_paths_from_different_trees_differ() {
        let tree1 = call_tree();
        let tree2 = call_tree();
        assert!(Path::root(&tree1).belongs_to(&tree1));
        assert!(!Path::root(&tree1).belongs_to(&tree2));
        assert_ne!(Path::root(&tree1), Path::root(&tree2));
        assert_eq!(Path::root(&tree1), Path::root(&tree1));
    }
}
