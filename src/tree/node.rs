use crate::coord::Span;
use crate::util::{bug_assert, NavBug};
use generational_arena::{Arena, Index};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies one parse. Paths remember the id of the tree they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(usize);

/// A node in a syntax tree. You'll need the `&Tree` it came from to do anything with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(Index);

/// The position a child occupies in its parent: either a single-valued field (`index` is `None`),
/// or an element of a list-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub field: String,
    pub index: Option<usize>,
}

/// The children a builder attaches to a node, in field declaration order.
#[derive(Debug, Clone)]
pub enum Field<'a> {
    /// A single-valued field. `None` for an absent optional child.
    Single(&'a str, Option<Node>),
    /// A list-valued field.
    List(&'a str, Vec<Node>),
}

#[derive(Debug)]
struct NodeData {
    kind: String,
    span: Option<Span>,
    /// Identifier names, literal values and operators.
    text: Option<String>,
    children: Vec<(Slot, Node)>,
    has_parent: bool,
}

/// An immutable syntax tree. Built once per parse by a [`TreeBuilder`].
pub struct Tree {
    id: TreeId,
    arena: Arena<NodeData>,
    root: Node,
}

/// Builds a [`Tree`] bottom up: children are added before their parents.
pub struct TreeBuilder {
    arena: Arena<NodeData>,
}

impl Slot {
    pub fn field(field: &str) -> Slot {
        Slot {
            field: field.to_owned(),
            index: None,
        }
    }

    pub fn list(field: &str, index: usize) -> Slot {
        Slot {
            field: field.to_owned(),
            index: Some(index),
        }
    }

    /// The name used to look this slot up in a [`SlotSchema`](crate::SlotSchema). List elements
    /// are named after their list.
    pub fn name(&self) -> &str {
        &self.field
    }

    pub fn is_list(&self) -> bool {
        self.index.is_some()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.field, index),
            None => write!(f, "{}", self.field),
        }
    }
}

impl TreeBuilder {
    pub fn new() -> TreeBuilder {
        TreeBuilder {
            arena: Arena::new(),
        }
    }

    /// Adds a leaf node, e.g. an identifier or literal.
    pub fn leaf(&mut self, kind: &str, span: Option<Span>, text: Option<String>) -> Node {
        self.insert(NodeData {
            kind: kind.to_owned(),
            span,
            text,
            children: Vec::new(),
            has_parent: false,
        })
    }

    /// Adds a node with the given children. Each child must not already have a parent.
    pub fn branch<'a>(
        &mut self,
        kind: &str,
        span: Option<Span>,
        text: Option<String>,
        fields: impl IntoIterator<Item = Field<'a>>,
    ) -> Node {
        let mut children = Vec::new();
        for field in fields {
            match field {
                Field::Single(_, None) => (),
                Field::Single(name, Some(child)) => children.push((Slot::field(name), child)),
                Field::List(name, elems) => {
                    for (i, child) in elems.into_iter().enumerate() {
                        children.push((Slot::list(name, i), child));
                    }
                }
            }
        }
        for (_, child) in &children {
            let data = self
                .arena
                .get_mut(child.0)
                .bug_msg("TreeBuilder: child from another builder");
            bug_assert!(!data.has_parent, "TreeBuilder: node attached twice");
            data.has_parent = true;
        }
        self.insert(NodeData {
            kind: kind.to_owned(),
            span,
            text,
            children,
            has_parent: false,
        })
    }

    /// Finishes the tree. `root` must not have a parent.
    pub fn finish(self, root: Node) -> Tree {
        let root_data = self
            .arena
            .get(root.0)
            .bug_msg("TreeBuilder: root from another builder");
        bug_assert!(!root_data.has_parent, "TreeBuilder: root has a parent");
        Tree {
            id: TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)),
            arena: self.arena,
            root,
        }
    }

    fn insert(&mut self, data: NodeData) -> Node {
        Node(self.arena.insert(data))
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

impl Tree {
    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> Node {
        self.root
    }

    pub fn num_nodes(&self) -> usize {
        self.arena.len()
    }

    fn data(&self, node: Node) -> &NodeData {
        self.arena
            .get(node.0)
            .bug_msg("Node does not belong to this tree")
    }
}

impl Node {
    pub fn kind(self, tree: &Tree) -> &str {
        &tree.data(self).kind
    }

    pub fn span(self, tree: &Tree) -> Option<Span> {
        tree.data(self).span
    }

    pub fn text(self, tree: &Tree) -> Option<&str> {
        tree.data(self).text.as_deref()
    }

    /// This node's children, each with the slot it occupies, in document order.
    pub fn children(self, tree: &Tree) -> &[(Slot, Node)] {
        &tree.data(self).children
    }

    pub fn num_children(self, tree: &Tree) -> usize {
        tree.data(self).children.len()
    }

    pub fn is_root(self, tree: &Tree) -> bool {
        self == tree.root
    }

    /// The child at the given slot, if any.
    pub fn child_at(self, tree: &Tree, slot: &Slot) -> Option<Node> {
        self.children(tree)
            .iter()
            .find(|(child_slot, _)| child_slot == slot)
            .map(|(_, child)| *child)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn write_node(f: &mut fmt::Formatter, tree: &Tree, node: Node, depth: usize) -> fmt::Result {
            write!(f, "{:indent$}{}", "", node.kind(tree), indent = 2 * depth)?;
            if let Some(text) = node.text(tree) {
                write!(f, " {:?}", text)?;
            }
            if let Some(span) = node.span(tree) {
                write!(f, " @{}", span)?;
            }
            writeln!(f)?;
            for (slot, child) in node.children(tree) {
                writeln!(f, "{:indent$}.{}", "", slot, indent = 2 * depth + 2)?;
                write_node(f, tree, *child, depth + 2)?;
            }
            Ok(())
        }
        write_node(f, self, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Pos;

    fn span(line: usize, start: usize, end: usize) -> Option<Span> {
        Some(Span::new(Pos::new(line, start), Pos::new(line, end)))
    }

    #[test]
    fn test_build_tree() {
        let mut b = TreeBuilder::new();
        let id = b.leaf("Identifier", span(1, 9, 10), Some("f".to_owned()));
        let a = b.leaf("Identifier", span(1, 11, 12), Some("a".to_owned()));
        let body = b.branch("BlockStatement", span(1, 14, 16), None, [Field::List("body", vec![])]);
        let func = b.branch(
            "FunctionDeclaration",
            span(1, 0, 16),
            None,
            [
                Field::Single("id", Some(id)),
                Field::List("params", vec![a]),
                Field::Single("returnType", None),
                Field::Single("body", Some(body)),
            ],
        );
        let program = b.branch("Program", span(1, 0, 16), None, [Field::List("body", vec![func])]);
        let tree = b.finish(program);

        assert_eq!(tree.num_nodes(), 5);
        assert!(program.is_root(&tree));
        assert_eq!(func.kind(&tree), "FunctionDeclaration");
        let slots = func
            .children(&tree)
            .iter()
            .map(|(slot, _)| slot.to_string())
            .collect::<Vec<_>>();
        assert_eq!(slots, vec!["id", "params[0]", "body"]);
        assert_eq!(func.child_at(&tree, &Slot::list("params", 0)), Some(a));
        assert_eq!(func.child_at(&tree, &Slot::list("params", 1)), None);
        assert_eq!(body.num_children(&tree), 0);
        assert_eq!(a.text(&tree), Some("a"));
    }

    #[test]
    #[should_panic(expected = "attached twice")]
    fn test_child_attached_twice() {
        let mut b = TreeBuilder::new();
        let x = b.leaf("Identifier", None, None);
        b.branch("ExpressionStatement", None, None, [Field::Single("expression", Some(x))]);
        b.branch("ExpressionStatement", None, None, [Field::Single("expression", Some(x))]);
    }

    #[test]
    fn test_tree_ids_are_distinct() {
        let mut b1 = TreeBuilder::new();
        let r1 = b1.leaf("Program", None, None);
        let mut b2 = TreeBuilder::new();
        let r2 = b2.leaf("Program", None, None);
        assert_ne!(b1.finish(r1).id(), b2.finish(r2).id());
    }
}
