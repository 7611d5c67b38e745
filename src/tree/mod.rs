mod node;
mod path;
mod walk;

pub use node::{Field, Node, Slot, Tree, TreeBuilder, TreeId};
pub use path::Path;
pub use walk::{Postorder, Preorder};
