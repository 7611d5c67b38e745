//! Structural navigation over syntax trees: find the node under a cursor, then move outward,
//! inward, to siblings and to the top level, or cut it out of the source text.

mod config;
mod coord;
mod navigate;
mod schema;
mod session;
mod tree;
mod util;

pub mod parsing;

pub use config::{ConfigError, Settings, DEFAULT_SETTINGS_FILE};
pub use coord::{Col, Line, Pos, PosParseError, Span};
pub use navigate::{locate, CutPlan, CutTarget, Navigator};
pub use schema::{SchemaError, SlotSchema, SlotSchemaSpec};
pub use session::{
    Command, EditorView, NavigationState, Outcome, Session, SessionError, UnknownCommand,
};
pub use tree::{Field, Node, Path, Postorder, Preorder, Slot, Tree, TreeBuilder, TreeId};
pub use util::{Log, LogEntry, LogLevel, NavBug};
