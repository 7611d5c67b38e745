//! Editor-side glue: turns the seven navigation commands into selection and cursor changes on an
//! [`EditorView`], keeping the current path and a cached parse between commands.

use crate::coord::{Pos, Span};
use crate::log;
use crate::navigate::{CutTarget, Navigator};
use crate::parsing::{Parse, ParseError};
use crate::schema::SlotSchema;
use crate::tree::{Path, Tree};
use crate::util::bug;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where navigation currently is. Owned by the [`Session`].
#[derive(Debug, Clone, Default)]
pub enum NavigationState {
    /// No current node: the next command starts from the cursor.
    #[default]
    Unset,
    Positioned(Path),
}

impl NavigationState {
    pub fn path(&self) -> Option<&Path> {
        match self {
            NavigationState::Unset => None,
            NavigationState::Positioned(path) => Some(path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Select,
    Expand,
    Shrink,
    Next,
    Prev,
    Top,
    Cut,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Select,
        Command::Expand,
        Command::Shrink,
        Command::Next,
        Command::Prev,
        Command::Top,
        Command::Cut,
    ];

    pub fn name(self) -> &'static str {
        use Command::*;

        match self {
            Select => "select",
            Expand => "expand",
            Shrink => "shrink",
            Next => "next",
            Prev => "prev",
            Top => "top",
            Cut => "cut",
        }
    }

    pub fn description(self) -> &'static str {
        use Command::*;

        match self {
            Select => "Select the node at the cursor",
            Expand => "Select the parent of the current node",
            Shrink => "Select the first child of the current node",
            Next => "Move to the next node",
            Prev => "Move to the previous node",
            Top => "Move to the start of the enclosing top-level node",
            Cut => "Delete the current node",
        }
    }

    /// The default key chord.
    pub fn chord(self) -> &'static str {
        use Command::*;

        match self {
            Select => "ctrl-alt-a",
            Expand => "ctrl-alt-s",
            Shrink => "ctrl-alt-d",
            Next => "ctrl-alt-x",
            Prev => "ctrl-alt-z",
            Top => "ctrl-alt-p",
            Cut => "ctrl-alt-k",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(name: &str) -> Result<Command, UnknownCommand> {
        Command::ALL
            .into_iter()
            .find(|command| command.name() == name)
            .ok_or_else(|| UnknownCommand(name.to_owned()))
    }
}

/// The editor state a session reads and writes: the text, and a selection from `anchor` to
/// `head`. The cursor is the head; the view is selecting iff `anchor != head`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub text: String,
    pub anchor: Pos,
    pub head: Pos,
}

impl EditorView {
    pub fn new(text: impl Into<String>, cursor: Pos) -> EditorView {
        EditorView {
            text: text.into(),
            anchor: cursor,
            head: cursor,
        }
    }

    pub fn cursor(&self) -> Pos {
        self.head
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor != self.head
    }

    /// The selection, start first.
    pub fn selection(&self) -> Span {
        Span::new(self.anchor.min(self.head), self.anchor.max(self.head))
    }

    pub fn set_selection(&mut self, span: Span) {
        self.anchor = span.start;
        self.head = span.end;
    }

    pub fn set_cursor(&mut self, pos: Pos) {
        self.anchor = pos;
        self.head = pos;
    }
}

/// What a command did to the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A node became current. The view now shows it, unless it has no span.
    Target { kind: String, span: Option<Span> },
    /// Text was deleted and the cursor moved.
    Cut { deleted: Span, cursor: Pos },
    /// There was nowhere to go. Nothing changed.
    NoTarget,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Cannot parse text {0}")]
    Parse(#[from] ParseError),
    #[error("Span {0} is not within the text")]
    SpanOutOfRange(Span),
}

/// Runs commands against an editor view, remembering the current path between them.
///
/// The tree is re-parsed only when the view's text differs from the last parse. A successful
/// re-parse resets navigation; a failed one leaves the previous tree and state in place.
#[derive(Debug)]
pub struct Session {
    parser: Box<dyn Parse>,
    schema: SlotSchema,
    /// The last successfully parsed text, and its tree.
    cache: Option<(String, Tree)>,
    state: NavigationState,
}

impl Session {
    pub fn new(parser: Box<dyn Parse>, schema: SlotSchema) -> Session {
        Session {
            parser,
            schema,
            cache: None,
            state: NavigationState::Unset,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// The tree from the most recent successful parse.
    pub fn tree(&self) -> Option<&Tree> {
        self.cache.as_ref().map(|(_, tree)| tree)
    }

    /// The cursor was moved by something other than this session.
    pub fn reposition(&mut self, view: &mut EditorView, anchor: Pos, head: Pos) {
        view.anchor = anchor;
        view.head = head;
        self.state = NavigationState::Unset;
    }

    pub fn execute(
        &mut self,
        command: Command,
        view: &mut EditorView,
    ) -> Result<Outcome, SessionError> {
        self.refresh(&view.text)?;
        let tree = match &self.cache {
            Some((_, tree)) => tree,
            None => bug!("Session: no tree after a successful parse"),
        };
        let nav = Navigator::new(tree, &self.schema);
        let cursor = Span::point(view.cursor());
        let current = self.state.path();

        if command == Command::Cut {
            let target = match current {
                Some(path) => CutTarget::Current(path),
                None => CutTarget::Cursor(cursor),
            };
            let plan = match nav.cut(target) {
                Some(plan) => plan,
                None => return Ok(Outcome::NoTarget),
            };
            view.text = plan
                .apply(&view.text)
                .ok_or(SessionError::SpanOutOfRange(plan.delete))?;
            view.set_cursor(plan.cursor);
            self.state = NavigationState::Unset;
            log!(Debug, "Cut {}", plan.delete);
            return Ok(Outcome::Cut {
                deleted: plan.delete,
                cursor: plan.cursor,
            });
        }

        let start = || current.cloned().or_else(|| nav.locate(cursor));
        let target = match command {
            Command::Select => nav.locate(cursor),
            Command::Expand => nav.expand(cursor, current),
            Command::Shrink => current.and_then(|path| nav.shrink(path)),
            Command::Next => start().and_then(|path| nav.next_node(&path)),
            Command::Prev => start().and_then(|path| nav.prev_node(&path)),
            Command::Top => start().map(|path| nav.to_top_level(&path)),
            Command::Cut => bug!("Session: cut handled above"),
        };
        let path = match target {
            Some(path) => path,
            None => {
                log!(Debug, "{}: no target", command);
                return Ok(Outcome::NoTarget);
            }
        };

        let span = path.span(tree);
        if let Some(span) = span {
            match command {
                Command::Select => view.set_selection(span),
                Command::Top => view.set_cursor(span.start),
                _ if view.is_selecting() => view.set_selection(span),
                _ => view.set_cursor(span.start),
            }
        }
        let outcome = Outcome::Target {
            kind: path.kind(tree).to_owned(),
            span,
        };
        self.state = NavigationState::Positioned(path);
        Ok(outcome)
    }

    fn refresh(&mut self, text: &str) -> Result<(), ParseError> {
        if let Some((cached_text, _)) = &self.cache {
            if cached_text == text {
                return Ok(());
            }
        }
        let tree = self.parser.parse(text)?;
        log!(
            Debug,
            "Re-parsed {} text; navigation reset",
            self.parser.name()
        );
        self.cache = Some((text.to_owned(), tree));
        self.state = NavigationState::Unset;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::JsParser;

    fn session() -> Session {
        Session::new(Box::new(JsParser), SlotSchema::default())
    }

    fn target_kind(outcome: Outcome) -> String {
        match outcome {
            Outcome::Target { kind, .. } => kind,
            other => panic!("Expected a target, found {:?}", other),
        }
    }

    #[test]
    fn test_command_names() {
        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>(), Ok(command));
        }
        assert_eq!(Command::Top.chord(), "ctrl-alt-p");
        assert_eq!(
            "jump".parse::<Command>(),
            Err(UnknownCommand("jump".to_owned()))
        );
    }

    #[test]
    fn test_select_then_expand_selects() {
        let mut session = session();
        let mut view = EditorView::new("let x = f(a);", Pos::new(1, 10));
        let kind = target_kind(session.execute(Command::Select, &mut view).unwrap());
        assert_eq!(kind, "Identifier");
        assert_eq!(
            view.selection(),
            Span::new(Pos::new(1, 10), Pos::new(1, 11))
        );
        let kind = target_kind(session.execute(Command::Expand, &mut view).unwrap());
        assert_eq!(kind, "CallExpression");
        assert_eq!(view.selection(), Span::new(Pos::new(1, 8), Pos::new(1, 12)));
    }

    #[test]
    fn test_moves_cursor_when_not_selecting() {
        let mut session = session();
        let mut view = EditorView::new("f(a, b);", Pos::new(1, 2));
        let kind = target_kind(session.execute(Command::Next, &mut view).unwrap());
        assert_eq!(kind, "Identifier");
        assert!(!view.is_selecting());
        assert_eq!(view.cursor(), Pos::new(1, 5));
    }

    #[test]
    fn test_shrink_needs_current_path() {
        let mut session = session();
        let mut view = EditorView::new("f(a);", Pos::new(1, 0));
        assert_eq!(
            session.execute(Command::Shrink, &mut view).unwrap(),
            Outcome::NoTarget
        );
    }

    #[test]
    fn test_reposition_resets_state() {
        let mut session = session();
        let mut view = EditorView::new("f(a);", Pos::new(1, 2));
        session.execute(Command::Select, &mut view).unwrap();
        assert!(session.state().path().is_some());
        session.reposition(&mut view, Pos::new(1, 0), Pos::new(1, 0));
        assert!(session.state().path().is_none());
    }

    #[test]
    fn test_parse_error_keeps_state() {
        let mut session = session();
        let mut view = EditorView::new("f(a);", Pos::new(1, 2));
        session.execute(Command::Select, &mut view).unwrap();
        let tree_id = session.tree().unwrap().id();

        view.text = "f(a;".to_owned();
        let err = session.execute(Command::Expand, &mut view).unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
        assert!(session.state().path().is_some());
        assert_eq!(session.tree().unwrap().id(), tree_id);
    }

    #[test]
    fn test_text_change_resets_state() {
        let mut session = session();
        let mut view = EditorView::new("f(a);", Pos::new(1, 2));
        session.execute(Command::Select, &mut view).unwrap();
        view.text = "g(a);".to_owned();
        // Unset, so expand locates at the cursor instead of taking the parent.
        let kind = target_kind(session.execute(Command::Expand, &mut view).unwrap());
        assert_eq!(kind, "Identifier");
    }

    #[test]
    fn test_cut_current() {
        let mut session = session();
        let mut view = EditorView::new("a;\nb;\n", Pos::new(2, 0));
        session.execute(Command::Select, &mut view).unwrap();
        session.execute(Command::Expand, &mut view).unwrap();
        let outcome = session.execute(Command::Cut, &mut view).unwrap();
        assert_eq!(
            outcome,
            Outcome::Cut {
                deleted: Span::new(Pos::new(2, 0), Pos::new(2, 2)),
                cursor: Pos::new(2, 0),
            }
        );
        assert_eq!(view.text, "a;\n\n");
        assert!(session.state().path().is_none());
    }
}
