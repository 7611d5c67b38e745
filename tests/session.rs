use std::fs;
use structnav::parsing::JsParser;
use structnav::{Command, EditorView, Outcome, Pos, Session, SlotSchema, Span};

const SCHEMA_PATH: &str = "data/slot_schema.ron";

fn session() -> Session {
    Session::new(Box::new(JsParser), SlotSchema::default())
}

/// Runs the commands and describes each outcome as `kind start-end`, `cut`, or `none`.
fn run(session: &mut Session, view: &mut EditorView, commands: &[Command]) -> Vec<String> {
    commands
        .iter()
        .map(|command| match session.execute(*command, view).unwrap() {
            Outcome::Target {
                kind,
                span: Some(span),
            } => format!("{} {}", kind, span),
            Outcome::Target { kind, span: None } => kind,
            Outcome::Cut { .. } => "cut".to_owned(),
            Outcome::NoTarget => "none".to_owned(),
        })
        .collect()
}

#[test]
fn test_select_and_expand() {
    use Command::*;

    let mut session = session();
    let mut view = EditorView::new("function f(a, b) { return a + b; }", Pos::new(1, 14));
    let outcomes = run(&mut session, &mut view, &[Select, Expand, Expand, Expand]);
    assert_eq!(
        outcomes,
        vec![
            "Identifier 1:14-1:15",
            "FunctionDeclaration 1:0-1:34",
            "Program 1:0-1:34",
            "none",
        ]
    );
    // No target leaves the selection where it was.
    assert_eq!(view.selection(), Span::new(Pos::new(1, 0), Pos::new(1, 34)));
}

#[test]
fn test_next_prev_and_shrink() {
    use Command::*;

    let mut session = session();
    let mut view = EditorView::new("function f(a, b) { return a + b; }", Pos::new(1, 11));
    let outcomes = run(&mut session, &mut view, &[Next, Next, Shrink, Prev]);
    assert_eq!(
        outcomes,
        vec![
            "Identifier 1:14-1:15",
            "BlockStatement 1:17-1:34",
            "ReturnStatement 1:19-1:32",
            "none",
        ]
    );
    assert_eq!(view.cursor(), Pos::new(1, 19));
    assert!(!view.is_selecting());
}

#[test]
fn test_top_moves_cursor_even_when_selecting() {
    use Command::*;

    let mut session = session();
    let source = "let a = 1;\n\nfunction g() {\n  return h(a);\n}\n";
    let mut view = EditorView::new(source, Pos::new(4, 11));
    let outcomes = run(&mut session, &mut view, &[Select, Top]);
    assert_eq!(outcomes, vec!["Identifier 4:11-4:12", "FunctionDeclaration 3:0-5:1"]);
    assert_eq!(view.cursor(), Pos::new(3, 0));
    assert!(!view.is_selecting());
}

#[test]
fn test_cut_at_cursor_then_continue() {
    use Command::*;

    let mut session = session();
    let mut view = EditorView::new("function g() {\n  x + y;\n}\n", Pos::new(2, 8));
    let outcome = session.execute(Cut, &mut view).unwrap();
    assert_eq!(
        outcome,
        Outcome::Cut {
            deleted: Span::new(Pos::new(2, 2), Pos::new(2, 8)),
            cursor: Pos::new(1, 13),
        }
    );
    assert_eq!(view.text, "function g() {\n  \n}\n");
    assert_eq!(view.cursor(), Pos::new(1, 13));
    assert!(session.state().path().is_none());

    // The edited text is re-parsed for the next command. No node that both starts and ends
    // on line 1 contains the cursor, so the outermost node starting on it is selected.
    let outcomes = run(&mut session, &mut view, &[Select]);
    assert_eq!(outcomes, vec!["Program 1:0-4:0"]);
}

#[test]
fn test_bundled_schema_file() {
    let source = fs::read_to_string(SCHEMA_PATH).unwrap();
    let schema = SlotSchema::from_ron(SCHEMA_PATH, &source).unwrap();
    assert_eq!(
        schema.fields("ForStatement").unwrap(),
        ["init", "test", "update", "body"]
    );
    assert_eq!(schema.field_after("IfStatement", "test"), Some("consequent"));
    assert_eq!(schema.fields("CallExpression"), None);
}
