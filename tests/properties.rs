use proptest::prelude::*;
use structnav::parsing::{JsParser, Parse};
use structnav::{Navigator, Path, Pos, Preorder, SlotSchema, Span, Tree};

const SOURCES: &[&str] = &[
    "function f(a, b) { return a + b; }",
    "let x = 1, y = [x, 2, 3];\nif (x > y.length) {\n  x = y[0];\n} else {\n  y.push(x);\n}\n",
    "class A extends B {\n  run(n) {\n    for (let i = 0; i < n; i++) {\n      this.step(i);\n    }\n  }\n}\n",
    "const o = { a: 1, b, m(x) { return x ? a : b; } };\nfoo(o, (p) => p.a, ...rest);\n",
    "try {\n  go();\n} catch (e) {\n  log(e);\n}\nswitch (k) {\n  case 1: one(); break;\n  default: other();\n}\n",
];

fn parse(source: &str) -> Tree {
    JsParser.parse(source).unwrap()
}

fn all_paths(tree: &Tree) -> Vec<Path> {
    Preorder::including(tree, &Path::root(tree)).collect()
}

fn source_and_cursor() -> impl Strategy<Value = (&'static str, Pos)> {
    (prop::sample::select(SOURCES), 1usize..12, 0usize..40)
        .prop_map(|(source, line, column)| (source, Pos::new(line, column)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_locate_is_deterministic((source, cursor) in source_and_cursor()) {
        let tree = parse(source);
        let schema = SlotSchema::default();
        let nav = Navigator::new(&tree, &schema);
        let span = Span::point(cursor);
        prop_assert_eq!(nav.locate(span), nav.locate(span));
    }

    #[test]
    fn prop_located_node_starts_on_cursor_line((source, cursor) in source_and_cursor()) {
        let tree = parse(source);
        if let Some(path) = structnav::locate(&tree, Span::point(cursor)) {
            let span = path.span(&tree).unwrap();
            prop_assert_eq!(span.start.line, cursor.line);
        }
    }

    #[test]
    fn prop_expand_climbs_one_level((source, cursor) in source_and_cursor()) {
        let tree = parse(source);
        let schema = SlotSchema::default();
        let nav = Navigator::new(&tree, &schema);
        let span = Span::point(cursor);
        let mut current = nav.expand(span, None);
        while let Some(path) = current {
            let parent = nav.expand(span, Some(&path));
            match &parent {
                Some(parent) => prop_assert_eq!(parent.depth() + 1, path.depth()),
                None => prop_assert!(path.is_root()),
            }
            current = parent;
        }
    }
}

#[test]
fn test_to_top_level_is_idempotent() {
    let schema = SlotSchema::default();
    for source in SOURCES {
        let tree = parse(source);
        let nav = Navigator::new(&tree, &schema);
        for path in all_paths(&tree) {
            let top = nav.to_top_level(&path);
            assert!(top.depth() <= 1);
            assert_eq!(nav.to_top_level(&top), top);
        }
    }
}

#[test]
fn test_list_siblings_are_inverse() {
    let schema = SlotSchema::default();
    for source in SOURCES {
        let tree = parse(source);
        let nav = Navigator::new(&tree, &schema);
        for path in all_paths(&tree) {
            let prev = match path.list_sibling(&tree, -1) {
                Some(prev) => prev,
                None => continue,
            };
            assert_eq!(nav.prev_node(&path).as_ref(), Some(&prev));
            assert_eq!(nav.next_node(&prev).map(|p| p.node()), Some(path.node()));
        }
    }
}

#[test]
fn test_shrink_stays_inside() {
    let schema = SlotSchema::default();
    for source in SOURCES {
        let tree = parse(source);
        let nav = Navigator::new(&tree, &schema);
        for path in all_paths(&tree) {
            match nav.shrink(&path) {
                Some(child) => assert_eq!(child.parent_path(), Some(&path)),
                None => assert_eq!(path.node().num_children(&tree), 0),
            }
        }
    }
}

#[test]
fn test_spans_nest() {
    for source in SOURCES {
        let tree = parse(source);
        for path in all_paths(&tree) {
            let (Some(span), Some(parent)) = (path.span(&tree), path.parent_path()) else {
                continue;
            };
            let parent_span = parent.span(&tree).unwrap();
            assert!(parent_span.start <= span.start && span.end <= parent_span.end);
            assert!(span.start <= span.end);
        }
    }
}
