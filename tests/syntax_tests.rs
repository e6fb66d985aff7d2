use miette::Diagnostic;
use splice::ast::Tree;
use splice::sexp;
use splice::syntax::{HostSyntax, Syntax};
use splice::SpliceError;

fn parse(source: &str) -> Tree {
    HostSyntax::new().parse(source).unwrap()
}

fn unparse(tree: &Tree) -> String {
    HostSyntax::new().unparse(tree).unwrap()
}

/// Text that is already in canonical form comes back unchanged.
fn assert_round_trip(source: &str) {
    assert_eq!(unparse(&parse(source)), source);
}

/// The rendering may differ from the input but must parse to the same tree.
fn assert_tree_round_trip(source: &str) {
    let tree = parse(source);
    assert_eq!(parse(&unparse(&tree)), tree, "rendered as {:?}", unparse(&tree));
}

#[test]
fn canonical_text_round_trips() {
    for source in [
        "my_if(a == 3, \"success\")",
        "a = 3",
        "a && b || !c",
        "(1 + 2) * 3",
        "1 + 2 * 3",
        "a - (b - c)",
        "x <= y",
        "a != b",
        "Person.hello",
        "abc.add(1, 2)",
        "[1, 2].each { |x| puts(x) }",
        ":name",
        "b if a",
        "-x",
    ] {
        assert_round_trip(source);
    }
}

#[test]
fn multi_line_forms_round_trip() {
    assert_round_trip("a = 3\nif a == 3 then\n  puts(\"yes\")\nelse\n  puts(\"no\")\nend");
    assert_round_trip("items.each do |x|\n  a = x\n  puts(a)\nend");
}

#[test]
fn loose_text_round_trips_as_trees() {
    assert_tree_round_trip("if a\n  1\nelsif b\n  2\nelse\n  3\nend");
    assert_tree_round_trip("x = 1; y = [x, [2]]; y[1][0]");
    assert_tree_round_trip("puts 'hi' if true");
    assert_tree_round_trip("foo(\n  1,\n  2,\n)");
    assert_tree_round_trip("3.times do\n  puts(1)\nend");
}

#[test]
fn call_shapes() {
    assert_eq!(parse("Person.hello"), sexp!(call (const Person) hello (arglist)));
    assert_eq!(
        parse("abc.add(1, 2)"),
        sexp!(call (call nil abc (arglist)) add (arglist (lit 1) (lit 2)))
    );
    assert_eq!(
        parse("puts 'hi', 2"),
        sexp!(call nil puts (arglist (str "hi") (lit 2)))
    );
}

#[test]
fn elsif_nests_into_else() {
    assert_eq!(
        parse("if a\n  1\nelsif b\n  2\nend"),
        sexp!(if (call nil a (arglist)) (lit 1) (if (call nil b (arglist)) (lit 2) nil))
    );
}

#[test]
fn literals() {
    assert_eq!(parse("'single'"), sexp!(str "single"));
    assert_eq!(parse("\"tab\\there\""), sexp!(str "tab\there"));
    assert_eq!(parse("-42"), Tree::node("lit", vec![Tree::Int(-42)]));
    assert_eq!(parse("nil"), Tree::node("nil", vec![]));
    assert_eq!(parse("false"), Tree::node("false", vec![]));
    assert_eq!(unparse(&parse("'single'")), "\"single\"");
}

#[test]
fn block_locals_stay_inside() {
    let tree = parse("[1].each { |x| y = x }\ny");
    assert_eq!(tree.get(2), Some(&sexp!(call nil y (arglist))));
    let iter = tree.get(1).unwrap();
    assert_eq!(iter.get(3), Some(&sexp!(lasgn y (lvar x))));
}

#[test]
fn comments_and_separators() {
    assert_eq!(
        parse("a = 1; b = 2 # note\n\n"),
        sexp!(block (lasgn a (lit 1)) (lasgn b (lit 2)))
    );
}

#[test]
fn parse_errors_carry_a_label() {
    let err = HostSyntax::new().parse_named("bad.rb", "foo(1, 2").unwrap_err();
    assert!(matches!(err, SpliceError::Parse { .. }));
    assert!(err.message().starts_with("syntax error"));
    assert!(err.labels().is_some());
    assert!(err.source_code().is_some());
}

#[test]
fn unsupported_trees_are_unparse_errors() {
    let syntax = HostSyntax::new();
    let err = syntax.unparse(&Tree::node("weird", vec![])).unwrap_err();
    assert!(matches!(err, SpliceError::Unparse { .. }));
    let err = syntax.unparse(&Tree::Int(1)).unwrap_err();
    assert!(matches!(err, SpliceError::Unparse { .. }));
}

#[test]
fn empty_program_round_trips() {
    assert_eq!(parse(""), Tree::Nil);
    assert_eq!(unparse(&Tree::Nil), "");
}
