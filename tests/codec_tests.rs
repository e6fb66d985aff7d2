use miette::Diagnostic;
use splice::ast::Tree;
use splice::codec::{decode, encode};
use splice::sexp;
use splice::syntax::{HostSyntax, Syntax};
use splice::SpliceError;

#[test]
fn decodes_legacy_markup_with_line_breaks() {
    let markup = "<Sexp>\n<Symbol>\n:lasgn\n</Symbol>\n<Symbol>\n:a\n</Symbol>\n<Sexp>\n\
                  <Symbol>\n:lit\n</Symbol>\n<Fixnum>\n3\n</Fixnum>\n</Sexp>\n</Sexp>";
    assert_eq!(decode(markup).unwrap(), sexp!(lasgn a (lit 3)));
}

#[test]
fn decodes_legacy_nil_class() {
    let markup = "<Sexp><Symbol>:call</Symbol><NilClass>nil</NilClass><Symbol>:defs</Symbol>\
                  <Sexp><Symbol>:arglist</Symbol><Sexp><Symbol>:call</Symbol><NilClass>nil</NilClass>\
                  <Symbol>:a</Symbol><Sexp><Symbol>:arglist</Symbol></Sexp></Sexp><Sexp>\
                  <Symbol>:call</Symbol><NilClass>nil</NilClass><Symbol>:b</Symbol><Sexp>\
                  <Symbol>:arglist</Symbol></Sexp></Sexp></Sexp></Sexp>";
    assert_eq!(
        decode(markup).unwrap(),
        sexp!(call nil defs (arglist (call nil a (arglist)) (call nil b (arglist))))
    );
}

#[test]
fn prolog_and_self_closing_elements_are_accepted() {
    let markup = "<?xml version=\"1.0\"?>\n<Sexp>\n  <Symbol>:arglist</Symbol>\n  <Nil/>\n</Sexp>\n";
    assert_eq!(decode(markup).unwrap(), sexp!(arglist nil));
}

#[test]
fn strings_are_quoted_and_escaped() {
    let tree = sexp!(str "a < b & \"c\"");
    let markup = encode(&tree);
    assert!(markup.contains("<String>\"a &lt; b &amp; \\\"c\\\"\"</String>"), "{}", markup);
    assert_eq!(decode(&markup).unwrap(), tree);
}

#[test]
fn parsed_programs_survive_the_codec() {
    let syntax = HostSyntax::new();
    let tree = syntax
        .parse("a = 3\nif a <= 3 then\n  puts('small')\nelse\n  [a, :big, nil].each { |x| p(x) }\nend")
        .unwrap();
    assert_eq!(decode(&encode(&tree)).unwrap(), tree);
}

#[test]
fn all_atom_kinds_round_trip() {
    let tree = Tree::list(vec![
        Tree::sym("mixed"),
        Tree::Int(-7),
        Tree::Bool(true),
        Tree::Bool(false),
        Tree::Nil,
        Tree::string(""),
        Tree::list(vec![]),
    ]);
    assert_eq!(decode(&encode(&tree)).unwrap(), tree);
}

fn codec_error(markup: &str) -> SpliceError {
    let err = decode(markup).unwrap_err();
    assert!(matches!(err, SpliceError::Codec { .. }), "{:?}", err);
    err
}

#[test]
fn malformed_markup_fails_fast() {
    codec_error("<Sexp><Symbol>:a</Symbol>");
    codec_error("");
    let err = codec_error("<Sexp><Symbol>:a</Sexp></Symbol>");
    assert!(err.message().contains("mismatched"));
}

#[test]
fn mismatched_close_tag_labels_both_tags() {
    let markup = "<Sexp><Symbol>:a</Symbol></Array>";
    let err = codec_error(markup);
    let labels: Vec<_> = err.labels().map(|labels| labels.collect()).unwrap_or_default();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0].offset(), markup.find("</Array>").unwrap());
    assert_eq!(labels[1].offset(), 0);
    assert_eq!(labels[1].label(), Some("<Sexp> opened here"));
}

#[test]
fn kind_and_value_must_agree() {
    codec_error("<Integer>three</Integer>");
    codec_error("<Boolean>yes</Boolean>");
    codec_error("<Symbol>noColon</Symbol>");
    codec_error("<Sexp>loose text</Sexp>");
    codec_error("<Integer><Nil/></Integer>");
    let err = codec_error("<Float>1.5</Float>");
    assert!(err.message().contains("Float"));
}

#[test]
fn whitespace_at_atom_edges_round_trips() {
    let tree = Tree::list(vec![
        Tree::sym("a "),
        Tree::sym(" b\n"),
        Tree::sym("\t"),
        Tree::string("  padded  "),
    ]);
    let markup = encode(&tree);
    assert!(markup.contains("<Symbol>:a&#32;</Symbol>"), "{}", markup);
    assert_eq!(decode(&markup).unwrap(), tree);
}

#[test]
fn numeric_references_are_decoded() {
    assert_eq!(decode("<Symbol>:x&#x20;</Symbol>").unwrap(), Tree::sym("x "));
    assert_eq!(decode("<Symbol>:&#60;&#61;</Symbol>").unwrap(), Tree::sym("<="));
}
