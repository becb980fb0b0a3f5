use docpy::parse::token::{Token, TokenValue};
use docpy::parse::{Lexer, LexerErrorKind};
use pretty_assertions::assert_eq;

fn summarize(token: &Token<'_>) -> String {
    match token.value {
        TokenValue::Name(name) => format!("name({})", name),
        TokenValue::Str { content, triple } => format!("str({}, triple: {})", content, triple),
        TokenValue::Op(op) => format!("op({})", op),
        TokenValue::Num(num) => format!("num({})", num),
        TokenValue::Indent => "indent".to_owned(),
        TokenValue::Dedent => "dedent".to_owned(),
        TokenValue::Eof => "eof".to_owned(),
    }
}

fn lex(source: &str) -> Vec<String> {
    Lexer::new(source)
        .map(|token| summarize(&token.unwrap()))
        .collect()
}

#[test]
fn tracks_block_structure() {
    let tokens = lex("class A:\n    def b(self):\n        pass\n");

    assert_eq!(
        tokens,
        vec![
            "name(class)",
            "name(A)",
            "op(:)",
            "indent",
            "name(def)",
            "name(b)",
            "op(()",
            "name(self)",
            "op())",
            "op(:)",
            "indent",
            "name(pass)",
            "dedent",
            "dedent",
            "eof",
        ]
    );
}

#[test]
fn blank_and_comment_lines_do_not_affect_indentation() {
    let tokens = lex("def f():\n\n    # setup\n    return 1\n");

    assert_eq!(
        tokens,
        vec![
            "name(def)",
            "name(f)",
            "op(()",
            "op())",
            "op(:)",
            "indent",
            "name(return)",
            "num(1)",
            "dedent",
            "eof",
        ]
    );
}

#[test]
fn tabs_measure_to_the_next_tab_stop() {
    let tokens = lex("if x:\n\ta = 1\n        b = 2\n");

    assert_eq!(
        tokens,
        vec![
            "name(if)",
            "name(x)",
            "op(:)",
            "indent",
            "name(a)",
            "op(=)",
            "num(1)",
            "name(b)",
            "op(=)",
            "num(2)",
            "dedent",
            "eof",
        ]
    );
}

#[test]
fn scans_single_and_triple_quoted_strings() {
    let tokens = lex("x = \"hi\"\ny = '''multi\nline'''\n");

    assert_eq!(
        tokens,
        vec![
            "name(x)",
            "op(=)",
            "str(hi, triple: false)",
            "name(y)",
            "op(=)",
            "str(multi\nline, triple: true)",
            "eof",
        ]
    );
}

#[test]
fn empty_string_is_not_mistaken_for_a_triple_quote() {
    let tokens = lex("x = ''\n");

    assert_eq!(tokens, vec!["name(x)", "op(=)", "str(, triple: false)", "eof"]);
}

#[test]
fn string_prefixes_belong_to_the_literal() {
    let tokens = lex("x = r\"raw\"\n");

    assert_eq!(
        tokens,
        vec!["name(x)", "op(=)", "str(raw, triple: false)", "eof"]
    );
}

#[test]
fn brackets_suppress_line_structure() {
    let tokens = lex("f(a,\n   b)\n");

    assert_eq!(
        tokens,
        vec![
            "name(f)",
            "op(()",
            "name(a)",
            "op(,)",
            "name(b)",
            "op())",
            "eof",
        ]
    );
}

#[test]
fn backslash_continues_the_line() {
    let tokens = lex("x = 1 + \\\n    2\n");

    assert_eq!(
        tokens,
        vec!["name(x)", "op(=)", "num(1)", "op(+)", "num(2)", "eof"]
    );
}

#[test]
fn multi_character_operators_scan_longest_first() {
    let tokens = lex("a **= b ** c\n");

    assert_eq!(
        tokens,
        vec!["name(a)", "op(**=)", "name(b)", "op(**)", "name(c)", "eof"]
    );
}

#[test]
fn dedents_are_flushed_before_eof() {
    let tokens = lex("if x:\n    if y:\n        pass");

    assert_eq!(
        tokens,
        vec![
            "name(if)",
            "name(x)",
            "op(:)",
            "indent",
            "name(if)",
            "name(y)",
            "op(:)",
            "indent",
            "name(pass)",
            "dedent",
            "dedent",
            "eof",
        ]
    );
}

#[test]
fn unterminated_string_stops_the_scan() {
    let mut lexer = Lexer::new("s = 'oops\n");

    assert!(matches!(lexer.next(), Some(Ok(_))));
    assert!(matches!(lexer.next(), Some(Ok(_))));

    let err = lexer.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), LexerErrorKind::UnterminatedString);

    assert!(lexer.next().is_none());
}

#[test]
fn inconsistent_dedent_is_an_error() {
    let results = Lexer::new("if x:\n        a = 1\n    b = 2\n").collect::<Vec<_>>();

    let err = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .unwrap();

    assert_eq!(err.kind(), LexerErrorKind::InconsistentDedent);
}
