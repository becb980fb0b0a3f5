use docpy::doc::MemberDoc;
use docpy::parse::{Lexer, LexerErrorKind, ModuleOutcome, ModuleParser, ParseOptions, TokenCursor};
use docpy::render;
use paste::paste;
use pretty_assertions::assert_str_eq;

fn parse(source: &str, opts: &ParseOptions) -> ModuleOutcome {
    ModuleParser::new(Lexer::new(source), "mod", opts).parse()
}

fn render(source: &str, opts: &ParseOptions) -> String {
    let outcome = parse(source, opts);
    assert!(outcome.error.is_none(), "unexpected error: {:?}", outcome.error);

    let mut out = String::new();

    if let Some(doc) = &outcome.doc {
        render::render_module(doc, false, &mut out);
    }

    out
}

fn member_names(outcome: &ModuleOutcome) -> Vec<&str> {
    outcome
        .doc
        .as_ref()
        .map(|doc| doc.members.iter().map(MemberDoc::name).collect())
        .unwrap_or_default()
}

macro_rules! rendering_tests {
    ($( $name:ident ),+ $(,)?) => {
        paste! {
            $(
                #[test]
                fn [<renders_ $name>]() {
                    let source = include_str!(concat!("parser/", stringify!($name), ".py"));
                    let expected = include_str!(concat!("parser/", stringify!($name), ".md"));

                    assert_str_eq!(expected, render(source, &ParseOptions::default()));
                }
            )+
        }
    };
}

rendering_tests! {
    module_doc,
    classes,
    export_list,
    signatures,
    nested,
}

#[test]
fn renders_a_method_with_an_elided_self() {
    let source = "\
class W:
    \"\"\"W.\"\"\"

    def go(self, x):
        \"\"\"Hi_there.\"\"\"
        return x
";

    let expected = "\
## mod.py
### Classes
#### _class_ mod.**W**
W.
##### mod.W.**go**(_x_)
Hi\\_there.
";

    assert_str_eq!(expected, render(source, &ParseOptions::default()));
}

#[test]
fn undocumented_definitions_are_dropped_by_default() {
    let outcome = parse("def go():\n    pass\n", &ParseOptions::default());

    assert!(outcome.doc.is_none());
}

#[test]
fn undocumented_definitions_are_kept_on_request() {
    let opts = ParseOptions {
        include_undocumented: true,
        ..Default::default()
    };

    let outcome = parse("def go():\n    pass\n", &opts);

    assert_eq!(member_names(&outcome), vec!["go"]);
}

#[test]
fn empty_input_yields_no_doc() {
    let opts = ParseOptions {
        include_undocumented: true,
        ..Default::default()
    };

    assert!(parse("", &ParseOptions::default()).doc.is_none());
    assert!(parse("", &opts).doc.is_none());
    assert!(parse("# nothing here\n", &opts).doc.is_none());
}

#[test]
fn later_export_assignment_overwrites_the_earlier_one() {
    let source = "\
__all__ = ['a']


def a():
    \"\"\"A.\"\"\"
    return 1


__all__ = ['b']


def b():
    \"\"\"B.\"\"\"
    return 2


def c():
    \"\"\"C.\"\"\"
    return 3
";

    let outcome = parse(source, &ParseOptions::default());

    assert_eq!(member_names(&outcome), vec!["a", "b"]);
}

#[test]
fn export_list_accepts_parentheses() {
    let source = "\
__all__ = (\"x\",)


def x():
    \"\"\"X.\"\"\"
    return 1


def y():
    \"\"\"Y.\"\"\"
    return 2
";

    let outcome = parse(source, &ParseOptions::default());

    assert_eq!(member_names(&outcome), vec!["x"]);
}

#[test]
fn an_unterminated_export_list_is_not_fatal() {
    let source = "\
\"\"\"M.\"\"\"


def kept():
    \"\"\"Kept.\"\"\"
    return 1


__all__ = ['kept'
";

    let outcome = parse(source, &ParseOptions::default());

    assert!(outcome.error.is_none());
    assert_eq!(member_names(&outcome), vec!["kept"]);
}

#[test]
fn escapes_the_module_docstring() {
    assert_str_eq!(
        render("\"\"\"Hi_there\"\"\"\n", &ParseOptions::default()),
        "## mod.py\nHi\\_there\n"
    );
}

#[test]
fn methods_are_exempt_from_the_export_list() {
    let source = "\
__all__ = ['Box']


class Box:
    \"\"\"A box.\"\"\"

    def get(self):
        \"\"\"Returns the contents.\"\"\"
        return self.contents


def loose():
    \"\"\"Not exported.\"\"\"
    return None
";

    let outcome = parse(source, &ParseOptions::default());
    let doc = outcome.doc.unwrap();

    assert_eq!(doc.members.len(), 1);

    let MemberDoc::Class(class) = &doc.members[0] else {
        panic!("expected a class");
    };

    assert_eq!(class.name, "Box");
    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].name, "get");
    assert_eq!(class.methods[0].owner, "mod.Box");
}

#[test]
fn private_methods_are_consumed_without_derailing_the_scan() {
    let source = "\
class T:
    \"\"\"T.\"\"\"

    def _setup(self):
        \"\"\"S.\"\"\"
        return 1

    def go(self):
        \"\"\"G.\"\"\"
        return 2
";

    let outcome = parse(source, &ParseOptions::default());
    let doc = outcome.doc.unwrap();

    let MemberDoc::Class(class) = &doc.members[0] else {
        panic!("expected a class");
    };

    assert_eq!(class.methods.len(), 1);
    assert_eq!(class.methods[0].name, "go");
}

#[test]
fn undocumented_class_is_consumed_without_derailing_the_scan() {
    let source = "\
class Quiet:
    def noop(self):
        \"\"\"Does nothing.\"\"\"
        pass


def after():
    \"\"\"Still found.\"\"\"
    return 1
";

    let outcome = parse(source, &ParseOptions::default());

    assert_eq!(member_names(&outcome), vec!["after"]);
}

#[test]
fn a_lexer_error_keeps_the_partial_result() {
    let source = "\
def a():
    \"\"\"Doc.\"\"\"
    pass

bad = 'x
";

    let outcome = parse(source, &ParseOptions::default());

    assert_eq!(
        outcome.error.map(|e| e.kind()),
        Some(LexerErrorKind::UnterminatedString)
    );

    let doc = outcome.doc.unwrap();
    assert_eq!(doc.members.len(), 1);
    assert_eq!(doc.members[0].name(), "a");
}

#[test]
#[should_panic(expected = "second rollback")]
fn a_second_rollback_without_an_advance_panics() {
    let mut cursor = TokenCursor::new(Lexer::new("name\n"));

    cursor.advance().unwrap();
    cursor.rollback();
    cursor.rollback();
}
