use std::path::Path;

use docpy::errors::Diagnostics;
use docpy::parse::ParseOptions;
use docpy::render;
use docpy::source::{SourceBuffer, SourceMap};
use docpy::tree::DocTreeAssembler;
use pretty_assertions::assert_str_eq;

#[test]
fn documents_a_package_tree_bottom_up() {
    let dir = Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/sample_pkg"
    ));

    let mut buf = SourceBuffer::new();
    let mut source = SourceMap::new(&mut buf);
    let mut diagnostics = Diagnostics::new();

    let pkg = DocTreeAssembler::new(&mut source, &mut diagnostics, ParseOptions::default())
        .document_package(dir)
        .unwrap()
        .unwrap();

    assert!(!diagnostics.has_errors());

    assert_eq!(pkg.name, "sample_pkg");
    assert_eq!(
        pkg.own_doc.as_ref().unwrap().docstring.as_deref(),
        Some("The sample package.")
    );
    assert_eq!(pkg.modules.len(), 1);
    assert_eq!(pkg.modules[0].name, "alpha");
    assert_eq!(pkg.subpackages.len(), 1);
    assert_eq!(pkg.subpackages[0].name, "tools");
    assert_eq!(pkg.subpackages[0].modules[0].name, "beta");
}

#[test]
fn renders_one_page_per_package() {
    let dir = Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/sample_pkg"
    ));

    let mut buf = SourceBuffer::new();
    let mut source = SourceMap::new(&mut buf);
    let mut diagnostics = Diagnostics::new();

    let pkg = DocTreeAssembler::new(&mut source, &mut diagnostics, ParseOptions::default())
        .document_package(dir)
        .unwrap()
        .unwrap();

    let pages = render::render_package_tree(&pkg, "md");

    assert_eq!(pages.len(), 2);

    // children come before parents
    assert_eq!(pages[0].file_stem, "sample_pkg_tools");
    assert_eq!(pages[1].file_stem, "sample_pkg");

    assert_str_eq!(
        pages[0].markdown,
        "\
# sample_pkg/tools
## Modules
* [beta.py](#beta.py)
## <a id=\"beta.py\"></a>beta.py
Tool helpers.
##### beta.**run**(_cmd_)
Runs cmd.
"
    );

    assert_str_eq!(
        pages[1].markdown,
        "\
# sample_pkg
The sample package.
## Packages
* [tools](sample_pkg_tools.md)
## Modules
* [alpha.py](#alpha.py)
## <a id=\"alpha.py\"></a>alpha.py
Letters.
##### alpha.**first**()
The first letter.
"
    );
}

#[test]
fn an_invalid_utf8_file_is_reported_and_skipped() {
    let path = Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/invalid_utf8.py"
    ));

    let mut buf = SourceBuffer::new();
    let mut source = SourceMap::new(&mut buf);
    let mut diagnostics = Diagnostics::new();

    let doc = DocTreeAssembler::new(&mut source, &mut diagnostics, ParseOptions::default())
        .document_file(path);

    assert!(doc.is_none());
    assert!(diagnostics.has_errors());
}

#[test]
fn a_missing_file_contributes_nothing() {
    let mut buf = SourceBuffer::new();
    let mut source = SourceMap::new(&mut buf);
    let mut diagnostics = Diagnostics::new();

    let doc = DocTreeAssembler::new(&mut source, &mut diagnostics, ParseOptions::default())
        .document_file(Path::new("does/not/exist.py"));

    assert!(doc.is_none());
    assert!(!diagnostics.has_errors());
}
