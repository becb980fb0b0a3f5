//! Rendering of the document model to Markdown, and Markdown to HTML.
//!
//! The layout matches the extractor's conventions: one `##` header per
//! module, a `### Classes` title before the first class, `####`/`#####`
//! headings for classes and callables, and one index page per package.

use itertools::Itertools;
use pulldown_cmark::{html, Parser};

use crate::doc::{ClassDoc, FunctionDoc, MemberDoc, ModuleDoc, PackageDoc};
use crate::markup;

/// A rendered documentation page; one is produced per package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The package path components joined with `_`, used as the output file
    /// name (sans extension).
    pub file_stem: String,

    pub markdown: String,
}

fn push_function(func: &FunctionDoc, out: &mut String) {
    let args = func.params.iter().join(", ");

    let args = if args.is_empty() {
        args
    } else {
        format!("_{}_", args)
    };

    out.push_str(&format!(
        "##### {}.**{}**({})\n",
        markup::escape_name(&func.owner),
        markup::escape_name(&func.name),
        args
    ));

    if let Some(doc) = &func.docstring {
        out.push_str(doc);
        out.push('\n');
    }
}

fn push_class(class: &ClassDoc, module_name: &str, out: &mut String) {
    out.push_str(&format!(
        "#### _class_ {}.**{}**\n",
        markup::escape_name(module_name),
        markup::escape_name(&class.name)
    ));

    if let Some(doc) = &class.docstring {
        out.push_str(doc);
        out.push('\n');
    }

    for method in &class.methods {
        push_function(method, out);
    }
}

fn push_members(module: &ModuleDoc, out: &mut String) {
    let mut has_classes_title = false;

    for member in &module.members {
        match member {
            MemberDoc::Class(class) => {
                if !has_classes_title {
                    out.push_str("### Classes\n");
                    has_classes_title = true;
                }

                push_class(class, &module.name, out);
            }

            MemberDoc::Function(func) => push_function(func, out),
        }
    }
}

/// Renders one module document, optionally preceded by an HTML anchor so
/// package indexes can link to it.
pub fn render_module(module: &ModuleDoc, with_anchor: bool, out: &mut String) {
    let display = markup::escape_name(&module.name);

    if with_anchor {
        out.push_str(&format!(
            "## <a id=\"{0}.py\"></a>{1}.py\n",
            module.name, display
        ));
    } else {
        out.push_str(&format!("## {}.py\n", display));
    }

    if let Some(doc) = &module.docstring {
        out.push_str(doc);
        out.push('\n');
    }

    push_members(module, out);
}

/// Renders a package tree into pages, children before parents.
///
/// `link_ext` is the extension used in inter-package links (`html` or `md`).
pub fn render_package_tree(pkg: &PackageDoc, link_ext: &str) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut path = Vec::new();

    render_package(pkg, link_ext, &mut path, &mut pages);

    pages
}

fn render_package(
    pkg: &PackageDoc,
    link_ext: &str,
    path: &mut Vec<String>,
    pages: &mut Vec<Page>,
) {
    path.push(pkg.name.clone());

    for sub in &pkg.subpackages {
        render_package(sub, link_ext, path, pages);
    }

    let file_stem = path.join("_");
    let mut out = String::new();

    out.push_str(&format!("# {}\n", path.join("/")));

    // the package's own documentation comes from its initializer module,
    // rendered without the module header
    if let Some(own) = &pkg.own_doc {
        if let Some(doc) = &own.docstring {
            out.push_str(doc);
            out.push('\n');
        }

        push_members(own, &mut out);
    }

    if !pkg.subpackages.is_empty() {
        out.push_str("## Packages\n");

        for sub in &pkg.subpackages {
            out.push_str(&format!(
                "* [{0}]({1}_{0}.{2})\n",
                sub.name, file_stem, link_ext
            ));
        }
    }

    if !pkg.modules.is_empty() {
        out.push_str("## Modules\n");

        for module in &pkg.modules {
            out.push_str(&format!("* [{0}.py](#{0}.py)\n", module.name));
        }
    }

    for module in &pkg.modules {
        render_module(module, true, &mut out);
    }

    pages.push(Page {
        file_stem,
        markdown: out,
    });

    path.pop();
}

/// Converts a rendered Markdown page to a standalone HTML document.
pub fn to_html(title: &str, markdown: &str) -> String {
    let mut content = String::new();
    html::push_html(&mut content, Parser::new(markdown));

    format!(
        "<!DOCTYPE html>\n\
         <head>\n\
         <meta charset=utf-8>\n\
         <title>{title} Documentation</title>\n\
         <link rel=\"stylesheet\" href=\"default.css\" type=\"text/css\">\n\
         </head>\n\
         <body>\n\
         {content}</body>\n\
         </html>\n",
        title = html_escape::encode_text(title),
        content = content,
    )
}
