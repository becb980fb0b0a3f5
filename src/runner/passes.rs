use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use docpy::doc::{ModuleDoc, PackageDoc};
use docpy::parse::ParseOptions;
use docpy::render::{self, Page};
use docpy::tree::DocTreeAssembler;

use super::config::OutputFormat;
use super::{PassOutput, RunnerCtx};

#[derive(Serialize, Debug)]
pub enum DocTree {
    Module(ModuleDoc),
    Package(PackageDoc),
}

pub enum Rendered {
    Stdout(String),
    Pages(Vec<Page>),
}

pub fn build_docs(ctx: &mut RunnerCtx<'_, '_>) -> PassOutput<Option<DocTree>> {
    let opts = ParseOptions {
        include_undocumented: ctx.config.include_undocumented,
        ..Default::default()
    };

    let path = ctx.config.path.clone();

    let result = {
        let mut assembler = DocTreeAssembler::new(&mut ctx.source, &mut ctx.diagnostics, opts);

        if path.is_dir() {
            assembler
                .document_package(&path)
                .map(|pkg| pkg.map(DocTree::Package))
        } else {
            Ok(assembler.document_file(&path).map(DocTree::Module))
        }
    };

    let tree = match result {
        Ok(tree) => tree,

        Err(e) => {
            ctx.diagnostics
                .fatal()
                .with_message(format!("could not read {}", path.display()))
                .with_source(Box::new(e))
                .emit();

            return PassOutput::stop_with_output(None);
        }
    };

    if tree.is_none() {
        if !ctx.diagnostics.has_errors() {
            ctx.diagnostics
                .info()
                .with_message("nothing to document".to_owned())
                .emit();
        }

        return PassOutput::stop_with_output(None);
    }

    PassOutput::continue_with_output(tree)
}

pub fn dump_tree_if_asked(
    ctx: &mut RunnerCtx<'_, '_>,
    tree: Option<DocTree>,
) -> PassOutput<Option<DocTree>> {
    if ctx.config.format != OutputFormat::Ron {
        return PassOutput::continue_with_output(tree);
    }

    let Some(tree) = tree else {
        return PassOutput::stop_with_output(None);
    };

    match ron::ser::to_string_pretty(&tree, Default::default()) {
        Ok(dump) => println!("{}", dump),

        Err(e) => {
            ctx.diagnostics
                .error()
                .with_message("could not dump the document tree".to_owned())
                .with_source(Box::new(e))
                .emit();
        }
    }

    PassOutput::stop_with_output(Some(tree))
}

pub fn render_output(
    ctx: &mut RunnerCtx<'_, '_>,
    tree: Option<DocTree>,
) -> PassOutput<Rendered> {
    let Some(tree) = tree else {
        return PassOutput::stop_with_output(Rendered::Stdout(String::new()));
    };

    PassOutput::continue_with_output(match tree {
        DocTree::Module(module) => {
            let mut out = String::new();
            render::render_module(&module, false, &mut out);

            let text = match ctx.config.format {
                OutputFormat::Html => render::to_html(&module.name, &out),
                _ => out,
            };

            Rendered::Stdout(text)
        }

        DocTree::Package(pkg) => {
            Rendered::Pages(render::render_package_tree(&pkg, ctx.config.format.extension()))
        }
    })
}

pub fn write_output(ctx: &mut RunnerCtx<'_, '_>, rendered: Rendered) -> PassOutput<()> {
    match rendered {
        Rendered::Stdout(text) => {
            if let Err(e) = io::stdout().write_all(text.as_bytes()) {
                ctx.diagnostics
                    .error()
                    .with_message("could not write the output to stdout".to_owned())
                    .with_source(Box::new(e))
                    .emit();
            }
        }

        Rendered::Pages(pages) => {
            let out_dir = ctx
                .config
                .output_dir
                .clone()
                .unwrap_or_else(|| default_output_dir(&ctx.config.path));

            if let Err(e) = fs::create_dir_all(&out_dir) {
                ctx.diagnostics
                    .fatal()
                    .with_message(format!("could not create {}", out_dir.display()))
                    .with_source(Box::new(e))
                    .emit();

                return PassOutput::stop_with_output(());
            }

            for page in pages {
                let target =
                    out_dir.join(format!("{}.{}", page.file_stem, ctx.config.format.extension()));

                let contents = match ctx.config.format {
                    OutputFormat::Html => render::to_html(&page.file_stem, &page.markdown),
                    _ => page.markdown,
                };

                info!(path = %target.display(), "writing");

                if let Err(e) = fs::write(&target, contents) {
                    ctx.diagnostics
                        .error()
                        .with_message(format!("could not write {}", target.display()))
                        .with_source(Box::new(e))
                        .emit();
                }
            }
        }
    }

    PassOutput::continue_with_output(())
}

fn default_output_dir(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package".to_owned());

    PathBuf::from(format!("{}_docs", name))
}
