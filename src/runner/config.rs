use std::path::PathBuf;

use clap::{arg, command, value_parser, ValueEnum};

#[derive(Debug, Clone)]
pub struct DocpyConfig {
    /// A module file or a package directory.
    pub path: PathBuf,

    pub include_undocumented: bool,
    pub format: OutputFormat,

    /// Where package documentation is written; defaults to `<package>_docs`.
    pub output_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Markdown,

    /// A debug dump of the document tree.
    Ron,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Ron => "ron",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Html
    }
}

pub fn parse_args_or_exit() -> DocpyConfig {
    use clap::Command;

    fn command() -> Command {
        command!()
            .arg(
                arg!(path: <PATH> "the module file or package directory to document")
                    .value_parser(value_parser!(PathBuf))
                    .required(true),
            )
            .arg(arg!(-a --all "document all objects, including those without docstrings"))
            .arg(
                arg!(-f --format <FORMAT> "the output format")
                    .value_parser(value_parser!(OutputFormat)),
            )
            .arg(
                arg!(-o --output <DIR> "the directory to write package documentation to")
                    .value_parser(value_parser!(PathBuf)),
            )
    }

    let matches = command().get_matches();

    DocpyConfig {
        path: matches.get_one::<PathBuf>("path").expect("path").clone(),
        include_undocumented: matches.get_flag("all"),
        format: matches
            .get_one::<OutputFormat>("format")
            .copied()
            .unwrap_or_default(),
        output_dir: matches.get_one::<PathBuf>("output").cloned(),
    }
}
