//! The document tree assembler: walks a package directory and aggregates
//! per-module parses into a `PackageDoc` tree.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::doc::{ModuleDoc, PackageDoc};
use crate::errors::Diagnostics;
use crate::parse::{Lexer, LexerError, ModuleParser, ParseOptions};
use crate::source::SourceMap;

pub const PACKAGE_INIT: &str = "__init__.py";

pub struct DocTreeAssembler<'buf, 'a, 'emt> {
    source: &'a mut SourceMap<'buf>,
    diagnostics: &'a mut Diagnostics<'emt>,
    opts: ParseOptions,
}

impl<'buf, 'a, 'emt> DocTreeAssembler<'buf, 'a, 'emt> {
    pub fn new(
        source: &'a mut SourceMap<'buf>,
        diagnostics: &'a mut Diagnostics<'emt>,
        opts: ParseOptions,
    ) -> Self {
        Self {
            source,
            diagnostics,
            opts,
        }
    }

    /// Parses one module file.
    ///
    /// A missing or unreadable file contributes nothing; a tokenization
    /// failure is reported and yields whatever was extracted before it.
    pub fn document_file(&mut self, path: &Path) -> Option<ModuleDoc> {
        let id = match self.source.load(path) {
            Ok(id) => id,

            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");

                return None;
            }
        };

        let file = self.source.get(id).unwrap();

        let text = match file.text() {
            Ok(text) => text,

            Err(e) => {
                let err = LexerError::invalid_utf8(file.buf(), e.valid_up_to());
                report_lex_error(self.diagnostics, path, err);

                return None;
            }
        };

        let module_name = file.module_name();
        let outcome = ModuleParser::new(Lexer::new(text), module_name, &self.opts).parse();

        if let Some(err) = outcome.error {
            report_lex_error(self.diagnostics, path, err);
        }

        outcome.doc
    }

    /// Documents a package directory, bottom-up: subpackages are fully
    /// materialized before the parent node is assembled. Returns `None` when
    /// nothing under `dir` contributed documentation.
    #[instrument(level = "debug", skip(self))]
    pub fn document_package(&mut self, dir: &Path) -> io::Result<Option<PackageDoc>> {
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_owned());

        let mut file_paths = Vec::new();
        let mut dir_paths = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                dir_paths.push(path);
            } else if path.extension().map_or(false, |ext| ext == "py") {
                file_paths.push(path);
            }
        }

        file_paths.sort();
        dir_paths.sort();

        let mut subpackages = Vec::new();

        for path in dir_paths {
            match self.document_package(&path) {
                Ok(Some(pkg)) => subpackages.push(pkg),
                Ok(None) => {}

                // an unreadable subdirectory is skipped like a missing file
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable directory"),
            }
        }

        let mut own_doc = None;
        let mut modules = Vec::new();

        for path in file_paths {
            info!(path = %path.display(), "documenting");

            let Some(doc) = self.document_file(&path) else {
                continue;
            };

            if path.file_name().map_or(false, |name| name == PACKAGE_INIT) {
                own_doc = Some(doc);
            } else {
                modules.push(doc);
            }
        }

        let pkg = PackageDoc {
            name,
            own_doc,
            modules,
            subpackages,
        };

        Ok((!pkg.is_empty()).then_some(pkg))
    }
}

fn report_lex_error(diagnostics: &mut Diagnostics<'_>, path: &Path, err: LexerError) {
    diagnostics
        .error()
        .with_message(format!("{}: {}", path.display(), err))
        .with_span_and_error(err)
        .emit();
}
