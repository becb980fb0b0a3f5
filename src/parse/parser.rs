use indexmap::IndexSet;
use serde::Serialize;
use tracing::instrument;

use crate::doc::{ClassDoc, FunctionDoc, MemberDoc, ModuleDoc};
use crate::markup;
use crate::parse::cursor::{Exhausted, TokenCursor};
use crate::parse::lexer::{Lexer, LexerError};
use crate::parse::token::{Keyword, Token, TokenValue, EXPORT_LIST_MARKER};
use crate::parse::ParseOptions;

/// The allow-list captured from an `__all__` assignment.
///
/// An empty list means no restriction. A later assignment overwrites an
/// earlier one; the policy is applied at the moment a definition is parsed,
/// so an assignment only affects definitions that follow it.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportList(IndexSet<String>);

impl ExportList {
    pub fn admits(&self, name: &str) -> bool {
        self.0.is_empty() || self.0.contains(name)
    }

    fn replace(&mut self, names: IndexSet<String>) {
        self.0 = names;
    }
}

/// The outcome of scanning for the next definition in the current block.
///
/// These are routine signals consumed by the nearest enclosing loop, not
/// failures; they never escape the parser.
#[derive(Debug)]
enum Scan<T> {
    /// A definition was parsed and retained.
    Found(T),

    /// A definition was parsed but dropped by the inclusion policy.
    Excluded,

    /// The enclosing block just closed (depth underflow).
    BlockEnd,

    /// The token stream ran dry.
    Eof,
}

#[derive(Debug)]
pub struct ModuleOutcome {
    pub doc: Option<ModuleDoc>,

    /// The tokenization failure that cut the scan short, if any. Whatever
    /// was extracted before the failure is kept in `doc`.
    pub error: Option<LexerError>,
}

/// A single-module parse session.
///
/// Owns the cursor and all scan-scoped state (current class, export list);
/// nothing here is shared across parses.
pub struct ModuleParser<'buf, 'opt> {
    cursor: TokenCursor<'buf>,
    opts: &'opt ParseOptions,
    module: String,
    current_class: Option<String>,
    exports: ExportList,
}

impl<'buf, 'opt> ModuleParser<'buf, 'opt> {
    pub fn new(lexer: Lexer<'buf>, module: impl Into<String>, opts: &'opt ParseOptions) -> Self {
        Self {
            cursor: TokenCursor::new(lexer),
            opts,
            module: module.into(),
            current_class: None,
            exports: ExportList::default(),
        }
    }

    /// Runs one full pass over the token stream: the module docstring, then
    /// definitions until the stream is exhausted.
    #[instrument(level = "trace", skip(self), fields(module = %self.module))]
    pub fn parse(mut self) -> ModuleOutcome {
        let docstring = match self.find_docstring() {
            Ok(docstring) => docstring,

            // nothing but trivia in the file: nothing to document
            Err(Exhausted) => {
                return ModuleOutcome {
                    doc: None,
                    error: self.cursor.take_error(),
                }
            }
        };

        let mut members = Vec::new();

        loop {
            match self.next_definition(false) {
                Scan::Found(member) => members.push(member),
                Scan::Excluded => {}
                Scan::BlockEnd | Scan::Eof => break,
            }
        }

        let doc = if docstring.is_none() && members.is_empty() && !self.opts.include_undocumented {
            None
        } else {
            Some(ModuleDoc {
                name: self.module.clone(),
                docstring,
                members,
            })
        };

        ModuleOutcome {
            doc,
            error: self.cursor.take_error(),
        }
    }

    /// Scans forward to the next `class`/`def` keyword and dispatches to the
    /// matching extractor. With `methods_only`, class definitions are not
    /// dispatched (a nested class is skipped like any other name).
    #[instrument(level = "trace", skip(self), ret)]
    fn next_definition(&mut self, methods_only: bool) -> Scan<MemberDoc> {
        let mut depth = 0isize;

        loop {
            let token = match self.cursor.advance() {
                Ok(token) => token,
                Err(Exhausted) => return Scan::Eof,
            };

            match token.value {
                TokenValue::Name(name) => match Keyword::parse(name) {
                    Some(Keyword::Def) => {
                        return match self.function(methods_only) {
                            Ok(Some(func)) => Scan::Found(MemberDoc::Function(func)),
                            Ok(None) => Scan::Excluded,
                            Err(Exhausted) => Scan::Eof,
                        };
                    }

                    Some(Keyword::Class) if !methods_only => {
                        return match self.class_def() {
                            Ok(Some(class)) => Scan::Found(MemberDoc::Class(class)),
                            Ok(None) => Scan::Excluded,
                            Err(Exhausted) => Scan::Eof,
                        };
                    }

                    Some(Keyword::Class) => {}

                    None if name == EXPORT_LIST_MARKER => self.capture_exports(),

                    None => {}
                },

                TokenValue::Indent => depth += 1,

                TokenValue::Dedent => {
                    depth -= 1;

                    if depth < 0 {
                        return Scan::BlockEnd;
                    }
                }

                _ => {}
            }
        }
    }

    /// Scans for a docstring directly after a definition header (or at the
    /// start of the module). The search ends at the first name token: a
    /// definition keyword is rolled back for the caller to re-read, the
    /// export-list marker delegates to the capture, and anything else means
    /// the body has started without a docstring.
    #[instrument(level = "trace", skip(self), ret)]
    fn find_docstring(&mut self) -> Result<Option<String>, Exhausted> {
        loop {
            let token = self.cursor.advance()?;

            match token.value {
                TokenValue::Name(name) => {
                    if Keyword::parse(name).is_some() {
                        self.cursor.rollback();
                    } else if name == EXPORT_LIST_MARKER {
                        self.capture_exports();
                    }

                    return Ok(None);
                }

                TokenValue::Str {
                    content,
                    triple: true,
                } => {
                    let doc = markup::normalize_docstring(content);

                    return Ok((!doc.is_empty()).then_some(doc));
                }

                _ => {}
            }
        }
    }

    /// Captures the right-hand list literal of an `__all__` assignment.
    ///
    /// An unterminated bracket is not fatal: the names collected up to the
    /// point the stream ran dry are kept.
    fn capture_exports(&mut self) {
        let mut names = IndexSet::new();

        // the assignment operator, then the opening bracket
        let Ok(_) = self.cursor.advance() else { return };
        let Ok(open) = self.cursor.advance() else { return };

        let closing = if open.is_op("[") { "]" } else { ")" };

        loop {
            match self.cursor.advance() {
                Ok(token) if token.is_op(closing) => break,

                Ok(Token {
                    value: TokenValue::Str { content, .. },
                    ..
                }) => {
                    names.insert(content.to_owned());
                }

                Ok(_) => {}

                Err(Exhausted) => break,
            }
        }

        self.exports.replace(names);
    }

    /// Accumulates the parameter list up to the block-opening colon.
    ///
    /// The enclosing parentheses and the colon are dropped, a leading `self`
    /// is elided together with the separator that follows it, and the rest
    /// is re-joined and split on commas to normalize spacing.
    #[instrument(level = "trace", skip(self), ret)]
    fn read_signature(&mut self) -> Result<Vec<String>, Exhausted> {
        let mut fragments = Vec::new();

        loop {
            let token = self.cursor.advance()?;
            let at_colon = token.is_op(":");

            if !token.lexeme.is_empty() {
                fragments.push(token.lexeme);
            }

            if at_colon {
                break;
            }
        }

        let mut params = if fragments.len() >= 3 {
            fragments[1..fragments.len() - 2].to_vec()
        } else {
            Vec::new()
        };

        if params.first() == Some(&"self") {
            params.remove(0);

            if !params.is_empty() {
                params.remove(0);
            }
        }

        Ok(params
            .concat()
            .split(',')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(markup::escape_signature)
            .collect())
    }

    /// Extracts one function or method definition, the cursor standing right
    /// after the `def` keyword.
    ///
    /// The signature, one docstring scan, and the body are always consumed,
    /// even when the definition ends up discarded: the cursor must stay in
    /// sync with the block structure regardless of the inclusion policy.
    #[instrument(level = "trace", skip(self), ret)]
    fn function(&mut self, is_method: bool) -> Result<Option<FunctionDoc>, Exhausted> {
        let name = self.cursor.advance()?.lexeme.to_owned();
        let params = self.read_signature()?;
        let docstring = self.find_docstring()?;

        self.skip_block();

        if name.starts_with('_') && name != self.opts.constructor_name {
            return Ok(None);
        }

        if !is_method && !self.exports.admits(&name) {
            return Ok(None);
        }

        if docstring.is_none() && !self.opts.include_undocumented {
            return Ok(None);
        }

        let owner = match &self.current_class {
            Some(class) => format!("{}.{}", self.module, class),
            None => self.module.clone(),
        };

        Ok(Some(FunctionDoc {
            name,
            owner,
            params,
            docstring,
            is_method,
        }))
    }

    /// Extracts one class definition: the header, the class docstring, then
    /// methods until the class body is exhausted.
    #[instrument(level = "trace", skip(self), ret)]
    fn class_def(&mut self) -> Result<Option<ClassDoc>, Exhausted> {
        let name = self.cursor.advance()?.lexeme.to_owned();

        // scan through the base list to the block-opening colon
        self.read_signature()?;

        let docstring = self.find_docstring()?;

        self.current_class = Some(name.clone());
        let mut methods = Vec::new();

        loop {
            match self.next_definition(true) {
                Scan::Found(MemberDoc::Function(method)) => methods.push(method),
                Scan::Found(MemberDoc::Class(_)) => unreachable!("a method scan never yields classes"),
                Scan::Excluded => {}
                Scan::BlockEnd | Scan::Eof => break,
            }
        }

        self.current_class = None;

        if !self.exports.admits(&name) {
            return Ok(None);
        }

        if docstring.is_none() && !self.opts.include_undocumented {
            return Ok(None);
        }

        Ok(Some(ClassDoc {
            name,
            docstring,
            methods,
        }))
    }

    /// Skips to the end of the current block: advances until the depth
    /// counter underflows (the enclosing block just closed, its dedent
    /// already consumed) or the stream runs dry.
    fn skip_block(&mut self) {
        let mut depth = 0isize;

        while let Ok(token) = self.cursor.advance() {
            match token.value {
                TokenValue::Indent => depth += 1,

                TokenValue::Dedent => {
                    depth -= 1;

                    if depth < 0 {
                        return;
                    }
                }

                _ => {}
            }
        }
    }
}
