use std::error::Error;
use std::fmt::{self, Display};

use crate::position::{HasSpan, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Fatal,
    Error,
    Warn,
    Info,
}

impl Level {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Fatal | Self::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub span: Option<Span>,
    pub message: String,
}

impl DiagnosticMessage {
    pub fn new(message: String) -> Self {
        Self {
            span: None,
            message,
        }
    }

    pub fn with_span(span: Span, message: String) -> Self {
        Self {
            span: Some(span),
            message,
        }
    }
}

impl From<String> for DiagnosticMessage {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

#[derive(Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: DiagnosticMessage,
    pub source: Option<Box<dyn Error + 'static>>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

pub trait SpannedError: Error + HasSpan {}

impl<T: Error + HasSpan> SpannedError for T {}

#[must_use = "DiagnosticBuilder is useless unless emitted"]
pub struct DiagnosticBuilder<'a, 'emt> {
    owner: &'a mut Diagnostics<'emt>,
    level: Level,
    message: Option<DiagnosticMessage>,
    source: Option<Box<dyn Error + 'static>>,
}

impl<'a, 'emt> DiagnosticBuilder<'a, 'emt> {
    fn new(owner: &'a mut Diagnostics<'emt>, level: Level) -> Self {
        Self {
            owner,
            level,
            message: None,
            source: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<DiagnosticMessage>) -> Self {
        self.message = Some(message.into());

        self
    }

    pub fn with_source(mut self, source: Box<dyn Error + 'static>) -> Self {
        self.source = Some(source);

        self
    }

    /// Uses the `error` to fill in the span, the message (unless already
    /// set), and the source of the diagnostic to be emitted.
    pub fn with_span_and_error(mut self, error: impl SpannedError + 'static) -> Self {
        let span = error.span().into_owned();

        self.message = Some(match self.message {
            Some(mut message) => {
                message.span = Some(span);

                message
            }

            None => DiagnosticMessage::with_span(span, format!("{}", error)),
        });

        self.source = Some(Box::new(error));

        self
    }

    /// Emits the diagnostic.
    ///
    /// Panics if the message is not set.
    pub fn emit(self) {
        let diagnostic = Diagnostic {
            level: self.level,
            message: self.message.expect("message must be set"),
            source: self.source,
        };

        self.owner.emit(diagnostic);
    }
}

pub struct Diagnostics<'emt> {
    emitter: Option<Box<dyn FnMut(&Diagnostic) + 'emt>>,
    error_count: usize,
}

impl Default for Diagnostics<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'emt> Diagnostics<'emt> {
    pub fn new() -> Self {
        Self {
            emitter: None,
            error_count: 0,
        }
    }

    pub fn set_emitter(&mut self, emitter: Box<dyn FnMut(&Diagnostic) + 'emt>) {
        self.emitter = Some(emitter);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn with_level(&mut self, level: Level) -> DiagnosticBuilder<'_, 'emt> {
        DiagnosticBuilder::new(self, level)
    }

    pub fn fatal(&mut self) -> DiagnosticBuilder<'_, 'emt> {
        self.with_level(Level::Fatal)
    }

    pub fn error(&mut self) -> DiagnosticBuilder<'_, 'emt> {
        self.with_level(Level::Error)
    }

    pub fn warn(&mut self) -> DiagnosticBuilder<'_, 'emt> {
        self.with_level(Level::Warn)
    }

    pub fn info(&mut self) -> DiagnosticBuilder<'_, 'emt> {
        self.with_level(Level::Info)
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.level.is_error() {
            self.error_count += 1;
        }

        if let Some(emitter) = &mut self.emitter {
            emitter(&diagnostic);
        }
    }
}
