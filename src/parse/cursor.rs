use tracing::trace;

use crate::parse::lexer::{Lexer, LexerError};
use crate::parse::token::{Token, TokenValue};

/// The control signal for "the token stream has nothing more to offer".
///
/// Producer exhaustion, the `Eof` token, and a tokenization failure are all
/// normalized to this one signal; a failure is additionally retained and can
/// be picked up through [`TokenCursor::take_error`] once the scan stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

/// A cursor over the token stream with a one-slot rollback buffer.
#[derive(Debug, Clone)]
pub struct TokenCursor<'buf> {
    lexer: Lexer<'buf>,
    rolled_back: Option<Token<'buf>>,
    last: Option<Token<'buf>>,
    error: Option<LexerError>,
    exhausted: bool,
}

impl<'buf> TokenCursor<'buf> {
    pub fn new(lexer: Lexer<'buf>) -> Self {
        Self {
            lexer,
            rolled_back: None,
            last: None,
            error: None,
            exhausted: false,
        }
    }

    /// Returns the next token, consuming the rollback buffer first if set.
    pub fn advance(&mut self) -> Result<Token<'buf>, Exhausted> {
        if let Some(token) = self.rolled_back.take() {
            trace!(token = ?token, "re-yielding the rolled back token");

            return Ok(token);
        }

        if self.exhausted {
            return Err(Exhausted);
        }

        match self.lexer.next() {
            Some(Ok(Token {
                value: TokenValue::Eof,
                ..
            }))
            | None => {
                self.exhausted = true;

                Err(Exhausted)
            }

            Some(Ok(token)) => {
                trace!(token = ?token);
                self.last = Some(token.clone());

                Ok(token)
            }

            Some(Err(e)) => {
                trace!(error = %e, "tokenization failed; ending the scan");
                self.error = Some(e);
                self.exhausted = true;

                Err(Exhausted)
            }
        }
    }

    /// Marks the most recently returned token to be re-returned by the next
    /// [`advance`](Self::advance).
    ///
    /// Panics if a rollback is already pending or no token has been returned
    /// yet: both indicate a bug in the calling scan code.
    pub fn rollback(&mut self) {
        assert!(
            self.rolled_back.is_none(),
            "a second rollback without an intervening advance"
        );

        let last = self
            .last
            .clone()
            .expect("rollback before any token was returned");

        self.rolled_back = Some(last);
    }

    /// The tokenization failure that ended the stream, if any.
    pub fn take_error(&mut self) -> Option<LexerError> {
        self.error.take()
    }
}
