use std::{fs::File, io::BufReader, iter::FusedIterator, path::Path};

use crate::{
    cursor::{Cursor, ReadCursor, StrCursor},
    internal_prelude::*,
    scanner,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    /// Character offset of the first character of the token.
    pub offset: usize,
    /// Whether the token is the first one on its line.
    pub line_start: bool,
}

/// A lazy sequence of tokens read from a cursor.
///
/// The read position belongs to the cursor, not to the stream. A stream built over a
/// borrowed cursor (`tokens(&mut cursor)`) can be dropped and a new one created later,
/// and the new stream continues where the previous one stopped.
///
/// After the end of the input or an error the stream yields nothing else. The end of the
/// input is reached when no characters are left to consume, not when a token is empty: an
/// empty quoted literal (`""` or `''`) is yielded as an empty token and the stream goes on.
#[derive(Debug)]
pub struct TokenStream<C> {
    cursor: C,
    finished: bool,
}

pub fn tokens<C: Cursor>(cursor: C) -> TokenStream<C> {
    TokenStream::new(cursor)
}

pub fn tokenize_str(content: &str) -> TokenStream<StrCursor> {
    TokenStream::new(StrCursor::new(content))
}

pub fn tokenize_path(path: impl AsRef<Path>) -> Result<TokenStream<ReadCursor<BufReader<File>>>> {
    Ok(TokenStream::new(ReadCursor::open(path)?))
}

impl<C: Cursor> TokenStream<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            finished: false,
        }
    }

    /// Current position of the underlying cursor.
    pub fn position(&self) -> usize {
        self.cursor.tell()
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.scan();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn scan(&mut self) -> Result<Option<Token>> {
        let line_break = scanner::skip_blank(&mut self.cursor)?;
        let offset = self.cursor.tell();
        let text = scanner::consume_token_body(&mut self.cursor)?;
        if self.cursor.tell() == offset {
            log::trace!("End of input at offset {offset}");
            return Ok(None);
        }
        self.cursor.release();
        log::trace!("Token {text:?} at offset {offset}");
        Ok(Some(Token {
            text,
            offset,
            line_start: line_break || offset == 0,
        }))
    }
}

impl<C: Cursor> Iterator for TokenStream<C> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
            .transpose()
            .map(|token| token.map(|token| token.text))
    }
}

impl<C: Cursor> FusedIterator for TokenStream<C> {}
