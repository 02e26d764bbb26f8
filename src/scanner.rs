//! Consume-while scanning on top of a [`Cursor`].
//!
//! Every consumer in this module is built on [`consume`], which advances the cursor one
//! [`Lookahead`] at a time for as long as a predicate accepts the looked-ahead [`Unit`].
//! A lookahead is usually a single character, but a peek strategy can also present a
//! whole quoted literal as one unit so it is accepted or rejected atomically.

use crate::{cursor::Cursor, internal_prelude::*};

pub const COMMENT: char = ';';
pub const NEWLINE: char = '\n';
pub const ESCAPE: char = '\\';
pub const DELIMITERS: [char; 2] = ['\'', '"'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Char(char),
    /// Text taken verbatim, such as an escaped character or the contents of a quoted string.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookahead {
    pub unit: Unit,
    /// Number of source characters the unit spans.
    pub width: usize,
}

impl Lookahead {
    pub fn char(c: char) -> Self {
        Self {
            unit: Unit::Char(c),
            width: 1,
        }
    }

    pub fn literal(text: impl Into<String>, width: usize) -> Self {
        Self {
            unit: Unit::Literal(text.into()),
            width,
        }
    }
}

/// Whether a character is unimportant whitespace. Newlines are never ignorable.
pub fn is_ignorable_space(c: char) -> bool {
    c.is_whitespace() && c != NEWLINE
}

fn is_token_char(c: char) -> bool {
    !is_ignorable_space(c) && c != NEWLINE && c != COMMENT
}

fn char_predicate(mut predicate: impl FnMut(char) -> bool) -> impl FnMut(&Unit) -> bool {
    move |unit| match unit {
        Unit::Char(c) => predicate(*c),
        Unit::Literal(text) => text.chars().all(&mut predicate),
    }
}

pub fn peek_char<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Option<Lookahead>> {
    Ok(cursor.peek()?.map(Lookahead::char))
}

/// Consumes units from `cursor` as long as `predicate` accepts them.
///
/// `peek` must not move the cursor. Consumption stops at the first unit the predicate
/// rejects or when `peek` finds nothing more to read, leaving the cursor right before it.
pub fn consume<C, P, K>(cursor: &mut C, mut predicate: P, mut peek: K) -> Result<String>
where
    C: Cursor + ?Sized,
    P: FnMut(&Unit) -> bool,
    K: FnMut(&mut C) -> Result<Option<Lookahead>>,
{
    let mut consumed = String::new();
    while let Some(Lookahead { unit, width }) = peek(&mut *cursor)? {
        if !predicate(&unit) {
            break;
        }
        cursor.read(width)?;
        match unit {
            Unit::Char(c) => consumed.push(c),
            Unit::Literal(text) => consumed.push_str(&text),
        }
    }
    Ok(consumed)
}

pub fn consume_whitespace<C: Cursor + ?Sized>(cursor: &mut C) -> Result<String> {
    consume(cursor, char_predicate(is_ignorable_space), peek_char)
}

pub fn consume_not_whitespace<C: Cursor + ?Sized>(cursor: &mut C) -> Result<String> {
    consume(cursor, char_predicate(|c| !is_ignorable_space(c)), peek_char)
}

pub fn consume_in<C: Cursor + ?Sized>(cursor: &mut C, chars: &str) -> Result<String> {
    consume(cursor, char_predicate(|c| chars.contains(c)), peek_char)
}

pub fn consume_not_in<C: Cursor + ?Sized>(cursor: &mut C, chars: &str) -> Result<String> {
    consume(cursor, char_predicate(|c| !chars.contains(c)), peek_char)
}

/// Consumes the rest of the line, excluding the newline.
pub fn consume_line<C: Cursor + ?Sized>(cursor: &mut C) -> Result<String> {
    consume_not_in(cursor, "\n")
}

/// Peeks a character, presenting an escape sequence as the escaped character.
fn peek_escaped<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Option<Lookahead>> {
    match cursor.peek()? {
        Some(ESCAPE) => {
            let start = cursor.tell();
            cursor.read(1)?;
            let escaped = cursor.peek()?;
            cursor.seek(start)?;
            Ok(escaped.map(|c| Lookahead::literal(c, 2)))
        }
        other => Ok(other.map(Lookahead::char)),
    }
}

/// Consumes a string enclosed in `delimiter`, returning its contents.
///
/// A backslash makes the following character literal, so `\"` inside a `"` string does not
/// close it and `\\` is a single backslash. No other escape sequences are interpreted.
pub fn consume_delimited<C: Cursor + ?Sized>(cursor: &mut C, delimiter: char) -> Result<String> {
    let offset = cursor.tell();
    if cursor.peek()? != Some(delimiter) {
        return Err(Error::ExpectedDelimiter { delimiter, offset });
    }
    cursor.read(1)?;

    let string = consume(
        cursor,
        |unit| match unit {
            Unit::Char(c) => *c != delimiter,
            Unit::Literal(_) => true,
        },
        peek_escaped,
    )?;

    let offset = cursor.tell();
    if cursor.peek()? != Some(delimiter) {
        return Err(Error::UnterminatedString { delimiter, offset });
    }
    cursor.read(1)?;

    Ok(string)
}

/// Looks ahead a whole delimited string without consuming it.
pub fn peek_delimited<C: Cursor + ?Sized>(cursor: &mut C, delimiter: char) -> Result<Lookahead> {
    let start = cursor.tell();
    let contents = consume_delimited(cursor, delimiter);
    let width = cursor.tell() - start;
    cursor.seek(start)?;
    Ok(Lookahead::literal(contents?, width))
}

fn peek_token<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Option<Lookahead>> {
    match cursor.peek()? {
        Some(c) if DELIMITERS.contains(&c) => peek_delimited(cursor, c).map(Some),
        other => Ok(other.map(Lookahead::char)),
    }
}

/// Skips ignorable whitespace, comments and blank lines.
///
/// Returns true if at least one line break was skipped. Skipped input is never revisited, so
/// the cursor is released after every skipped line and earlier offsets can't be seeked to.
pub fn skip_blank<C: Cursor + ?Sized>(cursor: &mut C) -> Result<bool> {
    let mut line_break = false;
    loop {
        cursor.release();
        consume_whitespace(cursor)?;
        if at_line_break(cursor)? {
            cursor.read(1)?;
            line_break = true;
        } else if cursor.peek()? == Some(COMMENT) {
            let comment = consume_line(cursor)?;
            log::trace!("Skipped comment : {comment:?}");
        } else {
            return Ok(line_break);
        }
    }
}

/// Whether the next character is a newline. Nothing is consumed.
pub fn at_line_break<C: Cursor + ?Sized>(cursor: &mut C) -> Result<bool> {
    Ok(cursor.peek()? == Some(NEWLINE))
}

/// Consumes a token body starting at the current position.
///
/// The body ends at ignorable whitespace, a newline, a comment or the end of the input.
/// Quoted strings are taken whole, whitespace included, and concatenate with the text
/// around them.
pub fn consume_token_body<C: Cursor + ?Sized>(cursor: &mut C) -> Result<String> {
    consume(
        cursor,
        |unit| match unit {
            Unit::Char(c) => is_token_char(*c),
            Unit::Literal(_) => true,
        },
        peek_token,
    )
}

/// Consumes the next token, or returns `None` at the end of the input.
pub fn consume_token<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Option<String>> {
    skip_blank(cursor)?;
    let start = cursor.tell();
    let token = consume_token_body(cursor)?;
    if cursor.tell() == start {
        return Ok(None);
    }
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::StrCursor;

    fn all_tokens(content: &str) -> Vec<String> {
        let mut cursor = StrCursor::new(content);
        let mut tokens = Vec::new();
        while let Some(token) = consume_token(&mut cursor).unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_consume_stops_at_rejected_unit() {
        let mut cursor = StrCursor::new("aaab");
        let consumed = consume(&mut cursor, char_predicate(|c| c == 'a'), peek_char).unwrap();
        assert_eq!(consumed, "aaa");
        assert_eq!(cursor.tell(), 3);
        assert_eq!(cursor.peek().unwrap(), Some('b'));
    }

    #[test]
    fn test_consume_stops_at_end() {
        let mut cursor = StrCursor::new("aaa");
        assert_eq!(consume_in(&mut cursor, "a").unwrap(), "aaa");
        assert_eq!(consume_in(&mut cursor, "a").unwrap(), "");
        assert_eq!(cursor.tell(), 3);
    }

    #[test]
    fn test_consume_uses_lookahead_width() {
        let mut cursor = StrCursor::new("abcdef");
        let mut peek = |cursor: &mut StrCursor| -> Result<Option<Lookahead>> {
            let start = cursor.tell();
            let pair = cursor.read(2)?;
            cursor.seek(start)?;
            Ok((pair.chars().count() == 2).then(|| Lookahead::literal(pair, 2)))
        };
        let consumed = consume(&mut cursor, |unit| unit != &Unit::Literal("ef".into()), &mut peek)
            .unwrap();
        assert_eq!(consumed, "abcd");
        assert_eq!(cursor.tell(), 4);
    }

    #[test]
    fn test_ignorable_space() {
        assert!(is_ignorable_space(' '));
        assert!(is_ignorable_space('\t'));
        assert!(is_ignorable_space('\r'));
        assert!(!is_ignorable_space('\n'));
        assert!(!is_ignorable_space('a'));
    }

    #[test]
    fn test_consume_line() {
        let mut cursor = StrCursor::new("first line\nsecond");
        assert_eq!(consume_line(&mut cursor).unwrap(), "first line");
        assert!(at_line_break(&mut cursor).unwrap());
        assert_eq!(consume_not_in(&mut cursor, "c").unwrap(), "\nse");
        assert_eq!(consume_not_whitespace(&mut cursor).unwrap(), "cond");
    }

    #[test]
    fn test_consume_delimited() {
        let mut cursor = StrCursor::new(r#""say \"hi\"" rest"#);
        assert_eq!(consume_delimited(&mut cursor, '"').unwrap(), r#"say "hi""#);
        assert_eq!(cursor.tell(), 12);

        let mut cursor = StrCursor::new(r#"'he said "x"'"#);
        assert_eq!(consume_delimited(&mut cursor, '\'').unwrap(), r#"he said "x""#);

        let mut cursor = StrCursor::new(r#"'a\\' b'"#);
        assert_eq!(consume_delimited(&mut cursor, '\'').unwrap(), r"a\");
        assert_eq!(cursor.tell(), 5);

        let mut cursor = StrCursor::new(r#""\n\t""#);
        assert_eq!(consume_delimited(&mut cursor, '"').unwrap(), "nt");

        let mut cursor = StrCursor::new(r#""""#);
        assert_eq!(consume_delimited(&mut cursor, '"').unwrap(), "");
    }

    #[test]
    fn test_consume_delimited_unterminated() {
        let mut cursor = StrCursor::new(r#""abc"#);
        assert!(matches!(
            consume_delimited(&mut cursor, '"'),
            Err(Error::UnterminatedString {
                delimiter: '"',
                offset: 4
            })
        ));

        let mut cursor = StrCursor::new(r#""abc\""#);
        assert!(matches!(
            consume_delimited(&mut cursor, '"'),
            Err(Error::UnterminatedString { offset: 6, .. })
        ));

        let mut cursor = StrCursor::new(r#""abc\"#);
        assert!(matches!(
            consume_delimited(&mut cursor, '"'),
            Err(Error::UnterminatedString { offset: 4, .. })
        ));

        let mut cursor = StrCursor::new("'abc\"");
        assert!(consume_delimited(&mut cursor, '\'').is_err());
    }

    #[test]
    fn test_consume_delimited_expects_opening() {
        let mut cursor = StrCursor::new("abc\"");
        assert!(matches!(
            consume_delimited(&mut cursor, '"'),
            Err(Error::ExpectedDelimiter {
                delimiter: '"',
                offset: 0
            })
        ));
        assert_eq!(cursor.tell(), 0);
    }

    #[test]
    fn test_peek_delimited_restores_position() {
        let mut cursor = StrCursor::new(r#"x "a\"b" c"#);
        cursor.seek(2).unwrap();
        let lookahead = peek_delimited(&mut cursor, '"').unwrap();
        assert_eq!(lookahead, Lookahead::literal(r#"a"b"#, 6));
        assert_eq!(cursor.tell(), 2);

        let mut cursor = StrCursor::new(r#"x "abc"#);
        cursor.seek(2).unwrap();
        peek_delimited(&mut cursor, '"').unwrap_err();
        assert_eq!(cursor.tell(), 2);
    }

    #[test]
    fn test_skip_blank() {
        let mut cursor = StrCursor::new("  \t; comment\n\n  ; more\n   x");
        assert!(skip_blank(&mut cursor).unwrap());
        assert_eq!(cursor.peek().unwrap(), Some('x'));

        let mut cursor = StrCursor::new("   x");
        assert!(!skip_blank(&mut cursor).unwrap());
        assert_eq!(cursor.tell(), 3);

        let mut cursor = StrCursor::new("; only a comment");
        assert!(!skip_blank(&mut cursor).unwrap());
        assert_eq!(cursor.peek().unwrap(), None);
    }

    #[test]
    fn test_consume_token() {
        assert_eq!(all_tokens("a b c"), vec!["a", "b", "c"]);
        assert_eq!(all_tokens(r#""a b" c"#), vec!["a b", "c"]);
        assert_eq!(all_tokens("a; a comment\nb"), vec!["a", "b"]);
        assert_eq!(all_tokens("a\n\n\n;c\n\nb"), vec!["a", "b"]);
        assert_eq!(all_tokens(r#""say \"hi\"""#), vec![r#"say "hi""#]);
    }

    #[test]
    fn test_consume_token_concatenates_quoted_text() {
        assert_eq!(all_tokens(r#""a b"cd e"#), vec!["a bcd", "e"]);
        assert_eq!(all_tokens(r#"key="some value" x"#), vec!["key=some value", "x"]);
        assert_eq!(all_tokens(r#"'a ; b'"c d""#), vec!["a ; bc d"]);
    }

    #[test]
    fn test_consume_token_empty_literal() {
        assert_eq!(all_tokens(r#"a "" b"#), vec!["a", "", "b"]);
    }

    #[test]
    fn test_consume_token_unterminated() {
        let mut cursor = StrCursor::new(r#"ok "abc"#);
        assert_eq!(consume_token(&mut cursor).unwrap().as_deref(), Some("ok"));
        assert!(matches!(
            consume_token(&mut cursor),
            Err(Error::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_consume_token_only_blanks() {
        for content in ["", "   ", "\n\n", "; comment", " \t; a\n;b\n\n  \n"] {
            assert!(all_tokens(content).is_empty(), "{content:?}");
        }
    }
}
