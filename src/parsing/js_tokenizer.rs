use super::ParseError;
use crate::coord::{Pos, Span};
use crate::util::NavBug;
use regex::Regex;
use std::cell::LazyCell;

thread_local! {
    static NUMBER_REGEX: LazyCell<Regex> = LazyCell::new(|| {
        Regex::new(
            r"^(?:0[xX][0-9a-fA-F]+|0[bB][01]+|0[oO][0-7]+|(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)n?",
        )
        .bug()
    });
    static IDENT_REGEX: LazyCell<Regex> =
        LazyCell::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*").bug());
}

/// Longest first, so that the first match is the longest one.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "...", "=>", "==", "!=", "<=", ">=", "&&",
    "||", "??", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**", "<<", ">>",
    "?.", "{", "}", "(", ")", "[", "]", ";", ",", ".", "<", ">", "+", "-", "*", "/", "%", "&",
    "|", "^", "!", "~", "?", ":", "=",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'s> {
    /// Identifiers and keywords.
    Ident(&'s str),
    Number(&'s str),
    /// Including its quotes and escapes, exactly as written.
    Str(&'s str),
    Punct(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind<'s>,
    pub span: Span,
    /// Whether a line break separates this token from the previous one.
    pub newline_before: bool,
}

// INVARIANT: `offset` and `pos` always agree, and point at the correct source position to blame in
//   an error message. (So make sure not to advance them prematurely.)
pub struct Tokenizer<'s> {
    source: &'s str,
    offset: usize,
    pos: Pos,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str) -> Tokenizer<'s> {
        Tokenizer {
            source,
            offset: 0,
            pos: Pos::zero(),
        }
    }

    /// The position just past the last character.
    pub fn end_pos(source: &str) -> Pos {
        let mut tokenizer = Tokenizer::new(source);
        tokenizer.advance(source.len());
        tokenizer.pos
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::new(self.pos, message)
    }

    fn remaining(&self) -> &'s str {
        &self.source[self.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, len: usize) {
        for ch in self.source[self.offset..self.offset + len].chars() {
            if ch == '\n' {
                self.pos.line += 1;
                self.pos.column = 0;
            } else {
                self.pos.column += 1;
            }
        }
        self.offset += len;
    }

    /// Skips whitespace and comments. Returns whether a line break was skipped.
    fn consume_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            let rest = self.remaining();
            if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.advance(len);
            } else if rest.starts_with("/*") {
                let len = match rest[2..].find("*/") {
                    Some(len) => len + 4,
                    None => return Err(self.error("Unterminated comment.")),
                };
                newline |= rest[..len].contains('\n');
                self.advance(len);
            } else {
                match self.peek_char() {
                    Some('\n') => {
                        newline = true;
                        self.advance(1);
                    }
                    Some(ch) if ch.is_whitespace() => self.advance(ch.len_utf8()),
                    _ => return Ok(newline),
                }
            }
        }
    }

    fn string_len(&self, quote: char) -> Option<usize> {
        let mut chars = self.remaining().char_indices().skip(1);
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\n' => return None,
                '\\' => {
                    chars.next()?;
                }
                _ if ch == quote => return Some(i + 1),
                _ => (),
            }
        }
        None
    }

    fn token(&mut self) -> Result<TokenKind<'s>, ParseError> {
        let rest = self.remaining();
        let ch = self.peek_char().bug();

        if ch == '"' || ch == '\'' {
            let len = self.string_len(ch).ok_or_else(|| self.error("Invalid string."))?;
            self.advance(len);
            return Ok(TokenKind::Str(&rest[..len]));
        }
        if ch == '`' {
            return Err(self.error("Template literals are not supported."));
        }
        let starts_number =
            ch.is_ascii_digit() || (ch == '.' && rest[1..].starts_with(|c: char| c.is_ascii_digit()));
        if starts_number {
            return match NUMBER_REGEX.with(|regex| regex.find(rest)) {
                Some(matched) => {
                    self.advance(matched.len());
                    Ok(TokenKind::Number(matched.as_str()))
                }
                None => Err(self.error("Invalid number.")),
            };
        }
        if let Some(matched) = IDENT_REGEX.with(|regex| regex.find(rest)) {
            self.advance(matched.len());
            return Ok(TokenKind::Ident(matched.as_str()));
        }
        if let Some(punct) = PUNCTUATORS.iter().find(|punct| rest.starts_with(**punct)) {
            self.advance(punct.len());
            return Ok(TokenKind::Punct(*punct));
        }
        Err(self.error(&format!("Unexpected character '{}'.", ch)))
    }
}

impl<'s> Iterator for Tokenizer<'s> {
    type Item = Result<Token<'s>, ParseError>;

    fn next(&mut self) -> Option<Result<Token<'s>, ParseError>> {
        let newline_before = match self.consume_trivia() {
            Ok(newline) => newline,
            Err(err) => {
                // Don't report the same error forever.
                self.offset = self.source.len();
                return Some(Err(err));
            }
        };
        self.peek_char()?;
        let start = self.pos;
        let result = self.token().map(|kind| Token {
            kind,
            span: Span::new(start, self.pos),
            newline_before,
        });
        if result.is_err() {
            self.offset = self.source.len();
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn tokenize(source: &str) -> Vec<TokenKind<'_>> {
        Tokenizer::new(source)
            .map(|result| match result {
                Ok(token) => token.kind,
                Err(err) => panic!("Tokenization test -- unexpected error:\n{}", err),
            })
            .collect()
    }

    #[track_caller]
    fn assert_invalid(source: &str, expected_message: &str) {
        for result in Tokenizer::new(source) {
            if let Err(err) = result {
                let message = err.to_string();
                assert!(
                    message.contains(expected_message),
                    "Tokenization test -- wrong error. Found '{}', expected '{}'.",
                    message,
                    expected_message
                );
                return;
            }
        }
        panic!("Tokenization test -- expected error, but tokenization succeeded.")
    }

    #[test]
    fn test_tokens() {
        use TokenKind::*;

        assert_eq!(
            tokenize("function f(a, b) { return a + b; }"),
            vec![
                Ident("function"),
                Ident("f"),
                Punct("("),
                Ident("a"),
                Punct(","),
                Ident("b"),
                Punct(")"),
                Punct("{"),
                Ident("return"),
                Ident("a"),
                Punct("+"),
                Ident("b"),
                Punct(";"),
                Punct("}"),
            ]
        );
        assert_eq!(
            tokenize("x >>>= 0x1F; y === .5e3 ?? 'it\\'s'"),
            vec![
                Ident("x"),
                Punct(">>>="),
                Number("0x1F"),
                Punct(";"),
                Ident("y"),
                Punct("==="),
                Number(".5e3"),
                Punct("??"),
                Str("'it\\'s'"),
            ]
        );
        assert_eq!(
            tokenize("a.b ...c"),
            vec![Ident("a"), Punct("."), Ident("b"), Punct("..."), Ident("c")]
        );
    }

    #[test]
    fn test_comments_and_positions() {
        let tokens = Tokenizer::new("// lead\nfoo /* a\nb */ bar('é')")
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0].kind, TokenKind::Ident("foo"));
        assert_eq!(tokens[0].span, Span::new(Pos::new(2, 0), Pos::new(2, 3)));
        assert!(tokens[0].newline_before);
        assert_eq!(tokens[1].kind, TokenKind::Ident("bar"));
        assert_eq!(tokens[1].span.start, Pos::new(3, 5));
        assert!(tokens[1].newline_before);
        assert!(!tokens[2].newline_before);
        assert_eq!(tokens[3].span, Span::new(Pos::new(3, 9), Pos::new(3, 12)));
        assert_eq!(tokens[4].span.start, Pos::new(3, 12));
    }

    #[test]
    fn test_end_pos() {
        assert_eq!(Tokenizer::end_pos(""), Pos::new(1, 0));
        assert_eq!(Tokenizer::end_pos("ab\ncd"), Pos::new(2, 2));
        assert_eq!(Tokenizer::end_pos("ab\n"), Pos::new(2, 0));
    }

    #[test]
    fn test_invalid_tokens() {
        assert_invalid("let s = \"open\nclosed\"", "at 1:8: Invalid string.");
        assert_invalid("a /* never closed", "at 1:2: Unterminated comment.");
        assert_invalid("`template`", "Template literals are not supported.");
        assert_invalid("a # b", "at 1:2: Unexpected character '#'.");
    }
}
