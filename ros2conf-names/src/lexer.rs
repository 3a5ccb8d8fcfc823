//! Shared tokenizer for the remap, parameter-rule, and log-rule grammars
//!
//! The lexer produces spanned tokens over a rule string and offers up to two
//! tokens of lookahead. Lookahead never consumes; [`Lexer::accept`] advances
//! only when the peeked kind matches, and [`Lexer::expect`] turns a mismatch
//! into [`NameError::WrongLexeme`] carrying the byte offset.

use crate::errors::{NameError, NameResult};

/// The kind of a lexeme recognized by the name lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`
    Token,
    /// `/`
    ForwardSlash,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `:=`
    Separator,
    /// `~/`
    TildeSlash,
    /// `rostopic://`
    UrlTopic,
    /// `rosservice://`
    UrlService,
    /// The reserved identifier `__ns`
    Ns,
    /// The reserved identifiers `__node` and `__name`
    Node,
    /// `*`
    WildOne,
    /// `**`
    WildMulti,
    /// A back-reference `\1` … `\9`
    BackRef,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Human-readable description used in `WrongLexeme` messages
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Token => "an identifier",
            Self::ForwardSlash => "'/'",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Separator => "':='",
            Self::TildeSlash => "'~/'",
            Self::UrlTopic => "'rostopic://'",
            Self::UrlService => "'rosservice://'",
            Self::Ns => "'__ns'",
            Self::Node => "'__node'",
            Self::WildOne => "'*'",
            Self::WildMulti => "'**'",
            Self::BackRef => "a back-reference",
            Self::Eof => "end of input",
        }
    }
}

/// A lexeme with its byte span in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// What was recognized
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Length in bytes (zero for `Eof`)
    pub len: usize,
}

impl Token {
    /// Byte offset one past the last character
    #[must_use]
    pub fn end(self) -> usize {
        self.start + self.len
    }
}

/// Tokenizer with two-token lookahead over a rule string
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    buf: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `input`
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            buf: Vec::with_capacity(2),
        }
    }

    /// The exact input slice a token was recognized from
    #[must_use]
    pub fn text(&self, token: Token) -> &'a str {
        &self.input[token.start..token.end()]
    }

    /// The not-yet-consumed suffix of the input
    ///
    /// Used to hand raw YAML value text off to the parameter parser once the
    /// `:=` separator has been consumed.
    #[must_use]
    pub fn remainder(&self) -> &'a str {
        match self.buf.first() {
            Some(token) => &self.input[token.start..],
            None => &self.input[self.pos..],
        }
    }

    /// Look at the next token without consuming it
    ///
    /// # Errors
    ///
    /// Returns a lexing error if the next characters form no token.
    pub fn peek(&mut self) -> NameResult<Token> {
        if self.buf.is_empty() {
            let token = self.scan()?;
            self.buf.push(token);
        }
        Ok(self.buf[0])
    }

    /// Look two tokens ahead without consuming anything
    ///
    /// # Errors
    ///
    /// Returns a lexing error if either of the next two positions forms no
    /// token.
    pub fn peek2(&mut self) -> NameResult<Token> {
        while self.buf.len() < 2 {
            let token = self.scan()?;
            self.buf.push(token);
        }
        Ok(self.buf[1])
    }

    /// Consume and return the next token
    ///
    /// # Errors
    ///
    /// Returns a lexing error if the next characters form no token.
    pub fn next_token(&mut self) -> NameResult<Token> {
        if self.buf.is_empty() {
            self.scan()
        } else {
            Ok(self.buf.remove(0))
        }
    }

    /// Consume the next token iff it has the given kind
    ///
    /// # Errors
    ///
    /// Returns a lexing error if the next characters form no token.
    pub fn accept(&mut self, kind: TokenKind) -> NameResult<Option<Token>> {
        let token = self.peek()?;
        if token.kind == kind {
            self.buf.remove(0);
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    /// Consume the next token, requiring the given kind
    ///
    /// # Errors
    ///
    /// Returns [`NameError::WrongLexeme`] if the peeked kind differs, or a
    /// lexing error if the next characters form no token.
    pub fn expect(&mut self, kind: TokenKind) -> NameResult<Token> {
        let token = self.peek()?;
        if token.kind == kind {
            self.buf.remove(0);
            Ok(token)
        } else {
            Err(NameError::WrongLexeme {
                expected: kind.describe(),
                offset: token.start,
            })
        }
    }

    fn scan(&mut self) -> NameResult<Token> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
                len: 0,
            });
        }

        let (kind, len) = match bytes[start] {
            b'/' => (TokenKind::ForwardSlash, 1),
            b'.' => (TokenKind::Dot, 1),
            b':' if bytes.get(start + 1) == Some(&b'=') => (TokenKind::Separator, 2),
            b':' => (TokenKind::Colon, 1),
            b'~' if bytes.get(start + 1) == Some(&b'/') => (TokenKind::TildeSlash, 2),
            b'*' if bytes.get(start + 1) == Some(&b'*') => (TokenKind::WildMulti, 2),
            b'*' => (TokenKind::WildOne, 1),
            b'\\' if matches!(bytes.get(start + 1), Some(b'1'..=b'9')) => (TokenKind::BackRef, 2),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                if self.input[start..].starts_with("rostopic://") {
                    (TokenKind::UrlTopic, "rostopic://".len())
                } else if self.input[start..].starts_with("rosservice://") {
                    (TokenKind::UrlService, "rosservice://".len())
                } else {
                    let mut end = start + 1;
                    while end < bytes.len()
                        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                    {
                        end += 1;
                    }
                    let kind = match &self.input[start..end] {
                        "__ns" => TokenKind::Ns,
                        "__node" | "__name" => TokenKind::Node,
                        _ => TokenKind::Token,
                    };
                    (kind, end - start)
                }
            }
            _ => {
                let found = self.input[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(NameError::UnexpectedCharacter {
                    found,
                    offset: start,
                });
            }
        };

        self.pos = start + len;
        Ok(Token { kind, start, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lex.next_token().unwrap();
            out.push(token.kind);
            if token.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    #[test]
    fn test_basic_remap_tokens() {
        assert_eq!(
            kinds("foo:=bar"),
            vec![
                TokenKind::Token,
                TokenKind::Separator,
                TokenKind::Token,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_node_prefix_tokens() {
        assert_eq!(
            kinds("alice:foo:=bar"),
            vec![
                TokenKind::Token,
                TokenKind::Colon,
                TokenKind::Token,
                TokenKind::Separator,
                TokenKind::Token,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_reserved_identifiers() {
        assert_eq!(kinds("__ns")[0], TokenKind::Ns);
        assert_eq!(kinds("__node")[0], TokenKind::Node);
        assert_eq!(kinds("__name")[0], TokenKind::Node);
        assert_eq!(kinds("__nsx")[0], TokenKind::Token);
    }

    #[test]
    fn test_url_schemes() {
        assert_eq!(
            kinds("rostopic://foo"),
            vec![TokenKind::UrlTopic, TokenKind::Token, TokenKind::Eof]
        );
        assert_eq!(
            kinds("rosservice://foo"),
            vec![TokenKind::UrlService, TokenKind::Token, TokenKind::Eof]
        );
        // no scheme separator, plain identifier followed by a colon
        assert_eq!(
            kinds("rostopic:x"),
            vec![
                TokenKind::Token,
                TokenKind::Colon,
                TokenKind::Token,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_wildcards_and_backrefs() {
        assert_eq!(kinds("*")[0], TokenKind::WildOne);
        assert_eq!(kinds("**")[0], TokenKind::WildMulti);
        assert_eq!(kinds("\\3")[0], TokenKind::BackRef);
    }

    #[test]
    fn test_tilde_slash() {
        assert_eq!(
            kinds("~/status"),
            vec![TokenKind::TildeSlash, TokenKind::Token, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lone_tilde_is_an_error() {
        let mut lex = Lexer::new("~x");
        assert!(matches!(
            lex.next_token(),
            Err(NameError::UnexpectedCharacter { found: '~', offset: 0 })
        ));
    }

    #[test]
    fn test_lookahead_never_consumes() {
        let mut lex = Lexer::new("a:b");
        assert_eq!(lex.peek().unwrap().kind, TokenKind::Token);
        assert_eq!(lex.peek2().unwrap().kind, TokenKind::Colon);
        assert_eq!(lex.peek().unwrap().kind, TokenKind::Token);
        let first = lex.next_token().unwrap();
        assert_eq!(lex.text(first), "a");
    }

    #[test]
    fn test_accept_and_expect() {
        let mut lex = Lexer::new("/foo");
        assert!(lex.accept(TokenKind::Dot).unwrap().is_none());
        assert!(lex.accept(TokenKind::ForwardSlash).unwrap().is_some());
        let err = lex.expect(TokenKind::Separator).unwrap_err();
        assert_eq!(
            err,
            NameError::WrongLexeme {
                expected: "':='",
                offset: 1
            }
        );
        assert_eq!(lex.expect(TokenKind::Token).unwrap().len, 3);
        assert_eq!(lex.expect(TokenKind::Eof).unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_remainder_after_separator() {
        let mut lex = Lexer::new("rate:=[1, 2]");
        lex.expect(TokenKind::Token).unwrap();
        lex.expect(TokenKind::Separator).unwrap();
        assert_eq!(lex.remainder(), "[1, 2]");
    }

    #[test]
    fn test_remainder_respects_lookahead() {
        let mut lex = Lexer::new("a:=b");
        lex.expect(TokenKind::Token).unwrap();
        lex.expect(TokenKind::Separator).unwrap();
        lex.peek().unwrap();
        assert_eq!(lex.remainder(), "b");
    }
}
