// src/frontend/lexer.rs

use crate::errors::ParseError;
use crate::frontend::{Span, Token, TokenType};

/// Lexer for the Go subset.
///
/// Implements the Go semicolon-insertion rule: a newline (or a block
/// comment spanning one) after an identifier, literal or closing delimiter
/// produces a [`TokenType::Semi`] token, exactly like the Go scanner.
pub struct Lexer<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    start: usize,
    current: usize,
    last: Option<TokenType>,
    eof_semi_emitted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            start: 0,
            current: 0,
            last: None,
            eof_semi_emitted: false,
        }
    }

    /// Lex a whole source string, ending with an `Eof` token.
    pub fn tokenize(source: &'src str) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.ty == TokenType::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        loop {
            self.start = self.current;
            let Some(c) = self.advance() else {
                if self.needs_semi() && !self.eof_semi_emitted {
                    self.eof_semi_emitted = true;
                    return Ok(self.make_token(TokenType::Semi));
                }
                return Ok(self.make_token(TokenType::Eof));
            };

            match c {
                ' ' | '\t' | '\r' => continue,
                '\n' => {
                    if self.needs_semi() {
                        return Ok(self.make_token(TokenType::Semi));
                    }
                    continue;
                }
                '/' => match self.peek() {
                    Some('/') => {
                        while self.peek().is_some_and(|c| c != '\n') {
                            self.advance();
                        }
                        // The newline itself is handled on the next pass.
                        continue;
                    }
                    Some('*') => {
                        self.advance();
                        let crossed_newline = self.skip_block_comment()?;
                        if crossed_newline && self.needs_semi() {
                            return Ok(self.make_token(TokenType::Semi));
                        }
                        continue;
                    }
                    _ => return Ok(self.make_token(TokenType::Other)),
                },
                '(' => return Ok(self.make_token(TokenType::LParen)),
                ')' => return Ok(self.make_token(TokenType::RParen)),
                '{' => return Ok(self.make_token(TokenType::LBrace)),
                '}' => return Ok(self.make_token(TokenType::RBrace)),
                '[' => return Ok(self.make_token(TokenType::LBracket)),
                ']' => return Ok(self.make_token(TokenType::RBracket)),
                ',' => return Ok(self.make_token(TokenType::Comma)),
                ';' => return Ok(self.make_token(TokenType::Semi)),
                '*' => return Ok(self.make_token(TokenType::Star)),
                '=' => {
                    if self.match_char('=') {
                        return Ok(self.make_token(TokenType::Other));
                    }
                    return Ok(self.make_token(TokenType::Assign));
                }
                '<' => {
                    if self.match_char('-') {
                        return Ok(self.make_token(TokenType::Arrow));
                    }
                    return Ok(self.make_token(TokenType::Other));
                }
                '.' => {
                    if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return self.number(true);
                    }
                    if self.match_char('.') {
                        // ".." alone is not valid Go; fold it into one token.
                        self.match_char('.');
                        return Ok(self.make_token(TokenType::Ellipsis));
                    }
                    return Ok(self.make_token(TokenType::Dot));
                }
                '"' => return self.string_literal(),
                '`' => return self.raw_string_literal(),
                '\'' => return self.rune_literal(),
                '+' | '-' | '%' | '&' | '|' | '^' | '!' | ':' | '>' | '~' | '?' => {
                    return Ok(self.make_token(TokenType::Other));
                }
                c if c.is_ascii_digit() => return self.number(false),
                c if c.is_alphabetic() || c == '_' => return Ok(self.identifier()),
                c => {
                    return Err(ParseError::UnexpectedChar {
                        ch: c,
                        span: Span::new(self.start, self.current).into(),
                    });
                }
            }
        }
    }

    fn needs_semi(&self) -> bool {
        self.last.is_some_and(|ty| ty.triggers_semi())
    }

    fn advance(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.current = i + c.len_utf8();
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_token(&mut self, ty: TokenType) -> Token {
        self.last = Some(ty);
        Token::new(
            ty,
            &self.source[self.start..self.current],
            Span::new(self.start, self.current),
        )
    }

    /// Skip a `/* */` comment; reports whether it spanned a newline.
    fn skip_block_comment(&mut self) -> Result<bool, ParseError> {
        let mut crossed_newline = false;
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::UnterminatedComment {
                        span: Span::new(self.start, self.start + 2).into(),
                    });
                }
                Some('\n') => crossed_newline = true,
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return Ok(crossed_newline);
                }
                Some(_) => {}
            }
        }
    }

    fn string_literal(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(ParseError::UnterminatedString {
                        span: Span::new(self.start, self.start + 1).into(),
                    });
                }
                Some('\\') => {
                    self.advance();
                }
                Some('"') => return Ok(self.make_token(TokenType::Str)),
                Some(_) => {}
            }
        }
    }

    fn raw_string_literal(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.advance() {
                None => {
                    return Err(ParseError::UnterminatedString {
                        span: Span::new(self.start, self.start + 1).into(),
                    });
                }
                Some('`') => return Ok(self.make_token(TokenType::Str)),
                Some(_) => {}
            }
        }
    }

    fn rune_literal(&mut self) -> Result<Token, ParseError> {
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(ParseError::UnterminatedRune {
                        span: Span::new(self.start, self.start + 1).into(),
                    });
                }
                Some('\\') => {
                    self.advance();
                }
                Some('\'') => return Ok(self.make_token(TokenType::Rune)),
                Some(_) => {}
            }
        }
    }

    fn number(&mut self, mut saw_dot: bool) -> Result<Token, ParseError> {
        let mut prev = '0';
        while let Some(c) = self.peek() {
            let take = match c {
                '0'..='9' | 'a'..='d' | 'f'..='o' | 'q'..='z' | 'A'..='D' | 'F'..='O'
                | 'Q'..='Z' | '_' => true,
                'e' | 'E' | 'p' | 'P' => true,
                '.' => {
                    saw_dot = true;
                    true
                }
                '+' | '-' => matches!(prev, 'e' | 'E' | 'p' | 'P'),
                _ => false,
            };
            if !take {
                break;
            }
            prev = c;
            self.advance();
        }
        let ty = if saw_dot { TokenType::Float } else { TokenType::Int };
        Ok(self.make_token(ty))
    }

    fn identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let ty = match &self.source[self.start..self.current] {
            "package" => TokenType::KwPackage,
            "import" => TokenType::KwImport,
            "type" => TokenType::KwType,
            "interface" => TokenType::KwInterface,
            "struct" => TokenType::KwStruct,
            "map" => TokenType::KwMap,
            "chan" => TokenType::KwChan,
            "func" => TokenType::KwFunc,
            "const" => TokenType::KwConst,
            "var" => TokenType::KwVar,
            _ => TokenType::Ident,
        };
        self.make_token(ty)
    }
}

/// Unquote a Go string literal lexeme (interpreted or raw).
///
/// Only the escapes that realistically show up in import paths are
/// interpreted; unknown escapes keep the escaped character.
pub fn unquote(lexeme: &str) -> String {
    if let Some(inner) = lexeme.strip_prefix('`') {
        return inner.strip_suffix('`').unwrap_or(inner).to_string();
    }
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.ty)
            .collect()
    }

    #[test]
    fn lexes_qualified_type() {
        assert_eq!(
            kinds("driver.Conn"),
            vec![
                TokenType::Ident,
                TokenType::Dot,
                TokenType::Ident,
                TokenType::Semi, // inserted at end of input
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn inserts_semi_after_rbrace_newline() {
        let toks = kinds("type A interface {\n\tClose() error\n}\n");
        // "error" newline and "}" newline both insert semicolons
        let semis = toks.iter().filter(|t| **t == TokenType::Semi).count();
        assert_eq!(semis, 2);
    }

    #[test]
    fn no_semi_after_comma_or_lbrace() {
        assert_eq!(
            kinds("interface {\n"),
            vec![TokenType::KwInterface, TokenType::LBrace, TokenType::Eof]
        );
    }

    #[test]
    fn line_comment_does_not_eat_newline() {
        let toks = kinds("Close() error // closes\nNext()");
        assert!(toks.contains(&TokenType::Semi));
    }

    #[test]
    fn block_comment_with_newline_acts_as_newline() {
        let toks = kinds("error /* doc\n */ Next");
        assert_eq!(toks[1], TokenType::Semi);
    }

    #[test]
    fn ellipsis_and_arrow() {
        assert_eq!(
            kinds("...int <-chan T"),
            vec![
                TokenType::Ellipsis,
                TokenType::Ident,
                TokenType::Arrow,
                TokenType::KwChan,
                TokenType::Ident,
                TokenType::Semi,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn strings_and_imports() {
        let toks = Lexer::tokenize("import foo \"example.com/foo\"\n").unwrap();
        assert_eq!(toks[0].ty, TokenType::KwImport);
        assert_eq!(toks[2].ty, TokenType::Str);
        assert_eq!(unquote(&toks[2].lexeme), "example.com/foo");
    }

    #[test]
    fn raw_string_unquote() {
        assert_eq!(unquote("`a/b`"), "a/b");
        assert_eq!(unquote("\"a\\\\b\""), "a\\b");
    }

    #[test]
    fn unterminated_string_errors() {
        assert!(Lexer::tokenize("\"oops\n").is_err());
    }

    #[test]
    fn unexpected_char_errors() {
        assert!(Lexer::tokenize("type # int").is_err());
    }
}
