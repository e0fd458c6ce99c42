//! Tokenizer for a single source file.

use std::fmt;

use crate::{
    error::{Error, Location},
    registry::SourceFile,
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Token<'a> {
    Eof,
    Name(&'a str),
    /// Decimal literal, with or without a fractional part.
    Literal(f64),
    /// Contents of a double-quoted string, without the quotes.
    Str(&'a str),
    Hash,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Semicolon,
    Percent,
    Bang,
    BangEquals,

    Lt,
    Le,
    Gt,
    Ge,
    Equals,
    DoubleEquals,
    Ampersand,
    DoubleAmpersand,
    Pipe,
    DoublePipe,
    Plus,
    PlusEquals,
    Minus,
    MinusEquals,
    Star,
    StarEquals,
    Slash,
    SlashEquals,
}

impl Token<'_> {
    /// Source text of punctuation tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Token::Eof | Token::Name(_) | Token::Literal(_) | Token::Str(_) => return None,
            Token::Hash => "#",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Percent => "%",
            Token::Bang => "!",
            Token::BangEquals => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Equals => "=",
            Token::DoubleEquals => "==",
            Token::Ampersand => "&",
            Token::DoubleAmpersand => "&&",
            Token::Pipe => "|",
            Token::DoublePipe => "||",
            Token::Plus => "+",
            Token::PlusEquals => "+=",
            Token::Minus => "-",
            Token::MinusEquals => "-=",
            Token::Star => "*",
            Token::StarEquals => "*=",
            Token::Slash => "/",
            Token::SlashEquals => "/=",
        };
        Some(symbol)
    }

    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            Token::Lt
                | Token::Le
                | Token::Gt
                | Token::Ge
                | Token::Equals
                | Token::DoubleEquals
                | Token::BangEquals
                | Token::Ampersand
                | Token::DoubleAmpersand
                | Token::Pipe
                | Token::DoublePipe
                | Token::Plus
                | Token::PlusEquals
                | Token::Minus
                | Token::MinusEquals
                | Token::Star
                | Token::StarEquals
                | Token::Slash
                | Token::SlashEquals
                | Token::Percent
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("end of file"),
            Token::Name(name) => write!(f, "name '{name}'"),
            Token::Literal(value) => write!(f, "literal {value}"),
            Token::Str(text) => write!(f, "string {text:?}"),
            _ => write!(f, "'{}'", self.symbol().unwrap_or_default()),
        }
    }
}

/// A token together with the file and byte range it was read from.
#[derive(Debug, Copy, Clone)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub file: &'a SourceFile,
    pub start: usize,
    pub end: usize,
}

impl<'a> Lexeme<'a> {
    pub fn location(&self) -> Location {
        Location::new(&self.file.id, &self.file.contents, self.start..self.end)
    }

    pub fn unexpected(&self, expected: impl Into<String>) -> Error {
        Error::UnexpectedToken {
            location: self.location(),
            expected: expected.into(),
            found: self.token.to_string(),
        }
    }
}

pub struct Lexer<'a> {
    file: &'a SourceFile,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a SourceFile) -> Lexer<'a> {
        Lexer { file, pos: 0 }
    }

    pub fn file(&self) -> &'a SourceFile {
        self.file
    }

    fn source(&self) -> &'a str {
        &self.file.contents
    }

    fn peek(&self) -> Option<u8> {
        self.source().as_bytes().get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<u8> {
        self.source().as_bytes().get(self.pos + 1).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn location(&self, start: usize, end: usize) -> Location {
        Location::new(&self.file.id, self.source(), start..end)
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(byte), _) if byte <= 32 => self.bump(),
                (Some(b'/'), Some(b'/')) => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    let body = &self.source()[start + 2..];
                    match body.find("*/") {
                        Some(end) => self.pos = start + 2 + end + 2,
                        None => {
                            return Err(Error::UnterminatedComment {
                                location: self.location(start, start + 2),
                            })
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Reads a token that may be extended by a second character.
    fn pair(&mut self, single: Token<'a>, second: u8, double: Token<'a>) -> Token<'a> {
        self.bump();
        if self.peek() == Some(second) {
            self.bump();
            double
        } else {
            single
        }
    }

    fn literal(&mut self) -> Token<'a> {
        let mut mantissa: u64 = 0;
        let mut have_dot = false;
        let mut fraction_digits = 0;
        while let Some(byte) = self.peek() {
            match byte {
                b'0'..=b'9' => {
                    mantissa = mantissa
                        .wrapping_mul(10)
                        .wrapping_add(u64::from(byte - b'0'));
                    if have_dot {
                        fraction_digits += 1;
                    }
                }
                b'.' if !have_dot => have_dot = true,
                _ => break,
            }
            self.bump();
        }

        let mut value = mantissa as f64;
        for _ in 0..fraction_digits {
            value /= 10.0;
        }
        trace!(value, "read literal");
        Token::Literal(value)
    }

    fn string(&mut self, start: usize) -> Result<Token<'a>, Error> {
        self.bump();
        let body = &self.source()[start + 1..];
        match body.find('"') {
            Some(length) => {
                self.pos = start + 1 + length + 1;
                Ok(Token::Str(&body[..length]))
            }
            None => Err(Error::UnterminatedString {
                location: self.location(start, start + 1),
            }),
        }
    }

    pub fn next_token(&mut self) -> Result<Lexeme<'a>, Error> {
        self.skip_trivia()?;

        let start = self.pos;
        let token = match self.peek() {
            None => Token::Eof,
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'_') => {
                while let Some(b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'0'..=b'9') = self.peek() {
                    self.bump();
                }
                Token::Name(&self.source()[start..self.pos])
            }
            Some(b'0'..=b'9') => self.literal(),
            Some(b'"') => self.string(start)?,
            Some(b'<') => self.pair(Token::Lt, b'=', Token::Le),
            Some(b'>') => self.pair(Token::Gt, b'=', Token::Ge),
            Some(b'=') => self.pair(Token::Equals, b'=', Token::DoubleEquals),
            Some(b'!') => self.pair(Token::Bang, b'=', Token::BangEquals),
            Some(b'&') => self.pair(Token::Ampersand, b'&', Token::DoubleAmpersand),
            Some(b'|') => self.pair(Token::Pipe, b'|', Token::DoublePipe),
            Some(b'+') => self.pair(Token::Plus, b'=', Token::PlusEquals),
            Some(b'-') => self.pair(Token::Minus, b'=', Token::MinusEquals),
            Some(b'*') => self.pair(Token::Star, b'=', Token::StarEquals),
            Some(b'/') => self.pair(Token::Slash, b'=', Token::SlashEquals),
            Some(byte) => {
                let token = match byte {
                    b'#' => Token::Hash,
                    b'(' => Token::LeftParen,
                    b')' => Token::RightParen,
                    b'{' => Token::LeftBrace,
                    b'}' => Token::RightBrace,
                    b'.' => Token::Dot,
                    b',' => Token::Comma,
                    b';' => Token::Semicolon,
                    b'%' => Token::Percent,
                    _ => {
                        let character = self.source()[start..].chars().next().unwrap_or('\0');
                        return Err(Error::UnexpectedCharacter {
                            location: self.location(start, start + character.len_utf8()),
                            character,
                        });
                    }
                };
                self.bump();
                token
            }
        };

        Ok(Lexeme {
            token,
            file: self.file,
            start,
            end: self.pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Result<Vec<String>, Error> {
        let file = SourceFile::new("test", source);
        let mut lexer = Lexer::new(&file);
        let mut tokens = Vec::new();
        loop {
            let lexeme = lexer.next_token()?;
            if lexeme.token == Token::Eof {
                return Ok(tokens);
            }
            tokens.push(lexeme.token.to_string());
        }
    }

    #[test]
    fn names_and_punctuation() {
        assert_eq!(
            tokens("uniform vec4 color_2;").unwrap(),
            ["name 'uniform'", "name 'vec4'", "name 'color_2'", "';'"]
        );
        assert_eq!(
            tokens("a<=b<c==d=e!=f!g").unwrap(),
            [
                "name 'a'", "'<='", "name 'b'", "'<'", "name 'c'", "'=='", "name 'd'", "'='",
                "name 'e'", "'!='", "name 'f'", "'!'", "name 'g'"
            ]
        );
        assert_eq!(
            tokens("&& & || | += + -= - *= * /= / % . , ( ) { } #").unwrap(),
            [
                "'&&'", "'&'", "'||'", "'|'", "'+='", "'+'", "'-='", "'-'", "'*='", "'*'",
                "'/='", "'/'", "'%'", "'.'", "','", "'('", "')'", "'{'", "'}'", "'#'"
            ]
        );
    }

    #[test]
    fn literals() {
        let file = SourceFile::new("test", "42 3.25 1. 7.5.5");
        let mut lexer = Lexer::new(&file);
        let mut values = Vec::new();
        loop {
            match lexer.next_token().unwrap().token {
                Token::Literal(value) => values.push(Some(value)),
                Token::Eof => break,
                _ => values.push(None),
            }
        }
        assert_eq!(
            values,
            [Some(42.0), Some(3.25), Some(1.0), Some(7.5), None, Some(5.0)]
        );
    }

    #[test]
    fn strings() {
        let file = SourceFile::new("test", "#include \"common.glsl\"");
        let mut lexer = Lexer::new(&file);
        assert_eq!(lexer.next_token().unwrap().token, Token::Hash);
        assert_eq!(lexer.next_token().unwrap().token, Token::Name("include"));
        let string = lexer.next_token().unwrap();
        assert_eq!(string.token, Token::Str("common.glsl"));
        assert_eq!((string.start, string.end), (9, 22));

        assert!(matches!(
            tokens("\"open"),
            Err(Error::UnterminatedString { .. })
        ));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("a // line comment\n/* block\n comment */ b / c").unwrap(),
            ["name 'a'", "name 'b'", "'/'", "name 'c'"]
        );
        assert_eq!(tokens("x // trailing").unwrap(), ["name 'x'"]);
    }

    #[test]
    fn unterminated_comment() {
        let error = tokens("a /* never closed").unwrap_err();
        match error {
            Error::UnterminatedComment { location } => assert_eq!(location.column, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_character() {
        let error = tokens("float x = y @ z;").unwrap_err();
        match error {
            Error::UnexpectedCharacter {
                location,
                character,
            } => {
                assert_eq!(character, '@');
                assert_eq!((location.line, location.column), (1, 13));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn control_bytes_are_whitespace() {
        assert_eq!(tokens("\t\r\n\x0b a \x01").unwrap(), ["name 'a'"]);
    }
}
