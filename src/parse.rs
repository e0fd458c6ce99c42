//! Recursive descent parser producing the top-level declarations of a shader.
//!
//! Function bodies are parsed only to make sure they are well formed. None of
//! the statement or expression structure is kept.

use crate::{
    ast::{Argument, Declaration, Direction, ShaderFileAst, Signature, UniformDecl, VariableDecl},
    error::Error,
    lex::{Lexeme, Token},
    preprocess::Preprocessor,
    registry::{Manifest, SourceFile},
    types::{ReturnType, TypeExpr},
};

/// Result of parsing a type position.
enum TypeSpec {
    Type(TypeExpr),
    /// An interface block `Name { ... }`; its fields are discarded.
    Block(String),
}

pub struct Parser<'a> {
    tokens: Preprocessor<'a>,
    peeked: Option<Lexeme<'a>>,
    declarations: Vec<Declaration>,
}

/// Parses the shader whose source is `file`, resolving includes against `manifest`.
pub fn parse_shader(manifest: &Manifest, file: &SourceFile) -> Result<ShaderFileAst, Error> {
    let mut parser = Parser::new(Preprocessor::new(manifest, file));
    parser.parse_toplevel()?;
    Ok(parser.finish())
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Preprocessor<'a>) -> Parser<'a> {
        Parser {
            tokens,
            peeked: None,
            declarations: Vec::new(),
        }
    }

    pub fn finish(self) -> ShaderFileAst {
        ShaderFileAst {
            declarations: self.declarations,
            expanded: self.tokens.into_output(),
        }
    }

    fn peek(&mut self) -> Result<Lexeme<'a>, Error> {
        match self.peeked {
            Some(lexeme) => Ok(lexeme),
            None => {
                let lexeme = self.tokens.next_token()?;
                self.peeked = Some(lexeme);
                Ok(lexeme)
            }
        }
    }

    fn next(&mut self) -> Result<Lexeme<'a>, Error> {
        let lexeme = self.peek()?;
        self.peeked = None;
        Ok(lexeme)
    }

    fn check(&mut self, token: Token) -> Result<bool, Error> {
        Ok(self.peek()?.token == token)
    }

    /// Consumes the next token if it is `token`.
    fn eat(&mut self, token: Token) -> Result<bool, Error> {
        let found = self.check(token)?;
        if found {
            self.peeked = None;
        }
        Ok(found)
    }

    fn expect(&mut self, token: Token) -> Result<Lexeme<'a>, Error> {
        let lexeme = self.next()?;
        if lexeme.token != token {
            return Err(lexeme.unexpected(token.to_string()));
        }
        Ok(lexeme)
    }

    fn check_keyword(&mut self, keyword: &str) -> Result<bool, Error> {
        Ok(matches!(self.peek()?.token, Token::Name(name) if name == keyword))
    }

    fn parse_name(&mut self) -> Result<String, Error> {
        let lexeme = self.next()?;
        match lexeme.token {
            Token::Name(name) => Ok(name.to_owned()),
            _ => Err(lexeme.unexpected("name")),
        }
    }

    /// Parses a type keyword. Interface blocks are not accepted here.
    fn parse_concrete_type(&mut self) -> Result<TypeExpr, Error> {
        let lexeme = self.next()?;
        match lexeme.token {
            Token::Name(word) => {
                TypeExpr::from_keyword(word).ok_or_else(|| lexeme.unexpected("type"))
            }
            _ => Err(lexeme.unexpected("type")),
        }
    }

    /// Parses a type keyword or an interface block.
    fn parse_type(&mut self) -> Result<TypeSpec, Error> {
        let lexeme = self.next()?;
        let Token::Name(word) = lexeme.token else {
            return Err(lexeme.unexpected("type"));
        };
        if let Some(ty) = TypeExpr::from_keyword(word) {
            trace!(%ty, "parsed type");
            return Ok(TypeSpec::Type(ty));
        }
        if !self.eat(Token::LeftBrace)? {
            return Err(lexeme.unexpected("type"));
        }
        while !self.eat(Token::RightBrace)? {
            self.parse_concrete_type()?;
            self.parse_name()?;
            self.expect(Token::Semicolon)?;
        }
        trace!(block = word, "parsed interface block");
        Ok(TypeSpec::Block(word.to_owned()))
    }

    fn parse_return_type(&mut self) -> Result<ReturnType, Error> {
        if self.check_keyword("void")? {
            self.next()?;
            return Ok(ReturnType::Void);
        }
        self.parse_concrete_type().map(ReturnType::Type)
    }

    pub fn parse_toplevel(&mut self) -> Result<(), Error> {
        loop {
            let lexeme = self.peek()?;
            match lexeme.token {
                Token::Eof => return Ok(()),
                Token::Name("uniform") => self.parse_uniform()?,
                Token::Name("flat" | "in" | "out") => self.parse_variable()?,
                Token::Name(_) => self.parse_function()?,
                _ => return Err(lexeme.unexpected("declaration")),
            }
        }
    }

    fn parse_uniform(&mut self) -> Result<(), Error> {
        self.next()?; // uniform
        let type_start = self.peek()?;
        let ty = match self.parse_type()? {
            TypeSpec::Type(ty) => ty,
            TypeSpec::Block(block) => {
                return Err(Error::BlockAsUniformType {
                    location: type_start.location(),
                    block,
                })
            }
        };
        let name = self.parse_name()?;
        self.expect(Token::Semicolon)?;

        trace!(%ty, %name, "uniform");
        self.declarations
            .push(Declaration::Uniform(UniformDecl { ty, name }));
        Ok(())
    }

    fn parse_variable(&mut self) -> Result<(), Error> {
        let flat = self.check_keyword("flat")?;
        if flat {
            self.next()?;
        }

        let lexeme = self.next()?;
        let direction = match lexeme.token {
            Token::Name("in") => Direction::In,
            Token::Name("out") => Direction::Out,
            _ => return Err(lexeme.unexpected("'in' or 'out'")),
        };
        let ty = self.parse_type()?;
        let name = self.parse_name()?;
        self.expect(Token::Semicolon)?;

        match ty {
            TypeSpec::Type(ty) => {
                trace!(?direction, %ty, %name, "variable");
                self.declarations.push(Declaration::Variable(VariableDecl {
                    direction,
                    flat,
                    ty,
                    name,
                }));
            }
            TypeSpec::Block(block) => trace!(?direction, %block, %name, "skipping interface block"),
        }
        Ok(())
    }

    fn parse_function(&mut self) -> Result<(), Error> {
        let return_type = self.parse_return_type()?;
        let name = self.parse_name()?;

        self.expect(Token::LeftParen)?;
        let mut arguments = Vec::new();
        if !self.check(Token::RightParen)? {
            loop {
                let ty = self.parse_concrete_type()?;
                let name = self.parse_name()?;
                arguments.push(Argument { ty, name });
                if !self.eat(Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::RightParen)?;

        let signature = Signature {
            name,
            return_type,
            arguments,
        };

        let lexeme = self.peek()?;
        match lexeme.token {
            Token::Semicolon => {
                self.next()?;
                trace!(name = %signature.name, "function declaration");
                self.declarations.push(Declaration::FuncDecl(signature));
            }
            Token::LeftBrace => {
                self.parse_compound()?;
                trace!(name = %signature.name, "function definition");
                self.declarations.push(Declaration::FuncDefn(signature));
            }
            _ => return Err(lexeme.unexpected("';' or '{'")),
        }
        Ok(())
    }

    fn parse_compound(&mut self) -> Result<(), Error> {
        self.expect(Token::LeftBrace)?;
        loop {
            let lexeme = self.peek()?;
            match lexeme.token {
                Token::RightBrace => {
                    self.next()?;
                    return Ok(());
                }
                Token::Eof => return Err(lexeme.unexpected("'}'")),
                _ => self.parse_statement()?,
            }
        }
    }

    fn parse_statement(&mut self) -> Result<(), Error> {
        let lexeme = self.peek()?;
        match lexeme.token {
            Token::LeftBrace => self.parse_compound(),
            Token::Name("if") => {
                self.next()?;
                self.expect(Token::LeftParen)?;
                self.parse_expression()?;
                self.expect(Token::RightParen)?;
                self.parse_statement()?;
                if self.check_keyword("else")? {
                    self.next()?;
                    self.parse_statement()?;
                }
                Ok(())
            }
            Token::Name("return") => {
                self.next()?;
                if !self.check(Token::Semicolon)? {
                    self.parse_expression()?;
                }
                self.expect(Token::Semicolon).map(drop)
            }
            Token::Name("discard") => {
                self.next()?;
                self.expect(Token::Semicolon).map(drop)
            }
            Token::Name(word) if TypeExpr::from_keyword(word).is_some() => {
                self.next()?;
                if let Token::Name(_) = self.peek()?.token {
                    // local declaration
                    self.next()?;
                    if self.eat(Token::Equals)? {
                        self.parse_expression()?;
                    }
                } else {
                    // the type name starts an expression, as in `vec4(...)`
                    self.parse_postfix()?;
                    self.parse_binary_tail()?;
                }
                self.expect(Token::Semicolon).map(drop)
            }
            _ => {
                self.parse_expression()?;
                self.expect(Token::Semicolon).map(drop)
            }
        }
    }

    fn parse_expression(&mut self) -> Result<(), Error> {
        self.parse_unary()?;
        self.parse_binary_tail()
    }

    /// Operators are chained left to right without precedence.
    fn parse_binary_tail(&mut self) -> Result<(), Error> {
        while self.peek()?.token.is_binary_operator() {
            self.next()?;
            self.parse_unary()?;
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<(), Error> {
        if self.eat(Token::Bang)? || self.eat(Token::Minus)? {
            return self.parse_unary();
        }

        let lexeme = self.next()?;
        match lexeme.token {
            Token::Name(_) | Token::Literal(_) => {}
            Token::LeftParen => {
                self.parse_expression()?;
                self.expect(Token::RightParen)?;
            }
            _ => return Err(lexeme.unexpected("expression")),
        }
        self.parse_postfix()
    }

    /// Calls and member accesses following a primary expression.
    fn parse_postfix(&mut self) -> Result<(), Error> {
        loop {
            if self.eat(Token::LeftParen)? {
                if !self.check(Token::RightParen)? {
                    loop {
                        self.parse_expression()?;
                        if !self.eat(Token::Comma)? {
                            break;
                        }
                    }
                }
                self.expect(Token::RightParen)?;
            } else if self.eat(Token::Dot)? {
                self.parse_name()?;
            } else {
                return Ok(());
            }
        }
    }
}
