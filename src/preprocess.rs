//! `#include` and `#version` handling on top of the [`Lexer`].
//!
//! The preprocessor keeps a stack of open files. Tokens are always drawn from
//! the file on top of the stack; `#include "id"` pushes the named file and
//! reaching the end of a file pops it again, so the parser sees one
//! continuous token stream for the whole shader.
//!
//! While doing so it copies the text it walks over into an output buffer,
//! leaving out the directive lines themselves. The result is the expanded
//! source of the shader with every include inlined in place.

use crate::{
    error::Error,
    lex::{Lexeme, Lexer, Token},
    registry::{Manifest, SourceFile},
};

/// Read state of one open file.
struct Cursor<'a> {
    lexer: Lexer<'a>,
    /// Everything before this offset has been copied to the output, or elided.
    flushed: usize,
    /// Set while a directive is being read; nothing is copied in that state.
    suspended: bool,
}

impl<'a> Cursor<'a> {
    fn new(file: &'a SourceFile) -> Cursor<'a> {
        Cursor {
            lexer: Lexer::new(file),
            flushed: 0,
            suspended: false,
        }
    }

    fn flush(&mut self, output: &mut String, upto: usize) {
        if self.suspended {
            return;
        }
        output.push_str(&self.lexer.file().contents[self.flushed..upto]);
        self.flushed = upto;
    }

    /// Ends a directive, dropping its text from the output.
    fn resume(&mut self, upto: usize) {
        self.suspended = false;
        self.flushed = upto;
    }
}

pub struct Preprocessor<'a> {
    manifest: &'a Manifest,
    stack: Vec<Cursor<'a>>,
    output: String,
    /// Last token handed out, kept around so end of file can still be located.
    last: Lexeme<'a>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(manifest: &'a Manifest, file: &'a SourceFile) -> Preprocessor<'a> {
        Preprocessor {
            manifest,
            stack: vec![Cursor::new(file)],
            output: String::with_capacity(file.size()),
            last: Lexeme {
                token: Token::Eof,
                file,
                start: 0,
                end: 0,
            },
        }
    }

    /// Number of files currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Next token of the logical stream, crossing file boundaries.
    pub fn next_token(&mut self) -> Result<Lexeme<'a>, Error> {
        loop {
            let Some(cursor) = self.stack.last_mut() else {
                return Ok(self.last);
            };

            let lexeme = cursor.lexer.next_token()?;
            match lexeme.token {
                Token::Eof => {
                    let end = lexeme.file.size();
                    cursor.flush(&mut self.output, end);
                    self.stack.pop();
                    debug!(file = %lexeme.file.id, depth = self.stack.len(), "leaving file");
                    if self.stack.is_empty() {
                        self.last = lexeme;
                        return Ok(lexeme);
                    }
                    self.separate();
                }
                Token::Hash => {
                    cursor.flush(&mut self.output, lexeme.start);
                    cursor.suspended = true;
                    let include = self.directive()?;
                    self.separate();
                    if let Some(file) = include {
                        self.enter(file, lexeme)?;
                    }
                }
                _ => {
                    self.last = lexeme;
                    return Ok(lexeme);
                }
            }
        }
    }

    /// Ends the output with whitespace, so text joined across a file boundary
    /// or an elided directive still lexes as separate tokens.
    fn separate(&mut self) {
        if matches!(self.output.as_bytes().last(), Some(&byte) if byte > 32) {
            self.output.push('\n');
        }
    }

    /// Reads the rest of a directive. Returns the file to include, if any.
    fn directive(&mut self) -> Result<Option<&'a SourceFile>, Error> {
        let manifest = self.manifest;
        let Some(cursor) = self.stack.last_mut() else {
            return Ok(None);
        };

        let name = cursor.lexer.next_token()?;
        match name.token {
            Token::Name("include") => {
                let argument = cursor.lexer.next_token()?;
                let Token::Str(id) = argument.token else {
                    return Err(argument.unexpected("file name string"));
                };
                let file = manifest.file(id).ok_or_else(|| Error::MissingInclude {
                    location: argument.location(),
                    file: id.to_owned(),
                })?;
                cursor.resume(argument.end);
                Ok(Some(file))
            }
            Token::Name("version") => {
                let argument = cursor.lexer.next_token()?;
                let Token::Literal(version) = argument.token else {
                    return Err(argument.unexpected("version number"));
                };
                trace!(version, "version directive");
                cursor.resume(argument.end);
                Ok(None)
            }
            Token::Name(other) => Err(Error::UnknownDirective {
                location: name.location(),
                name: other.to_owned(),
            }),
            _ => Err(name.unexpected("preprocessing directive")),
        }
    }

    fn enter(&mut self, file: &'a SourceFile, directive: Lexeme<'a>) -> Result<(), Error> {
        if self.stack.iter().any(|cursor| cursor.lexer.file().id == file.id) {
            return Err(Error::IncludeCycle {
                location: directive.location(),
                file: file.id.clone(),
            });
        }
        debug!(file = %file.id, from = %directive.file.id, "entering file");
        self.stack.push(Cursor::new(file));
        Ok(())
    }

    /// The expanded source text produced so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn into_output(self) -> String {
        self.output
    }
}
