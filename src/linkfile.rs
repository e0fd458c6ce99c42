//! Textual description of programs, shaders and links.
//!
//! ```text
//! program line;
//! shader line_vert VERTEX_SHADER "line.vert";
//! shader line_frag FRAGMENT_SHADER "line.frag";
//! link line line_vert;
//! link line line_frag;
//! ```

use crate::{
    error::Error,
    lex::{Lexeme, Lexer, Token},
    registry::{Builder, SourceFile},
    types::ShaderKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Program {
        name: String,
    },
    Shader {
        name: String,
        kind: ShaderKind,
        file: String,
    },
    Link {
        program: String,
        shader: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFile {
    pub statements: Vec<Statement>,
}

impl LinkFile {
    /// Registers every statement with `builder`.
    pub fn apply(&self, builder: &mut Builder) {
        for statement in &self.statements {
            match statement {
                Statement::Program { name } => builder.add_program(name.as_str()),
                Statement::Shader { name, kind, file } => {
                    builder.add_shader(name.as_str(), *kind, file.as_str())
                }
                Statement::Link { program, shader } => {
                    builder.add_link(program.as_str(), shader.as_str())
                }
            };
        }
    }

    /// Ids of the files referenced by shader statements.
    pub fn shader_files(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Shader { file, .. } => Some(file.as_str()),
            _ => None,
        })
    }
}

fn error(lexeme: &Lexeme, message: impl Into<String>) -> Error {
    Error::LinkFile {
        location: lexeme.location(),
        message: message.into(),
    }
}

struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    fn expect_name(&mut self, what: &str) -> Result<String, Error> {
        let lexeme = self.lexer.next_token()?;
        match lexeme.token {
            Token::Name(name) => Ok(name.to_owned()),
            found => Err(error(&lexeme, format!("expected {what}, found {found}"))),
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<String, Error> {
        let lexeme = self.lexer.next_token()?;
        match lexeme.token {
            Token::Str(text) => Ok(text.to_owned()),
            found => Err(error(&lexeme, format!("expected {what}, found {found}"))),
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), Error> {
        let lexeme = self.lexer.next_token()?;
        match lexeme.token {
            Token::Semicolon => Ok(()),
            found => Err(error(&lexeme, format!("expected ';', found {found}"))),
        }
    }

    fn shader_kind(&mut self) -> Result<ShaderKind, Error> {
        let lexeme = self.lexer.next_token()?;
        match lexeme.token {
            Token::Name(word) => ShaderKind::from_keyword(word).ok_or_else(|| {
                error(
                    &lexeme,
                    format!(
                        "unknown shader type '{word}', expected {} or {}",
                        ShaderKind::Vertex.keyword(),
                        ShaderKind::Fragment.keyword()
                    ),
                )
            }),
            found => Err(error(&lexeme, format!("expected shader type, found {found}"))),
        }
    }

    fn statement(&mut self, directive: Lexeme) -> Result<Statement, Error> {
        let statement = match directive.token {
            Token::Name("program") => Statement::Program {
                name: self.expect_name("program name")?,
            },
            Token::Name("shader") => Statement::Shader {
                name: self.expect_name("shader name")?,
                kind: self.shader_kind()?,
                file: self.expect_string("file name")?,
            },
            Token::Name("link") => Statement::Link {
                program: self.expect_name("program name")?,
                shader: self.expect_name("shader name")?,
            },
            Token::Name(other) => {
                return Err(error(
                    &directive,
                    format!("unknown directive '{other}', expected 'program', 'shader' or 'link'"),
                ))
            }
            found => return Err(error(&directive, format!("expected a directive, found {found}"))),
        };
        self.expect_semicolon()?;
        Ok(statement)
    }
}

pub fn parse(file: &SourceFile) -> Result<LinkFile, Error> {
    let mut reader = Reader {
        lexer: Lexer::new(file),
    };
    let mut link_file = LinkFile::default();
    loop {
        let lexeme = reader.lexer.next_token()?;
        if lexeme.token == Token::Eof {
            break;
        }
        let statement = reader.statement(lexeme)?;
        trace!(?statement, "link file statement");
        link_file.statements.push(statement);
    }
    debug!(file = %file.id, statements = link_file.statements.len(), "read link file");
    Ok(link_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(source: &str) -> Result<LinkFile, Error> {
        parse(&SourceFile::new("shaders.link", source))
    }

    #[test]
    fn statements() {
        let link_file = read(
            "// programs\n\
             program line;\n\
             shader line_vert VERTEX_SHADER \"line.vert\";\n\
             shader line_frag FRAGMENT_SHADER \"shaders/line.frag\";\n\
             link line line_vert;\n",
        )
        .unwrap();
        assert_eq!(
            link_file.statements,
            [
                Statement::Program {
                    name: "line".to_owned()
                },
                Statement::Shader {
                    name: "line_vert".to_owned(),
                    kind: ShaderKind::Vertex,
                    file: "line.vert".to_owned()
                },
                Statement::Shader {
                    name: "line_frag".to_owned(),
                    kind: ShaderKind::Fragment,
                    file: "shaders/line.frag".to_owned()
                },
                Statement::Link {
                    program: "line".to_owned(),
                    shader: "line_vert".to_owned()
                },
            ]
        );
        assert_eq!(
            link_file.shader_files().collect::<Vec<_>>(),
            ["line.vert", "shaders/line.frag"]
        );
    }

    #[test]
    fn applied_to_builder() {
        let link_file = read("program p; shader s VERTEX_SHADER \"s.vert\"; link p s;").unwrap();
        let mut builder = Builder::new();
        builder.add_file("s.vert", "in vec3 p;");
        link_file.apply(&mut builder);
        let manifest = builder.finish().unwrap();
        assert_eq!(manifest.programs().len(), 1);
        assert_eq!(manifest.shaders()[0].kind, ShaderKind::Vertex);
        assert_eq!(manifest.links().len(), 1);
    }

    #[test]
    fn errors() {
        let cases = [
            ("program;", 1, 8),
            ("program p", 1, 10),
            ("shader s GEOMETRY_SHADER \"g\";", 1, 10),
            ("shader s VERTEX_SHADER s;", 1, 24),
            ("\n  attach p s;", 2, 3),
            ("; program p;", 1, 1),
        ];
        for (source, line, column) in cases {
            match read(source) {
                Err(Error::LinkFile { location, .. }) => {
                    assert_eq!((location.line, location.column), (line, column), "{source}")
                }
                other => panic!("{source}: unexpected result {other:?}"),
            }
        }

        assert!(matches!(
            read("shader s VERTEX_SHADER \"open;"),
            Err(Error::UnterminatedString { .. })
        ));
    }
}
