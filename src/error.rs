use std::{error, fmt, ops::Range};

use crate::types::TypeExpr;

/// A position inside a registered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Id of the file the position points into.
    pub file: String,
    /// Byte range of the offending text.
    pub span: Range<usize>,
    /// 1-based line of `span.start`.
    pub line: usize,
    /// 1-based column (in bytes) of `span.start`.
    pub column: usize,
}

impl Location {
    pub fn new(file: &str, source: &str, span: Range<usize>) -> Location {
        let consumed = &source.as_bytes()[..span.start.min(source.len())];
        let line = 1 + consumed.iter().filter(|&&byte| byte == b'\n').count();
        let line_start = consumed
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |newline| newline + 1);
        Location {
            file: file.to_owned(),
            line,
            column: consumed.len() - line_start + 1,
            span,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    DuplicateFile(String),
    DuplicateProgram(String),
    DuplicateShader(String),
    DuplicateLink {
        program: String,
        shader: String,
    },
    MissingShaderFile {
        shader: String,
        file: String,
    },
    MissingLinkProgram {
        program: String,
        shader: String,
    },
    MissingLinkShader {
        program: String,
        shader: String,
    },

    UnexpectedCharacter {
        location: Location,
        character: char,
    },
    UnterminatedComment {
        location: Location,
    },
    UnterminatedString {
        location: Location,
    },

    UnexpectedToken {
        location: Location,
        expected: String,
        found: String,
    },
    UnknownDirective {
        location: Location,
        name: String,
    },
    MissingInclude {
        location: Location,
        file: String,
    },
    IncludeCycle {
        location: Location,
        file: String,
    },

    /// An interface block was used where a uniform's type belongs.
    BlockAsUniformType {
        location: Location,
        block: String,
    },
    IncompatibleTypes {
        program: String,
        name: String,
        first: TypeExpr,
        second: TypeExpr,
    },

    /// Malformed link file.
    LinkFile {
        location: Location,
        message: String,
    },
}

impl Error {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::UnexpectedCharacter { location, .. }
            | Error::UnterminatedComment { location }
            | Error::UnterminatedString { location }
            | Error::UnexpectedToken { location, .. }
            | Error::UnknownDirective { location, .. }
            | Error::MissingInclude { location, .. }
            | Error::IncludeCycle { location, .. }
            | Error::BlockAsUniformType { location, .. }
            | Error::LinkFile { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Short description attached to the highlighted source range.
    pub fn label(&self) -> String {
        match self {
            Error::UnexpectedToken { expected, .. } => format!("expected {expected}"),
            Error::UnexpectedCharacter { character, .. } => format!("{character:?}"),
            Error::UnterminatedComment { .. } => "comment starts here".to_owned(),
            Error::UnterminatedString { .. } => "string starts here".to_owned(),
            Error::IncludeCycle { file, .. } => format!("'{file}' is already being included"),
            Error::BlockAsUniformType { .. } => "interface block".to_owned(),
            _ => String::new(),
        }
    }

    /// Description of the error without its location.
    pub fn message(&self) -> String {
        match self {
            Error::DuplicateFile(id) => format!("multiple files '{id}' given"),
            Error::DuplicateProgram(name) => format!("multiple programs '{name}' given"),
            Error::DuplicateShader(name) => format!("multiple shaders '{name}' given"),
            Error::DuplicateLink { program, shader } => {
                format!("multiple links '{program} -> {shader}' given")
            }
            Error::MissingShaderFile { shader, file } => {
                format!("shader '{shader}' needs file '{file}' but it doesn't exist")
            }
            Error::MissingLinkProgram { program, shader } => {
                format!("in link '{program} -> {shader}': no such program '{program}'")
            }
            Error::MissingLinkShader { program, shader } => {
                format!("in link '{program} -> {shader}': no such shader '{shader}'")
            }
            Error::UnexpectedCharacter { character, .. } => {
                format!("failed to lex; initial character: {character:?}")
            }
            Error::UnterminatedComment { .. } => "unterminated block comment".to_owned(),
            Error::UnterminatedString { .. } => "unterminated string literal".to_owned(),
            Error::UnexpectedToken {
                expected, found, ..
            } => format!("expected {expected}, found {found}"),
            Error::UnknownDirective { name, .. } => {
                format!("unknown preprocessing directive '{name}'")
            }
            Error::MissingInclude { file, .. } => format!("included file '{file}' does not exist"),
            Error::IncludeCycle { file, .. } => format!("file '{file}' includes itself"),
            Error::BlockAsUniformType { block, .. } => {
                format!("interface block '{block}' cannot be used as the type of a uniform")
            }
            Error::IncompatibleTypes {
                program,
                name,
                first,
                second,
            } => format!(
                "incompatible types for '{name}' in program '{program}': {first} and {second}"
            ),
            Error::LinkFile { message, .. } => message.clone(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{location}: {}", self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

impl error::Error for Error {}

/// All errors collected over one processing run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Errors(pub Vec<Error>);

impl Errors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// `Ok(value)` if nothing was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Errors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Errors(vec![error])
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i != 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl error::Error for Errors {}
