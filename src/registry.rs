//! Registration of programs, shaders, source files and the links between
//! them.
//!
//! Entities are collected in a [`Builder`] in any order. [`Builder::finish`]
//! sorts and validates them into an immutable [`Manifest`], which is what the
//! rest of the crate works with. Indices into the manifest tables are stable
//! for the whole run and do not depend on registration order.

use crate::{
    error::{Error, Errors},
    types::ShaderKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(id: impl Into<String>, contents: impl Into<String>) -> SourceFile {
        SourceFile {
            id: id.into(),
            contents: contents.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.contents.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDecl {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderDecl {
    pub name: String,
    pub kind: ShaderKind,
    /// Id of the source file backing the shader.
    pub file: String,
}

/// Association of a program with a shader, by manifest index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinkEdge {
    pub program: usize,
    pub shader: usize,
}

#[derive(Debug, Default)]
pub struct Builder {
    files: Vec<SourceFile>,
    programs: Vec<ProgramDecl>,
    shaders: Vec<ShaderDecl>,
    links: Vec<(String, String)>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn add_file(&mut self, id: impl Into<String>, contents: impl Into<String>) -> &mut Self {
        self.files.push(SourceFile::new(id, contents));
        self
    }

    pub fn add_program(&mut self, name: impl Into<String>) -> &mut Self {
        self.programs.push(ProgramDecl { name: name.into() });
        self
    }

    pub fn add_shader(
        &mut self,
        name: impl Into<String>,
        kind: ShaderKind,
        file: impl Into<String>,
    ) -> &mut Self {
        self.shaders.push(ShaderDecl {
            name: name.into(),
            kind,
            file: file.into(),
        });
        self
    }

    pub fn add_link(&mut self, program: impl Into<String>, shader: impl Into<String>) -> &mut Self {
        self.links.push((program.into(), shader.into()));
        self
    }

    /// Validates uniqueness and references, reporting every problem found.
    pub fn finish(self) -> Result<Manifest, Errors> {
        let Builder {
            mut files,
            mut programs,
            mut shaders,
            links,
        } = self;

        files.sort_by(|a, b| a.id.cmp(&b.id));
        programs.sort_by(|a, b| a.name.cmp(&b.name));
        shaders.sort_by(|a, b| a.name.cmp(&b.name));

        let mut errors = Vec::new();

        errors.extend(
            files
                .windows(2)
                .filter(|pair| pair[0].id == pair[1].id)
                .map(|pair| Error::DuplicateFile(pair[1].id.clone())),
        );
        errors.extend(
            programs
                .windows(2)
                .filter(|pair| pair[0].name == pair[1].name)
                .map(|pair| Error::DuplicateProgram(pair[1].name.clone())),
        );
        errors.extend(
            shaders
                .windows(2)
                .filter(|pair| pair[0].name == pair[1].name)
                .map(|pair| Error::DuplicateShader(pair[1].name.clone())),
        );

        for shader in &shaders {
            if files.binary_search_by(|f| f.id.as_str().cmp(&shader.file)).is_err() {
                errors.push(Error::MissingShaderFile {
                    shader: shader.name.clone(),
                    file: shader.file.clone(),
                });
            }
        }

        let mut edges = Vec::with_capacity(links.len());
        for (program, shader) in links {
            let program_index = programs.binary_search_by(|p| p.name.cmp(&program));
            let shader_index = shaders.binary_search_by(|s| s.name.cmp(&shader));
            match (program_index, shader_index) {
                (Ok(program_index), Ok(shader_index)) => edges.push((
                    LinkEdge {
                        program: program_index,
                        shader: shader_index,
                    },
                    program,
                    shader,
                )),
                (Err(_), _) => errors.push(Error::MissingLinkProgram { program, shader }),
                (_, Err(_)) => errors.push(Error::MissingLinkShader { program, shader }),
            }
        }

        edges.sort_by_key(|(edge, _, _)| *edge);
        errors.extend(
            edges
                .windows(2)
                .filter(|pair| pair[0].0 == pair[1].0)
                .map(|pair| Error::DuplicateLink {
                    program: pair[1].1.clone(),
                    shader: pair[1].2.clone(),
                }),
        );

        let manifest = Manifest {
            files,
            programs,
            shaders,
            links: edges.into_iter().map(|(edge, _, _)| edge).collect(),
        };
        Errors(errors).into_result(manifest)
    }
}

/// The validated, read-only description of everything to process.
#[derive(Debug, Clone)]
pub struct Manifest {
    files: Vec<SourceFile>,
    programs: Vec<ProgramDecl>,
    shaders: Vec<ShaderDecl>,
    links: Vec<LinkEdge>,
}

impl Manifest {
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn programs(&self) -> &[ProgramDecl] {
        &self.programs
    }

    pub fn shaders(&self) -> &[ShaderDecl] {
        &self.shaders
    }

    pub fn links(&self) -> &[LinkEdge] {
        &self.links
    }

    pub fn file(&self, id: &str) -> Option<&SourceFile> {
        self.file_index(id).map(|index| &self.files[index])
    }

    pub fn file_index(&self, id: &str) -> Option<usize> {
        self.files
            .binary_search_by(|file| file.id.as_str().cmp(id))
            .ok()
    }

    pub fn program_index(&self, name: &str) -> Option<usize> {
        self.programs
            .binary_search_by(|program| program.name.as_str().cmp(name))
            .ok()
    }

    pub fn shader_index(&self, name: &str) -> Option<usize> {
        self.shaders
            .binary_search_by(|shader| shader.name.as_str().cmp(name))
            .ok()
    }

    /// Programs the shader at `shader` is linked into.
    pub fn programs_of(&self, shader: usize) -> impl Iterator<Item = usize> + '_ {
        self.links
            .iter()
            .filter(move |link| link.shader == shader)
            .map(|link| link.program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_do_not_depend_on_registration_order() {
        let mut builder = Builder::new();
        builder
            .add_file("line.vert", "")
            .add_program("line")
            .add_program("circle")
            .add_shader("line_vert", ShaderKind::Vertex, "line.vert")
            .add_link("line", "line_vert");
        let manifest = builder.finish().unwrap();

        assert_eq!(manifest.programs()[0].name, "circle");
        assert_eq!(manifest.program_index("line"), Some(1));
        assert_eq!(
            manifest.links(),
            &[LinkEdge {
                program: 1,
                shader: 0
            }]
        );
        assert_eq!(manifest.programs_of(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(manifest.file("line.vert").map(SourceFile::size), Some(0));
        assert_eq!(manifest.file_index("line.frag"), None);
    }

    #[test]
    fn duplicates_are_reported() {
        let mut builder = Builder::new();
        builder
            .add_file("a", "")
            .add_file("a", "")
            .add_program("p")
            .add_program("p")
            .add_shader("s", ShaderKind::Fragment, "a")
            .add_shader("s", ShaderKind::Vertex, "a")
            .add_link("p", "s")
            .add_link("p", "s");
        let errors = builder.finish().unwrap_err();

        assert!(errors.iter().any(|e| matches!(e, Error::DuplicateFile(id) if id == "a")));
        assert!(errors.iter().any(|e| matches!(e, Error::DuplicateProgram(name) if name == "p")));
        assert!(errors.iter().any(|e| matches!(e, Error::DuplicateShader(name) if name == "s")));
        assert!(errors.iter().any(|e| matches!(e, Error::DuplicateLink { .. })));
    }

    #[test]
    fn dangling_references_are_reported() {
        let mut builder = Builder::new();
        builder
            .add_program("p")
            .add_shader("s", ShaderKind::Vertex, "missing.vert")
            .add_link("q", "s")
            .add_link("p", "t");
        let errors = builder.finish().unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|e| matches!(e, Error::MissingShaderFile { file, .. } if file == "missing.vert")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, Error::MissingLinkProgram { program, .. } if program == "q")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, Error::MissingLinkShader { shader, .. } if shader == "t")));
    }
}
