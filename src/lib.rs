//! Extracts the externally visible interface of GLSL shader programs.
//!
//! Shaders are registered together with the programs they are linked into
//! (see [`registry`] and [`linkfile`]). Each shader is preprocessed and parsed
//! into its top-level declarations, and the declarations of all shaders linked
//! into a program are merged into one sorted, type-checked list of uniforms
//! and vertex attributes per program.
//!
//! ```
//! use glsl_interface::{registry::Builder, types::{ShaderKind, TypeExpr}};
//!
//! let mut builder = Builder::new();
//! builder
//!     .add_file("line.vert", "uniform mat4 mvp; in vec2 pos; void main() {}")
//!     .add_program("line")
//!     .add_shader("line_vert", ShaderKind::Vertex, "line.vert")
//!     .add_link("line", "line_vert");
//! let manifest = builder.finish().unwrap();
//!
//! let interface = glsl_interface::compile(&manifest).unwrap();
//! assert_eq!(interface.uniforms[0].ty, TypeExpr::Mat4);
//! assert_eq!(interface.attributes[0].name, "pos");
//! ```

#[macro_use]
extern crate tracing;

pub mod ast;
pub mod error;
pub mod lex;
pub mod linkfile;
pub mod parse;
pub mod preprocess;
pub mod registry;
pub mod resolve;
pub mod types;

use ast::ShaderFileAst;
use error::{Error, Errors};
use registry::Manifest;
use resolve::{ProgramAttribute, ProgramUniform};

/// State of one processing run.
pub struct Context<'a> {
    manifest: &'a Manifest,
    /// Shader being parsed, as an index into [`Manifest::shaders`].
    current_shader: usize,
    asts: Vec<ShaderFileAst>,
}

impl<'a> Context<'a> {
    pub fn new(manifest: &'a Manifest) -> Context<'a> {
        Context {
            manifest,
            current_shader: 0,
            asts: Vec::with_capacity(manifest.shaders().len()),
        }
    }

    pub fn current_shader(&self) -> usize {
        self.current_shader
    }

    /// Parses the next shader in manifest order. Returns `false` once every
    /// shader has been parsed.
    pub fn parse_next(&mut self) -> Result<bool, Error> {
        let manifest = self.manifest;
        let index = self.asts.len();
        let Some(shader) = manifest.shaders().get(index) else {
            return Ok(false);
        };
        self.current_shader = index;

        let _span = debug_span!("shader", name = %shader.name).entered();
        let file = manifest
            .file(&shader.file)
            .ok_or_else(|| Error::MissingShaderFile {
                shader: shader.name.clone(),
                file: shader.file.clone(),
            })?;

        let ast = parse::parse_shader(manifest, file)?;
        debug!(
            declarations = ast.declarations.len(),
            expanded = ast.expanded.len(),
            "parsed shader"
        );
        self.asts.push(ast);
        Ok(true)
    }

    /// Parses every shader, collecting the errors of all of them.
    pub fn parse_all(&mut self) -> Result<(), Errors> {
        let mut errors = Vec::new();
        loop {
            match self.parse_next() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    debug!(shader = self.current_shader, %error, "shader failed to parse");
                    errors.push(error);
                    // keep indices aligned so the remaining shaders still get parsed
                    self.asts.push(ShaderFileAst {
                        declarations: Vec::new(),
                        expanded: String::new(),
                    });
                }
            }
        }
        Errors(errors).into_result(())
    }

    pub fn asts(&self) -> &[ShaderFileAst] {
        &self.asts
    }

    /// Resolves the parsed shaders into program interfaces.
    pub fn finish(self) -> Result<Interface, Errors> {
        let resolved = resolve::resolve(self.manifest, &self.asts)?;
        Ok(Interface {
            asts: self.asts,
            uniforms: resolved.uniforms,
            attributes: resolved.attributes,
        })
    }
}

/// The resolved interface of every program in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Parsed shaders, indexed like [`Manifest::shaders`].
    pub asts: Vec<ShaderFileAst>,
    pub uniforms: Vec<ProgramUniform>,
    pub attributes: Vec<ProgramAttribute>,
}

impl Interface {
    pub fn program_uniforms(&self, program: usize) -> impl Iterator<Item = &ProgramUniform> {
        self.uniforms.iter().filter(move |uniform| uniform.program == program)
    }

    pub fn program_attributes(&self, program: usize) -> impl Iterator<Item = &ProgramAttribute> {
        self.attributes
            .iter()
            .filter(move |attribute| attribute.program == program)
    }
}

/// Parses every shader of `manifest` and resolves the program interfaces.
pub fn compile(manifest: &Manifest) -> Result<Interface, Errors> {
    let mut context = Context::new(manifest);
    context.parse_all()?;
    let interface = context.finish()?;
    info!(
        programs = manifest.programs().len(),
        shaders = manifest.shaders().len(),
        uniforms = interface.uniforms.len(),
        attributes = interface.attributes.len(),
        "compiled shader interface"
    );
    Ok(interface)
}
