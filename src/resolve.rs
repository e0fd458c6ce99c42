//! Merges the declarations of linked shaders into per-program bindings.

use crate::{
    ast::{Direction, ShaderFileAst},
    error::{Error, Errors},
    registry::Manifest,
    types::{ShaderKind, TypeExpr},
};

/// A uniform or attribute visible to a program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramBinding {
    /// Index into [`Manifest::programs`].
    pub program: usize,
    pub ty: TypeExpr,
    pub name: String,
}

pub type ProgramUniform = ProgramBinding;
pub type ProgramAttribute = ProgramBinding;

/// Output of the resolver, sorted by program index and then by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub uniforms: Vec<ProgramUniform>,
    pub attributes: Vec<ProgramAttribute>,
}

/// Collects the uniforms and attributes of every program.
///
/// `asts` is indexed like [`Manifest::shaders`]; shaders without an AST
/// contribute nothing. Uniforms come from every linked shader, attributes only
/// from `in` variables of vertex shaders.
pub fn resolve(manifest: &Manifest, asts: &[ShaderFileAst]) -> Result<Resolved, Errors> {
    let mut uniforms = Vec::new();
    let mut attributes = Vec::new();

    for (shader, (decl, ast)) in manifest.shaders().iter().zip(asts).enumerate() {
        let is_vertex = decl.kind == ShaderKind::Vertex;
        for program in manifest.programs_of(shader) {
            uniforms.extend(ast.uniforms().map(|uniform| ProgramBinding {
                program,
                ty: uniform.ty,
                name: uniform.name.clone(),
            }));

            if is_vertex {
                attributes.extend(
                    ast.variables()
                        .filter(|variable| variable.direction == Direction::In)
                        .map(|variable| ProgramBinding {
                            program,
                            ty: variable.ty,
                            name: variable.name.clone(),
                        }),
                );
            }
        }
    }

    let mut errors = Vec::new();
    let uniforms = merge(manifest, uniforms, &mut errors);
    let attributes = merge(manifest, attributes, &mut errors);
    debug!(
        uniforms = uniforms.len(),
        attributes = attributes.len(),
        "resolved program interfaces"
    );

    Errors(errors).into_result(Resolved {
        uniforms,
        attributes,
    })
}

/// Sorts candidates and collapses duplicates, which must agree on their type.
fn merge(
    manifest: &Manifest,
    mut candidates: Vec<ProgramBinding>,
    errors: &mut Vec<Error>,
) -> Vec<ProgramBinding> {
    candidates.sort_by(|a, b| (a.program, &a.name).cmp(&(b.program, &b.name)));

    let mut merged: Vec<ProgramBinding> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.last() {
            Some(last) if last.program == candidate.program && last.name == candidate.name => {
                if last.ty != candidate.ty {
                    errors.push(Error::IncompatibleTypes {
                        program: manifest.programs()[candidate.program].name.clone(),
                        name: candidate.name,
                        first: last.ty,
                        second: candidate.ty,
                    });
                }
            }
            _ => merged.push(candidate),
        }
    }
    merged
}
