use crate::types::{ReturnType, TypeExpr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub ty: TypeExpr,
    pub name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub direction: Direction,
    /// Declared with the `flat` interpolation qualifier.
    pub flat: bool,
    pub ty: TypeExpr,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub ty: TypeExpr,
    pub name: String,
}

/// Name, return type and arguments of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub return_type: ReturnType,
    pub arguments: Vec<Argument>,
}

/// A top-level item of a shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Uniform(UniformDecl),
    Variable(VariableDecl),
    /// Prototype without a body.
    FuncDecl(Signature),
    /// Function with a body. The body is checked for syntax but not kept.
    FuncDefn(Signature),
}

/// Everything parsed from one shader, includes inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFileAst {
    pub declarations: Vec<Declaration>,
    /// Source of the shader with includes inlined and directives removed.
    pub expanded: String,
}

impl ShaderFileAst {
    pub fn uniforms(&self) -> impl Iterator<Item = &UniformDecl> {
        self.declarations.iter().filter_map(|declaration| match declaration {
            Declaration::Uniform(uniform) => Some(uniform),
            _ => None,
        })
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDecl> {
        self.declarations.iter().filter_map(|declaration| match declaration {
            Declaration::Variable(variable) => Some(variable),
            _ => None,
        })
    }
}
