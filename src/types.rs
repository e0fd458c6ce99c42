use std::fmt;

/// The closed set of types understood by the interface compiler.
///
/// The declaration order is significant: downstream generators use it as the
/// numeric identity of each type, so new variants may only be appended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeExpr {
    Bool,
    Int,
    Uint,
    Float,
    Double,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
}

impl TypeExpr {
    pub const ALL: [TypeExpr; 12] = [
        TypeExpr::Bool,
        TypeExpr::Int,
        TypeExpr::Uint,
        TypeExpr::Float,
        TypeExpr::Double,
        TypeExpr::Vec2,
        TypeExpr::Vec3,
        TypeExpr::Vec4,
        TypeExpr::Mat2,
        TypeExpr::Mat3,
        TypeExpr::Mat4,
        TypeExpr::Sampler2D,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TypeExpr::Bool => "bool",
            TypeExpr::Int => "int",
            TypeExpr::Uint => "uint",
            TypeExpr::Float => "float",
            TypeExpr::Double => "double",
            TypeExpr::Vec2 => "vec2",
            TypeExpr::Vec3 => "vec3",
            TypeExpr::Vec4 => "vec4",
            TypeExpr::Mat2 => "mat2",
            TypeExpr::Mat3 => "mat3",
            TypeExpr::Mat4 => "mat4",
            TypeExpr::Sampler2D => "sampler2D",
        }
    }

    pub fn from_keyword(word: &str) -> Option<TypeExpr> {
        Self::ALL.into_iter().find(|ty| ty.keyword() == word)
    }

    /// Position in the keyword table.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Return type of a function: one of the closed types, or `void`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(TypeExpr),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("void"),
            ReturnType::Type(ty) => ty.fmt(f),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    /// Keyword used for the kind in link files.
    pub fn keyword(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "VERTEX_SHADER",
            ShaderKind::Fragment => "FRAGMENT_SHADER",
        }
    }

    pub fn from_keyword(word: &str) -> Option<ShaderKind> {
        [ShaderKind::Vertex, ShaderKind::Fragment]
            .into_iter()
            .find(|kind| kind.keyword() == word)
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShaderKind::Vertex => f.write_str("vertex"),
            ShaderKind::Fragment => f.write_str("fragment"),
        }
    }
}
