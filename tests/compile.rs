use glsl_interface::{
    error::Error,
    registry::{Builder, Manifest},
    resolve::ProgramBinding,
    types::{ShaderKind, TypeExpr},
};

const LINE_VERT: &str = "uniform mat4 mvp; in vec2 pos; void main(){}";
const LINE_FRAG: &str = "uniform vec4 color; void main(){}";

fn lines_and_circles() -> Manifest {
    let mut builder = Builder::new();
    builder
        .add_file("line.vert", LINE_VERT)
        .add_file("line.frag", LINE_FRAG)
        .add_program("line")
        .add_program("circle")
        .add_shader("line_vert", ShaderKind::Vertex, "line.vert")
        .add_shader("line_frag", ShaderKind::Fragment, "line.frag")
        .add_link("line", "line_vert")
        .add_link("line", "line_frag");
    builder.finish().unwrap()
}

fn binding(manifest: &Manifest, program: &str, ty: TypeExpr, name: &str) -> ProgramBinding {
    ProgramBinding {
        program: manifest.program_index(program).unwrap(),
        ty,
        name: name.to_owned(),
    }
}

/// Bindings keyed by program name, so manifests with different indices compare.
fn named(manifest: &Manifest, bindings: &[ProgramBinding]) -> Vec<(String, TypeExpr, String)> {
    bindings
        .iter()
        .map(|binding| {
            (
                manifest.programs()[binding.program].name.clone(),
                binding.ty,
                binding.name.clone(),
            )
        })
        .collect()
}

#[test]
fn end_to_end() {
    let manifest = lines_and_circles();
    let interface = glsl_interface::compile(&manifest).unwrap();

    assert_eq!(
        interface.uniforms,
        [
            binding(&manifest, "line", TypeExpr::Vec4, "color"),
            binding(&manifest, "line", TypeExpr::Mat4, "mvp"),
        ]
    );
    assert_eq!(
        interface.attributes,
        [binding(&manifest, "line", TypeExpr::Vec2, "pos")]
    );

    let circle = manifest.program_index("circle").unwrap();
    assert_eq!(interface.program_uniforms(circle).count(), 0);
    assert_eq!(interface.program_attributes(circle).count(), 0);
}

#[test]
fn included_declarations_come_first() {
    let mut builder = Builder::new();
    builder
        .add_file("a.frag", "#include \"b.glsl\"\nuniform float y;\n")
        .add_file("b.glsl", "uniform float x;\n")
        .add_program("p")
        .add_shader("a", ShaderKind::Fragment, "a.frag")
        .add_link("p", "a");
    let manifest = builder.finish().unwrap();

    let interface = glsl_interface::compile(&manifest).unwrap();
    let ast = &interface.asts[manifest.shader_index("a").unwrap()];
    let uniforms: Vec<_> = ast
        .uniforms()
        .map(|uniform| (uniform.ty, uniform.name.as_str()))
        .collect();
    assert_eq!(uniforms, [(TypeExpr::Float, "x"), (TypeExpr::Float, "y")]);
    assert!(!ast.expanded.contains("#include"));
}

#[test]
fn compiling_twice_gives_identical_output() {
    let manifest = lines_and_circles();
    let first = glsl_interface::compile(&manifest).unwrap();
    let second = glsl_interface::compile(&manifest).unwrap();
    assert_eq!(first, second);
}

#[test]
fn registration_order_does_not_matter() {
    let forward = lines_and_circles();

    let mut builder = Builder::new();
    builder
        .add_link("line", "line_frag")
        .add_link("line", "line_vert")
        .add_shader("line_frag", ShaderKind::Fragment, "line.frag")
        .add_shader("line_vert", ShaderKind::Vertex, "line.vert")
        .add_program("circle")
        .add_program("line")
        .add_file("line.frag", LINE_FRAG)
        .add_file("line.vert", LINE_VERT);
    let reversed = builder.finish().unwrap();

    let a = glsl_interface::compile(&forward).unwrap();
    let b = glsl_interface::compile(&reversed).unwrap();
    assert_eq!(named(&forward, &a.uniforms), named(&reversed, &b.uniforms));
    assert_eq!(
        named(&forward, &a.attributes),
        named(&reversed, &b.attributes)
    );
}

#[test]
fn conflicting_types_name_program_and_symbol() {
    let mut builder = Builder::new();
    builder
        .add_file("s1.vert", "uniform float x; void main() {}")
        .add_file("s2.frag", "uniform int x; void main() {}")
        .add_program("P")
        .add_shader("s1", ShaderKind::Vertex, "s1.vert")
        .add_shader("s2", ShaderKind::Fragment, "s2.frag")
        .add_link("P", "s1")
        .add_link("P", "s2");
    let manifest = builder.finish().unwrap();

    let errors = glsl_interface::compile(&manifest).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors.0[0] {
        Error::IncompatibleTypes { program, name, .. } => {
            assert_eq!(program, "P");
            assert_eq!(name, "x");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn only_vertex_inputs_are_attributes() {
    let mut builder = Builder::new();
    builder
        .add_file("v.vert", "in vec2 pos; out vec4 color; void main() {}")
        .add_file("f.frag", "in vec4 color; out vec4 frag; void main() {}")
        .add_program("P")
        .add_shader("v", ShaderKind::Vertex, "v.vert")
        .add_shader("f", ShaderKind::Fragment, "f.frag")
        .add_link("P", "v")
        .add_link("P", "f");
    let manifest = builder.finish().unwrap();

    let interface = glsl_interface::compile(&manifest).unwrap();
    assert_eq!(
        interface.attributes,
        [binding(&manifest, "P", TypeExpr::Vec2, "pos")]
    );
}

#[test]
fn interface_block_uniform_is_rejected() {
    let mut builder = Builder::new();
    builder
        .add_file("s.frag", "uniform Foo { float x; } y;")
        .add_program("P")
        .add_shader("s", ShaderKind::Fragment, "s.frag")
        .add_link("P", "s");
    let manifest = builder.finish().unwrap();

    let errors = glsl_interface::compile(&manifest).unwrap_err();
    assert!(matches!(
        &errors.0[..],
        [Error::BlockAsUniformType { block, .. }] if block == "Foo"
    ));
}

#[test]
fn errors_of_every_shader_are_collected() {
    let mut builder = Builder::new();
    builder
        .add_file("a.vert", "uniform float;")
        .add_file("b.frag", "#include \"nowhere.glsl\"\n")
        .add_file("c.frag", "uniform vec3 ok; void main() {}")
        .add_program("P")
        .add_shader("a", ShaderKind::Vertex, "a.vert")
        .add_shader("b", ShaderKind::Fragment, "b.frag")
        .add_shader("c", ShaderKind::Fragment, "c.frag")
        .add_link("P", "a")
        .add_link("P", "b")
        .add_link("P", "c");
    let manifest = builder.finish().unwrap();

    let errors = glsl_interface::compile(&manifest).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        errors.0[0],
        Error::UnexpectedToken { ref location, .. } if location.file == "a.vert"
    ));
    assert!(matches!(
        errors.0[1],
        Error::MissingInclude { ref file, .. } if file == "nowhere.glsl"
    ));
}
