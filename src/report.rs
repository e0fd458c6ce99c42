use std::io::Write;

use glsl_interface::{error::Error, registry::Manifest, Interface};

/// Renders `errors` to stderr, quoting the offending source where known.
pub fn emit_errors<'s>(
    errors: impl IntoIterator<Item = &'s Error>,
    source_of: impl Fn(&str) -> Option<&'s str>,
) -> anyhow::Result<()> {
    for error in errors {
        let source = error.location().and_then(|location| source_of(&location.file));
        emit_error(error, source)?;
    }
    Ok(())
}

pub fn emit_error(error: &Error, source: Option<&str>) -> anyhow::Result<()> {
    use codespan_reporting::{
        diagnostic::{Diagnostic, Label},
        files::SimpleFile,
        term,
    };

    let config = term::Config::default();
    let mut writer = term::termcolor::Ansi::new(std::io::stderr());

    let diagnostic = Diagnostic::error().with_message(error.message());

    match (error.location(), source) {
        (Some(location), Some(source)) => {
            let files = SimpleFile::new(location.file.as_str(), source);
            let diagnostic = diagnostic.with_labels(vec![
                Label::primary((), location.span.clone()).with_message(error.label())
            ]);
            term::emit(&mut writer, &config, &files, &diagnostic)?;
        }
        (location, _) => {
            let files = SimpleFile::new("", "");
            let diagnostic = match location {
                Some(location) => diagnostic.with_notes(vec![format!("at {location}")]),
                None => diagnostic,
            };
            term::emit(&mut writer, &config, &files, &diagnostic)?;
        }
    }

    Ok(())
}

/// Prints the uniforms and attributes of every program to stdout.
pub fn print_interface(manifest: &Manifest, interface: &Interface) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (index, program) in manifest.programs().iter().enumerate() {
        writeln!(out, "program {}", program.name)?;
        for uniform in interface.program_uniforms(index) {
            writeln!(out, "    uniform {} {}", uniform.ty, uniform.name)?;
        }
        for attribute in interface.program_attributes(index) {
            writeln!(out, "    attribute {} {}", attribute.ty, attribute.name)?;
        }
    }

    out.flush()?;
    Ok(())
}
