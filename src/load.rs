use std::path::Path;

use anyhow::Context;
use glsl_interface::{
    linkfile::{self, LinkFile},
    registry::{Builder, Manifest, SourceFile},
    Interface,
};

use crate::report;

pub fn read_link_file(path: &Path) -> anyhow::Result<LinkFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not open '{}'", path.display()))?;
    let file = SourceFile::new(path.display().to_string(), source);

    match linkfile::parse(&file) {
        Ok(link_file) => Ok(link_file),
        Err(error) => {
            report::emit_error(&error, Some(&file.contents))?;
            Err(anyhow::format_err!("could not parse link file: {path:?}"))
        }
    }
}

/// Registers every file below `root`, keyed by its `/`-separated relative path.
pub fn register_sources(root: &Path, builder: &mut Builder) -> anyhow::Result<usize> {
    let mut count = 0;

    let entries = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
    for entry in entries {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let id = file_id(root, path)?;
        let bytes =
            std::fs::read(path).with_context(|| format!("could not load source: {path:?}"))?;
        match String::from_utf8(bytes) {
            Ok(contents) => {
                trace!(%id, "registered source");
                builder.add_file(id, contents);
                count += 1;
            }
            Err(_) => warn!(?path, "skipping file that is not valid UTF-8"),
        }
    }

    Ok(count)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn file_id(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{path:?} is not inside {root:?}"))?;
    let components: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    Ok(components.join("/"))
}

pub fn load_manifest(link_path: &Path, root: &Path) -> anyhow::Result<Manifest> {
    let link_file = read_link_file(link_path)?;

    let mut builder = Builder::new();
    let count = register_sources(root, &mut builder)
        .with_context(|| format!("could not read sources in {root:?}"))?;
    debug!(count, root = %root.display(), "registered sources");
    link_file.apply(&mut builder);

    match builder.finish() {
        Ok(manifest) => Ok(manifest),
        Err(errors) => {
            report::emit_errors(errors.iter(), |_| None)?;
            Err(anyhow::format_err!("invalid link file: {link_path:?}"))
        }
    }
}

/// Writes the expanded source of every shader to `dir/<shader name>`.
pub fn write_expanded(
    dir: &Path,
    manifest: &Manifest,
    interface: &Interface,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("could not create {dir:?}"))?;
    for (shader, ast) in manifest.shaders().iter().zip(&interface.asts) {
        commit(&dir.join(&shader.name), &ast.expanded)?;
    }
    Ok(())
}

/// Writes `contents` unless the file already holds exactly that, so watchers
/// don't see spurious changes.
fn commit(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Ok(existing) = std::fs::read(path) {
        if existing == contents.as_bytes() {
            trace!(?path, "unchanged");
            return Ok(());
        }
    }
    std::fs::write(path, contents).with_context(|| format!("could not write {path:?}"))?;
    debug!(?path, "wrote expanded source");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_slash_separated() {
        let root = Path::new("assets");
        let path = root.join("shaders").join("line.vert");
        assert_eq!(file_id(root, &path).unwrap(), "shaders/line.vert");
        assert!(file_id(root, Path::new("elsewhere/x")).is_err());
    }
}
