mod load;
mod report;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::Parser;

#[macro_use]
extern crate tracing;

/// Extracts the uniforms and vertex attributes of linked GLSL programs.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Options {
    /// Link file declaring the programs, shaders and links
    link_file: PathBuf,

    /// Directory whose files are registered as shader sources
    /// [default: directory of the link file]
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Write the expanded source of every shader into this directory
    #[arg(long, value_name = "DIR")]
    expanded: Option<PathBuf>,

    /// Keep running and process again whenever a source changes
    #[arg(long)]
    watch: bool,
}

impl Options {
    fn root(&self) -> PathBuf {
        self.root
            .clone()
            .or_else(|| self.link_file.parent().map(Path::to_path_buf))
            .filter(|root| !root.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("glsl_interface=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options::parse();
    let root = options.root();

    if options.watch {
        return watch(&options, &root);
    }

    run(&options, &root)
}

fn run(options: &Options, root: &Path) -> anyhow::Result<()> {
    let manifest = load::load_manifest(&options.link_file, root)?;

    let interface = match glsl_interface::compile(&manifest) {
        Ok(interface) => interface,
        Err(errors) => {
            report::emit_errors(errors.iter(), |id| {
                manifest.file(id).map(|file| file.contents.as_str())
            })?;
            return Err(anyhow::format_err!(
                "could not compile shaders: {} error(s)",
                errors.len()
            ));
        }
    };

    report::print_interface(&manifest, &interface)?;

    if let Some(dir) = &options.expanded {
        load::write_expanded(dir, &manifest, &interface)
            .context("could not write expanded sources")?;
    }

    Ok(())
}

fn watch(options: &Options, root: &Path) -> anyhow::Result<()> {
    use notify::Watcher;

    let (sender, receiver) = std::sync::mpsc::channel();
    let debounce = Duration::from_millis(200);

    // keep the watcher alive for as long as we read events, otherwise the channel is closed
    let mut watcher =
        notify::PollWatcher::new(sender, debounce).context("could not start file watcher")?;
    watcher
        .watch(root, notify::RecursiveMode::Recursive)
        .with_context(|| format!("could not watch {root:?}"))?;
    watcher
        .watch(&options.link_file, notify::RecursiveMode::NonRecursive)
        .with_context(|| format!("could not watch {:?}", options.link_file))?;

    reload(options, root);

    while let Ok(event) = receiver.recv() {
        match event {
            notify::DebouncedEvent::Rescan
            | notify::DebouncedEvent::Error(_, _)
            | notify::DebouncedEvent::NoticeWrite(_)
            | notify::DebouncedEvent::NoticeRemove(_) => continue,
            notify::DebouncedEvent::Create(_)
            | notify::DebouncedEvent::Write(_)
            | notify::DebouncedEvent::Chmod(_)
            | notify::DebouncedEvent::Remove(_)
            | notify::DebouncedEvent::Rename(_, _) => {
                reload(options, root);

                // skip all events currently in the queue
                while receiver.try_recv().is_ok() {}
            }
        }
    }

    warn!("file watcher stopped");
    Ok(())
}

fn reload(options: &Options, root: &Path) {
    info!("processing...");
    if let Err(error) = run(options, root) {
        error!("{:#}", error);
    }
}
