use console::style;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::process::{self, ServerProcess};
use crate::scaffold;

const WATCHED: [&str; 2] = ["src", "config"];
const DEBOUNCE: Duration = Duration::from_millis(500);

pub fn run(port: Option<u16>) {
    if let Err(e) = process::ensure_project_root() {
        scaffold::fail(e);
    }
    let port = process::resolve_port(port);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        scaffold::fail(format!("Failed to set Ctrl+C handler: {}", e));
    }

    let (tx, rx) = channel::<Event>();
    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => scaffold::fail(format!("Failed to start file watcher: {}", e)),
    };

    for dir in WATCHED {
        let path = Path::new(dir);
        if !path.exists() {
            continue;
        }
        if let Err(e) = watcher.watch(path, RecursiveMode::Recursive) {
            scaffold::fail(format!("Failed to watch {}: {}", dir, e));
        }
        println!("{} Watching {}/", style("[watch]").blue(), dir);
    }

    let mut server = ServerProcess::new(port);
    if let Err(e) = server.start() {
        scaffold::fail(e);
    }
    println!("{}", style("Press Ctrl+C to stop").dim());

    // Changes are collected until the tree has been quiet for DEBOUNCE
    let mut pending: Option<Instant> = None;

    while !shutdown.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                if event.paths.iter().any(|p| is_relevant(p)) {
                    pending = Some(Instant::now());
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if pending.is_some_and(|at| at.elapsed() >= DEBOUNCE) {
            pending = None;
            println!("{} Change detected, restarting", style("[watch]").blue());
            if let Err(e) = server.restart() {
                eprintln!("{} {}", style("[watch]").yellow(), e);
            }
        }
    }

    println!();
    server.stop();
    println!("{}", style("Server stopped.").green());
}

/// Rust sources and config files; editor swap files and `target/` are ignored
fn is_relevant(path: &Path) -> bool {
    if path.components().any(|c| c == Component::Normal("target".as_ref())) {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("rs" | "yaml" | "yml" | "toml" | "json")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_paths() {
        assert!(is_relevant(Path::new("src/controllers/photo.rs")));
        assert!(is_relevant(Path::new("config/photos.yaml")));
        assert!(!is_relevant(Path::new("src/controllers/.photo.rs.swp")));
        assert!(!is_relevant(Path::new("target/debug/build/out.rs")));
    }
}
