use console::style;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::process::{self, ServerProcess};
use crate::scaffold;

pub fn run(port: Option<u16>) {
    if let Err(e) = process::ensure_project_root() {
        scaffold::fail(e);
    }
    let port = process::resolve_port(port);

    println!();
    println!("{}", style("Starting Ember development server...").cyan().bold());
    println!();

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", style("Shutting down server...").yellow());
        flag.store(true, Ordering::SeqCst);
    }) {
        scaffold::fail(format!("Failed to set Ctrl+C handler: {}", e));
    }

    let mut server = ServerProcess::new(port);
    if let Err(e) = server.start() {
        scaffold::fail(e);
    }
    println!(
        "{} Server on http://127.0.0.1:{}",
        style("[app]").magenta().bold(),
        server.port()
    );
    println!("{}", style("Press Ctrl+C to stop").dim());
    println!();

    while !shutdown.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
        if server.has_exited() {
            break;
        }
    }

    server.stop();
    println!("{}", style("Server stopped.").green());
}
