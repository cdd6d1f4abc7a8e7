//! Child process running `cargo run -- serve`

use console::style;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

pub struct ServerProcess {
    child: Option<Child>,
    port: u16,
}

impl ServerProcess {
    pub fn new(port: u16) -> Self {
        Self { child: None, port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Build and start the server, prefixing its output with `[app]`
    pub fn start(&mut self) -> Result<(), String> {
        let port = self.port.to_string();
        let mut child = Command::new("cargo")
            .args(["run", "--", "serve", "--port", &port])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("Failed to spawn cargo: {}", e))?;

        if let Some(stdout) = child.stdout.take() {
            forward(stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward(stderr, true);
        }

        self.child = Some(child);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    pub fn restart(&mut self) -> Result<(), String> {
        self.stop();
        self.start()
    }

    /// True once a started child has exited on its own
    pub fn has_exited(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
            None => false,
        }
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

// The reader thread ends when the child closes the pipe
fn forward(pipe: impl Read + Send + 'static, to_stderr: bool) {
    thread::spawn(move || {
        for line in BufReader::new(pipe).lines().map_while(Result::ok) {
            if to_stderr {
                eprintln!("{} {}", style("[app]").magenta().bold(), line);
            } else {
                println!("{} {}", style("[app]").magenta().bold(), line);
            }
        }
    });
}

/// Exit unless the current directory holds a Cargo project
pub fn ensure_project_root() -> Result<(), String> {
    if !Path::new("Cargo.toml").exists() {
        return Err("No Cargo.toml found. Are you in an Ember project directory?".into());
    }
    Ok(())
}

/// CLI flag first, then SERVER_PORT from the environment or `.env`, then 8080
pub fn resolve_port(flag: Option<u16>) -> u16 {
    let _ = dotenvy::dotenv();
    flag.or_else(|| {
        std::env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
    })
    .unwrap_or(8080)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_flag_wins() {
        assert_eq!(resolve_port(Some(9100)), 9100);
    }

    #[test]
    fn test_unstarted_process_has_not_exited() {
        let mut process = ServerProcess::new(8080);
        assert!(!process.has_exited());
        process.stop();
        assert_eq!(process.port(), 8080);
    }
}
