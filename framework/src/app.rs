//! Application builder for Ember
//!
//! Provides a fluent builder API to configure and run an Ember application.
//!
//! # Example
//!
//! ```rust,ignore
//! use ember::Application;
//!
//! #[tokio::main]
//! async fn main() {
//!     Application::new()
//!         .provider(AppServiceProvider)
//!         .middleware(RequestLogger)
//!         .routes(routes::register)
//!         .run()
//!         .await;
//! }
//! ```
//!
//! Startup runs in a fixed order: `.env` and config files, logging,
//! provider config defaults, provider `register`, provider `boot`, the
//! bootstrap hook, then route compilation. Any failure is fatal.

use crate::config::{Config, Environment};
use crate::console;
use crate::container::{App, Container, ProviderRegistry, ServiceProvider};
use crate::error::FrameworkError;
use crate::http::HttpKernel;
use crate::logging;
use crate::middleware::{into_boxed, BoxedMiddleware, Middleware, MiddlewareRegistry};
use crate::routing::Router;
use crate::server::Server;
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// CLI structure for Ember applications
#[derive(Parser, Debug)]
#[command(name = "app")]
#[command(about = "Ember application server and utilities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the web server (default command)
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show environment, providers, bindings and routes
    About,
    /// Print a configuration section as JSON
    #[command(name = "config:show")]
    ConfigShow {
        /// Section name, e.g. `app`
        section: String,
    },
    /// List registered routes
    #[command(name = "route:list")]
    RouteList,
    /// Copy provider files (config stubs) into the application
    #[command(name = "vendor:publish")]
    VendorPublish {
        /// Only publish files from this provider
        #[arg(long)]
        provider: Option<String>,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

type BootstrapFn = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;
type RoutesFn = Box<dyn FnOnce() -> Router + Send>;

/// Application builder for Ember
pub struct Application {
    root: PathBuf,
    providers: ProviderRegistry,
    middleware: Vec<BoxedMiddleware>,
    bootstrap_fn: Option<BootstrapFn>,
    routes_fn: Option<RoutesFn>,
}

/// A fully started application, ready to serve
pub struct BootedApplication {
    pub environment: Environment,
    pub providers: ProviderRegistry,
    pub kernel: HttpKernel,
}

impl Application {
    /// Create a new application builder
    ///
    /// Providers registered with `provider!` are included, ahead of any
    /// added with [`Application::provider`].
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            providers: ProviderRegistry::with_discovered(),
            middleware: Vec::new(),
            bootstrap_fn: None,
            routes_fn: None,
        }
    }

    /// Project root holding `.env` files and the `config/` directory
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn provider<P: ServiceProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.add(provider);
        self
    }

    /// Add global middleware (runs on every request)
    ///
    /// Runs after middleware registered with `global_middleware!`.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(into_boxed(middleware));
        self
    }

    /// Register a bootstrap function
    ///
    /// Runs after every provider has booted and the container is installed,
    /// so it may use `App` freely.
    pub fn bootstrap<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.bootstrap_fn = Some(Box::new(move || Box::pin(f())));
        self
    }

    /// Register a routes function
    pub fn routes<F, R>(mut self, f: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: Into<Router>,
    {
        self.routes_fn = Some(Box::new(move || f().into()));
        self
    }

    /// Parse CLI arguments and run the chosen command
    ///
    /// Exits the process with status 1 on any error.
    pub async fn run(self) {
        let cli = Cli::parse();
        if let Err(e) = self.run_command(cli.command).await {
            tracing::error!(error = %e, "application failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    /// Run a single command; `None` means `serve`
    pub async fn run_command(self, command: Option<Commands>) -> Result<(), FrameworkError> {
        match command.unwrap_or(Commands::Serve {
            host: None,
            port: None,
        }) {
            Commands::Serve { host, port } => {
                let booted = self.boot().await?;
                let mut server = Server::from_config(booted.kernel);
                if let Some(host) = host {
                    server = server.host(&host);
                }
                if let Some(port) = port {
                    server = server.port(port);
                }
                server.run().await
            }
            Commands::About => {
                let booted = self.boot().await?;
                println!("{}", console::about(&booted));
                Ok(())
            }
            Commands::RouteList => {
                let booted = self.boot().await?;
                println!("{}", console::route_list(booted.kernel.routes()));
                Ok(())
            }
            Commands::ConfigShow { section } => {
                self.prepare()?;
                println!("{}", console::config_show(&section)?);
                Ok(())
            }
            Commands::VendorPublish { provider, force } => {
                let root = self.root.clone();
                let (_, providers) = self.prepare()?;
                let report = console::vendor_publish(&providers, &root, provider.as_deref(), force)?;
                println!("{}", report);
                Ok(())
            }
        }
    }

    /// Load config, start logging and merge provider config defaults
    fn prepare(self) -> Result<(Environment, ProviderRegistry), FrameworkError> {
        let environment = load(&self.root)?;
        let mut config = Config::snapshot();
        self.providers.merge_config(&mut config);
        Config::replace(config);
        Ok((environment, self.providers))
    }

    /// Run the full startup sequence without serving
    pub async fn boot(self) -> Result<BootedApplication, FrameworkError> {
        let Application {
            root,
            mut providers,
            middleware,
            bootstrap_fn,
            routes_fn,
        } = self;

        let environment = load(&root)?;
        tracing::info!(%environment, providers = providers.len(), "booting application");

        let mut config = Config::snapshot();
        providers.merge_config(&mut config);
        Config::replace(config);

        // Providers see only each other's bindings until the container is
        // installed after boot
        let mut container = Container::new();
        providers.register_all(&mut container)?;
        providers.boot_all(&container)?;
        App::install(container);

        if let Some(bootstrap_fn) = bootstrap_fn {
            bootstrap_fn().await;
        }

        let router = routes_fn.map(|f| f()).unwrap_or_default();
        let routes = router.compile()?;

        let registry = middleware
            .into_iter()
            .fold(MiddlewareRegistry::from_global(), MiddlewareRegistry::append_boxed);

        Ok(BootedApplication {
            environment,
            providers,
            kernel: HttpKernel::new(routes, registry),
        })
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn load(root: &Path) -> Result<Environment, FrameworkError> {
    let environment = Config::init(root)?;
    logging::init(&Config::app());
    Ok(environment)
}
