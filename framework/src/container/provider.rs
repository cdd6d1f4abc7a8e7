//! Service providers
//!
//! A provider bundles everything a feature needs at startup: configuration
//! defaults, files an application may publish into its own tree, container
//! bindings (`register`) and startup code that relies on other providers'
//! bindings (`boot`).
//!
//! # Example
//!
//! ```rust,ignore
//! use ember::{provider, Container, FrameworkError, ServiceProvider};
//! use serde_json::json;
//!
//! #[derive(Default)]
//! pub struct MailProvider;
//!
//! impl ServiceProvider for MailProvider {
//!     fn config(&self) -> Option<(&'static str, serde_json::Value)> {
//!         Some(("mail", json!({ "driver": "log" })))
//!     }
//!
//!     fn register(&self, container: &mut Container) -> Result<(), FrameworkError> {
//!         container.singleton(|_| Mailer::from_config());
//!         Ok(())
//!     }
//! }
//!
//! // Picked up automatically, no need to list it in main.rs
//! provider!(MailProvider);
//! ```

use super::Container;
use crate::error::FrameworkError;
use std::path::PathBuf;

/// A file a provider offers to copy into the application (`vendor:publish`)
#[derive(Debug, Clone, PartialEq)]
pub struct Publishable {
    /// Grouping tag, e.g. `config`
    pub tag: &'static str,
    /// Destination relative to the project root
    pub path: PathBuf,
    pub contents: String,
}

impl Publishable {
    pub fn config(file: &str, contents: impl Into<String>) -> Self {
        Self {
            tag: "config",
            path: PathBuf::from("config").join(file),
            contents: contents.into(),
        }
    }
}

/// Two-phase service provider
pub trait ServiceProvider: Send + Sync {
    /// Name used in logs, errors and `--provider` filters
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Default configuration for a section; application config wins
    fn config(&self) -> Option<(&'static str, serde_json::Value)> {
        None
    }

    /// Files the application can publish into its own tree
    fn publishes(&self) -> Vec<Publishable> {
        Vec::new()
    }

    /// Register bindings. Must not rely on bindings of other providers.
    fn register(&self, container: &mut Container) -> Result<(), FrameworkError>;

    /// Runs after every provider has registered
    fn boot(&self, container: &Container) -> Result<(), FrameworkError> {
        let _ = container;
        Ok(())
    }
}

/// Link-time registration record created by the `provider!` macro
pub struct DiscoveredProvider {
    pub name: &'static str,
    pub make: fn() -> Box<dyn ServiceProvider>,
}

inventory::collect!(DiscoveredProvider);

/// Instantiate every provider registered with `provider!`, ordered by name
pub fn discovered() -> Vec<Box<dyn ServiceProvider>> {
    let mut entries: Vec<&DiscoveredProvider> = inventory::iter::<DiscoveredProvider>
        .into_iter()
        .collect();
    entries.sort_by_key(|entry| entry.name);
    entries.into_iter().map(|entry| (entry.make)()).collect()
}

/// Register a `Default` provider for automatic discovery
///
/// # Example
/// ```rust,ignore
/// provider!(MailProvider);
/// ```
#[macro_export]
macro_rules! provider {
    ($ty:ty) => {
        $crate::__private::inventory::submit! {
            $crate::container::provider::DiscoveredProvider {
                name: stringify!($ty),
                make: || ::std::boxed::Box::new(<$ty as ::std::default::Default>::default()),
            }
        }
    };
}
