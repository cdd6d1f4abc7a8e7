//! `vendor:publish`: copy provider files into the application tree

use crate::container::ProviderRegistry;
use crate::error::FrameworkError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written and files left alone
#[derive(Debug, Default, PartialEq)]
pub struct PublishReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.written.is_empty() && self.skipped.is_empty() {
            return write!(f, "Nothing to publish.");
        }
        for path in &self.written {
            writeln!(f, "Published {}", path.display())?;
        }
        for path in &self.skipped {
            writeln!(f, "Skipped {} (exists, use --force to overwrite)", path.display())?;
        }
        Ok(())
    }
}

/// Write every publishable file under `root`
///
/// Existing files are skipped unless `force` is set. `only` limits the
/// run to one provider and must name a registered provider.
pub fn vendor_publish(
    providers: &ProviderRegistry,
    root: &Path,
    only: Option<&str>,
    force: bool,
) -> Result<PublishReport, FrameworkError> {
    if let Some(name) = only {
        if !providers.names().iter().any(|n| n == name) {
            return Err(FrameworkError::domain(
                format!("No provider named '{}'", name),
                404,
            ));
        }
    }

    let mut report = PublishReport::default();
    for (provider, file) in providers.publishables(only) {
        let target = root.join(&file.path);
        if target.exists() && !force {
            tracing::debug!(%provider, path = %target.display(), "skipping existing file");
            report.skipped.push(file.path);
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.contents)?;
        tracing::info!(%provider, tag = file.tag, path = %target.display(), "published");
        report.written.push(file.path);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Container, Publishable, ServiceProvider};
    use pretty_assertions::assert_eq;

    struct MailProvider;

    impl ServiceProvider for MailProvider {
        fn publishes(&self) -> Vec<Publishable> {
            vec![Publishable::config("mail.yaml", "driver: log\n")]
        }

        fn register(&self, _container: &mut Container) -> Result<(), FrameworkError> {
            Ok(())
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.add(MailProvider);
        registry
    }

    #[test]
    fn test_publishes_then_skips_then_forces() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config/mail.yaml");

        let first = vendor_publish(&registry(), dir.path(), None, false).unwrap();
        assert_eq!(first.written, vec![PathBuf::from("config/mail.yaml")]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "driver: log\n");

        fs::write(&target, "driver: smtp\n").unwrap();
        let second = vendor_publish(&registry(), dir.path(), None, false).unwrap();
        assert_eq!(second.skipped, vec![PathBuf::from("config/mail.yaml")]);
        assert_eq!(fs::read_to_string(&target).unwrap(), "driver: smtp\n");

        let forced = vendor_publish(&registry(), dir.path(), Some("MailProvider"), true).unwrap();
        assert_eq!(forced.written.len(), 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), "driver: log\n");
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = vendor_publish(&registry(), dir.path(), Some("Nope"), false).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
