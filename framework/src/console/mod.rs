//! Output for the application's built-in CLI commands

mod publish;

pub use publish::{vendor_publish, PublishReport};

use crate::app::BootedApplication;
use crate::config::Config;
use crate::container::App;
use crate::error::{ConfigError, FrameworkError};
use crate::routing::RouteTable;
use std::fmt::Write;

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {:.<24} {}", format!("{} ", label), value);
}

/// `about`: a summary of the running configuration
pub fn about(app: &BootedApplication) -> String {
    let mut out = String::from("Ember\n");
    line(&mut out, "Version", env!("CARGO_PKG_VERSION"));
    line(&mut out, "Environment", &app.environment);
    line(&mut out, "Debug", Config::is_debug());
    line(&mut out, "Providers", app.providers.len());
    for name in app.providers.names() {
        let _ = writeln!(out, "    - {}", name);
    }
    line(&mut out, "Bindings", App::binding_count());
    line(&mut out, "Routes", app.kernel.routes().len());
    line(&mut out, "Global middleware", app.kernel.middleware().names().join(", "));

    let sources = Config::with(|repo| repo.sources().to_vec());
    line(&mut out, "Config sources", sources.len());
    for source in sources {
        let _ = writeln!(out, "    - {}", source.display());
    }
    out
}

/// `config:show <section>`: the section as pretty JSON
pub fn config_show(section: &str) -> Result<String, FrameworkError> {
    let value = Config::get(section).ok_or_else(|| ConfigError::Missing {
        key: section.to_string(),
    })?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| FrameworkError::internal(format!("Failed to render config: {}", e)))
}

/// `route:list`: one row per route, ordered by path
pub fn route_list(routes: &RouteTable) -> String {
    let mut rows: Vec<[String; 4]> = routes
        .routes()
        .iter()
        .map(|route| {
            [
                route.method.to_string(),
                route.path.clone(),
                route.name.clone().unwrap_or_default(),
                route.middleware().len().to_string(),
            ]
        })
        .collect();
    rows.sort_by(|a, b| (&a[1], &a[0]).cmp(&(&b[1], &b[0])));

    let header = [
        "METHOD".to_string(),
        "PATH".to_string(),
        "NAME".to_string(),
        "MIDDLEWARE".to_string(),
    ];
    let mut widths = header.clone().map(|h| h.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let _ = writeln!(
            out,
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            row[0],
            row[1],
            row[2],
            row[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
    }
    let _ = write!(out, "\n{} route(s)", rows.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Repository;
    use crate::http::{HttpResponse, Request, Response};
    use crate::middleware::RequestLogger;
    use crate::routing::Router;
    use serial_test::serial;

    async fn ok(_req: Request) -> Response {
        Ok(HttpResponse::text("ok"))
    }

    #[test]
    fn test_route_list_sorted_with_counts() {
        let table = Router::new()
            .post("/photos", ok)
            .get("/photos", ok)
            .name("console_test.photos.index")
            .middleware(RequestLogger)
            .get("/", ok)
            .compile()
            .unwrap();

        let output = route_list(&table);
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("METHOD"));
        assert!(lines[1].starts_with("GET     /  "));
        assert!(lines[2].contains("/photos") && lines[2].contains("console_test.photos.index"));
        assert!(lines[2].trim_end().ends_with('1'));
        assert!(lines[3].starts_with("POST"));
        assert_eq!(lines.last(), Some(&"3 route(s)"));
    }

    #[test]
    #[serial]
    fn test_config_show() {
        Config::replace(Repository::new());
        Config::set("mail.driver", "log");

        let shown = config_show("mail").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(parsed, serde_json::json!({ "driver": "log" }));

        assert!(matches!(
            config_show("nope"),
            Err(FrameworkError::Config(ConfigError::Missing { .. }))
        ));
    }
}
