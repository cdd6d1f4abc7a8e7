// Source templates for the make:* generators

/// Plain controller with a single `invoke` handler
pub fn controller_template(name: &str) -> String {
    format!(
        r#"//! {name} controller

use ember::{{json, Request, Response}};
use serde_json::json;

pub async fn invoke(_req: Request) -> Response {{
    json(json!({{
        "controller": "{name}"
    }}))
}}
"#,
        name = name
    )
}

/// Resource controller; unimplemented actions answer 404
pub fn resource_controller_template(name: &str, struct_name: &str) -> String {
    format!(
        r#"//! {name} resource controller

use ember::{{async_trait, json, Request, ResourceController, Response}};
use serde_json::json;

#[derive(Default)]
pub struct {struct_name};

#[async_trait]
impl ResourceController for {struct_name} {{
    async fn index(&self, _req: Request) -> Response {{
        json(json!({{ "data": [] }}))
    }}

    async fn store(&self, req: Request) -> Response {{
        let input: serde_json::Value = req.input()?;
        json(json!({{ "data": input }}))
    }}

    async fn show(&self, req: Request) -> Response {{
        let id = req.param("id")?;
        json(json!({{ "data": {{ "id": id }} }}))
    }}

    async fn update(&self, req: Request) -> Response {{
        let id = req.param("id")?;
        let input: serde_json::Value = req.input()?;
        json(json!({{ "id": id, "data": input }}))
    }}

    async fn destroy(&self, req: Request) -> Response {{
        let id = req.param("id")?;
        json(json!({{ "deleted": id }}))
    }}
}}
"#,
        name = name,
        struct_name = struct_name
    )
}

/// Template for generating new middleware with make:middleware command
pub fn middleware_template(name: &str, struct_name: &str) -> String {
    format!(
        r#"//! {name} middleware

use ember::{{async_trait, Middleware, Next, Request, Response}};

/// {name} middleware
pub struct {struct_name};

#[async_trait]
impl Middleware for {struct_name} {{
    async fn handle(&self, request: Request, next: Next) -> Response {{
        next(request).await
    }}
}}
"#,
        name = name,
        struct_name = struct_name
    )
}

/// Self-registering service provider
pub fn provider_template(name: &str, struct_name: &str, config_key: &str) -> String {
    format!(
        r#"//! {name} service provider

use ember::{{Container, FrameworkError, ServiceProvider}};
use serde_json::json;

#[derive(Default)]
pub struct {struct_name};

impl ServiceProvider for {struct_name} {{
    /// Defaults for the `{config_key}` config section
    fn config(&self) -> Option<(&'static str, serde_json::Value)> {{
        Some(("{config_key}", json!({{}})))
    }}

    fn register(&self, _container: &mut Container) -> Result<(), FrameworkError> {{
        Ok(())
    }}

    fn boot(&self, _container: &Container) -> Result<(), FrameworkError> {{
        Ok(())
    }}
}}

ember::provider!({struct_name});
"#,
        name = name,
        struct_name = struct_name,
        config_key = config_key
    )
}
