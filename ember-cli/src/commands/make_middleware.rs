use console::style;

use crate::scaffold::{self, Module};
use crate::templates;

pub fn run(name: String) {
    if !scaffold::is_valid_identifier(&name) {
        scaffold::fail(format!("'{}' is not a valid Rust identifier", name));
    }

    // "RateLimit" -> "RateLimitMiddleware", "rate_limit"
    let base = name.trim_end_matches("Middleware");
    let struct_name = format!("{}Middleware", scaffold::to_pascal_case(&scaffold::to_snake_case(base)));
    let file_name = scaffold::to_snake_case(base);

    let module = Module {
        dir: "src/middleware",
        file_name: &file_name,
        contents: templates::middleware_template(base, &struct_name),
        public: false,
        export: Some(&struct_name),
    };
    if let Err(e) = module.write() {
        scaffold::fail(e);
    }

    println!();
    println!(
        "Middleware {} created successfully!",
        style(&struct_name).cyan().bold()
    );
    println!();
    println!("Usage:");
    println!("  {} Use on a route or group in src/routes.rs:", style("1.").dim());
    println!("     .get(\"/path\", handler).middleware(middleware::{})", struct_name);
    println!();
    println!("  {} Or apply globally in src/bootstrap.rs:", style("2.").dim());
    println!("     global_middleware!(middleware::{});", struct_name);
    println!();
}
