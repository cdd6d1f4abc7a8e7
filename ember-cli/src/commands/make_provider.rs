use console::style;

use crate::scaffold::{self, Module};
use crate::templates;

pub fn run(name: String) {
    if !scaffold::is_valid_identifier(&name) {
        scaffold::fail(format!("'{}' is not a valid Rust identifier", name));
    }

    // "Mail" -> "MailServiceProvider", "mail_service_provider", config key "mail"
    let base = name
        .trim_end_matches("ServiceProvider")
        .trim_end_matches("Provider");
    let key = scaffold::to_snake_case(base);
    if key.is_empty() {
        scaffold::fail(format!("'{}' is not a valid provider name", name));
    }
    let struct_name = format!("{}ServiceProvider", scaffold::to_pascal_case(&key));
    let file_name = format!("{}_service_provider", key);

    // Providers register themselves through `provider!`, no re-export needed
    let module = Module {
        dir: "src/providers",
        file_name: &file_name,
        contents: templates::provider_template(base, &struct_name, &key),
        public: false,
        export: None,
    };
    if let Err(e) = module.write() {
        scaffold::fail(e);
    }

    println!();
    println!(
        "Provider {} created successfully!",
        style(&struct_name).cyan().bold()
    );
    println!();
    println!(
        "It is discovered automatically. Make sure {} declares {}.",
        style("src/main.rs").dim(),
        style("mod providers;").dim()
    );
    println!();
}
