use console::style;

use crate::scaffold::{self, Module};
use crate::templates;

pub fn run(name: String, resource: bool) {
    let base = name.trim_end_matches("Controller");
    let file_name = scaffold::to_snake_case(base);

    if !scaffold::is_valid_identifier(&file_name) {
        scaffold::fail(format!("'{}' is not a valid controller name", name));
    }

    let struct_name = format!("{}Controller", scaffold::to_pascal_case(&file_name));
    let contents = if resource {
        templates::resource_controller_template(&file_name, &struct_name)
    } else {
        templates::controller_template(&file_name)
    };

    let module = Module {
        dir: "src/controllers",
        file_name: &file_name,
        contents,
        public: true,
        export: None,
    };
    if let Err(e) = module.write() {
        scaffold::fail(e);
    }

    println!();
    println!(
        "Controller {} created successfully!",
        style(&file_name).cyan().bold()
    );
    println!();
    println!("Usage:");
    println!("  {} Add to src/routes.rs:", style("1.").dim());
    if resource {
        println!(
            "     .resource(\"/{}s\", controllers::{}::{})",
            file_name, file_name, struct_name
        );
    } else {
        println!(
            "     .get(\"/{}\", controllers::{}::invoke)",
            file_name, file_name
        );
    }
    println!();
}
