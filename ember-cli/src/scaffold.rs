//! Shared plumbing for the `make:*` generators

use console::style;
use std::fmt::Display;
use std::fs;
use std::path::Path;

/// A generated source file and how its parent `mod.rs` should expose it
pub struct Module<'a> {
    /// Directory relative to the project root, e.g. `src/controllers`
    pub dir: &'a str,
    pub file_name: &'a str,
    pub contents: String,
    /// `pub mod x;` instead of `mod x;`
    pub public: bool,
    /// Item to re-export with `pub use x::Item;`
    pub export: Option<&'a str>,
}

impl Module<'_> {
    /// Write the file and register it in `mod.rs`, creating both as needed
    pub fn write(&self) -> Result<(), String> {
        let dir = Path::new(self.dir);
        let file = dir.join(format!("{}.rs", self.file_name));
        let mod_file = dir.join("mod.rs");

        if !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {} directory: {}", self.dir, e))?;
            println!("{} Created {} directory", style("✓").green(), self.dir);
        }

        if file.exists() {
            return Err(format!("{} already exists", file.display()));
        }

        let existing = if mod_file.exists() {
            fs::read_to_string(&mod_file).map_err(|e| format!("Failed to read mod.rs: {}", e))?
        } else {
            String::new()
        };
        let updated = add_module(&existing, self.file_name, self.public, self.export)?;

        fs::write(&file, &self.contents)
            .map_err(|e| format!("Failed to write {}: {}", file.display(), e))?;
        println!("{} Created {}", style("✓").green(), file.display());

        fs::write(&mod_file, updated).map_err(|e| format!("Failed to write mod.rs: {}", e))?;
        println!("{} Updated {}", style("✓").green(), mod_file.display());
        Ok(())
    }
}

/// Print an error and exit with status 1
pub fn fail(message: impl Display) -> ! {
    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    // First character must be letter or underscore
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// `RateLimit` -> `rate_limit`; snake case input is returned unchanged
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// `user_profile` -> `UserProfile`
pub fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Insert a module declaration (and optional re-export) into `mod.rs` text
///
/// Declarations go after the last existing one of the same kind, so the
/// file keeps its grouping. Fails if the module is already declared.
pub fn add_module(
    content: &str,
    file_name: &str,
    public: bool,
    export: Option<&str>,
) -> Result<String, String> {
    let declared = content.lines().any(|line| {
        let line = line.trim();
        line == format!("mod {};", file_name) || line == format!("pub mod {};", file_name)
    });
    if declared {
        return Err(format!("Module '{}' is already declared in mod.rs", file_name));
    }

    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let mod_decl = if public {
        format!("pub mod {};", file_name)
    } else {
        format!("mod {};", file_name)
    };
    let is_mod = |line: &String| {
        let line = line.trim();
        line.starts_with("mod ") || line.starts_with("pub mod ")
    };
    let mod_idx = match lines.iter().rposition(is_mod) {
        Some(idx) => idx + 1,
        // No declarations yet: after the leading doc comment block
        None => lines
            .iter()
            .take_while(|line| line.starts_with("//!") || line.is_empty())
            .count(),
    };
    lines.insert(mod_idx, mod_decl);

    if let Some(item) = export {
        let use_decl = format!("pub use {}::{};", file_name, item);
        match lines.iter().rposition(|line| line.trim().starts_with("pub use ")) {
            Some(idx) => lines.insert(idx + 1, use_decl),
            None => {
                let mut idx = mod_idx + 1;
                while idx < lines.len() && is_mod(&lines[idx]) {
                    idx += 1;
                }
                lines.insert(idx, String::new());
                lines.insert(idx + 1, use_decl);
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("RateLimit"), "rate_limit");
        assert_eq!(to_snake_case("user_profile"), "user_profile");
        assert_eq!(to_snake_case("Photo_Album"), "photo_album");
        assert_eq!(to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(to_pascal_case("photo"), "Photo");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("photo_2"));
        assert!(!is_valid_identifier("2photo"));
        assert!(!is_valid_identifier("photo-album"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_add_module_keeps_grouping() {
        let content = "//! Application middleware\n\nmod auth;\n\npub use auth::Auth;\n";
        let updated = add_module(content, "rate_limit", false, Some("RateLimit")).unwrap();
        assert_eq!(
            updated,
            "//! Application middleware\n\nmod auth;\nmod rate_limit;\n\npub use auth::Auth;\npub use rate_limit::RateLimit;\n"
        );
    }

    #[test]
    fn test_add_module_to_empty_file() {
        assert_eq!(add_module("", "photo", true, None).unwrap(), "pub mod photo;\n");
        assert_eq!(
            add_module("//! Providers\n", "mail", false, Some("MailServiceProvider")).unwrap(),
            "//! Providers\nmod mail;\n\npub use mail::MailServiceProvider;\n"
        );
    }

    #[test]
    fn test_add_module_rejects_duplicates() {
        assert!(add_module("pub mod photo;\n", "photo", true, None).is_err());
        assert!(add_module("mod photo;\n", "photo", true, None).is_err());
    }

    #[test]
    fn test_write_creates_dir_and_mod_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("src/providers");
        let target = target.to_str().unwrap();

        let module = Module {
            dir: target,
            file_name: "mail",
            contents: "pub struct Mail;\n".to_string(),
            public: false,
            export: None,
        };
        module.write().unwrap();

        let mod_rs = fs::read_to_string(Path::new(target).join("mod.rs")).unwrap();
        assert_eq!(mod_rs, "mod mail;\n");
        assert!(module.write().unwrap_err().contains("already exists"));
    }
}
