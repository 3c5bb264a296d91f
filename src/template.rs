use crate::config::DEFAULT_TEMPLATE;
use crate::llm::prompts;
use std::fs;

/// Resolve the `template` setting to the text handed to the description prompt.
///
/// `"default"` or an empty value selects the built-in template; anything else
/// is read as a path. Unreadable paths fall back to the built-in template.
pub fn resolve(identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.is_empty() || identifier == DEFAULT_TEMPLATE {
        return prompts::DEFAULT_TEMPLATE.to_string();
    }

    match fs::read_to_string(identifier) {
        Ok(text) => {
            log::debug!("Using PR template from {identifier}");
            text
        }
        Err(err) => {
            log::warn!("Error reading template file {identifier}: {err}; using the default template instead");
            prompts::DEFAULT_TEMPLATE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sentinel_and_empty_select_builtin() {
        assert_eq!(resolve("default"), prompts::DEFAULT_TEMPLATE);
        assert_eq!(resolve(""), prompts::DEFAULT_TEMPLATE);
        assert_eq!(resolve("   "), prompts::DEFAULT_TEMPLATE);
    }

    #[test]
    fn path_contents_are_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("PULL_REQUEST_TEMPLATE.md");
        let text = "## What\n\n## Why\n<!-- {{not a placeholder}} -->\n";
        fs::write(&path, text).unwrap();

        assert_eq!(resolve(path.to_str().unwrap()), text);
    }

    #[test]
    fn missing_path_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.md");

        assert_eq!(resolve(path.to_str().unwrap()), prompts::DEFAULT_TEMPLATE);
    }
}
