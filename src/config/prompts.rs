//! Prompt templates for Podbrief.
//!
//! The summary prompt is a plain text/markdown file; `{{transcript}}` marks where the
//! transcript goes. A built-in template is used when no file is present.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Built-in summary prompt.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are an expert podcast summary creator. Create a concise, well-structured markdown summary of the following podcast transcript.

The summary should include:
1. **Overview** - 2-3 sentence summary of the main topic
2. **Key Points** - 5-7 bullet points of the most important takeaways
3. **Speakers** - Brief description of who is speaking (if mentioned)
4. **Resources & Takeaways** - Any mentioned resources, links, or actionable items

Keep the summary concise but comprehensive. Use markdown formatting.

TRANSCRIPT:
{{transcript}}

SUMMARY:"#;

/// Prompt template store.
#[derive(Debug, Clone, Default)]
pub struct Prompts {
    /// Custom variables from config, available in all prompts.
    pub variables: HashMap<String, String>,
}

impl Prompts {
    /// Create a prompt store with custom variables from config.
    pub fn new(variables: &HashMap<String, String>) -> Self {
        Self {
            variables: variables.clone(),
        }
    }

    /// Load a template from disk, falling back to the built-in summary prompt.
    pub fn load_template(path: &Path) -> String {
        match std::fs::read_to_string(path) {
            Ok(template) => {
                info!("Loaded prompt template from {}", path.display());
                template
            }
            Err(e) => {
                warn!(
                    "Prompt template not readable at {} ({}), using default",
                    path.display(),
                    e
                );
                DEFAULT_SUMMARY_PROMPT.to_string()
            }
        }
    }

    /// Render a prompt template with the given variables.
    ///
    /// Both `{{name}}` and single-brace `{name}` placeholders are substituted.
    /// The template is scanned once, so braces inside substituted values are
    /// left as they are. Unknown placeholders are kept verbatim.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            result.push_str(&rest[..open]);
            let tail = &rest[open..];

            match placeholder(tail).and_then(|(name, len)| vars.get(name).map(|v| (v, len))) {
                Some((value, len)) => {
                    result.push_str(value);
                    rest = &tail[len..];
                }
                None => {
                    result.push('{');
                    rest = &tail[1..];
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

/// Name and byte length of a `{{name}}` or `{name}` placeholder at the start of `s`.
fn placeholder(s: &str) -> Option<(&str, usize)> {
    let (inner, open, close) = if s.starts_with("{{") {
        (&s[2..], 2, "}}")
    } else {
        (&s[1..], 1, "}")
    };

    let end = inner.find(close)?;
    let name = &inner[..end];
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    valid.then_some((name, open + end + close.len()))
}
