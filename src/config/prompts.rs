//! Prompt templates for Tubescribe.
//!
//! Prompts can be customized by placing a `chat.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub chat: ChatPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// The two chat templates: one for a bare message, one grounded in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    /// Used when no transcript accompanies the message. Placeholder: `{{message}}`.
    pub plain: String,
    /// Used when a transcript is present. Placeholders: `{{transcript}}`, `{{message}}`.
    pub grounded: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            plain: r#"You are a helpful AI assistant. Respond to the following message clearly and concisely.

User: {{message}}

Assistant:"#
                .to_string(),

            grounded: r#"You are an expert content analyst and script consultant. A user has shared the transcript of a YouTube video and has a question about it.

Video transcript:
"""
{{transcript}}
"""

User question: {{message}}

When answering, draw on the transcript and consider:
1. Content structure and flow: how the video is organized and how its ideas progress.
2. Storytelling elements: hooks, narrative arcs, tension and payoff.
3. Key points: the main messages and takeaways of the video.
4. Audience engagement: techniques used to hold the viewer's attention.
5. Script improvement suggestions: concrete changes that would make the script stronger.

Answer the question directly, referring to specific parts of the transcript where useful."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is single-pass per placeholder, so `{{...}}` sequences inside
    /// a substituted value (a transcript, say) are left alone.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = &after[..close];
                    match vars.get(key.trim()) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.chat.plain.contains("{{message}}"));
        assert!(prompts.chat.grounded.contains("{{transcript}}"));
        assert!(prompts.chat.grounded.contains("{{message}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_expand_inside_values() {
        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), "say {{message}} twice".to_string());
        vars.insert("message".to_string(), "hi".to_string());

        let result = Prompts::render("[{{transcript}}] {{message}}", &vars);
        assert_eq!(result, "[say {{message}} twice] hi");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let result = Prompts::render("a {{missing}} b {{", &HashMap::new());
        assert_eq!(result, "a {{missing}} b {{");
    }

    #[test]
    fn test_custom_variables_are_overridden() {
        let mut custom = HashMap::new();
        custom.insert("channel".to_string(), "My Channel".to_string());
        custom.insert("message".to_string(), "default".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("message".to_string(), "actual".to_string());

        let out = prompts.render_with_custom("{{channel}}: {{message}}", &vars);
        assert_eq!(out, "My Channel: actual");
    }

    #[test]
    fn test_load_custom_chat_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chat.toml"),
            "plain = \"Q: {{message}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.chat.plain, "Q: {{message}}");
        // Missing keys keep their defaults.
        assert!(prompts.chat.grounded.contains("{{transcript}}"));
    }
}
