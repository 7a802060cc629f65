//! Prompt loader
//!
//! Renders the embedded handlebars templates with typed contexts.

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for rendering the planner prompt
#[derive(Debug, Clone, Serialize)]
pub struct PlannerContext {
    /// Comma-joined quoted technique names the planner may choose from
    pub techniques: String,
    /// One rule line per conversational state
    pub rules: Vec<String>,
    /// Technique used by the immediately preceding ai turn, if any
    pub previous_technique: Option<String>,
    /// Latest journal excerpt, or "None"
    pub journal: String,
    /// Optional affect label for the latest message
    pub affect: Option<String>,
    /// Prior turns rendered as "role: content" lines
    pub history: String,
    /// The latest user message
    pub message: String,
}

/// Context for rendering the generator prompt
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorContext {
    /// The assigned technique's wire name
    pub technique: String,
    /// The technique's application instruction
    pub instruction: String,
    /// Optional affect label for the latest message
    pub affect: Option<String>,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
}

impl PromptLoader {
    /// Create a new prompt loader
    ///
    /// Escaping is disabled: rendered output is prompt text for a model, not
    /// HTML, and quotes in user messages must survive verbatim.
    pub fn new() -> Self {
        debug!("PromptLoader::new: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs }
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = embedded::get_embedded(template_name)
            .ok_or_else(|| eyre!("Prompt template not found: {}", template_name))?;

        self.hbs
            .render_template(template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_context() -> PlannerContext {
        PlannerContext {
            techniques: "'probing', 'validation'".to_string(),
            rules: vec![
                "a greeting: choose 'social_greeting'".to_string(),
                "anything else: choose 'clarifying'".to_string(),
            ],
            previous_technique: Some("reflection".to_string()),
            journal: "Slept badly again.".to_string(),
            affect: None,
            history: "user: hi\nai: hello".to_string(),
            message: "I can't focus today".to_string(),
        }
    }

    #[test]
    fn test_render_planner() {
        let loader = PromptLoader::new();
        let rendered = loader.render("planner", &planner_context()).unwrap();

        assert!(rendered.contains("'probing', 'validation'"));
        assert!(rendered.contains("- a greeting: choose 'social_greeting'"));
        assert!(rendered.contains("The previous reply used 'reflection'"));
        assert!(rendered.contains("Latest journal entry: Slept badly again."));
        assert!(rendered.contains("User message: I can't focus today"));
        // No affect line when the label is absent
        assert!(!rendered.contains("Detected affect"));
    }

    #[test]
    fn test_render_planner_with_affect() {
        let loader = PromptLoader::new();
        let mut ctx = planner_context();
        ctx.affect = Some("anxious".to_string());
        ctx.previous_technique = None;

        let rendered = loader.render("planner", &ctx).unwrap();
        assert!(rendered.contains("Detected affect of the latest message: anxious"));
        assert!(!rendered.contains("The previous reply used"));
    }

    #[test]
    fn test_render_does_not_escape_quotes() {
        let loader = PromptLoader::new();
        let mut ctx = planner_context();
        ctx.message = "he said \"it's fine\"".to_string();

        let rendered = loader.render("planner", &ctx).unwrap();
        assert!(rendered.contains("he said \"it's fine\""));
    }

    #[test]
    fn test_render_generator() {
        let loader = PromptLoader::new();
        let ctx = GeneratorContext {
            technique: "probing".to_string(),
            instruction: "ask a short question".to_string(),
            affect: Some("sad".to_string()),
        };

        let rendered = loader.render("generator", &ctx).unwrap();
        assert!(rendered.contains("Assigned technique: probing"));
        assert!(rendered.contains("How to apply: ask a short question"));
        assert!(rendered.contains("'sad' tone"));
    }

    #[test]
    fn test_render_unknown_template() {
        let loader = PromptLoader::new();
        let result = loader.render("nonexistent", &GeneratorContext {
            technique: String::new(),
            instruction: String::new(),
            affect: None,
        });
        assert!(result.is_err());
    }
}
