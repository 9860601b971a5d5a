//! Prompt rendering.
//!
//! The template is compiled once at startup - a malformed template is a
//! fatal configuration error, not a per-call one. Rendering is a pure
//! function of the text to annotate, the label set, and the current
//! few-shot window; it never truncates. Whether the result fits the
//! target model's context is the caller's configuration concern.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

use crate::domain::{LabelSet, PromptExample};

const TEMPLATE_NAME: &str = "ner_prompt";

/// What the template sees for one few-shot example: the text plus its
/// entities flattened to `label: phrase, phrase` lines.
#[derive(Serialize)]
struct ExampleView<'a> {
    text: &'a str,
    entities: Vec<EntityLineView<'a>>,
}

#[derive(Serialize)]
struct EntityLineView<'a> {
    label: &'a str,
    phrases: String,
}

#[derive(Serialize)]
struct PromptView<'a> {
    text: &'a str,
    labels: Vec<&'a str>,
    examples: Vec<ExampleView<'a>>,
}

/// Compiled prompt template.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile a template from source. Fails on malformed template syntax.
    pub fn new(template: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        // Prompts are plain text for a language model, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .context("Failed to compile prompt template")?;
        Ok(Self { registry })
    }

    /// Render a prompt for one text to annotate.
    pub fn render<'a, I>(&self, text: &str, labels: &LabelSet, examples: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a PromptExample>,
    {
        let examples: Vec<ExampleView<'_>> = examples
            .into_iter()
            .map(|example| ExampleView {
                text: &example.text,
                entities: example
                    .entities
                    .iter()
                    .map(|(label, phrases)| EntityLineView {
                        label,
                        phrases: phrases.join(", "),
                    })
                    .collect(),
            })
            .collect();

        let view = PromptView {
            text,
            labels: labels.iter().map(|l| l.as_str()).collect(),
            examples,
        };

        self.registry
            .render(TEMPLATE_NAME, &view)
            .context("Failed to render prompt template")
    }
}
