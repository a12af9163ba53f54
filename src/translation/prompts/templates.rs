/*!
 * Prompt template for batch subtitle translation.
 *
 * The model is asked for plain text: one translation per input line, joined
 * by the `|||` separator, with nothing before or after.
 */

use crate::subtitle_processor::SubtitleEntry;
use crate::translation::response::SEPARATOR;

/// Batch translation prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Instructions placed before the numbered lines.
    pub const BATCH_TRANSLATOR: &'static str = r#"Translate the following {count} subtitle lines to {target_language}. IMPORTANT RULES:
1. Do NOT translate proper names (person names, locations, brands, etc.), keep them in English.
2. If a line is unclear or difficult to translate, use the original English text.
3. NEVER leave empty translations - always provide something for each line.
4. Provide ONLY the translated text for each line, separated by '{separator}'.
5. Do NOT add any extra text, explanations, or numbering before or after the translations.
6. Maintain the exact same order as the input.

FORMAT EXAMPLE:
Input: 1. "Hello there" 2. "How are you?"
Output for {target_language}: "[Hello translation]{separator}[How are you translation]"

You must provide exactly {count} translations separated by {separator}.
Here are the lines to translate:
"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default batch translator template.
    pub fn batch_translator() -> Self {
        Self::new(Self::BATCH_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, count: usize, target_language: &str) -> String {
        self.template
            .replace("{count}", &count.to_string())
            .replace("{target_language}", target_language)
            .replace("{separator}", SEPARATOR)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::batch_translator()
    }
}

/// Builder for the prompt of one batch.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    target_language: String,
    template: PromptTemplate,
    lines: Vec<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            template: PromptTemplate::default(),
            lines: Vec::new(),
        }
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Set the entries whose source text is to be translated.
    pub fn with_entries(mut self, entries: &[SubtitleEntry]) -> Self {
        self.lines = entries.iter().map(|entry| entry.text.clone()).collect();
        self
    }

    /// Build the full prompt: header, rules, then `i. "text"` lines numbered from 1.
    pub fn build(&self) -> String {
        let mut prompt = self.template.render(self.lines.len(), &self.target_language);
        for (i, line) in self.lines.iter().enumerate() {
            prompt.push_str(&format!("{}. \"{}\"\n", i + 1, line));
        }
        prompt
    }
}
