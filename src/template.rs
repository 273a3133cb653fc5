use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::pipeline::PipelineError;

const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// A text template with `{name}` placeholders and a declared variable set,
/// validated at construction so a malformed binding fails before any request
/// is ever made.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: BTreeSet<String>,
}

impl PromptTemplate {
    pub fn new<I, S>(template: &str, variables: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: BTreeSet<String> = variables.into_iter().map(Into::into).collect();

        // Every placeholder in the template must be a declared variable.
        // Declared variables without a placeholder are still required at
        // fill time, matching how the bound templates are authored.
        for name in Self::placeholders(template) {
            if !variables.contains(&name) {
                return Err(PipelineError::Configuration(format!(
                    "template references undeclared variable '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            template: template.to_string(),
            variables,
        })
    }

    fn placeholders(template: &str) -> Vec<String> {
        let re = Regex::new(PLACEHOLDER_PATTERN).unwrap();
        re.captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Render the template with the given values. Fails before any I/O if a
    /// declared variable is missing.
    pub fn fill(&self, values: &HashMap<String, String>) -> Result<String, PipelineError> {
        for name in &self.variables {
            if !values.contains_key(name) {
                return Err(PipelineError::MissingVariable(name.clone()));
            }
        }

        // One pass over the template text: substituted values are never
        // re-scanned, so a value that itself contains `{name}` comes
        // through verbatim.
        let re = Regex::new(PLACEHOLDER_PATTERN).unwrap();
        let rendered = re.replace_all(&self.template, |caps: &regex::Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });

        Ok(rendered.into_owned())
    }
}
