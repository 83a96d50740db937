//! Jinja template rendering for outgoing notifications.
//!
//! Built-in templates are compiled into the binary. Files with the `.jinja`
//! extension found under the override directory replace built-ins with the same
//! relative name, so deployments can restyle emails without a rebuild.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Default override directory relative to the working directory
pub const TEMPLATE_DIR: &str = "templates/email";

/// Name of the report saved/updated email body
pub const REPORT_UPDATE_TEMPLATE: &str = "report_update.jinja";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    REPORT_UPDATE_TEMPLATE,
    include_str!("../../../templates/email/report_update.jinja"),
)];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Engine with only the compiled-in templates
    pub fn builtin() -> Self {
        let mut env = Environment::new();
        for &(name, source) in BUILTIN_TEMPLATES {
            if let Err(e) = env.add_template(name, source) {
                tracing::warn!("Failed to load built-in template {}: {}", name, e);
            }
        }
        Self { env }
    }

    /// Built-in templates, overridden by any `.jinja` files under `dir`
    pub fn with_overrides(dir: &Path) -> Self {
        let mut engine = Self::builtin();
        if dir.exists() {
            load_templates_recursive(&mut engine.env, dir, dir);
        }
        engine
    }

    pub fn render(
        &self,
        template_name: &str,
        ctx: &HashMap<&str, Value>,
    ) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        let render_ctx = Value::from_iter(ctx.iter().map(|(k, v)| (*k, v.clone())));

        template
            .render(render_ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

/// Recursively load all .jinja templates from a directory
fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(base_path) else {
            continue;
        };
        let template_name = relative.to_string_lossy().replace('\\', "/");
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                // Templates live for the whole process
                let static_name: &'static str = Box::leak(template_name.clone().into_boxed_str());
                let static_content: &'static str = Box::leak(content.into_boxed_str());
                if let Err(e) = env.add_template(static_name, static_content) {
                    tracing::warn!("Failed to load template {}: {}", template_name, e);
                } else {
                    tracing::debug!("Loaded template: {}", template_name);
                }
            }
            Err(e) => tracing::warn!("Failed to read template {}: {}", template_name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_ctx(version_count: i64) -> HashMap<&'static str, Value> {
        let mut ctx = HashMap::new();
        ctx.insert("report_title", Value::from("Diesel sheen"));
        ctx.insert("report_num", Value::from("2021-14"));
        ctx.insert("version_count", Value::from(version_count));
        ctx.insert("report_url", Value::from("https://example.org/report/2021-14"));
        ctx.insert("site_url", Value::from("https://example.org"));
        ctx.insert("pollutant", Value::from("Diesel"));
        ctx.insert("location", Value::from(()));
        ctx
    }

    #[test]
    fn test_render_builtin_report_update() {
        let engine = TemplateEngine::builtin();
        let html = engine
            .render(REPORT_UPDATE_TEMPLATE, &report_ctx(2))
            .unwrap();

        assert!(html.contains("Update #2"));
        assert!(html.contains("Diesel sheen"));
        assert!(html.contains("https://example.org/report/2021-14"));
        assert!(!html.contains("Location:"));
    }

    #[test]
    fn test_render_new_report_wording() {
        let engine = TemplateEngine::builtin();
        let html = engine
            .render(REPORT_UPDATE_TEMPLATE, &report_ctx(0))
            .unwrap();

        assert!(html.contains("Created"));
        assert!(!html.contains("Update #"));
    }

    #[test]
    fn test_missing_template() {
        let engine = TemplateEngine::builtin();
        let result = engine.render("nonexistent.jinja", &HashMap::new());
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_missing_override_dir_keeps_builtins() {
        let engine = TemplateEngine::with_overrides(Path::new("/definitely/not/here"));
        assert!(engine
            .render(REPORT_UPDATE_TEMPLATE, &report_ctx(1))
            .is_ok());
    }
}
