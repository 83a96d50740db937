pub mod engine;

pub use engine::{TemplateEngine, TemplateError, REPORT_UPDATE_TEMPLATE, TEMPLATE_DIR};
