use tera::{Context, Tera};

use crate::error::ExportError;

/// Names of the templates every generator registers.
pub const SUBJECT: &str = "subject";
pub const BODY: &str = "body";
pub const REPORT: &str = "report";

/// Compile a set of raw templates into one Tera instance.
///
/// Tera keys autoescaping on the template name suffix, so the caller lists
/// the names that produce HTML.
pub fn compile(
    templates: &[(&str, &str)],
    autoescape: Vec<&'static str>,
) -> Result<Tera, ExportError> {
    let mut tera = Tera::default();
    tera.autoescape_on(autoescape);
    for (name, content) in templates {
        tera.add_raw_template(name, content)
            .map_err(|e| ExportError::TemplateParse(format!("{name}: {e}")))?;
    }
    Ok(tera)
}

/// Render a compiled template against a JSON context.
///
/// The top-level keys of `value` become the template context variables.
pub fn render(tera: &Tera, name: &str, value: &serde_json::Value) -> Result<String, ExportError> {
    let context =
        Context::from_value(value.clone()).map_err(|e| ExportError::TemplateRender(e.to_string()))?;
    let rendered = tera.render(name, &context)?;
    Ok(rendered)
}
