//! HTML output.

use std::path::Path;

use tera::{Context, Tera};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Module;

/// Entry template of every bundle.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Templates and stylesheet the renderer works from.
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    /// `(name, source)` pairs; must include [`INDEX_TEMPLATE`].
    pub templates: Vec<(String, String)>,
    /// Inlined into the page.
    pub style: String,
}

impl TemplateBundle {
    /// The templates compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                (
                    INDEX_TEMPLATE.to_owned(),
                    include_str!("../templates/index.html").to_owned(),
                ),
                (
                    "macros.html".to_owned(),
                    include_str!("../templates/macros.html").to_owned(),
                ),
            ],
            style: include_str!("../templates/style.css").to_owned(),
        }
    }
}

#[derive(Debug)]
pub struct HtmlRenderer {
    tera: Tera,
    style: String,
}

impl HtmlRenderer {
    pub fn new(bundle: &TemplateBundle) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(
            bundle
                .templates
                .iter()
                .map(|(name, src)| (name.as_str(), src.as_str())),
        )?;
        tera.set_escape_fn(escape_html);
        Ok(Self {
            tera,
            style: bundle.style.clone(),
        })
    }

    pub fn render(&self, module: &Module) -> Result<String> {
        let mut context = Context::from_serialize(module)?;
        context.insert("style", &self.style);
        context.insert(
            "release_day",
            &module.release_date.format("%Y-%m-%d").to_string(),
        );
        Ok(self.tera.render(INDEX_TEMPLATE, &context)?)
    }
}

/// Tera's escaping, leaving `/` readable in paths and import references.
fn escape_html(input: &str) -> String {
    tera::escape_html(input).replace("&#x2F;", "/")
}

/// Writes a finished page.
pub fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Render {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, html).map_err(|source| Error::Render {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), bytes = html.len(), "wrote output");
    Ok(())
}
