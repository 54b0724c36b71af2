//! README discovery and Markdown → HTML conversion.

use std::path::Path;

use pulldown_cmark::{html, Options, Parser};
use tracing::{debug, warn};

/// Checked in order; the first that exists wins.
pub const README_FILE_NAMES: &[&str] = &["README.md", "Readme.md", "readme.md", "README.markdown"];

/// Renders the module README, if there is one.
///
/// A missing README is normal. An unreadable one is logged and treated as
/// missing.
pub fn load(root: &Path) -> Option<String> {
    let path = README_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())?;

    match std::fs::read_to_string(&path) {
        Ok(src) => {
            debug!(file = %path.display(), "rendering readme");
            Some(render_markdown(&src))
        }
        Err(err) => {
            warn!(file = %path.display(), error = %err, "cannot read readme");
            None
        }
    }
}

pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_tables() {
        let html = render_markdown("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn missing_readme_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path()), None);
    }

    #[test]
    fn first_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.markdown"), "second").unwrap();
        std::fs::write(dir.path().join("README.md"), "*first*").unwrap();
        assert_eq!(load(dir.path()).as_deref(), Some("<p><em>first</em></p>\n"));
    }
}
