//! Redirect stubs at version-free page locations.
//!
//! A stub replaces `docs/<page>` and sends readers to the newest rendering
//! at `docs/<version>/<page>` through the theme's `versionredirect.html`
//! template.

use std::path::{Component, Path};

use verdocs_meta::{Mapping, MetaError, Value, write_front_matter};
use verdocs_version::DocVersion;

/// Theme template rendering the redirect.
pub const REDIRECT_TEMPLATE: &str = "versionredirect.html";

const TEMPLATE_KEY: &str = "template";
const REDIRECT_KEY: &str = "redirect";
const SEARCH_KEY: &str = "search";
const SEARCH_EXCLUDE_KEY: &str = "exclude";

/// A redirect from a version-free page to one of its renderings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectStub {
    /// Page title shown while the redirect loads.
    pub title: String,
    /// Markdown link to the rendered page, relative to the stub.
    pub link: String,
}

impl RedirectStub {
    /// Stub for the page at `page` (relative to the docs root) rendered
    /// under the directory of `version`.
    #[must_use]
    pub fn new(page: &Path, version: DocVersion, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: relative_link(page, version),
        }
    }

    /// Browser-facing redirect target.
    ///
    /// `index.md` pages resolve to their directory, other pages to their
    /// `.html` rendering.
    #[must_use]
    pub fn target(&self) -> String {
        if let Some(dir) = self.link.strip_suffix("index.md")
            && (dir.is_empty() || dir.ends_with('/'))
        {
            return dir.to_owned();
        }
        match self.link.strip_suffix(".md") {
            Some(stem) => format!("{stem}.html"),
            None => self.link.clone(),
        }
    }

    /// Markdown document of the stub.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter cannot be serialized.
    pub fn render(&self) -> Result<String, MetaError> {
        let mut search = Mapping::new();
        search.insert(Value::from(SEARCH_EXCLUDE_KEY), Value::Bool(true));
        let mut values = Mapping::new();
        values.insert(Value::from(TEMPLATE_KEY), Value::from(REDIRECT_TEMPLATE));
        values.insert(Value::from(REDIRECT_KEY), Value::from(self.target()));
        values.insert(Value::from(SEARCH_KEY), Value::Mapping(search));

        let title = &self.title;
        let body = format!(
            "# {title}\n\n[Latest version of {title}]({link})\nClick on the link if page doesn't load\n",
            link = self.link,
        );
        write_front_matter(&values, &body)
    }
}

/// Link from `docs/<page>` to `docs/<version>/<page>`.
fn relative_link(page: &Path, version: DocVersion) -> String {
    let segments: Vec<_> = page
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect();

    let mut link = "../".repeat(segments.len().saturating_sub(1));
    link.push_str(&version.to_string());
    for segment in &segments {
        link.push('/');
        link.push_str(segment);
    }
    link
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_link_for_top_level_page() {
        let stub = RedirectStub::new(Path::new("setup.md"), DocVersion::new(3), "Setup");
        assert_eq!(stub.link, "v3/setup.md");
        assert_eq!(stub.target(), "v3/setup.html");
    }

    #[test]
    fn test_link_for_nested_page() {
        let stub = RedirectStub::new(Path::new("guide/admin/setup.md"), DocVersion::new(3), "Setup");
        assert_eq!(stub.link, "../../v3/guide/admin/setup.md");
        assert_eq!(stub.target(), "../../v3/guide/admin/setup.html");
    }

    #[test]
    fn test_index_target_drops_filename() {
        let stub = RedirectStub::new(Path::new("guide/index.md"), DocVersion::new(2), "Guide");
        assert_eq!(stub.target(), "../v2/guide/");

        let root = RedirectStub::new(Path::new("index.md"), DocVersion::new(2), "Home");
        assert_eq!(root.target(), "v2/");
    }

    #[test]
    fn test_page_ending_in_index_is_not_an_index() {
        let stub = RedirectStub::new(Path::new("reindex.md"), DocVersion::new(2), "Reindex");
        assert_eq!(stub.target(), "v2/reindex.html");
    }

    #[test]
    fn test_render_stub() {
        let stub = RedirectStub::new(Path::new("guide/setup.md"), DocVersion::new(3), "Setup");
        assert_eq!(
            stub.render().unwrap(),
            "---\n\
             template: versionredirect.html\n\
             redirect: ../v3/guide/setup.html\n\
             search:\n  exclude: true\n\
             ---\n\
             # Setup\n\
             \n\
             [Latest version of Setup](../v3/guide/setup.md)\n\
             Click on the link if page doesn't load\n"
        );
    }

    #[test]
    fn test_render_quotes_awkward_paths() {
        let stub = RedirectStub::new(Path::new("faq/why: #1.md"), DocVersion::new(2), "Why");

        let rendered = stub.render().unwrap();

        let values = verdocs_meta::parse_front_matter(&rendered).unwrap();
        assert_eq!(
            values.get(REDIRECT_KEY),
            Some(&Value::from("../v2/faq/why: #1.html"))
        );
        assert_eq!(values.get(TEMPLATE_KEY), Some(&Value::from(REDIRECT_TEMPLATE)));
    }
}
