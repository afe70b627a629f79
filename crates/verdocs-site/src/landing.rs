//! The unversioned landing page and landing manifest.
//!
//! `docs/index.md` and `docs/.pages` sit outside the versioned tree and link
//! into it through `current/`. Their rendered copies link to the newest
//! requested version instead.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::{CURRENT_DIR, INDEX_PAGE, MANIFEST_NAME};
use crate::render::RenderContext;

/// `current/` where it starts a path segment: at a line start, or after
/// whitespace, `:`, `-`, a quote, a bracket or `/`.
static CURRENT_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(?m)(^|[\s:'"/(\[-]){CURRENT_DIR}/"#)).unwrap()
});

/// Rewrite markdown links `(current/…` to `(<latest>/…`.
#[must_use]
pub fn rewrite_landing_page(content: &str, latest: &str) -> String {
    content.replace(&format!("({CURRENT_DIR}/"), &format!("({latest}/"))
}

/// Rewrite manifest references `current/…` to `<latest>/…`.
///
/// Only a whole `current` path segment is replaced, so `concurrent/` and
/// `recurrent/` stay as they are.
#[must_use]
pub fn rewrite_landing_manifest(content: &str, latest: &str) -> String {
    CURRENT_SEGMENT_RE
        .replace_all(content, |caps: &Captures| format!("{}{latest}/", &caps[1]))
        .into_owned()
}

/// Render whichever landing files exist. Returns the number written.
pub(crate) fn render_landing(ctx: &RenderContext<'_>) -> usize {
    let Some(latest) = ctx.config.latest() else {
        return 0;
    };
    let latest = latest.to_string();
    let files: [(&str, fn(&str, &str) -> String); 2] = [
        (INDEX_PAGE, rewrite_landing_page),
        (MANIFEST_NAME, rewrite_landing_manifest),
    ];

    let mut written = 0;
    for (name, rewrite) in files {
        let source = ctx.config.docs_source().join(name);
        if !ctx.storage.is_file(&source) {
            continue;
        }
        match ctx.storage.read(&source) {
            Ok(content) => {
                let target = ctx.config.docs_target().join(name);
                written += usize::from(ctx.write(&target, &rewrite(&content, &latest)));
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), error = %e, "Failed to read landing file");
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use verdocs_storage::FsStorage;
    use verdocs_version::DocVersion;

    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_rewrite_landing_page_only_touches_links() {
        let content = "# Welcome\n\nSee [the guide](current/guide/index.md).\nThe current/ tree is versioned.\n";

        assert_eq!(
            rewrite_landing_page(content, "v3"),
            "# Welcome\n\nSee [the guide](v3/guide/index.md).\nThe current/ tree is versioned.\n"
        );
    }

    #[test]
    fn test_rewrite_landing_manifest() {
        let content = "nav:\n- index.md\n- Guide: current/guide\n";

        assert_eq!(
            rewrite_landing_manifest(content, "v2.1"),
            "nav:\n- index.md\n- Guide: v2.1/guide\n"
        );
    }

    #[test]
    fn test_rewrite_landing_manifest_keeps_similar_segments() {
        let content = "nav:\n- Docs: current/\n- Concurrency: concurrent/index.md\n- 'current/faq.md'\n- archive/current/old.md\n";

        assert_eq!(
            rewrite_landing_manifest(content, "v2"),
            "nav:\n- Docs: v2/\n- Concurrency: concurrent/index.md\n- 'v2/faq.md'\n- archive/v2/old.md\n"
        );
    }

    #[test]
    fn test_render_landing_writes_existing_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(source.join("docs")).unwrap();
        std::fs::write(source.join("docs/index.md"), "[Start](current/start.md)\n").unwrap();
        let config = SiteConfig::new(&source, &target, [DocVersion::new(1), DocVersion::new(2)]);
        let storage = FsStorage::new();

        let written = render_landing(&RenderContext::new(&config, &storage));

        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read_to_string(target.join("docs/index.md")).unwrap(),
            "[Start](v2/start.md)\n"
        );
        assert!(!target.join("docs/.pages").exists());
    }
}
