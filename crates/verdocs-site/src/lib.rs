//! Version resolution and multi-version site rendering for verdocs.
//!
//! The source tree keeps every page once under `docs/current/`. Pages that
//! change between releases get additional variations named with a version
//! infix (`setup.v2.md`), and directories may carry versioned navigation
//! manifests (`v2.pages`). This crate renders one output tree per requested
//! version from that single source tree.
//!
//! # Architecture
//!
//! - [`PageVariation`]: one source file and the version range it covers
//! - [`LogicalPage`] and [`resolve_variations`]: per-version page resolution
//! - [`MenuGroup`], [`resolve_manifest`] and [`prune_manifest`]: manifests
//! - [`SiteIndex`]: registry of pages and manifests with staged rendering
//! - [`Preprocessor`]: build and watch pipeline over a [`Storage`] backend
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use verdocs_site::{Preprocessor, SiteConfig};
//! use verdocs_storage::FsStorage;
//! use verdocs_version::DocVersion;
//!
//! let mut config = SiteConfig::new(".", "build", [DocVersion::new(1), DocVersion::new(2)]);
//! config.generate_redirects = true;
//! let mut processor = Preprocessor::new(config, Arc::new(FsStorage::new()));
//! let report = processor.process_files()?;
//! println!("{} files", report.files_processed);
//! # Ok(())
//! # }
//! ```
//!
//! [`Storage`]: verdocs_storage::Storage

mod config;
mod landing;
mod menu;
mod page;
mod processor;
mod redirect;
mod render;
mod site;
mod variation;

pub use config::{
    CURRENT_DIR, DOCS_DIR, INDEX_PAGE, LATEST_DIR, MANIFEST_NAME, MKDOCS_CONFIG, SiteConfig,
};
pub use landing::{rewrite_landing_manifest, rewrite_landing_page};
pub use menu::{MenuGroup, NAV_KEY, prune_manifest, resolve_manifest};
pub use page::{LogicalPage, resolve_variations};
pub use processor::{BuildReport, Preprocessor, ProcessError};
pub use redirect::{REDIRECT_TEMPLATE, RedirectStub};
pub use render::{ALL_VERSIONS_KEY, IS_LATEST_KEY, THIS_VERSION_KEY, stamp_versions};
pub use site::{IndexError, Indexed, PathKind, RenderStage, SiteIndex};
pub use variation::PageVariation;
