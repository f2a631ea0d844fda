//! Content management for markdown-based pages.
//!
//! This module loads markdown files from `content/pages` at startup, parses
//! frontmatter metadata, and renders markdown to HTML. Pages that declare a
//! `menu` in their frontmatter appear in the matching navigation menu.
//!
//! ```markdown
//! ---
//! title: About Us
//! summary: Learn about our story
//! menu: company
//! order: 1
//! ---
//! ```

use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Navigation menu a page is listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuSection {
    /// Top-level links next to the dropdowns.
    Primary,
    Company,
    Support,
}

/// Frontmatter for content pages.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub menu: Option<MenuSection>,
    /// Position within the menu, ascending.
    #[serde(default)]
    pub order: u32,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// A navigation entry derived from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLink {
    pub title: String,
    pub summary: String,
    pub href: String,
}

/// Content store that holds all loaded content in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all content from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let pages = Self::load_pages(&content_dir.join("pages"))?;
        Ok(Self::from_pages(pages.into_values()))
    }

    /// Build a store from already-parsed pages.
    #[must_use]
    pub fn from_pages(pages: impl IntoIterator<Item = Page>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();
        Self {
            pages: Arc::new(pages),
        }
    }

    /// Load all pages from the pages directory
    fn load_pages(dir: &Path) -> Result<HashMap<String, Page>, ContentError> {
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(pages);
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(pages)
    }

    /// Load a single page from a markdown file
    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        parse_page(slug, &content)
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Links for a navigation menu, ordered by `order` then title.
    #[must_use]
    pub fn menu(&self, section: MenuSection) -> Vec<MenuLink> {
        let mut pages: Vec<&Page> = self
            .pages
            .values()
            .filter(|page| page.meta.menu == Some(section))
            .collect();
        pages.sort_by(|a, b| {
            a.meta
                .order
                .cmp(&b.meta.order)
                .then_with(|| a.meta.title.cmp(&b.meta.title))
        });
        pages
            .into_iter()
            .map(|page| MenuLink {
                title: page.meta.title.clone(),
                summary: page.meta.summary.clone().unwrap_or_default(),
                href: format!("/{}", page.slug),
            })
            .collect()
    }
}

/// Parse a markdown document with frontmatter into a page.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the frontmatter is missing or invalid.
pub fn parse_page(slug: String, content: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    let content_html = render_markdown(&parsed.content);

    Ok(Page {
        slug,
        meta,
        content_html,
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(slug: &str, frontmatter: &str) -> Page {
        parse_page(slug.to_string(), &format!("---\n{frontmatter}\n---\n\n# Heading\n\nBody text.\n"))
            .unwrap()
    }

    #[test]
    fn test_parse_page_renders_markdown() {
        let page = page("about-us", "title: About Us\nsummary: Learn about our story\nmenu: company\norder: 1");
        assert_eq!(page.meta.title, "About Us");
        assert_eq!(page.meta.menu, Some(MenuSection::Company));
        assert!(page.content_html.contains("<h1"));
        assert!(page.content_html.contains("<p>Body text.</p>"));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(parse_page("bare".to_string(), "# Just markdown").is_err());
    }

    #[test]
    fn test_menu_ordering() {
        let store = ContentStore::from_pages([
            page("faq", "title: FAQ\nmenu: support\norder: 2"),
            page("contact", "title: Contact Us\nmenu: support\norder: 1"),
            page("about-us", "title: About Us\nmenu: company\norder: 1"),
            page("terms", "title: Terms"),
        ]);

        let support = store.menu(MenuSection::Support);
        let titles: Vec<&str> = support.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Contact Us", "FAQ"]);
        assert_eq!(support[0].href, "/contact");

        assert_eq!(store.menu(MenuSection::Company).len(), 1);
        assert!(store.get_page("terms").is_some());
    }
}
