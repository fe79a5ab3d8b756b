use crate::types::{PipelineError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Slug used when a source line appears before any header, or when a header
/// name sanitizes down to nothing.
pub const DEFAULT_SLUG: &str = "other";

/// A named group of feed URLs producing one output document.
#[derive(Debug, Clone)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub feeds: Vec<String>,
}

/// The parsed feed list: categories in first-appearance order, sources in
/// file order within each category.
#[derive(Debug, Default)]
pub struct FeedList {
    categories: Vec<Category>,
}

impl FeedList {
    /// Read and parse the feed list file. A missing file is a configuration
    /// error, not an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|_| PipelineError::FeedListMissing {
            path: path.to_path_buf(),
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse the line-oriented feed list grammar:
    /// `# ===== Name =====` opens (or re-opens) a category, other `#` lines
    /// are comments, anything else is a feed URL for the current category.
    pub fn parse(text: &str) -> Self {
        let mut list = FeedList::default();
        let mut current_slug = DEFAULT_SLUG.to_string();
        let mut current_name = DEFAULT_SLUG.to_string();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = parse_header(line) {
                let slug = slugify(name);
                if !list.categories.iter().any(|c| c.slug == slug) {
                    list.categories.push(Category {
                        slug: slug.clone(),
                        name: name.to_string(),
                        feeds: Vec::new(),
                    });
                } else {
                    // Colliding slug: continuation of the existing category.
                    debug!("Category header '{}' merges into slug '{}'", name, slug);
                }
                current_slug = slug;
                current_name = name.to_string();
            } else if line.starts_with('#') {
                continue;
            } else {
                let category = list.ensure(&current_slug, &current_name);
                category.feeds.push(line.to_string());
            }
        }

        list
    }

    fn ensure(&mut self, slug: &str, name: &str) -> &mut Category {
        if let Some(pos) = self.categories.iter().position(|c| c.slug == slug) {
            return &mut self.categories[pos];
        }
        self.categories.push(Category {
            slug: slug.to_string(),
            name: name.to_string(),
            feeds: Vec::new(),
        });
        self.categories.last_mut().unwrap()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Extract the display name from a `# ===== Name =====` header line.
/// Repeated markers are required on both sides; a lone `=` is just a comment.
fn parse_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?.trim();
    if !rest.starts_with("==") || !rest.ends_with("==") {
        return None;
    }
    let name = rest.trim_matches('=').trim();
    (!name.is_empty()).then_some(name)
}

/// Derive a filesystem-safe slug from a category display name: lowercase,
/// parenthetical segments removed, non-alphanumeric runs collapsed to a
/// single underscore, leading/trailing underscores trimmed.
pub fn slugify(name: &str) -> String {
    let mut stripped = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' | '（' => depth += 1,
            ')' | '）' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(c),
            _ => {}
        }
    }

    let mut slug = String::with_capacity(stripped.len());
    let mut prev_sep = true;
    for c in stripped.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            prev_sep = false;
        } else if !prev_sep {
            slug.push('_');
            prev_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}
