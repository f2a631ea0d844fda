//! Experience catalog.
//!
//! The catalog is small and loaded once at startup from
//! `content/experiences.json`. Consumers only see the [`CatalogAccessor`]
//! trait, so a paginated backend can replace [`StaticCatalog`] later without
//! touching the cart or search code.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use slash_core::ExperienceId;

/// A bookable experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Price in the store currency's standard unit.
    pub price: Decimal,
    pub image_url: String,
    /// Human-readable date or schedule ("Every Saturday", "12 Dec 2026").
    pub date: String,
}

impl Experience {
    /// Case-insensitive substring match on title, description or location.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
    }

    /// Path of the experience detail page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/experience/{}", urlencoding::encode(self.id.as_str()))
    }
}

/// Read-only access to the experience catalog.
pub trait CatalogAccessor: Send + Sync {
    /// All experiences, in catalog order.
    fn get_all(&self) -> &[Experience];

    /// Look up an experience by id.
    fn get(&self, id: &str) -> Option<&Experience> {
        self.get_all().iter().find(|e| e.id.as_str() == id)
    }
}

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate experience id: {0}")]
    DuplicateId(ExperienceId),
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    experiences: Vec<Experience>,
}

impl StaticCatalog {
    /// Build a catalog from experiences, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two experiences share an id.
    pub fn new(experiences: Vec<Experience>) -> Result<Self, CatalogError> {
        {
            let mut seen = HashSet::with_capacity(experiences.len());
            for experience in &experiences {
                if !seen.insert(experience.id.as_str()) {
                    return Err(CatalogError::DuplicateId(experience.id.clone()));
                }
            }
        }
        Ok(Self { experiences })
    }

    /// Load the catalog from a JSON array of experiences.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or contains
    /// duplicate ids.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let experiences: Vec<Experience> = serde_json::from_str(&raw)?;
        let catalog = Self::new(experiences)?;
        tracing::info!(
            count = catalog.experiences.len(),
            path = %path.display(),
            "Loaded experience catalog"
        );
        Ok(catalog)
    }
}

impl CatalogAccessor for StaticCatalog {
    fn get_all(&self) -> &[Experience] {
        &self.experiences
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Build an experience with a whole-unit price.
    pub fn experience(id: &str, title: &str, location: &str, price: i64) -> Experience {
        Experience {
            id: ExperienceId::new(id),
            title: title.to_string(),
            description: format!("{title} in {location}"),
            location: location.to_string(),
            price: Decimal::from(price),
            image_url: format!("/static/images/{id}.jpg"),
            date: "Every weekend".to_string(),
        }
    }

    /// A small catalog used across unit tests.
    #[allow(clippy::unwrap_used)]
    pub fn catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            experience("e1", "Spa Day", "Goa", 50),
            experience("e2", "Hot Air Balloon Ride", "Jaipur", 220),
            experience("e3", "Sunset Yacht Cruise", "Mumbai", 180),
            experience("e4", "Private Dining", "Bengaluru", 90),
        ])
        .unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{catalog, experience};
    use super::*;

    #[test]
    fn test_get_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.get("e3").unwrap().title, "Sunset Yacht Cruise");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = StaticCatalog::new(vec![
            experience("e1", "Spa Day", "Goa", 50),
            experience("e1", "Spa Night", "Goa", 60),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id.as_str() == "e1"));
    }

    #[test]
    fn test_matches_is_case_insensitive_on_all_fields() {
        let spa = experience("e1", "Spa Day", "Goa", 50);
        assert!(spa.matches("spa"));
        assert!(spa.matches("goa"));
        assert!(spa.matches("day in"));
        assert!(!spa.matches("yacht"));
    }

    #[test]
    fn test_parse_json_prices_as_strings() {
        let raw = r#"[{
            "id": "e9",
            "title": "Pottery Class",
            "description": "Throw your first bowl",
            "location": "Pune",
            "price": "45.50",
            "image_url": "/static/images/e9.jpg",
            "date": "Sundays"
        }]"#;
        let experiences: Vec<Experience> = serde_json::from_str(raw).unwrap();
        let catalog = StaticCatalog::new(experiences).unwrap();
        assert_eq!(catalog.get("e9").unwrap().price, Decimal::new(4550, 2));
    }

    #[test]
    fn test_url_encodes_id() {
        let e = experience("spa day", "Spa Day", "Goa", 50);
        assert_eq!(e.url(), "/experience/spa%20day");
    }
}
