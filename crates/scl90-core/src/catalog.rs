//! Read-only item catalog.
//!
//! The catalog is the ordered list of assessment items, each tagged with the
//! dimension it contributes to, plus descriptors for those dimensions. Its
//! length is a property of the loaded content; nothing in the engine assumes
//! a particular item count.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::{AssessmentError, Result};

/// One statement the respondent rates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentItem {
    pub id: u32,
    pub dimension_id: String,
    pub text: String,
}

impl AssessmentItem {
    pub fn new(id: u32, dimension_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            dimension_id: dimension_id.into(),
            text: text.into(),
        }
    }
}

/// Reading text shown for a dimension at each severity level.
///
/// The very-high reading is composed from `high` when the report is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LevelTexts {
    pub low: String,
    pub moderate: String,
    pub high: String,
}

/// A named group of items averaged into one sub-score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interpretation: LevelTexts,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    dimensions: Vec<Dimension>,
    items: Vec<AssessmentItem>,
}

/// Ordered, validated item catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<AssessmentItem>,
    dimensions: Vec<Dimension>,
    positions: HashMap<u32, usize>,
}

impl Catalog {
    /// Build a catalog from items and dimension descriptors.
    ///
    /// Fails when there are no items, when item ids repeat, when an item
    /// references an undeclared dimension, or when a dimension is declared
    /// twice. Declared dimensions with no items are dropped.
    pub fn new(items: Vec<AssessmentItem>, dimensions: Vec<Dimension>) -> Result<Self> {
        if items.is_empty() {
            return Err(AssessmentError::InvalidCatalog(
                "catalog has no items".to_string(),
            ));
        }

        let mut declared = HashSet::new();
        for dim in &dimensions {
            if !declared.insert(dim.id.as_str()) {
                return Err(AssessmentError::InvalidCatalog(format!(
                    "dimension {} declared twice",
                    dim.id
                )));
            }
        }

        let mut positions = HashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if positions.insert(item.id, index).is_some() {
                return Err(AssessmentError::InvalidCatalog(format!(
                    "item id {} appears more than once",
                    item.id
                )));
            }
            if !declared.contains(item.dimension_id.as_str()) {
                return Err(AssessmentError::InvalidCatalog(format!(
                    "item {} references unknown dimension {}",
                    item.id, item.dimension_id
                )));
            }
        }

        let used: HashSet<&str> = items.iter().map(|i| i.dimension_id.as_str()).collect();
        let dimensions = dimensions
            .into_iter()
            .filter(|d| used.contains(d.id.as_str()))
            .collect();

        Ok(Self {
            items,
            dimensions,
            positions,
        })
    }

    /// Build a catalog whose dimension descriptors are derived from the item
    /// tags (name = id, no description), in first-appearance order.
    pub fn from_items(items: Vec<AssessmentItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        let dimensions = items
            .iter()
            .filter(|item| seen.insert(item.dimension_id.clone()))
            .map(|item| Dimension {
                id: item.dimension_id.clone(),
                name: item.dimension_id.clone(),
                ..Dimension::default()
            })
            .collect();
        Self::new(items, dimensions)
    }

    /// Parse a catalog from its JSON form:
    /// `{ "dimensions": [{id, name, description, interpretation}], "items": [{id, dimensionId, text}] }`.
    /// When `dimensions` is omitted it is derived from the items.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        if file.dimensions.is_empty() {
            Self::from_items(file.items)
        } else {
            Self::new(file.items, file.dimensions)
        }
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn items(&self) -> &[AssessmentItem] {
        &self.items
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Dimension ids in descriptor order.
    pub fn dimension_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.dimensions.iter().map(|d| d.id.as_str())
    }

    /// Number of items (N).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&AssessmentItem> {
        self.items.get(index)
    }

    pub fn index_of(&self, item_id: u32) -> Option<usize> {
        self.positions.get(&item_id).copied()
    }

    pub fn contains(&self, item_id: u32) -> bool {
        self.positions.contains_key(&item_id)
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    /// Display name for a dimension id, falling back to the id itself.
    pub fn dimension_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.dimension(id).map(|d| d.name.as_str()).unwrap_or(id)
    }
}
