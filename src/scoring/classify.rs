//! Grocery store affordability classification.
//!
//! [`GroceryTaxonomy`] holds the keyword lists and point weights for each
//! [`GroceryTier`]. It is an immutable value handed to the classifier, so
//! alternate taxonomies can be loaded from disk or built in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroceryTier {
    Budget,
    Regular,
    Premium,
}

impl fmt::Display for GroceryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroceryTier::Budget => "budget",
            GroceryTier::Regular => "regular",
            GroceryTier::Premium => "premium",
        };
        f.write_str(s)
    }
}

/// Point weight and name keywords for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub weight: i32,
    pub stores: Vec<String>,
}

impl TierRule {
    fn new(weight: i32, stores: &[&str]) -> Self {
        Self {
            weight,
            stores: stores.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(&self, name_lower: &str) -> bool {
        self.stores.iter().any(|kw| name_lower.contains(kw.as_str()))
    }
}

/// Keyword taxonomy for grocery store classification.
///
/// Stored on disk as JSON:
/// ```json
/// {
///   "budget":  { "weight": 10, "stores": ["trader joe", "aldi"] },
///   "regular": { "weight": 5,  "stores": ["shoprite"] },
///   "premium": { "weight": -3, "stores": ["whole foods"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryTaxonomy {
    pub budget: TierRule,
    pub regular: TierRule,
    pub premium: TierRule,
}

impl Default for GroceryTaxonomy {
    fn default() -> Self {
        Self {
            budget: TierRule::new(
                10,
                &[
                    "trader joe",
                    "aldi",
                    "costco",
                    "target",
                    "stop & shop",
                    "stop and shop",
                    "key food",
                    "c-town",
                    "ctown",
                ],
            ),
            regular: TierRule::new(
                5,
                &["food bazaar", "associated", "met fresh", "shoprite", "shop rite"],
            ),
            premium: TierRule::new(
                -3,
                &[
                    "whole foods",
                    "dean & deluca",
                    "dean and deluca",
                    "gourmet garage",
                    "fairway market",
                    "fairway",
                ],
            ),
        }
    }
}

impl GroceryTaxonomy {
    /// Loads a taxonomy from a JSON file at `path`. Keywords are lower-cased.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Taxonomy {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut taxonomy: GroceryTaxonomy =
            serde_json::from_str(&content).map_err(|e| ConfigError::Taxonomy {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        for rule in [
            &mut taxonomy.budget,
            &mut taxonomy.regular,
            &mut taxonomy.premium,
        ] {
            for kw in rule.stores.iter_mut() {
                *kw = kw.to_lowercase();
            }
        }

        Ok(taxonomy)
    }

    /// Classifies a store by display name.
    ///
    /// Budget keywords win over premium ones, which win over regular ones.
    /// Unrecognized names are regular.
    pub fn classify(&self, store_name: &str) -> GroceryTier {
        let name = store_name.to_lowercase();

        if self.budget.matches(&name) {
            GroceryTier::Budget
        } else if self.premium.matches(&name) {
            GroceryTier::Premium
        } else {
            // regular keywords and unknown names land in the same tier
            GroceryTier::Regular
        }
    }

    pub fn weight(&self, tier: GroceryTier) -> i32 {
        match tier {
            GroceryTier::Budget => self.budget.weight,
            GroceryTier::Regular => self.regular.weight,
            GroceryTier::Premium => self.premium.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_known_store_names() {
        let t = GroceryTaxonomy::default();
        assert_eq!(t.classify("Trader Joe's"), GroceryTier::Budget);
        assert_eq!(t.classify("Whole Foods Market"), GroceryTier::Premium);
        assert_eq!(t.classify("SHOPRITE of Brooklyn"), GroceryTier::Regular);
        assert_eq!(t.classify("Corner Deli & Grocery"), GroceryTier::Regular);
    }

    #[test]
    fn test_budget_checked_before_premium() {
        // contains both "target" and "fairway"
        let t = GroceryTaxonomy::default();
        assert_eq!(t.classify("Fairway by Target"), GroceryTier::Budget);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let t = GroceryTaxonomy::default();
        for name in ["Aldi", "Gourmet Garage", "Unknown Bodega", ""] {
            assert_eq!(t.classify(name), t.classify(name));
        }
    }

    #[test]
    fn test_injected_taxonomy() {
        let t = GroceryTaxonomy {
            budget: TierRule::new(1, &["lidl"]),
            regular: TierRule::new(1, &[]),
            premium: TierRule::new(-1, &["trader joe"]),
        };
        assert_eq!(t.classify("Lidl"), GroceryTier::Budget);
        assert_eq!(t.classify("Trader Joe's"), GroceryTier::Premium);
    }

    #[test]
    fn test_load_lowercases_keywords() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "budget":  {{ "weight": 8, "stores": ["LIDL"] }},
                "regular": {{ "weight": 4, "stores": [] }},
                "premium": {{ "weight": -2, "stores": ["Eataly"] }}
            }}"#
        )
        .unwrap();

        let t = GroceryTaxonomy::load(file.path()).unwrap();
        assert_eq!(t.budget.weight, 8);
        assert_eq!(t.classify("lidl express"), GroceryTier::Budget);
        assert_eq!(t.classify("EATALY Flatiron"), GroceryTier::Premium);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = GroceryTaxonomy::load("/nonexistent/taxonomy.json").unwrap_err();
        assert!(matches!(err, ConfigError::Taxonomy { .. }));
    }
}
