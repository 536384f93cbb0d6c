//! Card catalog and deck recipes.
//!
//! The `Catalog` is the immutable master data a duel is built from: card
//! definitions keyed by code and named deck recipes. Lookups hand out
//! independent copies, so nothing a duel does can leak back into the
//! catalog.
//!
//! Catalogs are authored as JSON:
//!
//! ```
//! use card_duel::cards::Catalog;
//!
//! let catalog = Catalog::from_json(r#"{
//!     "cards": [
//!         { "code": "m003", "name": "Ember Rat", "kind": "monster", "level": 1, "power": 500 }
//!     ],
//!     "recipes": {
//!         "rats": { "name": "Rat Pack", "cards": ["m003", "m003"] }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(catalog.get_card("m003").unwrap().power, 500);
//! assert_eq!(catalog.get_recipe("rats").unwrap().cards.len(), 2);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::definition::{CardCode, CardDefinition};
use super::instance::{CardInstance, InstanceId};
use crate::core::error::{DuelError, DuelResult};
use crate::core::Side;

pub const STARTER_CATALOG: &str = include_str!("../../data/starter_catalog.json");

/// A named, ordered list of card codes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecipe {
    pub name: String,
    pub cards: Vec<CardCode>,
}

/// Deck construction limits.
///
/// The duel engine assumes it receives a validated list and never checks
/// these itself; deck editors call [`DeckRules::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRules {
    pub max_size: usize,
    pub max_copies: usize,
}

impl Default for DeckRules {
    fn default() -> Self {
        Self {
            max_size: 30,
            max_copies: 3,
        }
    }
}

impl DeckRules {
    /// Check size, copy counts and that every code exists in `catalog`.
    pub fn validate(&self, catalog: &Catalog, key: &str, recipe: &DeckRecipe) -> DuelResult<()> {
        let invalid = |reason: String| DuelError::InvalidDeck {
            recipe: key.to_string(),
            reason,
        };

        if recipe.cards.is_empty() {
            return Err(DuelError::EmptyRecipe(key.to_string()));
        }
        if recipe.cards.len() > self.max_size {
            return Err(invalid(format!(
                "{} cards exceeds the limit of {}",
                recipe.cards.len(),
                self.max_size
            )));
        }

        let mut copies: FxHashMap<&str, usize> = FxHashMap::default();
        for code in &recipe.cards {
            if !catalog.contains(code.as_str()) {
                return Err(DuelError::UnknownCard(code.to_string()));
            }
            let count = copies.entry(code.as_str()).or_insert(0);
            *count += 1;
            if *count > self.max_copies {
                return Err(invalid(format!(
                    "more than {} copies of `{}`",
                    self.max_copies, code
                )));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    cards: Vec<CardDefinition>,
    #[serde(default)]
    recipes: FxHashMap<String, DeckRecipe>,
}

/// Registry of card definitions and deck recipes.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    cards: FxHashMap<CardCode, CardDefinition>,
    recipes: FxHashMap<String, DeckRecipe>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled starter set.
    pub fn starter() -> DuelResult<Self> {
        Self::from_json(STARTER_CATALOG)
    }

    /// Parse a catalog document. Duplicate codes are rejected.
    pub fn from_json(json: &str) -> DuelResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for card in document.cards {
            catalog.register(card)?;
        }
        for (key, recipe) in document.recipes {
            catalog.register_recipe(key, recipe);
        }
        debug!(cards = catalog.len(), recipes = catalog.recipes.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Register a card definition.
    pub fn register(&mut self, card: CardDefinition) -> DuelResult<()> {
        if self.cards.contains_key(&card.code) {
            return Err(DuelError::DuplicateCard(card.code.to_string()));
        }
        self.cards.insert(card.code.clone(), card);
        Ok(())
    }

    /// Register or replace a deck recipe.
    pub fn register_recipe(&mut self, key: impl Into<String>, recipe: DeckRecipe) {
        self.recipes.insert(key.into(), recipe);
    }

    /// An independent copy of a card definition.
    #[must_use]
    pub fn get_card(&self, code: &str) -> Option<CardDefinition> {
        self.cards.get(code).cloned()
    }

    /// Borrow a definition without copying.
    #[must_use]
    pub fn definition(&self, code: &str) -> Option<&CardDefinition> {
        self.cards.get(code)
    }

    #[must_use]
    pub fn get_recipe(&self, key: &str) -> Option<&DeckRecipe> {
        self.recipes.get(key)
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.cards.contains_key(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Recipe keys, sorted.
    #[must_use]
    pub fn recipe_keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.recipes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Instantiate a recipe in recipe order, allocating ids with `next_id`.
    ///
    /// Fails without allocating anything when the recipe is unknown, empty
    /// or names a card the catalog does not have.
    pub fn build_deck(
        &self,
        key: &str,
        owner: Side,
        mut next_id: impl FnMut() -> InstanceId,
    ) -> DuelResult<Vec<CardInstance>> {
        let recipe = self
            .get_recipe(key)
            .ok_or_else(|| DuelError::UnknownRecipe(key.to_string()))?;
        if recipe.cards.is_empty() {
            return Err(DuelError::EmptyRecipe(key.to_string()));
        }

        let definitions = recipe
            .cards
            .iter()
            .map(|code| {
                self.get_card(code.as_str())
                    .ok_or_else(|| DuelError::UnknownCard(code.to_string()))
            })
            .collect::<DuelResult<Vec<_>>>()?;

        Ok(definitions
            .into_iter()
            .map(|definition| CardInstance::new(next_id(), owner, definition))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register(CardDefinition::monster("a", "A", 1, 100)).unwrap();
        catalog.register(CardDefinition::spell("b", "B")).unwrap();
        catalog.register_recipe(
            "ab",
            DeckRecipe {
                name: "AB".into(),
                cards: vec!["a".into(), "a".into(), "b".into()],
            },
        );
        catalog
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = tiny();
        let err = catalog.register(CardDefinition::monster("a", "Again", 1, 1)).unwrap_err();
        assert!(matches!(err, DuelError::DuplicateCard(code) if code == "a"));
    }

    #[test]
    fn test_get_card_is_a_copy() {
        let catalog = tiny();
        let mut copy = catalog.get_card("a").unwrap();
        copy.power = 9999;
        assert_eq!(catalog.definition("a").unwrap().power, 100);
        assert!(catalog.get_card("zzz").is_none());
    }

    #[test]
    fn test_build_deck_in_recipe_order() {
        let catalog = tiny();
        let mut next = 10;
        let deck = catalog
            .build_deck("ab", Side::Opponent, || {
                next += 1;
                InstanceId::new(next)
            })
            .unwrap();

        let codes: Vec<_> = deck.iter().map(|c| c.code().as_str()).collect();
        assert_eq!(codes, vec!["a", "a", "b"]);
        assert_eq!(deck[0].id, InstanceId::new(11));
        assert!(deck.iter().all(|c| c.owner == Side::Opponent));
    }

    #[test]
    fn test_build_deck_missing_card() {
        let mut catalog = tiny();
        catalog.register_recipe(
            "broken",
            DeckRecipe {
                name: "Broken".into(),
                cards: vec!["a".into(), "ghost".into()],
            },
        );

        let err = catalog.build_deck("broken", Side::Player, || InstanceId::new(0)).unwrap_err();
        assert!(matches!(err, DuelError::UnknownCard(code) if code == "ghost"));
    }

    #[test]
    fn test_build_deck_unknown_and_empty_recipe() {
        let mut catalog = tiny();
        catalog.register_recipe("empty", DeckRecipe { name: "Empty".into(), cards: vec![] });

        assert!(matches!(
            catalog.build_deck("nope", Side::Player, || InstanceId::new(0)),
            Err(DuelError::UnknownRecipe(_))
        ));
        assert!(matches!(
            catalog.build_deck("empty", Side::Player, || InstanceId::new(0)),
            Err(DuelError::EmptyRecipe(_))
        ));
    }

    #[test]
    fn test_deck_rules() {
        let catalog = tiny();
        let rules = DeckRules { max_size: 3, max_copies: 2 };
        assert!(rules.validate(&catalog, "ab", catalog.get_recipe("ab").unwrap()).is_ok());

        let too_many = DeckRecipe {
            name: "x".into(),
            cards: vec!["a".into(), "a".into(), "a".into()],
        };
        assert!(matches!(
            rules.validate(&catalog, "x", &too_many),
            Err(DuelError::InvalidDeck { .. })
        ));

        let too_big = DeckRecipe {
            name: "y".into(),
            cards: vec![CardCode::from("b"); 4],
        };
        assert!(rules.validate(&catalog, "y", &too_big).is_err());
    }

    #[test]
    fn test_starter_catalog_loads() {
        let catalog = Catalog::starter().unwrap();
        let recipe = catalog.get_recipe("starter_fire").unwrap();
        assert_eq!(recipe.cards.len(), 20);
        for code in &recipe.cards {
            assert!(catalog.contains(code.as_str()), "missing {}", code);
        }
        for key in catalog.recipe_keys() {
            let recipe = catalog.get_recipe(key).unwrap();
            DeckRules::default().validate(&catalog, key, recipe).unwrap();
        }
    }

    #[test]
    fn test_starter_reference_cards() {
        let catalog = Catalog::starter().unwrap();
        let king = catalog.get_card("m005").unwrap();
        assert_eq!(king.level, 4);
        assert_eq!(king.power, 1500);
        assert_eq!(king.effects.len(), 2);
    }
}
