//! Card system: definitions, instances, and the catalog.
//!
//! ## Key Types
//!
//! - `CardCode`: Catalog identifier of a card definition
//! - `CardDefinition`: Static card data and its effect instructions
//! - `CardInstance`: One copy in a duel (modifiers, usage, attack flag)
//! - `Catalog`: Definition and deck recipe lookup
//!
//! ## Independent Copies
//!
//! Every instance owns a full clone of its definition. Nothing a duel does
//! to one copy can leak into another copy or back into the catalog.

pub mod catalog;
pub mod definition;
pub mod instance;

pub use catalog::{Catalog, DeckRecipe, DeckRules, STARTER_CATALOG};
pub use definition::{CardCode, CardDefinition, CardKind, SubType, SummonRequirement};
pub use instance::{CardInstance, InstanceId, PowerModifier};
