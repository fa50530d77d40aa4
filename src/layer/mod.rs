//! Layer infrastructure for character composition.
//!
//! This module holds the per-category selection state used by the studio and
//! turns it into a [`RenderPlan`]: the ordered list of assets to draw and the
//! tint each one receives.
//!
//! # Architecture
//!
//! Each [`Category`] owns a [`LayerSlot`] holding the chosen asset, an
//! explicit tint and a version number. The version increments on any state
//! change, and the sum of all slot versions identifies a composite so that an
//! unchanged selection never re-renders.
//!
//! Cross-category behavior is declarative rather than wired into event
//! handlers:
//! - [`TintRule`]s derive a category's tint from another category's tint
//! - [`CompanionRule`]s derive a category's asset from another category's
//!   selection (the back of the hair follows the chosen hairstyle)
//!
//! Both tables are evaluated on every [`LayerStack::plan`] call.

pub mod compose;
pub mod tint;

pub use compose::{AssetCache, PreparedFrame, PreparedLayer, compose, compose_into, prepare};
pub use tint::{TintRule, TintTransform, effective_tints, tint_layer};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, LayerAsset};
use crate::color::Rgb;

// ============================================================================
// Category
// ============================================================================

/// A visual layer category of the character.
///
/// Serialized with the keys used by the asset manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Category {
    #[serde(rename = "espalda")]
    Back,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "nariz")]
    Nose,
    #[serde(rename = "boca")]
    Mouth,
    #[serde(rename = "ojos")]
    Eyes,
    #[serde(rename = "barba")]
    Beard,
    #[serde(rename = "ropa")]
    Clothes,
    #[serde(rename = "peinado")]
    Hair,
    #[serde(rename = "orejas")]
    Ears,
    #[serde(rename = "cejas")]
    Eyebrows,
    #[serde(rename = "accesorio")]
    Accessory,
}

impl Category {
    /// Default stacking order, bottom to top.
    pub const RENDER_ORDER: [Category; 11] = [
        Category::Back,
        Category::Base,
        Category::Nose,
        Category::Mouth,
        Category::Eyes,
        Category::Beard,
        Category::Clothes,
        Category::Hair,
        Category::Ears,
        Category::Eyebrows,
        Category::Accessory,
    ];

    /// Every category.
    pub const ALL: [Category; 11] = Self::RENDER_ORDER;

    /// The manifest key of this category.
    pub fn key(self) -> &'static str {
        match self {
            Category::Back => "espalda",
            Category::Base => "base",
            Category::Nose => "nariz",
            Category::Mouth => "boca",
            Category::Eyes => "ojos",
            Category::Beard => "barba",
            Category::Clothes => "ropa",
            Category::Hair => "peinado",
            Category::Ears => "orejas",
            Category::Eyebrows => "cejas",
            Category::Accessory => "accesorio",
        }
    }

    /// Looks up a category by manifest key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown category '{}'", s))
    }
}

// ============================================================================
// Companion Rules
// ============================================================================

/// Derives `target`'s asset from `source`'s selection by matching asset id.
///
/// While a companion rule exists for a category, any direct selection of that
/// category is ignored by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CompanionRule {
    pub target: Category,
    pub source: Category,
}

impl CompanionRule {
    /// The back of the hairstyle follows the selected hairstyle.
    pub fn defaults() -> Vec<CompanionRule> {
        vec![CompanionRule {
            target: Category::Back,
            source: Category::Hair,
        }]
    }
}

// ============================================================================
// LayerSlot
// ============================================================================

/// Selection state of one category.
///
/// The slot tracks:
/// - The chosen asset, if any
/// - An explicit tint, if any
/// - A version number that increments on any state change
#[derive(Debug, Clone, Default)]
pub struct LayerSlot {
    asset: Option<LayerAsset>,
    tint: Option<Rgb>,
    version: u64,
}

impl LayerSlot {
    /// Returns the selected asset, if any.
    pub fn asset(&self) -> Option<&LayerAsset> {
        self.asset.as_ref()
    }

    /// Returns the explicit tint, if any.
    pub fn tint(&self) -> Option<Rgb> {
        self.tint
    }

    /// Returns the current version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sets the selected asset. Returns true if it changed.
    pub fn set_asset(&mut self, asset: Option<LayerAsset>) -> bool {
        if self.asset == asset {
            return false;
        }
        self.asset = asset;
        self.version = self.version.wrapping_add(1);
        true
    }

    /// Sets the explicit tint. Returns true if it changed.
    pub fn set_tint(&mut self, tint: Option<Rgb>) -> bool {
        if self.tint == tint {
            return false;
        }
        self.tint = tint;
        self.version = self.version.wrapping_add(1);
        true
    }
}

// ============================================================================
// Render Plan
// ============================================================================

/// One layer to draw, with its resolved tint.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLayer {
    pub category: Category,
    pub asset: LayerAsset,
    pub tint: Option<Rgb>,
}

/// Everything the compositor needs to know, in drawing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPlan {
    /// Shared guide reference, drawn beneath every layer.
    pub guide: Option<String>,
    /// Layers, bottom to top.
    pub layers: Vec<PlannedLayer>,
}

/// Rule tables consulted while planning.
#[derive(Debug, Clone, Copy)]
pub struct PlanRules<'a> {
    pub render_order: &'a [Category],
    pub tint_rules: &'a [TintRule],
    pub companion_rules: &'a [CompanionRule],
    pub include_guide: bool,
}

// ============================================================================
// LayerStack
// ============================================================================

/// Selection state of every category.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    slots: BTreeMap<Category, LayerSlot>,
}

impl LayerStack {
    /// Creates a stack with the first asset of every category selected and
    /// no tints.
    pub fn with_defaults(catalog: &Catalog) -> Self {
        let mut stack = Self::default();
        stack.select_defaults(catalog);
        stack
    }

    /// Selects the first asset of every category and clears all tints.
    pub fn select_defaults(&mut self, catalog: &Catalog) {
        for category in Category::ALL {
            let slot = self.slots.entry(category).or_default();
            slot.set_asset(catalog.first(category).cloned());
            slot.set_tint(None);
        }
    }

    /// Returns the slot for a category.
    pub fn slot(&self, category: Category) -> Option<&LayerSlot> {
        self.slots.get(&category)
    }

    /// Returns the slot for a category, creating an empty one if needed.
    pub fn slot_mut(&mut self, category: Category) -> &mut LayerSlot {
        self.slots.entry(category).or_default()
    }

    /// Combined version of every slot.
    ///
    /// Versions only grow, so the sum changes whenever any slot changes.
    pub fn version(&self) -> u64 {
        self.slots
            .values()
            .fold(0u64, |acc, slot| acc.wrapping_add(slot.version()))
    }

    /// Explicit tints of every category that has one.
    pub fn explicit_tints(&self) -> BTreeMap<Category, Rgb> {
        self.slots
            .iter()
            .filter_map(|(category, slot)| slot.tint().map(|t| (*category, t)))
            .collect()
    }

    /// Resolves the current selection into an ordered plan.
    pub fn plan(&self, catalog: &Catalog, rules: PlanRules<'_>) -> RenderPlan {
        let tints = effective_tints(&self.explicit_tints(), rules.tint_rules);

        let layers = rules
            .render_order
            .iter()
            .filter_map(|&category| {
                let asset = self.resolve_asset(catalog, category, rules.companion_rules)?;
                Some(PlannedLayer {
                    category,
                    asset,
                    tint: tints.get(&category).copied(),
                })
            })
            .collect();

        RenderPlan {
            guide: rules
                .include_guide
                .then(|| catalog.guide().map(str::to_owned))
                .flatten(),
            layers,
        }
    }

    fn resolve_asset(
        &self,
        catalog: &Catalog,
        category: Category,
        companions: &[CompanionRule],
    ) -> Option<LayerAsset> {
        match companions.iter().find(|rule| rule.target == category) {
            Some(rule) => {
                let leader = self.slot(rule.source)?.asset()?;
                catalog.find(category, &leader.id).cloned()
            }
            None => self.slot(category)?.asset().cloned(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
