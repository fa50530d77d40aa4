//! Layer tinting and derived tint rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Category;
use crate::color::{Rgb, darken_rgb};
use crate::raster::Raster;

/// How a derived tint is computed from its source tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(tag = "type", content = "amount", rename_all = "camelCase")]
pub enum TintTransform {
    /// Use the source tint unchanged.
    Mirror,
    /// Darken the source tint by a fraction in `0.0..=1.0`.
    Darken(f32),
}

impl TintTransform {
    pub fn apply(self, color: Rgb) -> Rgb {
        match self {
            TintTransform::Mirror => color,
            TintTransform::Darken(fraction) => darken_rgb(color, fraction),
        }
    }
}

/// Derives the tint of `target` from the tint of `source`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct TintRule {
    pub target: Category,
    pub source: Category,
    pub transform: TintTransform,
}

impl TintRule {
    pub fn new(target: Category, source: Category, transform: TintTransform) -> Self {
        Self {
            target,
            source,
            transform,
        }
    }

    /// Skin-tone and hair-color coupling used by the stock character art.
    pub fn defaults() -> Vec<TintRule> {
        vec![
            TintRule::new(Category::Back, Category::Hair, TintTransform::Darken(0.07)),
            TintRule::new(Category::Nose, Category::Base, TintTransform::Mirror),
            TintRule::new(Category::Ears, Category::Base, TintTransform::Mirror),
            TintRule::new(Category::Mouth, Category::Base, TintTransform::Darken(0.06)),
        ]
    }
}

/// Resolves the tint every category is drawn with.
///
/// Explicit tints always win. Rules are applied in table order, and a rule
/// only fires when its target has no tint yet and its source has one, so a
/// rule may read a tint derived by an earlier rule.
pub fn effective_tints(
    explicit: &BTreeMap<Category, Rgb>,
    rules: &[TintRule],
) -> BTreeMap<Category, Rgb> {
    let mut tints = explicit.clone();
    for rule in rules {
        if tints.contains_key(&rule.target) {
            continue;
        }
        if let Some(&source) = tints.get(&rule.source) {
            tints.insert(rule.target, rule.transform.apply(source));
        }
    }
    tints
}

/// Returns a copy of `fill` recolored with `tint` inside its own silhouette.
pub fn tint_layer(fill: &Raster, tint: Rgb) -> Raster {
    let mut scratch = fill.clone();
    scratch.fill_atop(tint);
    scratch
}
