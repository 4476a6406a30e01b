//! Categorized clothing recommendations

use serde::{Serialize, Serializer};
use std::fmt;

/// Layering category of a clothing item, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    BaseLayer,
    Bottoms,
    MidLayer,
    OuterLayer,
    Accessories,
    Footwear,
}

impl Category {
    /// Fixed display order
    pub const ORDER: [Category; 6] = [
        Category::BaseLayer,
        Category::Bottoms,
        Category::MidLayer,
        Category::OuterLayer,
        Category::Accessories,
        Category::Footwear,
    ];

    /// Keyword classification order. Narrower vocabularies come first so
    /// "sweatshirt" lands in Mid Layer before "shirt" can claim it.
    const MATCH_ORDER: [Category; 6] = [
        Category::Footwear,
        Category::Bottoms,
        Category::OuterLayer,
        Category::MidLayer,
        Category::BaseLayer,
        Category::Accessories,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::BaseLayer => "Base Layer",
            Category::Bottoms => "Bottoms",
            Category::MidLayer => "Mid Layer",
            Category::OuterLayer => "Outer Layer",
            Category::Accessories => "Accessories",
            Category::Footwear => "Footwear",
        }
    }

    /// Emoji used when an item doesn't bring its own
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Category::BaseLayer => "👕",
            Category::Bottoms => "👖",
            Category::MidLayer => "🧶",
            Category::OuterLayer => "🧥",
            Category::Accessories => "🧣",
            Category::Footwear => "👟",
        }
    }

    /// Categories that must always carry a recommendation
    #[must_use]
    pub fn is_essential(self) -> bool {
        matches!(
            self,
            Category::BaseLayer | Category::Bottoms | Category::Footwear
        )
    }

    /// Fallback item for an essential category left empty
    #[must_use]
    pub fn default_item(self) -> Option<&'static str> {
        match self {
            Category::BaseLayer => Some("Comfortable shirt"),
            Category::Bottoms => Some("Long pants"),
            Category::Footwear => Some("Closed-toe shoes"),
            _ => None,
        }
    }

    /// Position in [`Category::ORDER`]
    #[must_use]
    pub fn rank(self) -> usize {
        self as usize
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::BaseLayer => &[
                "thermal",
                "t-shirt",
                "tee",
                "shirt",
                "undershirt",
                "base layer",
                "tank top",
                "long sleeve",
                "short sleeve",
            ],
            Category::Bottoms => &[
                "pants", "shorts", "jeans", "trousers", "leggings", "skirt", "bottoms",
            ],
            Category::MidLayer => &[
                "sweater",
                "fleece",
                "hoodie",
                "sweatshirt",
                "cardigan",
                "vest",
                "pullover",
                "mid layer",
            ],
            Category::OuterLayer => &[
                "coat",
                "jacket",
                "parka",
                "windbreaker",
                "poncho",
                "outer layer",
                "outerwear",
            ],
            Category::Accessories => &[
                "scarf",
                "gloves",
                "mittens",
                "hat",
                "beanie",
                "umbrella",
                "sunglasses",
                "sunscreen",
                "socks",
            ],
            Category::Footwear => &[
                "boots", "shoes", "sneakers", "sandals", "footwear", "galoshes",
            ],
        }
    }

    /// Classify free text by keyword membership
    #[must_use]
    pub fn classify(text: &str) -> Option<Category> {
        let lower = text.to_lowercase();
        Self::MATCH_ORDER
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| lower.contains(kw)))
    }

    /// Resolve a `Category:` prefix written by a person or a model
    #[must_use]
    pub fn from_label(label: &str) -> Option<Category> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "base" | "baselayer" | "baselayers" | "top" | "tops" => Some(Category::BaseLayer),
            "bottoms" | "bottom" | "pants" | "legs" => Some(Category::Bottoms),
            "mid" | "midlayer" | "midlayers" | "middlelayer" | "insulation" => {
                Some(Category::MidLayer)
            }
            "outer" | "outerlayer" | "outerlayers" | "outerwear" | "jacket" | "coat" => {
                Some(Category::OuterLayer)
            }
            "accessories" | "accessory" | "extras" | "raingear" => Some(Category::Accessories),
            "footwear" | "shoes" | "feet" | "boots" => Some(Category::Footwear),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase alphanumerics only; emoji, whitespace and punctuation drop out
#[must_use]
pub fn normalized_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One clothing item tagged with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub category: Category,
    /// Leading emoji supplied with the item, if any
    pub emoji: Option<String>,
    pub item: String,
}

impl Recommendation {
    #[must_use]
    pub fn new(category: Category, emoji: &str, item: &str) -> Self {
        Self {
            category,
            emoji: Some(emoji.to_string()),
            item: item.to_string(),
        }
    }

    /// Item without its own emoji
    #[must_use]
    pub fn plain(category: Category, item: &str) -> Self {
        Self {
            category,
            emoji: None,
            item: item.to_string(),
        }
    }

    /// Default line for an essential category
    #[must_use]
    pub fn default_for(category: Category) -> Option<Self> {
        category
            .default_item()
            .map(|item| Self::new(category, category.emoji(), item))
    }

    /// Deduplication key of the item text
    #[must_use]
    pub fn key(&self) -> String {
        normalized_key(&self.item)
    }

    #[must_use]
    pub fn has_emoji(&self) -> bool {
        self.emoji.is_some()
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let emoji = self.emoji.as_deref().unwrap_or(self.category.emoji());
        write!(f, "{} {}: {}", emoji, self.category.label(), self.item)
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Cozy wool sweater", Some(Category::MidLayer))]
    #[case("Light sweatshirt", Some(Category::MidLayer))]
    #[case("Long sleeve shirt", Some(Category::BaseLayer))]
    #[case("Heavy pants with thermal layer", Some(Category::Bottoms))]
    #[case("Rain jacket", Some(Category::OuterLayer))]
    #[case("Rain boots", Some(Category::Footwear))]
    #[case("Warm gloves", Some(Category::Accessories))]
    #[case("Stay hydrated", None)]
    fn test_classify(#[case] text: &str, #[case] expected: Option<Category>) {
        assert_eq!(Category::classify(text), expected);
    }

    #[rstest]
    #[case("Base layer", Some(Category::BaseLayer))]
    #[case("OUTER LAYER", Some(Category::OuterLayer))]
    #[case("Mid-layer", Some(Category::MidLayer))]
    #[case("Shoes", Some(Category::Footwear))]
    #[case("Tip", None)]
    fn test_from_label(#[case] label: &str, #[case] expected: Option<Category>) {
        assert_eq!(Category::from_label(label), expected);
    }

    #[test]
    fn test_order_matches_rank() {
        for (index, category) in Category::ORDER.iter().enumerate() {
            assert_eq!(category.rank(), index);
        }
    }

    #[test]
    fn test_essential_categories_have_defaults() {
        for category in Category::ORDER {
            assert_eq!(category.is_essential(), category.default_item().is_some());
        }
    }

    #[test]
    fn test_normalized_key_strips_emoji_and_punctuation() {
        assert_eq!(normalized_key("🧥 Winter coat!"), "wintercoat");
        assert_eq!(normalized_key("winter-coat"), "wintercoat");
    }

    #[test]
    fn test_display_format() {
        let rec = Recommendation::new(Category::OuterLayer, "🧥", "Winter coat");
        assert_eq!(rec.to_string(), "🧥 Outer Layer: Winter coat");

        let plain = Recommendation::plain(Category::Footwear, "Snow boots");
        assert_eq!(plain.to_string(), "👟 Footwear: Snow boots");
    }

    #[test]
    fn test_serializes_as_display_string() {
        let rec = Recommendation::new(Category::Bottoms, "🩳", "Shorts");
        assert_eq!(serde_json::to_string(&rec).unwrap(), "\"🩳 Bottoms: Shorts\"");
    }
}
