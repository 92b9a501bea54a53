//! Font lookup with dynamic type scaling.
//!
//! Installed fonts come from a [`FontCatalog`]. Lookups that miss fall back
//! to the system font, either the preferred font for a text style or the
//! system face at a requested weight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name reported for fonts synthesized by [`FontCatalog::system_font`].
pub const SYSTEM_FONT_NAME: &str = ".SFUI";
pub const SYSTEM_FONT_FAMILY: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

/// Semantic text styles with their point sizes at the default category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextStyle {
    LargeTitle,
    Title1,
    Title2,
    Title3,
    Headline,
    Body,
    Callout,
    Subheadline,
    Footnote,
    Caption1,
    Caption2,
}

impl TextStyle {
    pub const ALL: [TextStyle; 11] = [
        TextStyle::LargeTitle,
        TextStyle::Title1,
        TextStyle::Title2,
        TextStyle::Title3,
        TextStyle::Headline,
        TextStyle::Body,
        TextStyle::Callout,
        TextStyle::Subheadline,
        TextStyle::Footnote,
        TextStyle::Caption1,
        TextStyle::Caption2,
    ];

    /// Point size at [`ContentSizeCategory::Large`].
    pub fn default_point_size(self) -> f64 {
        match self {
            TextStyle::LargeTitle => 34.0,
            TextStyle::Title1 => 28.0,
            TextStyle::Title2 => 22.0,
            TextStyle::Title3 => 20.0,
            TextStyle::Headline | TextStyle::Body => 17.0,
            TextStyle::Callout => 16.0,
            TextStyle::Subheadline => 15.0,
            TextStyle::Footnote => 13.0,
            TextStyle::Caption1 => 12.0,
            TextStyle::Caption2 => 11.0,
        }
    }

    pub fn default_weight(self) -> FontWeight {
        match self {
            TextStyle::Headline => FontWeight::Semibold,
            _ => FontWeight::Regular,
        }
    }
}

/// User-selected text size setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContentSizeCategory {
    ExtraSmall,
    Small,
    Medium,
    #[default]
    Large,
    ExtraLarge,
    ExtraExtraLarge,
    ExtraExtraExtraLarge,
    AccessibilityMedium,
    AccessibilityLarge,
    AccessibilityExtraLarge,
    AccessibilityExtraExtraLarge,
    AccessibilityExtraExtraExtraLarge,
}

impl ContentSizeCategory {
    /// Body text size in this category.
    fn body_point_size(self) -> f64 {
        match self {
            ContentSizeCategory::ExtraSmall => 14.0,
            ContentSizeCategory::Small => 15.0,
            ContentSizeCategory::Medium => 16.0,
            ContentSizeCategory::Large => 17.0,
            ContentSizeCategory::ExtraLarge => 19.0,
            ContentSizeCategory::ExtraExtraLarge => 21.0,
            ContentSizeCategory::ExtraExtraExtraLarge => 23.0,
            ContentSizeCategory::AccessibilityMedium => 28.0,
            ContentSizeCategory::AccessibilityLarge => 33.0,
            ContentSizeCategory::AccessibilityExtraLarge => 40.0,
            ContentSizeCategory::AccessibilityExtraExtraLarge => 47.0,
            ContentSizeCategory::AccessibilityExtraExtraExtraLarge => 53.0,
        }
    }

    pub fn is_accessibility(self) -> bool {
        matches!(
            self,
            ContentSizeCategory::AccessibilityMedium
                | ContentSizeCategory::AccessibilityLarge
                | ContentSizeCategory::AccessibilityExtraLarge
                | ContentSizeCategory::AccessibilityExtraExtraLarge
                | ContentSizeCategory::AccessibilityExtraExtraExtraLarge
        )
    }
}

/// Scales point sizes for a text style and size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub style: TextStyle,
    pub category: ContentSizeCategory,
}

impl FontMetrics {
    pub fn new(style: TextStyle, category: ContentSizeCategory) -> Self {
        Self { style, category }
    }

    /// `size` scaled by the category's ratio to the default category.
    pub fn scaled_size(&self, size: f64) -> f64 {
        size * self.category.body_point_size() / ContentSizeCategory::Large.body_point_size()
    }

    pub fn scaled_font(&self, font: &Font) -> Font {
        Font {
            point_size: self.scaled_size(font.point_size),
            ..font.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    pub family: String,
    pub point_size: f64,
    pub weight: FontWeight,
}

impl Font {
    pub fn is_system(&self) -> bool {
        self.name == SYSTEM_FONT_NAME
    }

    pub fn dynamically_typed(&self, style: TextStyle, category: ContentSizeCategory) -> Font {
        FontMetrics::new(style, category).scaled_font(self)
    }
}

/// Source of installed fonts.
pub trait FontCatalog {
    /// Family names in any order.
    fn family_names(&self) -> Vec<String>;

    fn font_names(&self, family: &str) -> Vec<String>;

    /// The installed font called `name` at `size`, if any.
    fn font(&self, name: &str, size: f64) -> Option<Font>;

    fn system_font(&self, size: f64, weight: FontWeight) -> Font {
        Font {
            name: SYSTEM_FONT_NAME.to_string(),
            family: SYSTEM_FONT_FAMILY.to_string(),
            point_size: size,
            weight,
        }
    }

    /// System font for `style` sized for `category`.
    fn preferred_font(&self, style: TextStyle, category: ContentSizeCategory) -> Font {
        let metrics = FontMetrics::new(style, category);
        self.system_font(
            metrics.scaled_size(style.default_point_size()),
            style.default_weight(),
        )
    }
}

/// One face of a font family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFace {
    pub name: String,
    #[serde(default)]
    pub weight: FontWeight,
}

/// Fixed catalog, typically loaded from a JSON manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticFontCatalog {
    pub families: BTreeMap<String, Vec<FontFace>>,
}

impl StaticFontCatalog {
    pub fn add_face(&mut self, family: &str, name: &str, weight: FontWeight) {
        self.families
            .entry(family.to_string())
            .or_default()
            .push(FontFace {
                name: name.to_string(),
                weight,
            });
    }
}

impl FontCatalog for StaticFontCatalog {
    fn family_names(&self) -> Vec<String> {
        self.families.keys().cloned().collect()
    }

    fn font_names(&self, family: &str) -> Vec<String> {
        self.families
            .get(family)
            .map(|faces| faces.iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default()
    }

    fn font(&self, name: &str, size: f64) -> Option<Font> {
        self.families.iter().find_map(|(family, faces)| {
            faces.iter().find(|f| f.name == name).map(|face| Font {
                name: face.name.clone(),
                family: family.clone(),
                point_size: size,
                weight: face.weight,
            })
        })
    }
}

/// Custom font `name` scaled for `style`, or the preferred system font for
/// `style` when `name` is not installed.
pub fn custom_font_for_style(
    catalog: &impl FontCatalog,
    style: TextStyle,
    name: &str,
    size: f64,
    category: ContentSizeCategory,
) -> Font {
    match catalog.font(name, size) {
        Some(font) => font.dynamically_typed(style, category),
        None => {
            log::debug!("font {name:?} not installed, using preferred font for {style:?}");
            catalog.preferred_font(style, category)
        }
    }
}

/// Custom font `name` at `size`, or the system font with `weight`.
pub fn custom_font(catalog: &impl FontCatalog, size: f64, name: &str, weight: FontWeight) -> Font {
    catalog.font(name, size).unwrap_or_else(|| {
        log::debug!("font {name:?} not installed, using system font");
        catalog.system_font(size, weight)
    })
}

/// Families in sorted order with their font names. Each entry is logged.
pub fn list_available_fonts(catalog: &impl FontCatalog) -> Vec<(String, Vec<String>)> {
    let mut families = catalog.family_names();
    families.sort();
    families
        .into_iter()
        .map(|family| {
            let names = catalog.font_names(&family);
            log::info!("{family}");
            for name in &names {
                log::info!("== {name}");
            }
            (family, names)
        })
        .collect()
}
