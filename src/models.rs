use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EntryError;

/// A product record from Open Food Facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: Option<String>,
    pub product_name: Option<String>,
    pub ingredients_text: Option<String>,
    /// Nutrient key to value. Values are numbers or numeric strings in practice.
    pub nutriments: Option<HashMap<String, Value>>,
    pub image_url: Option<String>,
}

impl Product {
    /// Numeric value of a nutrient, accepting numbers and numeric strings.
    pub fn nutrient(&self, key: &str) -> Option<f64> {
        self.nutriments.as_ref()?.get(key).and_then(|v| {
            v.as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        })
    }

    /// Energy per 100g, preferring the kilocalorie variant.
    pub fn calories_kcal(&self) -> Option<f64> {
        self.nutrient("energy-kcal_100g")
            .or_else(|| self.nutrient("energy_100g"))
    }
}

/// Envelope returned by `/cgi/search.pl`.
#[derive(Debug, Deserialize)]
pub struct ProductSearchResponse {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

/// A single nutrient line of a USDA FoodData Central food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    #[serde(default)]
    pub nutrient_name: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_name: String,
}

/// A food record from USDA FoodData Central.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaFood {
    pub fdc_id: u64,
    #[serde(default)]
    pub description: String,
    pub brand_owner: Option<String>,
    pub food_category: Option<String>,
    pub ingredients: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<UsdaNutrient>,
    pub image_url: Option<String>,
}

impl UsdaFood {
    /// Energy in kcal, taken from the `Energy` nutrient line.
    pub fn calories_kcal(&self) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| {
                n.nutrient_name.eq_ignore_ascii_case("energy")
                    && n.unit_name.eq_ignore_ascii_case("kcal")
            })
            .and_then(|n| n.value)
    }
}

/// Envelope returned by `/fdc/v1/foods/search`.
#[derive(Debug, Deserialize)]
pub struct UsdaSearchResponse {
    #[serde(default)]
    pub foods: Option<Vec<UsdaFood>>,
}

/// A search hit from whichever provider is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum SearchResult {
    OpenFoodFacts(Product),
    Usda(UsdaFood),
}

impl SearchResult {
    /// Normalize into the provider-independent display shape.
    pub fn summary(&self) -> FoodSummary {
        match self {
            SearchResult::OpenFoodFacts(p) => FoodSummary {
                id: non_empty(p.code.as_deref()),
                name: non_empty(p.product_name.as_deref())
                    .unwrap_or_else(|| UNNAMED.to_string()),
                brand: None,
                details: non_empty(p.ingredients_text.as_deref())
                    .unwrap_or_else(|| NO_INGREDIENTS.to_string()),
                calories_kcal: p.calories_kcal(),
                image_url: non_empty(p.image_url.as_deref()),
            },
            SearchResult::Usda(f) => FoodSummary {
                id: Some(f.fdc_id.to_string()),
                name: non_empty(Some(f.description.as_str())).unwrap_or_else(|| UNNAMED.to_string()),
                brand: non_empty(f.brand_owner.as_deref()),
                details: non_empty(f.ingredients.as_deref())
                    .or_else(|| non_empty(f.food_category.as_deref()))
                    .unwrap_or_else(|| NO_INGREDIENTS.to_string()),
                calories_kcal: f.calories_kcal(),
                image_url: non_empty(f.image_url.as_deref()),
            },
        }
    }
}

const UNNAMED: &str = "Unnamed Product";
const NO_INGREDIENTS: &str = "Ingredients not available";

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// What a result listing shows for one hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodSummary {
    pub id: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    /// Ingredients, or a placeholder when the provider has none.
    pub details: String,
    pub calories_kcal: Option<f64>,
    pub image_url: Option<String>,
}

impl FoodSummary {
    pub fn calories_label(&self) -> String {
        match self.calories_kcal {
            Some(kcal) => format!("{kcal}"),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for FoodSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.brand {
            Some(brand) => writeln!(f, "{} ({})", self.name, brand)?,
            None => writeln!(f, "{}", self.name)?,
        }
        writeln!(f, "  {}", self.details)?;
        write!(f, "  Calories: {} kcal", self.calories_label())?;
        if let Some(ref url) = self.image_url {
            write!(f, "\n  Image: {}", url)?;
        }
        Ok(())
    }
}

/// Unit of a micronutrient amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitaminUnit {
    #[default]
    Mg,
    Mcg,
    G,
}

impl VitaminUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitaminUnit::Mg => "mg",
            VitaminUnit::Mcg => "mcg",
            VitaminUnit::G => "g",
        }
    }
}

impl fmt::Display for VitaminUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VitaminUnit {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mg" => Ok(VitaminUnit::Mg),
            "mcg" | "ug" | "µg" => Ok(VitaminUnit::Mcg),
            "g" => Ok(VitaminUnit::G),
            _ => Err(EntryError::UnknownUnit(s.to_string())),
        }
    }
}

/// A finalized micronutrient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitamin {
    pub name: String,
    pub amount: f64,
    pub unit: VitaminUnit,
}

/// A food record entered by hand, with all numbers parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualFoodRecord {
    pub name: String,
    /// Calories (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbs (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    pub vitamins: Vec<Vitamin>,
}
