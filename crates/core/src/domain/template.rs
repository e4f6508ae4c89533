use serde::{Deserialize, Serialize};

use crate::domain::menu::{ItemId, MealRole};

/// Used when a role has no configured completion probability.
pub const DEFAULT_COMPLETION_PROB: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    BiryaniMeal,
    NorthIndianCurry,
    SouthIndianBreakfast,
    ChineseMeal,
    StreetFoodSnack,
    ContinentalMeal,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BiryaniMeal => "biryani_meal",
            Self::NorthIndianCurry => "north_indian_curry",
            Self::SouthIndianBreakfast => "south_indian_breakfast",
            Self::ChineseMeal => "chinese_meal",
            Self::StreetFoodSnack => "street_food_snack",
            Self::ContinentalMeal => "continental_meal",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionProbabilities {
    pub complement: f64,
    pub addon: f64,
    pub finisher: f64,
}

/// A meal grammar: which items fill each role and how likely each role is
/// to be completed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealTemplate {
    pub id: TemplateId,
    pub anchors: Vec<ItemId>,
    pub complements: Vec<ItemId>,
    pub addons: Vec<ItemId>,
    pub finishers: Vec<ItemId>,
    pub completion: CompletionProbabilities,
}

impl MealTemplate {
    pub fn items_for(&self, role: MealRole) -> &[ItemId] {
        match role {
            MealRole::Anchor => &self.anchors,
            MealRole::Complement => &self.complements,
            MealRole::Addon => &self.addons,
            MealRole::Finisher => &self.finishers,
        }
    }

    pub fn completion_prob(&self, role: MealRole) -> f64 {
        match role {
            MealRole::Anchor => DEFAULT_COMPLETION_PROB,
            MealRole::Complement => self.completion.complement,
            MealRole::Addon => self.completion.addon,
            MealRole::Finisher => self.completion.finisher,
        }
    }
}
