use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time-of-day ordering bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealTime {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
    LateNight,
}

impl MealTime {
    pub const ALL: [MealTime; 5] =
        [Self::Breakfast, Self::Lunch, Self::Snacks, Self::Dinner, Self::LateNight];

    /// Maps an hour of day (0..=23) to its bucket. Lunch runs until 15:00 to
    /// cover late lunches; anything outside the day buckets is late night.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=9 => Self::Breakfast,
            10..=14 => Self::Lunch,
            15..=17 => Self::Snacks,
            18..=21 => Self::Dinner,
            _ => Self::LateNight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snacks => "snacks",
            Self::Dinner => "dinner",
            Self::LateNight => "late_night",
        }
    }
}

/// Position an item takes in the meal grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealRole {
    Anchor,
    Complement,
    Addon,
    Finisher,
}

impl MealRole {
    /// Post-anchor roles in the order a cart fills them.
    pub const SLOTS: [MealRole; 3] = [Self::Complement, Self::Addon, Self::Finisher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Complement => "complement",
            Self::Addon => "addon",
            Self::Finisher => "finisher",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Main,
    Side,
    Starter,
    Dessert,
    Drink,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cuisine {
    #[serde(rename = "North Indian")]
    NorthIndian,
    #[serde(rename = "South Indian")]
    SouthIndian,
    Mughlai,
    Chinese,
    #[serde(rename = "Street Food")]
    StreetFood,
    Continental,
    Desserts,
}

impl Cuisine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NorthIndian => "North Indian",
            Self::SouthIndian => "South Indian",
            Self::Mughlai => "Mughlai",
            Self::Chinese => "Chinese",
            Self::StreetFood => "Street Food",
            Self::Continental => "Continental",
            Self::Desserts => "Desserts",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub category: Category,
    pub cuisine: Cuisine,
    pub is_veg: bool,
    /// Price in INR.
    pub price: Decimal,
    pub meal_role: MealRole,
    pub meal_times: Vec<MealTime>,
    pub description: String,
    pub popularity_score: f64,
}

impl MenuItem {
    pub fn serves(&self, meal_time: MealTime) -> bool {
        self.meal_times.contains(&meal_time)
    }

    pub fn price_f64(&self) -> f64 {
        self.price.to_f64().unwrap_or(0.0)
    }
}
