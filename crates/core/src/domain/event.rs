use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::menu::{Category, Cuisine, ItemId, MealRole, MealTime};
use crate::domain::template::TemplateId;
use crate::domain::user::{City, Segment, UserId};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("S{sequence:07}"))
    }
}

/// Where a candidate came from when its role pool was assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Template,
    Noise,
}

/// Cart statistics captured right before a candidate is decided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<ItemId>,
    pub item_count: usize,
    pub total_price: Decimal,
    pub veg_ratio: f64,
    pub categories: BTreeSet<Category>,
    pub cuisines: BTreeSet<Cuisine>,
    pub last_item: ItemId,
    pub last_item_category: Category,
    pub last_item_cuisine: Cuisine,
}

/// One labeled (cart, candidate, accept/reject) training record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub city: City,
    pub user_segment: Segment,
    pub user_veg_preference: f64,
    pub user_price_sensitivity: f64,
    pub timestamp: NaiveDateTime,
    pub meal_time: MealTime,
    pub day_of_week: u32,
    pub hour_of_day: u32,
    pub is_weekend: u8,
    pub slot_role: MealRole,
    pub candidate_source: CandidateSource,
    pub cart_items: Vec<ItemId>,
    pub cart_item_count: usize,
    pub cart_total_price: Decimal,
    pub cart_veg_ratio: f64,
    pub last_item_added: ItemId,
    pub last_item_category: Category,
    pub last_item_cuisine: Cuisine,
    pub cart_categories: BTreeSet<Category>,
    pub cart_cuisines: BTreeSet<Cuisine>,
    pub candidate_item_id: ItemId,
    pub candidate_category: Category,
    pub candidate_cuisine: Cuisine,
    pub candidate_price: Decimal,
    pub candidate_is_veg: u8,
    pub candidate_meal_role: MealRole,
    pub candidate_popularity: f64,
    pub candidate_accepted: u8,
    pub meal_template: TemplateId,
    pub is_abandoned: u8,
}

impl CandidateEvent {
    pub fn accepted(&self) -> bool {
        self.candidate_accepted == 1
    }

    pub fn abandoned(&self) -> bool {
        self.is_abandoned == 1
    }
}
