use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::menu::Cuisine;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum City {
    Mumbai,
    Delhi,
    Bangalore,
    Hyderabad,
    Chennai,
    Kolkata,
}

impl City {
    pub const ALL: [City; 6] =
        [Self::Mumbai, Self::Delhi, Self::Bangalore, Self::Hyderabad, Self::Chennai, Self::Kolkata];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mumbai => "Mumbai",
            Self::Delhi => "Delhi",
            Self::Bangalore => "Bangalore",
            Self::Hyderabad => "Hyderabad",
            Self::Chennai => "Chennai",
            Self::Kolkata => "Kolkata",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    New,
    Regular,
    Power,
}

impl Segment {
    /// Scales a template's per-role completion probability.
    pub fn completion_multiplier(&self) -> f64 {
        match self {
            Self::New => 0.7,
            Self::Regular => 1.0,
            Self::Power => 1.3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Regular => "regular",
            Self::Power => "power",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub city: City,
    pub segment: Segment,
    /// 0.0 = strictly non-veg, 1.0 = strictly veg.
    pub veg_preference: f64,
    pub price_sensitivity: f64,
    pub preferred_cuisines: BTreeSet<Cuisine>,
    pub num_orders: u32,
}

impl UserProfile {
    pub fn leans_veg(&self) -> bool {
        self.veg_preference > 0.5
    }
}
