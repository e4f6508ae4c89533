use rand::Rng;

use crate::domain::event::CandidateSource;
use crate::domain::menu::{MealRole, MealTime, MenuItem};
use crate::domain::template::MealTemplate;
use crate::domain::user::UserProfile;

pub const MAX_BASE_PROB: f64 = 0.95;
pub const WEEKEND_BOOST: f64 = 1.15;

const NOISE_FACTOR: f64 = 0.08;
const VEG_FOR_MEAT_EATER_FACTOR: f64 = 0.6;
const NON_VEG_FOR_VEGETARIAN_FACTOR: f64 = 0.05;
const PRICEY_FOR_SENSITIVE_FACTOR: f64 = 0.4;
const OFF_MEAL_TIME_FACTOR: f64 = 0.15;
const PRICEY_THRESHOLD: f64 = 200.0;

/// Per-role acceptance baseline: template completion probability scaled by
/// segment and weekend, capped at 0.95. Fixed before the role's candidates
/// are evaluated.
pub fn role_base_prob(template: &MealTemplate, role: MealRole, user: &UserProfile, weekend: bool) -> f64 {
    let mut prob =
        (template.completion_prob(role) * user.segment.completion_multiplier()).min(MAX_BASE_PROB);
    if weekend {
        prob = (prob * WEEKEND_BOOST).min(MAX_BASE_PROB);
    }
    prob
}

#[derive(Clone, Copy, Debug)]
pub struct AcceptanceInput<'a> {
    pub base_prob: f64,
    pub candidate: &'a MenuItem,
    pub source: CandidateSource,
    pub user: &'a UserProfile,
    pub meal_time: MealTime,
}

pub trait AcceptanceModel {
    fn probability(&self, input: &AcceptanceInput<'_>) -> f64;

    /// One uniform draw against the probability; returns the 0/1 label.
    fn draw<R: Rng>(&self, input: &AcceptanceInput<'_>, rng: &mut R) -> u8 {
        let probability = self.probability(input);
        u8::from(rng.gen::<f64>() < probability)
    }
}

/// Multiplicative modifiers over the role baseline.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalibratedAcceptanceModel;

impl AcceptanceModel for CalibratedAcceptanceModel {
    fn probability(&self, input: &AcceptanceInput<'_>) -> f64 {
        let candidate = input.candidate;
        let user = input.user;
        let mut prob = input.base_prob;

        if input.source == CandidateSource::Noise {
            prob *= NOISE_FACTOR;
        }

        if candidate.is_veg && user.veg_preference < 0.3 {
            prob *= VEG_FOR_MEAT_EATER_FACTOR;
        } else if !candidate.is_veg && user.veg_preference > 0.7 {
            prob *= NON_VEG_FOR_VEGETARIAN_FACTOR;
        }

        if candidate.price_f64() > PRICEY_THRESHOLD && user.price_sensitivity > 0.7 {
            prob *= PRICEY_FOR_SENSITIVE_FACTOR;
        }

        if !candidate.serves(input.meal_time) {
            prob *= OFF_MEAL_TIME_FACTOR;
        }

        prob
    }
}
