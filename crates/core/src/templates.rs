use std::collections::BTreeMap;

use crate::domain::menu::{ItemId, MealTime};
use crate::domain::template::{CompletionProbabilities, MealTemplate, TemplateId};
use crate::errors::DomainError;

/// Meal-time used when a bucket has no weight table of its own.
pub const FALLBACK_MEAL_TIME: MealTime = MealTime::Lunch;

pub type TemplateWeights = Vec<(TemplateId, f64)>;

/// Immutable meal templates plus per-meal-time selection weights, loaded once.
#[derive(Clone, Debug)]
pub struct TemplateBook {
    templates: BTreeMap<TemplateId, MealTemplate>,
    weights: BTreeMap<MealTime, TemplateWeights>,
}

impl TemplateBook {
    pub fn new(
        templates: Vec<MealTemplate>,
        weights: BTreeMap<MealTime, TemplateWeights>,
    ) -> Result<Self, DomainError> {
        let templates: BTreeMap<TemplateId, MealTemplate> =
            templates.into_iter().map(|template| (template.id, template)).collect();

        for (meal_time, table) in &weights {
            for (template, weight) in table {
                if !templates.contains_key(template) {
                    return Err(DomainError::UnknownTemplate {
                        meal_time: *meal_time,
                        template: *template,
                    });
                }
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(DomainError::DegenerateTemplateWeights(*meal_time));
                }
            }
            if table.iter().map(|(_, weight)| weight).sum::<f64>() <= 0.0 {
                return Err(DomainError::DegenerateTemplateWeights(*meal_time));
            }
        }
        if !weights.contains_key(&FALLBACK_MEAL_TIME) {
            return Err(DomainError::InvariantViolation(format!(
                "template weights must define the fallback meal-time `{}`",
                FALLBACK_MEAL_TIME.as_str()
            )));
        }

        Ok(Self { templates, weights })
    }

    pub fn standard() -> Self {
        Self { templates: standard_templates(), weights: standard_weights() }
    }

    pub fn template(&self, id: TemplateId) -> Option<&MealTemplate> {
        self.templates.get(&id)
    }

    pub fn templates(&self) -> impl Iterator<Item = &MealTemplate> {
        self.templates.values()
    }

    /// Selection weights for a bucket, falling back to lunch weights.
    pub fn weights_for(&self, meal_time: MealTime) -> &[(TemplateId, f64)] {
        self.weights
            .get(&meal_time)
            .or_else(|| self.weights.get(&FALLBACK_MEAL_TIME))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn ids(raw: &[&str]) -> Vec<ItemId> {
    raw.iter().map(|id| ItemId::new(*id)).collect()
}

fn template(
    id: TemplateId,
    anchors: &[&str],
    complements: &[&str],
    addons: &[&str],
    finishers: &[&str],
    completion: (f64, f64, f64),
) -> MealTemplate {
    MealTemplate {
        id,
        anchors: ids(anchors),
        complements: ids(complements),
        addons: ids(addons),
        finishers: ids(finishers),
        completion: CompletionProbabilities {
            complement: completion.0,
            addon: completion.1,
            finisher: completion.2,
        },
    }
}

fn standard_templates() -> BTreeMap<TemplateId, MealTemplate> {
    [
        template(
            TemplateId::BiryaniMeal,
            &["ITEM_001", "ITEM_002", "ITEM_003", "ITEM_011"],
            &["ITEM_033", "ITEM_034", "ITEM_035"],
            &["ITEM_040", "ITEM_041", "ITEM_044"],
            &["ITEM_050", "ITEM_051", "ITEM_064", "ITEM_063"],
            (0.65, 0.25, 0.50),
        ),
        template(
            TemplateId::NorthIndianCurry,
            &["ITEM_004", "ITEM_005", "ITEM_006", "ITEM_007"],
            &["ITEM_030", "ITEM_031", "ITEM_032"],
            &["ITEM_040", "ITEM_041", "ITEM_035", "ITEM_072"],
            &["ITEM_050", "ITEM_052", "ITEM_062", "ITEM_064"],
            (0.80, 0.20, 0.45),
        ),
        template(
            TemplateId::SouthIndianBreakfast,
            &["ITEM_009", "ITEM_010", "ITEM_012", "ITEM_013"],
            &["ITEM_038", "ITEM_039"],
            &["ITEM_073"],
            &["ITEM_066", "ITEM_060"],
            (0.70, 0.15, 0.55),
        ),
        template(
            TemplateId::ChineseMeal,
            &["ITEM_014", "ITEM_015", "ITEM_016", "ITEM_017"],
            &["ITEM_043", "ITEM_044"],
            &["ITEM_037"],
            &["ITEM_064", "ITEM_061", "ITEM_053"],
            (0.45, 0.30, 0.40),
        ),
        template(
            TemplateId::StreetFoodSnack,
            &["ITEM_018", "ITEM_019", "ITEM_020", "ITEM_008"],
            &[],
            &["ITEM_037", "ITEM_035"],
            &["ITEM_060", "ITEM_064", "ITEM_065"],
            (0.10, 0.20, 0.50),
        ),
        template(
            TemplateId::ContinentalMeal,
            &["ITEM_021", "ITEM_022", "ITEM_023"],
            &["ITEM_037", "ITEM_036"],
            &["ITEM_042", "ITEM_045"],
            &["ITEM_053", "ITEM_061", "ITEM_064"],
            (0.55, 0.30, 0.45),
        ),
    ]
    .into_iter()
    .map(|template| (template.id, template))
    .collect()
}

fn standard_weights() -> BTreeMap<MealTime, TemplateWeights> {
    use TemplateId::*;

    BTreeMap::from([
        (
            MealTime::Breakfast,
            vec![(SouthIndianBreakfast, 0.5), (StreetFoodSnack, 0.3), (ContinentalMeal, 0.2)],
        ),
        (
            MealTime::Lunch,
            vec![
                (BiryaniMeal, 0.25),
                (NorthIndianCurry, 0.30),
                (ChineseMeal, 0.15),
                (SouthIndianBreakfast, 0.10),
                (ContinentalMeal, 0.10),
                (StreetFoodSnack, 0.10),
            ],
        ),
        (
            MealTime::Snacks,
            vec![
                (StreetFoodSnack, 0.5),
                (ChineseMeal, 0.2),
                (ContinentalMeal, 0.2),
                (SouthIndianBreakfast, 0.1),
            ],
        ),
        (
            MealTime::Dinner,
            vec![
                (BiryaniMeal, 0.30),
                (NorthIndianCurry, 0.30),
                (ChineseMeal, 0.20),
                (ContinentalMeal, 0.15),
                (StreetFoodSnack, 0.05),
            ],
        ),
        (
            MealTime::LateNight,
            vec![
                (ChineseMeal, 0.35),
                (ContinentalMeal, 0.35),
                (StreetFoodSnack, 0.20),
                (BiryaniMeal, 0.10),
            ],
        ),
    ])
}
