use std::collections::BTreeSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::catalog::MenuCatalog;
use crate::domain::menu::{Cuisine, ItemId, MealTime, MenuItem};
use crate::domain::template::{MealTemplate, TemplateId};
use crate::domain::user::UserProfile;
use crate::errors::DomainError;
use crate::templates::TemplateBook;

/// Weight boost per anchor cuisine shared with the user's preferences.
const CUISINE_OVERLAP_BOOST: f64 = 0.3;
const VEG_MISMATCH_PENALTY: f64 = 0.3;
/// Price at which a fully price-sensitive user loses all price appeal.
const PRICE_REFERENCE: f64 = 400.0;
const PRICE_MATCH_FLOOR: f64 = 0.1;

/// Chooses the meal template for a session.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateSelector;

impl TemplateSelector {
    /// Selection weights after the cuisine-affinity boost, in table order.
    pub fn adjusted_weights(
        &self,
        book: &TemplateBook,
        catalog: &MenuCatalog,
        meal_time: MealTime,
        preferred: &BTreeSet<Cuisine>,
    ) -> Result<Vec<(TemplateId, f64)>, DomainError> {
        book.weights_for(meal_time)
            .iter()
            .map(|(id, weight)| -> Result<(TemplateId, f64), DomainError> {
                let template = book
                    .template(*id)
                    .ok_or(DomainError::UnknownTemplate { meal_time, template: *id })?;
                let overlap = anchor_cuisines(template, catalog).intersection(preferred).count();
                Ok((*id, weight * (1.0 + CUISINE_OVERLAP_BOOST * overlap as f64)))
            })
            .collect()
    }

    pub fn select<R: Rng>(
        &self,
        book: &TemplateBook,
        catalog: &MenuCatalog,
        meal_time: MealTime,
        preferred: &BTreeSet<Cuisine>,
        rng: &mut R,
    ) -> Result<TemplateId, DomainError> {
        let weights = self.adjusted_weights(book, catalog, meal_time, preferred)?;
        let index = WeightedIndex::new(weights.iter().map(|(_, weight)| *weight))
            .map_err(|_| DomainError::DegenerateTemplateWeights(meal_time))?;
        Ok(weights[index.sample(rng)].0)
    }
}

fn anchor_cuisines(template: &MealTemplate, catalog: &MenuCatalog) -> BTreeSet<Cuisine> {
    template.anchors.iter().filter_map(|id| catalog.find(id)).map(|item| item.cuisine).collect()
}

/// Seeds the cart with one anchor chosen by veg, price and popularity fit.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnchorSelector;

impl AnchorSelector {
    pub fn score(&self, item: &MenuItem, user: &UserProfile) -> f64 {
        let veg_match = if item.is_veg == user.leans_veg() { 1.0 } else { VEG_MISMATCH_PENALTY };
        let price_match = (1.0 - user.price_sensitivity * (item.price_f64() / PRICE_REFERENCE))
            .max(PRICE_MATCH_FLOOR);
        veg_match * price_match * item.popularity_score
    }

    /// Returns `None` when none of the template's anchors exist in the
    /// catalog; the caller skips such sessions.
    pub fn select<R: Rng>(
        &self,
        template: &MealTemplate,
        catalog: &MenuCatalog,
        user: &UserProfile,
        session_id: &str,
        rng: &mut R,
    ) -> Result<Option<ItemId>, DomainError> {
        let scored: Vec<(&ItemId, f64)> = template
            .anchors
            .iter()
            .filter_map(|id| catalog.find(id).map(|item| (id, self.score(item, user))))
            .collect();
        if scored.is_empty() {
            return Ok(None);
        }

        let index = WeightedIndex::new(scored.iter().map(|(_, score)| *score)).map_err(|_| {
            DomainError::DegenerateAnchorScores {
                template: template.id,
                session_id: session_id.to_string(),
            }
        })?;
        Ok(Some(scored[index.sample(rng)].0.clone()))
    }
}
