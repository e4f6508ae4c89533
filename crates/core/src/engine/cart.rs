use std::collections::BTreeSet;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::MenuCatalog;
use crate::domain::event::{CandidateSource, CartSnapshot};
use crate::domain::menu::{ItemId, MealRole};
use crate::domain::template::MealTemplate;
use crate::engine::acceptance::{role_base_prob, AcceptanceInput, AcceptanceModel};
use crate::engine::emitter::{round_to, EventEmitter, EventLog, SessionContext};
use crate::engine::noise::NoiseInjector;
use crate::errors::DomainError;

/// Veg share of a cart rounded to two decimals; an empty cart is 0.0.
pub fn veg_ratio(veg_items: usize, cart_size: usize) -> f64 {
    if cart_size == 0 {
        return 0.0;
    }
    round_to(veg_items as f64 / cart_size as f64, 2)
}

/// Append-only, duplicate-free list of items in a session's cart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<ItemId>,
}

impl CartState {
    pub fn append(&mut self, item_id: ItemId) -> Result<(), DomainError> {
        if self.contains(&item_id) {
            return Err(DomainError::DuplicateCartItem(item_id));
        }
        self.items.push(item_id);
        Ok(())
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.items.contains(item_id)
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self, catalog: &MenuCatalog) -> Result<CartSnapshot, DomainError> {
        let items = self
            .items
            .iter()
            .map(|id| catalog.find(id).ok_or_else(|| DomainError::UnknownItem(id.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let last = items.last().ok_or_else(|| {
            DomainError::InvariantViolation("cart snapshot requires an anchor item".to_string())
        })?;

        Ok(CartSnapshot {
            items: self.items.clone(),
            item_count: items.len(),
            total_price: items.iter().map(|item| item.price).sum::<Decimal>(),
            veg_ratio: veg_ratio(items.iter().filter(|item| item.is_veg).count(), items.len()),
            categories: items.iter().map(|item| item.category).collect::<BTreeSet<_>>(),
            cuisines: items.iter().map(|item| item.cuisine).collect::<BTreeSet<_>>(),
            last_item: last.id.clone(),
            last_item_category: last.category,
            last_item_cuisine: last.cuisine,
        })
    }
}

/// Cart-building stages. Each is entered once per session in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartStage {
    AnchorChosen,
    Role(MealRole),
    Done,
}

impl CartStage {
    /// Transitions do not depend on what was accepted in the current stage.
    pub fn next(self) -> Self {
        match self {
            Self::AnchorChosen => Self::Role(MealRole::Complement),
            Self::Role(MealRole::Complement) => Self::Role(MealRole::Addon),
            Self::Role(MealRole::Addon) => Self::Role(MealRole::Finisher),
            Self::Role(MealRole::Finisher) | Self::Role(MealRole::Anchor) | Self::Done => {
                Self::Done
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartOutcome {
    pub items: Vec<ItemId>,
    pub events_emitted: usize,
    pub roles_visited: Vec<MealRole>,
}

/// Drives a seeded cart through complement, addon and finisher roles.
pub struct CartBuilder<'a, M> {
    catalog: &'a MenuCatalog,
    noise: &'a NoiseInjector,
    model: &'a M,
    emitter: EventEmitter,
}

impl<'a, M> CartBuilder<'a, M>
where
    M: AcceptanceModel,
{
    pub fn new(catalog: &'a MenuCatalog, noise: &'a NoiseInjector, model: &'a M) -> Self {
        Self { catalog, noise, model, emitter: EventEmitter }
    }

    pub fn run<R: Rng>(
        &self,
        session: &SessionContext<'_>,
        template: &MealTemplate,
        mut cart: CartState,
        log: &mut EventLog,
        rng: &mut R,
    ) -> Result<CartOutcome, DomainError> {
        let weekend = session.is_weekend();
        let mut events_emitted = 0;
        let mut roles_visited = Vec::new();
        let mut stage = CartStage::AnchorChosen.next();

        while let CartStage::Role(role) = stage {
            stage = stage.next();
            if template.items_for(role).is_empty() {
                continue;
            }
            roles_visited.push(role);

            let base_prob = role_base_prob(template, role, session.user, weekend);
            let mut template_pool: Vec<ItemId> = Vec::new();
            for id in template.items_for(role) {
                if self.catalog.contains(id) && !cart.contains(id) && !template_pool.contains(id) {
                    template_pool.push(id.clone());
                }
            }
            let distractors =
                self.noise.sample_distractors(self.catalog, &cart, &template_pool, rng);

            let candidates = template_pool
                .into_iter()
                .map(|id| (id, CandidateSource::Template))
                .chain(distractors.into_iter().map(|id| (id, CandidateSource::Noise)));

            for (candidate_id, source) in candidates {
                let candidate = self
                    .catalog
                    .find(&candidate_id)
                    .ok_or_else(|| DomainError::UnknownItem(candidate_id.clone()))?;
                let snapshot = cart.snapshot(self.catalog)?;
                let accepted = self.model.draw(
                    &AcceptanceInput {
                        base_prob,
                        candidate,
                        source,
                        user: session.user,
                        meal_time: session.meal_time,
                    },
                    rng,
                );

                log.record(
                    self.emitter.candidate_event(session, role, source, snapshot, candidate, accepted),
                );
                events_emitted += 1;

                if accepted == 1 {
                    trace!(
                        event_name = "cartsim.cart.item_accepted",
                        session_id = %session.session_id.0,
                        item_id = %candidate_id,
                        role = role.as_str(),
                        "candidate accepted into cart"
                    );
                    cart.append(candidate_id)?;
                }
            }
        }

        Ok(CartOutcome { items: cart.items, events_emitted, roles_visited })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{veg_ratio, CartBuilder, CartStage, CartState};
    use crate::catalog::MenuCatalog;
    use crate::domain::event::{CandidateSource, SessionId};
    use crate::domain::menu::{Cuisine, ItemId, MealRole, MealTime};
    use crate::domain::template::TemplateId;
    use crate::domain::user::{City, Segment, UserId, UserProfile};
    use crate::engine::acceptance::{AcceptanceInput, AcceptanceModel, CalibratedAcceptanceModel};
    use crate::engine::clock::timestamp_at;
    use crate::engine::emitter::{EventLog, SessionContext};
    use crate::engine::noise::NoiseInjector;
    use crate::errors::DomainError;
    use crate::rng::stream;
    use crate::templates::TemplateBook;

    struct AcceptAll;

    impl AcceptanceModel for AcceptAll {
        fn probability(&self, _input: &AcceptanceInput<'_>) -> f64 {
            1.0
        }
    }

    fn user() -> UserProfile {
        UserProfile {
            id: UserId("U00042".to_string()),
            city: City::Hyderabad,
            segment: Segment::Power,
            veg_preference: 0.2,
            price_sensitivity: 0.4,
            preferred_cuisines: BTreeSet::from([Cuisine::Mughlai]),
            num_orders: 10,
        }
    }

    fn session(profile: &UserProfile, template: TemplateId) -> SessionContext<'_> {
        SessionContext {
            session_id: SessionId::from_sequence(1),
            user: profile,
            timestamp: timestamp_at(NaiveDate::from_ymd_opt(2025, 1, 8).expect("date"), 20.5),
            meal_time: MealTime::Dinner,
            template,
            is_abandoned: false,
        }
    }

    fn seeded_cart(anchor: &str) -> CartState {
        let mut cart = CartState::default();
        cart.append(ItemId::new(anchor)).expect("anchor");
        cart
    }

    #[test]
    fn stages_advance_in_fixed_order() {
        let mut stage = CartStage::AnchorChosen;
        let mut visited = Vec::new();
        while stage != CartStage::Done {
            stage = stage.next();
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                CartStage::Role(MealRole::Complement),
                CartStage::Role(MealRole::Addon),
                CartStage::Role(MealRole::Finisher),
                CartStage::Done,
            ]
        );
    }

    #[test]
    fn veg_ratio_guards_empty_cart() {
        assert_eq!(veg_ratio(0, 0), 0.0);
        assert_eq!(veg_ratio(2, 3), 0.67);
        assert_eq!(veg_ratio(1, 1), 1.0);
    }

    #[test]
    fn duplicate_append_is_rejected() {
        let mut cart = seeded_cart("ITEM_001");
        let error = cart.append(ItemId::new("ITEM_001")).expect_err("duplicate");
        assert_eq!(error, DomainError::DuplicateCartItem(ItemId::new("ITEM_001")));
    }

    #[test]
    fn snapshot_reports_running_cart_statistics() {
        let catalog = MenuCatalog::standard();
        let mut cart = seeded_cart("ITEM_001");
        cart.append(ItemId::new("ITEM_033")).expect("raita");

        let snapshot = cart.snapshot(&catalog).expect("snapshot");
        assert_eq!(snapshot.item_count, 2);
        assert_eq!(snapshot.total_price, Decimal::from(348));
        assert_eq!(snapshot.veg_ratio, 0.5);
        assert_eq!(snapshot.last_item, ItemId::new("ITEM_033"));
        assert_eq!(snapshot.cuisines, BTreeSet::from([Cuisine::Mughlai, Cuisine::NorthIndian]));
    }

    #[test]
    fn accepted_items_grow_later_snapshots_and_leave_later_pools() {
        let catalog = MenuCatalog::standard();
        let book = TemplateBook::standard();
        let template = book.template(TemplateId::BiryaniMeal).expect("template");
        let profile = user();
        let noise = NoiseInjector::default();
        let builder = CartBuilder::new(&catalog, &noise, &AcceptAll);
        let mut log = EventLog::default();

        let outcome = builder
            .run(
                &session(&profile, TemplateId::BiryaniMeal),
                template,
                seeded_cart("ITEM_001"),
                &mut log,
                &mut stream(8, b"cart"),
            )
            .expect("cart run");

        assert_eq!(
            outcome.roles_visited,
            vec![MealRole::Complement, MealRole::Addon, MealRole::Finisher]
        );
        assert_eq!(outcome.events_emitted, log.len());
        let noise_events = log
            .events()
            .iter()
            .filter(|event| event.candidate_source == CandidateSource::Noise)
            .count();
        assert_eq!(noise_events, 9);
        // accepted distractors can pre-empt later template items
        assert!(log.len() - noise_events <= 3 + 3 + 4);

        for (index, event) in log.events().iter().enumerate() {
            assert!(!event.cart_items.contains(&event.candidate_item_id));
            assert_eq!(event.cart_item_count, index + 1);
            assert_eq!(event.candidate_accepted, 1);
        }
        assert_eq!(outcome.items.len(), log.len() + 1);
    }

    #[test]
    fn empty_roles_are_skipped_without_events() {
        let catalog = MenuCatalog::standard();
        let book = TemplateBook::standard();
        let template = book.template(TemplateId::StreetFoodSnack).expect("template");
        let profile = user();
        let noise = NoiseInjector::default();
        let builder = CartBuilder::new(&catalog, &noise, &CalibratedAcceptanceModel);
        let mut log = EventLog::default();

        let outcome = builder
            .run(
                &session(&profile, TemplateId::StreetFoodSnack),
                template,
                seeded_cart("ITEM_018"),
                &mut log,
                &mut stream(3, b"cart"),
            )
            .expect("cart run");

        assert_eq!(outcome.roles_visited, vec![MealRole::Addon, MealRole::Finisher]);
        assert!(log.events().iter().all(|event| event.slot_role != MealRole::Complement));
    }

    #[test]
    fn template_candidates_precede_noise_within_a_role() {
        let catalog = MenuCatalog::standard();
        let book = TemplateBook::standard();
        let template = book.template(TemplateId::ChineseMeal).expect("template");
        let profile = user();
        let noise = NoiseInjector::default();
        let builder = CartBuilder::new(&catalog, &noise, &CalibratedAcceptanceModel);
        let mut log = EventLog::default();

        builder
            .run(
                &session(&profile, TemplateId::ChineseMeal),
                template,
                seeded_cart("ITEM_014"),
                &mut log,
                &mut stream(12, b"cart"),
            )
            .expect("cart run");

        for role in MealRole::SLOTS {
            let sources: Vec<CandidateSource> = log
                .events()
                .iter()
                .filter(|event| event.slot_role == role)
                .map(|event| event.candidate_source)
                .collect();
            let first_noise =
                sources.iter().position(|source| *source == CandidateSource::Noise).unwrap_or(sources.len());
            assert!(sources[first_noise..].iter().all(|source| *source == CandidateSource::Noise));
        }
    }
}
