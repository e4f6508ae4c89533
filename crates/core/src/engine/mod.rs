//! Session and cart generation.
//!
//! For every user, sessions are generated in order-date order from the
//! user's own random stream: timestamp, template, anchor, abandonment flag,
//! the complement/addon/finisher role loop and finally the last-event
//! override draw. Reordering any of these draws changes every later result.

pub mod acceptance;
pub mod cart;
pub mod clock;
pub mod emitter;
pub mod noise;
pub mod selector;

use chrono::{NaiveDate, Timelike};
use rand::Rng;
use tracing::{debug, info};

use crate::catalog::MenuCatalog;
use crate::domain::event::{CandidateEvent, SessionId};
use crate::domain::menu::MealTime;
use crate::domain::user::UserProfile;
use crate::errors::DomainError;
use crate::rng::user_stream;
use crate::templates::TemplateBook;

use self::acceptance::{AcceptanceModel, CalibratedAcceptanceModel};
use self::cart::{CartBuilder, CartState};
use self::clock::{date_for_offset, sample_order_days, sample_timestamp};
use self::emitter::{EventLog, SessionContext};
use self::noise::{NoiseInjector, NoiseSettings};
use self::selector::{AnchorSelector, TemplateSelector};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationParams {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub days: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationOutput {
    pub events: Vec<CandidateEvent>,
    pub sessions_started: u64,
    pub sessions_skipped: u64,
    pub overrides_applied: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionOutcome {
    Completed { overridden: bool },
    Skipped,
}

pub struct SessionGenerator<'a, M = CalibratedAcceptanceModel> {
    catalog: &'a MenuCatalog,
    book: &'a TemplateBook,
    noise: NoiseInjector,
    model: M,
    template_selector: TemplateSelector,
    anchor_selector: AnchorSelector,
}

impl<'a> SessionGenerator<'a> {
    pub fn new(catalog: &'a MenuCatalog, book: &'a TemplateBook, noise: NoiseSettings) -> Self {
        Self::with_model(catalog, book, noise, CalibratedAcceptanceModel)
    }
}

impl<'a, M> SessionGenerator<'a, M>
where
    M: AcceptanceModel,
{
    pub fn with_model(
        catalog: &'a MenuCatalog,
        book: &'a TemplateBook,
        noise: NoiseSettings,
        model: M,
    ) -> Self {
        Self {
            catalog,
            book,
            noise: NoiseInjector::new(noise),
            model,
            template_selector: TemplateSelector,
            anchor_selector: AnchorSelector,
        }
    }

    pub fn generate(
        &self,
        users: &[UserProfile],
        params: &GenerationParams,
    ) -> Result<GenerationOutput, DomainError> {
        info!(
            event_name = "cartsim.generation.started",
            users = users.len(),
            days = params.days,
            seed = params.seed,
            "starting session generation"
        );

        let mut log = EventLog::default();
        let mut output = GenerationOutput::default();

        for user in users {
            let mut rng = user_stream(params.seed, &user.id);
            for offset in sample_order_days(&mut rng, user.num_orders, params.days) {
                output.sessions_started += 1;
                let session_id = SessionId::from_sequence(output.sessions_started);
                let date = date_for_offset(params.start_date, offset);

                match self.run_session(user, session_id, date, &mut log, &mut rng)? {
                    SessionOutcome::Completed { overridden } => {
                        output.overrides_applied += u64::from(overridden);
                    }
                    SessionOutcome::Skipped => output.sessions_skipped += 1,
                }
            }
        }

        output.events = log.into_events();
        info!(
            event_name = "cartsim.generation.completed",
            events = output.events.len(),
            sessions = output.sessions_started,
            skipped = output.sessions_skipped,
            overrides = output.overrides_applied,
            "session generation completed"
        );
        Ok(output)
    }

    fn run_session<R: Rng>(
        &self,
        user: &UserProfile,
        session_id: SessionId,
        date: NaiveDate,
        log: &mut EventLog,
        rng: &mut R,
    ) -> Result<SessionOutcome, DomainError> {
        let timestamp = sample_timestamp(rng, date)?;
        let meal_time = MealTime::for_hour(timestamp.hour());

        let template_id = self.template_selector.select(
            self.book,
            self.catalog,
            meal_time,
            &user.preferred_cuisines,
            rng,
        )?;
        let template = self.book.template(template_id).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "selected template `{}` is not loaded",
                template_id.as_str()
            ))
        })?;

        let Some(anchor) =
            self.anchor_selector.select(template, self.catalog, user, &session_id.0, rng)?
        else {
            debug!(
                event_name = "cartsim.session.skipped",
                session_id = %session_id.0,
                template = template_id.as_str(),
                "template has no anchors in the catalog"
            );
            return Ok(SessionOutcome::Skipped);
        };

        let mut cart = CartState::default();
        cart.append(anchor)?;
        let is_abandoned = self.noise.draw_abandonment(rng);

        let session = SessionContext {
            session_id,
            user,
            timestamp,
            meal_time,
            template: template_id,
            is_abandoned,
        };
        let session_start = log.len();
        let outcome = CartBuilder::new(self.catalog, &self.noise, &self.model)
            .run(&session, template, cart, log, rng)?;

        let overridden = self.noise.apply_last_event_override(log, session_start, rng).is_some();
        debug!(
            event_name = "cartsim.session.completed",
            session_id = %session.session_id.0,
            template = template_id.as_str(),
            meal_time = meal_time.as_str(),
            cart_size = outcome.items.len(),
            events = outcome.events_emitted,
            abandoned = is_abandoned,
            "session completed"
        );
        Ok(SessionOutcome::Completed { overridden })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::event::{CandidateEvent, CandidateSource, SessionId};
    use crate::domain::menu::{Category, Cuisine, ItemId, MealRole, MealTime};
    use crate::domain::template::TemplateId;
    use crate::domain::user::{City, Segment, UserId};
    use crate::engine::clock::timestamp_at;

    pub(crate) fn sample_event(session_id: &str) -> CandidateEvent {
        CandidateEvent {
            session_id: SessionId(session_id.to_string()),
            user_id: UserId("U00001".to_string()),
            city: City::Delhi,
            user_segment: Segment::Regular,
            user_veg_preference: 0.5,
            user_price_sensitivity: 0.5,
            timestamp: timestamp_at(NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"), 13.0),
            meal_time: MealTime::Lunch,
            day_of_week: 2,
            hour_of_day: 13,
            is_weekend: 0,
            slot_role: MealRole::Complement,
            candidate_source: CandidateSource::Template,
            cart_items: vec![ItemId::new("ITEM_004")],
            cart_item_count: 1,
            cart_total_price: Decimal::from(279),
            cart_veg_ratio: 0.0,
            last_item_added: ItemId::new("ITEM_004"),
            last_item_category: Category::Main,
            last_item_cuisine: Cuisine::NorthIndian,
            cart_categories: BTreeSet::from([Category::Main]),
            cart_cuisines: BTreeSet::from([Cuisine::NorthIndian]),
            candidate_item_id: ItemId::new("ITEM_030"),
            candidate_category: Category::Side,
            candidate_cuisine: Cuisine::NorthIndian,
            candidate_price: Decimal::from(59),
            candidate_is_veg: 1,
            candidate_meal_role: MealRole::Complement,
            candidate_popularity: 0.75,
            candidate_accepted: 0,
            meal_template: TemplateId::NorthIndianCurry,
            is_abandoned: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::{GenerationParams, SessionGenerator};
    use crate::catalog::MenuCatalog;
    use crate::domain::menu::{ItemId, MealTime};
    use crate::domain::template::TemplateId;
    use crate::engine::noise::NoiseSettings;
    use crate::population::generate_users;
    use crate::rng::population_stream;
    use crate::templates::TemplateBook;

    fn params(seed: u64) -> GenerationParams {
        GenerationParams {
            seed,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"),
            days: 14,
        }
    }

    #[test]
    fn no_users_means_no_events() {
        let catalog = MenuCatalog::standard();
        let book = TemplateBook::standard();
        let output = SessionGenerator::new(&catalog, &book, NoiseSettings::default())
            .generate(&[], &params(1))
            .expect("generation");
        assert!(output.events.is_empty());
        assert_eq!(output.sessions_started, 0);
    }

    #[test]
    fn sessions_without_catalog_anchors_are_skipped() {
        let standard = MenuCatalog::standard();
        let anchors: Vec<ItemId> =
            TemplateBook::standard().templates().flat_map(|t| t.anchors.clone()).collect();
        let catalog = MenuCatalog::new(
            standard.items().iter().filter(|item| !anchors.contains(&item.id)).cloned().collect(),
        )
        .expect("catalog");
        let book = TemplateBook::standard();
        let users = generate_users(5, &mut population_stream(3)).expect("users");

        let output = SessionGenerator::new(&catalog, &book, NoiseSettings::default())
            .generate(&users, &params(3))
            .expect("generation");

        assert!(output.events.is_empty());
        assert_eq!(output.sessions_skipped, output.sessions_started);
        assert_eq!(
            output.sessions_started,
            users.iter().map(|user| u64::from(user.num_orders)).sum::<u64>()
        );
    }

    #[test]
    fn only_breakfast_template_available_still_generates() {
        let catalog = MenuCatalog::standard();
        let standard = TemplateBook::standard();
        let weights = MealTime::ALL
            .iter()
            .map(|meal_time| (*meal_time, vec![(TemplateId::SouthIndianBreakfast, 1.0)]))
            .collect::<BTreeMap<_, _>>();
        let book = TemplateBook::new(standard.templates().cloned().collect(), weights)
            .expect("book");
        let users = generate_users(10, &mut population_stream(5)).expect("users");

        let output = SessionGenerator::new(&catalog, &book, NoiseSettings::default())
            .generate(&users, &params(5))
            .expect("generation");

        assert!(!output.events.is_empty());
        assert!(output
            .events
            .iter()
            .all(|event| event.meal_template == TemplateId::SouthIndianBreakfast));
    }
}
