use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::domain::event::{CandidateEvent, CandidateSource, CartSnapshot, SessionId};
use crate::domain::menu::{MealRole, MealTime, MenuItem};
use crate::domain::template::TemplateId;
use crate::domain::user::UserProfile;
use crate::engine::clock::is_weekend;

/// Session-level fields shared by every event a session emits.
#[derive(Clone, Debug)]
pub struct SessionContext<'a> {
    pub session_id: SessionId,
    pub user: &'a UserProfile,
    pub timestamp: NaiveDateTime,
    pub meal_time: MealTime,
    pub template: TemplateId,
    pub is_abandoned: bool,
}

impl SessionContext<'_> {
    pub fn is_weekend(&self) -> bool {
        is_weekend(&self.timestamp)
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Turns one candidate evaluation into a flat training record.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventEmitter;

impl EventEmitter {
    pub fn candidate_event(
        &self,
        session: &SessionContext<'_>,
        slot_role: MealRole,
        source: CandidateSource,
        cart: CartSnapshot,
        candidate: &MenuItem,
        accepted: u8,
    ) -> CandidateEvent {
        let user = session.user;
        CandidateEvent {
            session_id: session.session_id.clone(),
            user_id: user.id.clone(),
            city: user.city,
            user_segment: user.segment,
            user_veg_preference: round_to(user.veg_preference, 3),
            user_price_sensitivity: round_to(user.price_sensitivity, 3),
            timestamp: session.timestamp,
            meal_time: session.meal_time,
            day_of_week: session.timestamp.weekday().num_days_from_monday(),
            hour_of_day: session.timestamp.hour(),
            is_weekend: u8::from(session.is_weekend()),
            slot_role,
            candidate_source: source,
            cart_item_count: cart.item_count,
            cart_total_price: cart.total_price,
            cart_veg_ratio: cart.veg_ratio,
            last_item_added: cart.last_item,
            last_item_category: cart.last_item_category,
            last_item_cuisine: cart.last_item_cuisine,
            cart_categories: cart.categories,
            cart_cuisines: cart.cuisines,
            cart_items: cart.items,
            candidate_item_id: candidate.id.clone(),
            candidate_category: candidate.category,
            candidate_cuisine: candidate.cuisine,
            candidate_price: candidate.price,
            candidate_is_veg: u8::from(candidate.is_veg),
            candidate_meal_role: candidate.meal_role,
            candidate_popularity: candidate.popularity_score,
            candidate_accepted: accepted,
            meal_template: session.template,
            is_abandoned: u8::from(session.is_abandoned),
        }
    }
}

/// Ordered record of every emitted event in the run.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<CandidateEvent>,
}

impl EventLog {
    pub fn record(&mut self, event: CandidateEvent) {
        self.events.push(event);
    }

    pub fn mark_abandoned(&mut self, index: usize) -> bool {
        match self.events.get_mut(index) {
            Some(event) => {
                event.is_abandoned = 1;
                true
            }
            None => false,
        }
    }

    pub fn events(&self) -> &[CandidateEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<CandidateEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::{round_to, EventLog};
    use crate::engine::test_support::sample_event;

    #[test]
    fn rounding_keeps_requested_precision() {
        assert_eq!(round_to(0.666_666, 2), 0.67);
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(0.0, 2), 0.0);
    }

    #[test]
    fn log_marks_only_existing_events() {
        let mut log = EventLog::default();
        log.record(sample_event("S0000001"));
        log.record(sample_event("S0000002"));

        assert!(log.mark_abandoned(1));
        assert!(!log.mark_abandoned(2));
        assert!(!log.events()[0].abandoned());
        assert!(log.events()[1].abandoned());
        assert_eq!(log.into_events().len(), 2);
    }
}
