use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::event::CandidateEvent;
use crate::domain::menu::MealTime;
use crate::domain::user::{City, Segment};
use crate::engine::emitter::round_to;

/// Acceptance must land strictly inside this band to look realistic.
pub const REALISTIC_ACCEPTANCE: (f64, f64) = (0.03, 0.50);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total_events: usize,
    pub unique_sessions: usize,
    pub unique_users: usize,
    pub overall_acceptance_rate: f64,
    pub acceptance_by_segment: BTreeMap<Segment, f64>,
    pub acceptance_by_meal_time: BTreeMap<MealTime, f64>,
    pub sessions_by_city: BTreeMap<City, usize>,
    pub avg_cart_size_at_event: f64,
    pub events_by_hour: BTreeMap<u32, usize>,
    pub abandonment_rate: f64,
    pub labels_binary: bool,
    pub acceptance_rate_realistic: bool,
}

#[derive(Default)]
struct RateAccumulator {
    accepted: usize,
    total: usize,
}

impl RateAccumulator {
    fn push(&mut self, accepted: bool) {
        self.accepted += usize::from(accepted);
        self.total += 1;
    }

    fn rate(&self) -> f64 {
        ratio(self.accepted, self.total, 4)
    }
}

fn ratio(numerator: usize, denominator: usize, decimals: i32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_to(numerator as f64 / denominator as f64, decimals)
}

pub fn summarize(events: &[CandidateEvent]) -> GenerationSummary {
    let mut sessions = BTreeSet::new();
    let mut users = BTreeSet::new();
    let mut overall = RateAccumulator::default();
    let mut by_segment: BTreeMap<Segment, RateAccumulator> = BTreeMap::new();
    let mut by_meal_time: BTreeMap<MealTime, RateAccumulator> = BTreeMap::new();
    let mut city_sessions: BTreeMap<City, BTreeSet<&str>> = BTreeMap::new();
    let mut events_by_hour = BTreeMap::new();
    let mut cart_sizes = 0_usize;
    let mut abandoned = 0_usize;
    let mut labels_binary = true;

    for event in events {
        sessions.insert(event.session_id.0.as_str());
        users.insert(event.user_id.as_str());
        labels_binary &= event.candidate_accepted <= 1;

        let accepted = event.accepted();
        overall.push(accepted);
        by_segment.entry(event.user_segment).or_default().push(accepted);
        by_meal_time.entry(event.meal_time).or_default().push(accepted);
        city_sessions.entry(event.city).or_default().insert(event.session_id.0.as_str());
        *events_by_hour.entry(event.hour_of_day).or_insert(0) += 1;
        cart_sizes += event.cart_item_count;
        abandoned += usize::from(event.abandoned());
    }

    let overall_acceptance_rate = overall.rate();
    let avg_cart_size_at_event = ratio(cart_sizes, events.len(), 2);
    let (low, high) = REALISTIC_ACCEPTANCE;

    GenerationSummary {
        total_events: events.len(),
        unique_sessions: sessions.len(),
        unique_users: users.len(),
        overall_acceptance_rate,
        acceptance_by_segment: by_segment.iter().map(|(k, v)| (*k, v.rate())).collect(),
        acceptance_by_meal_time: by_meal_time.iter().map(|(k, v)| (*k, v.rate())).collect(),
        sessions_by_city: city_sessions.iter().map(|(k, v)| (*k, v.len())).collect(),
        avg_cart_size_at_event,
        events_by_hour,
        abandonment_rate: ratio(abandoned, events.len(), 4),
        labels_binary,
        acceptance_rate_realistic: low < overall_acceptance_rate && overall_acceptance_rate < high,
    }
}

#[cfg(test)]
mod tests {
    use super::summarize;
    use crate::domain::event::SessionId;
    use crate::domain::user::{City, Segment};
    use crate::engine::test_support::sample_event;

    #[test]
    fn empty_input_summarizes_to_zeroes() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.overall_acceptance_rate, 0.0);
        assert_eq!(summary.avg_cart_size_at_event, 0.0);
        assert!(summary.labels_binary);
        assert!(!summary.acceptance_rate_realistic);
    }

    #[test]
    fn rates_group_by_segment_and_city_sessions() {
        let mut first = sample_event("S0000001");
        first.candidate_accepted = 1;
        let second = sample_event("S0000001");
        let mut third = sample_event("S0000002");
        third.user_segment = Segment::Power;
        third.city = City::Chennai;
        third.session_id = SessionId("S0000002".to_string());
        third.is_abandoned = 1;
        third.cart_item_count = 3;

        let summary = summarize(&[first, second, third]);
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.unique_sessions, 2);
        assert_eq!(summary.unique_users, 1);
        assert_eq!(summary.overall_acceptance_rate, 0.3333);
        assert_eq!(summary.acceptance_by_segment[&Segment::Regular], 0.5);
        assert_eq!(summary.acceptance_by_segment[&Segment::Power], 0.0);
        assert_eq!(summary.sessions_by_city[&City::Delhi], 1);
        assert_eq!(summary.sessions_by_city[&City::Chennai], 1);
        assert_eq!(summary.avg_cart_size_at_event, 1.67);
        assert_eq!(summary.abandonment_rate, 0.3333);
        assert!(summary.acceptance_rate_realistic);
    }
}
