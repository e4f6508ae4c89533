use std::collections::BTreeSet;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Beta;

use crate::domain::menu::Cuisine;
use crate::domain::user::{City, Segment, UserId, UserProfile};
use crate::errors::DomainError;

const CITY_WEIGHTS: [(City, f64); 6] = [
    (City::Mumbai, 0.25),
    (City::Delhi, 0.25),
    (City::Bangalore, 0.18),
    (City::Hyderabad, 0.15),
    (City::Chennai, 0.10),
    (City::Kolkata, 0.07),
];

/// Segment selection as an explicit cumulative scan: new 40%, regular 45%,
/// power 15%.
const SEGMENT_CUMULATIVE: [(Segment, f64); 3] =
    [(Segment::New, 0.40), (Segment::Regular, 0.85), (Segment::Power, 1.00)];

/// Share of the city affinity at which a cuisine becomes a preference.
const AFFINITY_THRESHOLD: f64 = 0.8;

const PRICE_SENSITIVITY_BETA: (f64, f64) = (2.0, 3.0);

pub fn order_range(segment: Segment) -> (u32, u32) {
    match segment {
        Segment::New => (1, 3),
        Segment::Regular => (4, 20),
        Segment::Power => (21, 60),
    }
}

/// Beta shape parameters for veg preference; alpha > beta leans veg.
fn veg_beta_params(city: City) -> (f64, f64) {
    match city {
        City::Mumbai => (2.0, 2.5),
        City::Delhi => (2.5, 2.5),
        City::Bangalore => (3.0, 2.0),
        City::Hyderabad => (1.8, 3.0),
        City::Chennai => (3.5, 2.0),
        City::Kolkata => (2.0, 2.8),
    }
}

pub fn city_cuisine_affinity(city: City) -> [(Cuisine, f64); 7] {
    use Cuisine::*;

    let [north, south, chinese, street, mughlai, continental, desserts] = match city {
        City::Mumbai => [0.7, 0.4, 0.6, 0.9, 0.5, 0.5, 0.6],
        City::Delhi => [0.9, 0.3, 0.6, 0.8, 0.9, 0.4, 0.7],
        City::Bangalore => [0.5, 0.9, 0.5, 0.5, 0.3, 0.7, 0.5],
        City::Hyderabad => [0.5, 0.6, 0.4, 0.5, 0.9, 0.3, 0.6],
        City::Chennai => [0.3, 0.95, 0.4, 0.6, 0.2, 0.4, 0.5],
        City::Kolkata => [0.5, 0.3, 0.7, 0.8, 0.6, 0.4, 0.8],
    };
    [
        (NorthIndian, north),
        (SouthIndian, south),
        (Chinese, chinese),
        (StreetFood, street),
        (Mughlai, mughlai),
        (Continental, continental),
        (Desserts, desserts),
    ]
}

pub fn segment_for_roll(roll: f64) -> Segment {
    SEGMENT_CUMULATIVE
        .iter()
        .find(|(_, cumulative)| roll <= *cumulative)
        .map(|(segment, _)| *segment)
        .unwrap_or(Segment::New)
}

fn distribution_error(error: impl std::fmt::Display) -> DomainError {
    DomainError::InvariantViolation(format!("population distribution is invalid: {error}"))
}

/// Samples `n_users` independent profiles. Ids run `U00001`, `U00002`, ...
pub fn generate_users<R: Rng>(n_users: usize, rng: &mut R) -> Result<Vec<UserProfile>, DomainError> {
    let city_index =
        WeightedIndex::new(CITY_WEIGHTS.iter().map(|(_, weight)| *weight)).map_err(distribution_error)?;
    let (price_alpha, price_beta) = PRICE_SENSITIVITY_BETA;
    let price_sensitivity = Beta::new(price_alpha, price_beta).map_err(distribution_error)?;

    let mut users = Vec::with_capacity(n_users);
    for index in 0..n_users {
        let city = CITY_WEIGHTS[city_index.sample(rng)].0;

        let segment = segment_for_roll(rng.gen::<f64>());
        let (low, high) = order_range(segment);
        let num_orders = rng.gen_range(low..=high);

        let affinity = city_cuisine_affinity(city);
        let mut preferred_cuisines: BTreeSet<Cuisine> = affinity
            .iter()
            .filter(|(_, score)| rng.gen::<f64>() < score * AFFINITY_THRESHOLD)
            .map(|(cuisine, _)| *cuisine)
            .collect();
        if preferred_cuisines.is_empty() {
            // first maximum wins on ties
            let top = affinity
                .iter()
                .fold(affinity[0], |best, entry| if entry.1 > best.1 { *entry } else { best });
            preferred_cuisines.insert(top.0);
        }

        let (veg_alpha, veg_beta) = veg_beta_params(city);
        let veg_preference = Beta::new(veg_alpha, veg_beta).map_err(distribution_error)?.sample(rng);

        users.push(UserProfile {
            id: UserId(format!("U{:05}", index + 1)),
            city,
            segment,
            veg_preference,
            price_sensitivity: price_sensitivity.sample(rng),
            preferred_cuisines,
            num_orders,
        });
    }

    Ok(users)
}
