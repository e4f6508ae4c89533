use thiserror::Error;

use crate::domain::menu::{ItemId, MealTime};
use crate::domain::template::TemplateId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate catalog item id `{0}`")]
    DuplicateItemId(ItemId),
    #[error("catalog item `{item}` is invalid: {reason}")]
    InvalidMenuItem { item: ItemId, reason: String },
    #[error("item `{0}` is not present in the catalog")]
    UnknownItem(ItemId),
    #[error("meal-time `{meal_time:?}` weights reference unknown template `{template:?}`")]
    UnknownTemplate { meal_time: MealTime, template: TemplateId },
    #[error("template weights for `{0:?}` do not form a usable distribution")]
    DegenerateTemplateWeights(MealTime),
    #[error("every anchor of template `{template:?}` scored zero for session {session_id}")]
    DegenerateAnchorScores { template: TemplateId, session_id: String },
    #[error("item `{0}` is already in the cart")]
    DuplicateCartItem(ItemId),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("output failure: {0}")]
    Output(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain",
            Self::Configuration(_) => "config_validation",
            Self::Output(_) => "output",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Domain(_) => 3,
            Self::Output(_) => 4,
        }
    }
}
