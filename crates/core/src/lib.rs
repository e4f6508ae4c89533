//! Synthetic cart-session generator for add-on recommendation training data.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod population;
pub mod rng;
pub mod summary;
pub mod templates;

pub use catalog::{CatalogStats, MenuCatalog};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::event::{CandidateEvent, CandidateSource, SessionId};
pub use domain::menu::{Category, Cuisine, ItemId, MealRole, MealTime, MenuItem};
pub use domain::template::{MealTemplate, TemplateId};
pub use domain::user::{City, Segment, UserId, UserProfile};
pub use engine::acceptance::{AcceptanceModel, CalibratedAcceptanceModel};
pub use engine::noise::{LastEventOverride, NoiseSettings};
pub use engine::{GenerationOutput, GenerationParams, SessionGenerator};
pub use errors::{ApplicationError, DomainError};
pub use population::generate_users;
pub use summary::{summarize, GenerationSummary};
pub use templates::TemplateBook;
