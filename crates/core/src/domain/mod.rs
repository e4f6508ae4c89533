pub mod event;
pub mod menu;
pub mod template;
pub mod user;
