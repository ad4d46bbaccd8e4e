pub mod achievements;
pub mod caffeine;
pub mod data;
pub mod reminder;
pub mod settings;
pub mod streak;
pub mod water;
