//! Auction-site listing content generation.

pub mod generator;
pub mod styles;

pub use generator::{ContentGenerator, split_content_sections};
pub use styles::StyleTemplate;
