// src/services/mod.rs

//! Services for talking to the paste feed and classifying pastes.

pub mod classifier;
pub mod pastebin;

pub use classifier::Classifier;
pub use pastebin::{PasteSource, PastebinClient};
