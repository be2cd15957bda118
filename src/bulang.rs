//! Main module for bulang formatting functionality

pub mod config;
pub mod document;
pub mod edits;
pub mod error;
pub mod formatting;
pub mod registry;
