//! Pokedex TUI - searchable Pokemon catalog over the PokeAPI GraphQL endpoint
//!
//! The library exposes the app's modules for testing.

pub mod action;
pub mod components;
pub mod effect;
pub mod graphql;
pub mod query;
pub mod reducer;
pub mod route;
pub mod sprite;
pub mod state;
pub mod view;
