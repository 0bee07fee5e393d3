mod client;
pub mod normalize;
pub mod types;

pub use client::EvolutionClient;
