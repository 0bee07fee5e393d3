//! Messaging core for the agency hub portal: Evolution (WhatsApp) payload
//! normalization, chat/group unification, the composer/sender with webhook
//! relay, and the realtime insert feed.

pub mod access;
pub mod audit;
pub mod config;
pub mod db;
pub mod evolution;
pub mod models;
pub mod realtime;
pub mod service;
pub mod store;
pub mod timeline;
pub mod webhook;
