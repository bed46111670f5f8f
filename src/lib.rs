//! tolkroute - language-aware tier routing for multilingual chat
//!
//! Detects which of South Africa's eleven official languages a message is
//! written in, classifies its intent with weighted keyword tables, and turns
//! both signals plus a subscription tier into a [`router::RoutePlan`].

pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod handlers;
pub mod invoker;
pub mod lexicon;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod router;
pub mod telemetry;
