// Support-program retrieval: source adapters, aggregation, region filtering
// and the recurring-program catalog. No LLM calls in this module.

pub mod aggregator;
pub mod handlers;
pub mod models;
pub mod recurring;
pub mod region;
pub mod sources;
