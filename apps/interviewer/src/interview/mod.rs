// Interview orchestration: session state, question generation, answer
// evaluation and result aggregation. Model calls go through llm_client and
// always resolve to a value; failures become fallbacks at the call site.

pub mod evaluator;
pub mod handlers;
pub mod models;
pub mod outcome;
pub mod prompts;
pub mod questions;
pub mod results;
pub mod session;
