//! Prompt templates for the two pipeline stages
//!
//! Templates live in `prompts/*.pmt` and are compiled into the binary.
//! The loader renders them with handlebars from typed contexts so the
//! planner and generator never do string surgery on prompt text.

mod embedded;
mod loader;

pub use loader::{GeneratorContext, PlannerContext, PromptLoader};
