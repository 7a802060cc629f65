//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Planner system instruction (technique selection)
pub const PLANNER: &str = include_str!("../../prompts/planner.pmt");

/// Generator system instruction (technique application)
pub const GENERATOR: &str = include_str!("../../prompts/generator.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "planner" => Some(PLANNER),
        "generator" => Some(GENERATOR),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_planner() {
        let planner = get_embedded("planner").unwrap();
        assert!(planner.contains("communication technique"));
        assert!(planner.contains("JSON object"));
    }

    #[test]
    fn test_get_embedded_generator() {
        let generator = get_embedded("generator").unwrap();
        assert!(generator.contains("Dear"));
        assert!(generator.contains("DO NOT give advice"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("missing-template").is_none());
    }
}
