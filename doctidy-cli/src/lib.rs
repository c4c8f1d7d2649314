// All filing logic is in doctidy-core
// This CLI adds the terminal prompts and argument handling

// CLI-specific modules
pub mod console;

// Re-export core types for convenience
pub use doctidy_core::*;

pub use console::ConsoleDecisions;
