// crates/prism-cli/src/commands/mod.rs
//
// Command module declarations for the Prism CLI.

pub mod cache;
pub mod metadata;
pub mod visualize;
