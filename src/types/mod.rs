// Session store shared type definitions
// Each submodule defines types used across the engine.

pub mod errors;
pub mod history;
pub mod literal;
pub mod navigation;
pub mod settings;
