// Adapters layer: concrete implementations of the domain ports.

pub mod ids;
pub mod llm;
