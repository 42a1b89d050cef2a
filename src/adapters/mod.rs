// Adapters layer: concrete implementations for external systems (http service, terminal map).

pub mod console;
pub mod http;
