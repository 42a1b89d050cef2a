// Domain layer: core models and ports (interfaces) for the parking map.

pub mod model;
pub mod ports;
