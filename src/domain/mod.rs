// Domain layer: fire records, the typed model and the ports the pipeline talks to.

pub mod fields;
pub mod fire_point;
pub mod model;
pub mod ports;
