// Domain layer: data model and the narrow service ports the pipeline talks to.

pub mod model;
pub mod ports;
