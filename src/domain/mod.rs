// Domain layer: data handed between pipeline phases and the ports the pipeline depends on.

pub mod model;
pub mod ports;
