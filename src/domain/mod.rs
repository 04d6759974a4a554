// Domain layer: response descriptors, endpoints, fetch reports and the ports the
// core talks to.

pub mod model;
pub mod ports;
