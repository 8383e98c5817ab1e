// Domain layer: source tree, produced model graph, and the ports the core talks through.

pub mod model;
pub mod ports;
pub mod source;
