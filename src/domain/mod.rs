// Domain layer: record types and the ports the extraction core talks through.

pub mod model;
pub mod ports;
