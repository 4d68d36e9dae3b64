// Domain layer: resource models, creation payloads and the upload port.

pub mod model;
pub mod payload;
pub mod ports;
