// Domain layer: core models, ports and the currency conversion. No I/O here.

pub mod model;
pub mod ports;
pub mod services;
