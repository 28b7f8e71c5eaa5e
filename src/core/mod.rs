pub mod config;
pub mod decision;
pub mod hysteresis;
pub mod overrides;
pub mod sampler;
pub mod table;
