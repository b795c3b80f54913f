pub mod combat;
pub mod model;
