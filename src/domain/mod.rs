// Domain layer - Core playback types

pub mod errors;
pub mod model;
