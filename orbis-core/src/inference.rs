pub mod advisor;
pub mod model;
pub mod normalize;
pub mod prepare;
pub mod remote;
