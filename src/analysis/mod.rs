pub mod blur;
pub mod face;
pub mod framing;
pub mod lighting;
pub mod liveness;
pub mod object;
pub mod screenshot;
