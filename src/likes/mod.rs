pub mod coordinator;

pub use coordinator::{LikeCoordinator, LikePhase, LikeSnapshot, LikeWatch};
