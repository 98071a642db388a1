pub mod generation_flow;
pub mod session;

pub use generation_flow::{GeneratedArtifact, GenerationFlow};
pub use session::{Session, SessionState};
