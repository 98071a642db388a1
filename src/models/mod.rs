pub mod output;
pub mod task;
pub mod vault;

pub use output::{GenerationResult, ScormFiles};
pub use task::{GenerationRequest, GenerationTask};
pub use vault::{ExtractedAsset, VaultContent};
