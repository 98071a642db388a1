pub mod file_kind;
pub mod llm_service;
pub mod packager;
pub mod prompt_builder;
pub mod response_sanitizer;
pub mod vault_reader;

pub use llm_service::LlmService;
pub use packager::Packager;
pub use vault_reader::VaultReader;
