//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod campaign_repo;
pub mod character_repo;
pub mod codex_repo;
pub mod encounter_repo;
pub mod library_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use campaign_repo::CampaignRepo;
pub use character_repo::CharacterRepo;
pub use codex_repo::CodexRepo;
pub use encounter_repo::EncounterRepo;
pub use library_repo::LibraryRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
