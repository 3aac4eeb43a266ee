pub mod error;
pub mod event_repo;
pub mod memory;
pub mod note_repo;
pub mod pet_repo;
pub mod user_repo;
