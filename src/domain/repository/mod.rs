pub mod profile_image_storage;
pub mod request_repository;
pub mod resident_repository;
pub mod user_repository;

pub use profile_image_storage::ProfileImageStorage;
pub use request_repository::RequestRepository;
pub use resident_repository::ResidentRepository;
pub use user_repository::UserRepository;
