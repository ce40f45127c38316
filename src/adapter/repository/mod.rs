pub mod request_in_memory;
pub mod request_postgres;
pub mod resident_in_memory;
pub mod resident_postgres;
pub mod user_in_memory;
pub mod user_postgres;

pub use request_in_memory::InMemoryRequestRepository;
pub use request_postgres::{BlotterRequestPostgresRepository, ClearanceRequestPostgresRepository};
pub use resident_in_memory::InMemoryResidentRepository;
pub use resident_postgres::ResidentPostgresRepository;
pub use user_in_memory::InMemoryUserRepository;
pub use user_postgres::UserPostgresRepository;
