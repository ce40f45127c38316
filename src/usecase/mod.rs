pub mod create_resident;
pub mod delete_resident;
pub mod export_residents;
pub mod get_profile_image;
pub mod get_resident;
pub mod import_residents;
pub mod list_residents;
pub mod login;
pub mod manage_requests;
pub mod register_user;
pub mod resident_stats;
pub mod submit_request;
pub mod update_resident;
pub mod validate_token;

pub use create_resident::CreateResidentUseCase;
pub use delete_resident::DeleteResidentUseCase;
pub use export_residents::ExportResidentsUseCase;
pub use get_profile_image::GetProfileImageUseCase;
pub use get_resident::GetResidentUseCase;
pub use import_residents::ImportResidentsUseCase;
pub use list_residents::ListResidentsUseCase;
pub use login::LoginUseCase;
pub use manage_requests::RequestUseCases;
pub use register_user::RegisterUserUseCase;
pub use resident_stats::ResidentStatsUseCase;
pub use submit_request::{SubmitBlotterRequestUseCase, SubmitClearanceRequestUseCase};
pub use update_resident::UpdateResidentUseCase;
pub use validate_token::ValidateTokenUseCase;
