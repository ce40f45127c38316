pub mod claims;
pub mod import;
pub mod profile_image;
pub mod request;
pub mod resident;
pub mod user;
