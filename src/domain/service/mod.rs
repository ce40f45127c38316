pub mod import_validator;
pub mod request_validator;
pub mod resident_validator;
