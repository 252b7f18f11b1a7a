pub mod certificate;
pub mod pdf_record;
pub mod student;
pub mod upload;
