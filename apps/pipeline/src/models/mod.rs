pub mod payload;
pub mod response;
pub mod resume;
pub mod vacancy;
