pub mod facts;
pub mod report;
pub mod resume;
pub mod target;
