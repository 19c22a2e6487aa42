pub mod file_service;
pub mod records;
pub mod storage;
pub mod student_service;
