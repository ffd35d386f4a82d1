pub mod grading_service;
pub mod storage_service;

pub use grading_service::GradingService;
pub use storage_service::StorageService;
