//! Record service implementations

mod json;

pub use json::JsonRecordService;
