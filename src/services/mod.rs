pub mod syllabus_service;

pub use syllabus_service::SyllabusService;
