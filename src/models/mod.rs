pub mod career;
pub mod period;
pub mod syllabus;
pub mod user;

pub use career::{Career, NewCareerRequest};
pub use period::{AcademicPeriod, NewPeriodRequest};
pub use syllabus::{
    Evaluation, EvaluationUpdate, NewSyllabusRequest, Syllabus, SyllabusDetail, SyllabusUnit,
    UnitUpdate, UpdateSyllabusRequest,
};
pub use user::{
    BatchRegisterResponse, LoginRequest, LoginResponse, RegisterRequest, Role, UpdateUserRequest,
    User,
};
