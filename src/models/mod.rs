// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Availability, Booking, BookingStatus, Coordinate, EducationInfo, RankedTeacher,
    SubjectOffered, TeacherProfile, TeacherSummary, UNREACHABLE,
};
pub use requests::{BookTeacherRequest, CheckBookingParams, CreateTeacherFormRequest, SearchParams};
pub use responses::{
    BookingCheckResponse, BookingListResponse, BookingResponse, BookingView, ErrorResponse,
    HealthResponse, MessageResponse, SearchResponse, TeacherFormResponse, TeacherListResponse,
    NO_TEACHERS_FOUND,
};
