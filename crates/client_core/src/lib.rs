pub mod error;
pub mod service;
pub mod session;
pub mod token_store;

pub use error::{CommandError, ServiceError};
pub use service::{HttpInterviewService, InterviewService, ResumeUpload};
pub use session::{ActiveInterview, Session, SessionController, View};
pub use token_store::{FileTokenStore, TokenStore};

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod service_tests;
