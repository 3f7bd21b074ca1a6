mod frame;
mod student_state;

pub use frame::{FramePayload, StudentIdentity, DEFAULT_SESSION_ID, DEFAULT_STUDENT_ID};
pub use student_state::{AlertCode, StudentState, StudentStatus};
