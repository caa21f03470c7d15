mod answers;
mod ids;
mod question;
mod submission;

pub use answers::AnswerMap;
pub use ids::{QuestionId, TestId, UserId};
pub use question::{Question, TestPaper, TestPaperError};
pub use submission::{SubmissionReason, SubmissionRequest, SubmissionResult};
