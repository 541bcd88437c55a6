pub mod answer_key;
pub mod exam_session;
pub mod question;
pub mod submission;
