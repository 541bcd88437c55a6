pub mod answer_fetcher;
pub mod answer_key_service;
pub mod exam_service;
pub mod extraction;
pub mod grading_service;
pub mod prompt_builder;
pub mod shuffle_service;
pub mod text_gen;
