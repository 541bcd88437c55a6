pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use crate::services::answer_fetcher::CorrectAnswerFetcher;
use crate::services::answer_key_service::AnswerKeyService;
use crate::services::exam_service::ExamService;
use crate::store::postgres::PgAnswerStore;
use crate::store::AnswerStore;
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub store: Arc<dyn AnswerStore>,
    pub exam_service: ExamService,
    pub answer_key_service: AnswerKeyService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.ai_request_timeout_secs))
            .build()
            .unwrap();

        let store: Arc<dyn AnswerStore> = Arc::new(PgAnswerStore::new(pool.clone()));
        let fetcher = CorrectAnswerFetcher::from_config(config, http_client)?;
        let exam_service = ExamService::new(store.clone());
        let answer_key_service = AnswerKeyService::new(
            Arc::new(fetcher),
            store.clone(),
            config.fetch_concurrency,
        );

        Ok(Self {
            pool,
            store,
            exam_service,
            answer_key_service,
        })
    }
}
