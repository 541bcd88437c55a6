use exam_engine::{config::init_config, database::pool::create_pool, AppState};
use tracing::info;

/// Worker that fetches and persists the AI answer key for one exam session,
/// named by its hash id on the command line.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;

    let hash_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: exam-engine <exam-hash-id>"))?;

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool)?;

    let session = state.store.session_by_hash(&hash_id).await?;
    info!(
        session = %session.hash_id,
        title = session.exam_title.as_deref().unwrap_or("-"),
        "Fetching answer keys"
    );

    let report = state.answer_key_service.fetch_all(session.id).await?;
    info!(
        total = report.total,
        success = report.success,
        "Answer key fetch finished"
    );
    for err in &report.errors {
        tracing::warn!(question_id = err.question_id, error = %err.error, "Question failed");
    }

    Ok(())
}
