use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weird_audiobook::controllers::audiobook::AudiobookController;
use weird_audiobook::domain::audiobook::{AudiobookProcessor, Speaker};
use weird_audiobook::domain::article::HttpArticleSource;
use weird_audiobook::domain::speech::{
    ClovaCredentials, ClovaSpeechProvider, ClovaVoice, PollySpeechProvider, SpeechProvider,
};
use weird_audiobook::infrastructure::config::{Config, LogFormat};
use weird_audiobook::infrastructure::db::{check_connection, create_pool};
use weird_audiobook::infrastructure::http::start_http_server;
use weird_audiobook::infrastructure::queue::{SqsTaskQueue, TaskConsumer};
use weird_audiobook::infrastructure::repositories::PgAudiobookRepository;
use weird_audiobook::infrastructure::storage::{ObjectStore, S3ObjectStore};
use weird_audiobook::infrastructure::workers::{
    HttpAudioJoiner, HttpAudioTranscoder, TranscodingPreset,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting weird-audiobook on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    // AWS clients (Polly for async synthesis, S3 for audio objects, SQS for
    // the task queue)
    tracing::info!("Loading AWS configuration for region: {}", config.aws_region);
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));
    let sqs_client = Arc::new(aws_sdk_sqs::Client::new(&aws_config));
    tracing::info!("AWS clients initialized");

    let pool = Arc::new(pool);
    let config = Arc::new(config);
    let http_client = reqwest::Client::new();

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories and collaborator clients
    tracing::info!("Instantiating repositories and clients...");
    let audiobook_repo = Arc::new(PgAudiobookRepository::new(pool.clone()));
    let object_store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(s3_client.clone()));
    let article_source = Arc::new(HttpArticleSource::new(
        http_client.clone(),
        config.blog_base_url.clone(),
    ));
    let task_queue = Arc::new(SqsTaskQueue::new(
        sqs_client.clone(),
        config.task_queue_url.clone(),
    ));
    let joiner = Arc::new(HttpAudioJoiner::new(
        http_client.clone(),
        config.audio_joiner_endpoint.clone(),
    ));
    let transcoder = Arc::new(HttpAudioTranscoder::new(
        http_client.clone(),
        config.audio_transcoder_endpoint.clone(),
    ));

    // 2. Speech providers, one per configured speaker
    let clova_credentials = ClovaCredentials {
        client_id: config.clova_client_id.clone(),
        client_secret: config.clova_client_secret.clone(),
    };
    let speakers: Vec<(Speaker, Arc<dyn SpeechProvider>)> = vec![
        (
            Speaker::AwsPollySeoyeon,
            Arc::new(PollySpeechProvider::new(polly_client.clone())),
        ),
        (
            Speaker::NaverClovaMijin,
            Arc::new(ClovaSpeechProvider::new(
                http_client.clone(),
                clova_credentials.clone(),
                object_store.clone(),
                ClovaVoice::Mijin,
            )),
        ),
        (
            Speaker::NaverClovaJinho,
            Arc::new(ClovaSpeechProvider::new(
                http_client.clone(),
                clova_credentials.clone(),
                object_store.clone(),
                ClovaVoice::Jinho,
            )),
        ),
    ];

    // 3. The orchestrator
    tracing::info!("Instantiating audiobook processor...");
    let processor = Arc::new(AudiobookProcessor::new(
        audiobook_repo.clone(),
        article_source.clone(),
        speakers,
        joiner,
        transcoder,
        vec![
            TranscodingPreset::SegmentedStreaming,
            TranscodingPreset::SingleFileCompressed,
        ],
        config.audiobook_bucket.clone(),
    ));

    // 4. Controllers
    let audiobook_controller = Arc::new(AudiobookController::new(
        audiobook_repo.clone(),
        article_source.clone(),
        task_queue.clone(),
        config.cdn_base_url.clone(),
    ));

    // Run the queue consumer next to the HTTP server
    let consumer = TaskConsumer::new(sqs_client.clone(), config.task_queue_url.clone(), processor);
    tokio::spawn(consumer.run());

    // Start HTTP server with all routes
    start_http_server(pool, config, audiobook_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "weird_audiobook=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "weird_audiobook=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
