use anyhow::Context;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use chrono::Utc;
use clap::{Parser, Subcommand};
use lambda_runtime::{service_fn, LambdaEvent};
use photo_search_core::{
    HttpRequest, IntentSettings, LabelSettings, LexIntentExtractor, ObjectMetadata, ObjectStore,
    OpenSearchSettings, OpenSearchStore, PhotoIndexer, RekognitionLabelDetector, S3ObjectStore,
    SearchCoordinator, SearchSettings, StorageEvent, CUSTOM_LABELS_FIELD,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type Indexer = PhotoIndexer<S3ObjectStore, RekognitionLabelDetector, OpenSearchStore>;
type Searcher = SearchCoordinator<LexIntentExtractor, OpenSearchStore>;

#[derive(Parser)]
#[command(name = "photo-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Lambda handler to run when no subcommand is given: `index` or `search`.
    /// Other values are ignored.
    #[arg(long, env = "_HANDLER")]
    handler: Option<String>,

    /// AWS region for S3, Rekognition and Lex
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// OpenSearch base URL
    #[arg(long, env = "OPENSEARCH_URL", default_value_t = OpenSearchSettings::default().endpoint)]
    opensearch_url: String,

    /// OpenSearch index name
    #[arg(long, env = "OPENSEARCH_INDEX", default_value_t = OpenSearchSettings::default().index_name)]
    opensearch_index: String,

    /// OpenSearch basic auth username
    #[arg(long, env = "OS_USERNAME")]
    opensearch_username: Option<String>,

    /// OpenSearch basic auth password
    #[arg(long, env = "OS_PASSWORD", hide_env_values = true)]
    opensearch_password: Option<String>,

    /// Lex V2 bot id
    #[arg(long, env = "LEX_BOT_ID", default_value = "")]
    lex_bot_id: String,

    /// Lex V2 bot alias id
    #[arg(long, env = "LEX_BOT_ALIAS_ID", default_value = "")]
    lex_bot_alias_id: String,

    /// Lex V2 locale
    #[arg(long, env = "LEX_LOCALE_ID", default_value_t = IntentSettings::default().locale_id)]
    lex_locale_id: String,

    /// Lex session id used for every query
    #[arg(long, env = "LEX_SESSION_ID", default_value_t = IntentSettings::default().session_id)]
    lex_session_id: String,

    /// Maximum number of labels requested from Rekognition
    #[arg(long, env = "MAX_LABELS", default_value_t = LabelSettings::default().max_labels)]
    max_labels: i32,

    /// Minimum label confidence, in percent
    #[arg(long, env = "MIN_CONFIDENCE", default_value_t = LabelSettings::default().min_confidence)]
    min_confidence: f32,

    /// Maximum number of search hits
    #[arg(long, env = "MAX_RESULTS", default_value_t = SearchSettings::default().max_results)]
    max_results: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Run the photo indexer under the Lambda runtime.
    IndexHandler,
    /// Run photo search under the Lambda runtime.
    SearchHandler,
    /// Index one stored object, as if a storage notification arrived.
    Index {
        /// Bucket holding the photo.
        #[arg(long)]
        bucket: String,
        /// Object key, not URL-encoded.
        #[arg(long)]
        key: String,
    },
    /// Run a search and print the response envelope.
    Search {
        /// Free-text query
        #[arg(long)]
        query: String,
    },
    /// Upload a photo with optional custom labels.
    Upload {
        /// Target bucket.
        #[arg(long)]
        bucket: String,
        /// Local image file.
        #[arg(long)]
        file: PathBuf,
        /// Object key; defaults to the file name.
        #[arg(long)]
        key: Option<String>,
        /// Comma separated custom labels.
        #[arg(long)]
        labels: Option<String>,
    },
}

/// Lambda handler named by `--handler` / `_HANDLER`, if it is one we run.
fn lambda_command(handler: Option<&str>) -> Option<Command> {
    match handler.map(str::trim) {
        Some("index") => Some(Command::IndexHandler),
        Some("search") => Some(Command::SearchHandler),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");
    let in_lambda = std::env::var_os("AWS_LAMBDA_FUNCTION_NAME").is_some();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_ansi(!in_lambda))
        .init();

    let mut cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "photo-search boot"
    );

    let command = match cli.command.take() {
        Some(command) => command,
        None => lambda_command(cli.handler.as_deref()).with_context(|| {
            format!(
                "no subcommand given and handler {:?} is neither `index` nor `search`",
                cli.handler
            )
        })?,
    };

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(cli.region.clone()))
        .load()
        .await;

    match command {
        Command::IndexHandler => {
            let indexer = build_indexer(&cli, &shared)?;
            run_index_handler(&indexer)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
        }
        Command::SearchHandler => {
            let searcher = build_searcher(&cli, &shared)?;
            run_search_handler(&searcher)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
        }
        Command::Index { bucket, key } => {
            let indexer = build_indexer(&cli, &shared)?;
            let indexed = indexer
                .index_key(&bucket, &key)
                .await
                .with_context(|| format!("indexing s3://{bucket}/{key} failed"))?;
            println!("{}", serde_json::to_string_pretty(&indexed)?);
        }
        Command::Search { query } => {
            let searcher = build_searcher(&cli, &shared)?;
            let response = searcher.handle(&HttpRequest::with_query(query)).await;
            println!("{}", serde_json::to_string_pretty(&response.body_json()?)?);
        }
        Command::Upload {
            bucket,
            file,
            key,
            labels,
        } => {
            let key = match key {
                Some(key) => key,
                None => file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
                    .with_context(|| format!("path has no file name: {}", file.display()))?,
            };
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("cannot read {}", file.display()))?;

            let mut custom = HashMap::new();
            if let Some(labels) = labels.filter(|labels| !labels.trim().is_empty()) {
                custom.insert(CUSTOM_LABELS_FIELD.to_string(), labels);
            }
            let metadata = ObjectMetadata {
                content_type: Some(content_type_for(&file).to_string()),
                content_length: None,
                custom,
            };

            let store = S3ObjectStore::new(aws_sdk_s3::Client::new(&shared));
            store
                .put_object(&bucket, &key, body, &metadata)
                .await
                .with_context(|| format!("upload to s3://{bucket}/{key} failed"))?;
            println!("uploaded s3://{bucket}/{key}");
        }
    }

    Ok(())
}

fn opensearch_store(cli: &Cli) -> anyhow::Result<OpenSearchStore> {
    let settings = OpenSearchSettings {
        endpoint: cli.opensearch_url.clone(),
        index_name: cli.opensearch_index.clone(),
        username: cli.opensearch_username.clone(),
        password: cli.opensearch_password.clone(),
        ..OpenSearchSettings::default()
    };
    OpenSearchStore::new(&settings).context("cannot build opensearch client")
}

fn build_indexer(cli: &Cli, shared: &aws_config::SdkConfig) -> anyhow::Result<Indexer> {
    let labels = LabelSettings {
        max_labels: cli.max_labels,
        min_confidence: cli.min_confidence,
    };
    Ok(PhotoIndexer::new(
        S3ObjectStore::new(aws_sdk_s3::Client::new(shared)),
        RekognitionLabelDetector::new(aws_sdk_rekognition::Client::new(shared), labels),
        opensearch_store(cli)?,
    ))
}

fn build_searcher(cli: &Cli, shared: &aws_config::SdkConfig) -> anyhow::Result<Searcher> {
    let intent = IntentSettings {
        bot_id: cli.lex_bot_id.clone(),
        bot_alias_id: cli.lex_bot_alias_id.clone(),
        locale_id: cli.lex_locale_id.clone(),
        session_id: cli.lex_session_id.clone(),
    };
    Ok(SearchCoordinator::new(
        LexIntentExtractor::new(aws_sdk_lexruntimev2::Client::new(shared), intent),
        opensearch_store(cli)?,
        SearchSettings {
            max_results: cli.max_results,
        },
    ))
}

async fn run_index_handler(indexer: &Indexer) -> Result<(), lambda_runtime::Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<StorageEvent>| async move {
        Ok::<_, lambda_runtime::Error>(indexer.handle(&event.payload).await)
    }))
    .await
}

async fn run_search_handler(searcher: &Searcher) -> Result<(), lambda_runtime::Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<HttpRequest>| async move {
        Ok::<_, lambda_runtime::Error>(searcher.handle(&event.payload).await)
    }))
    .await
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_the_extension() {
        assert_eq!(content_type_for(Path::new("beach.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("dog.png")), "image/png");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn handler_env_selects_a_lambda_handler() {
        let cli = Cli::parse_from(["photo-search", "--handler", "search"]);
        assert!(cli.command.is_none());
        assert!(matches!(
            lambda_command(cli.handler.as_deref()),
            Some(Command::SearchHandler)
        ));
        assert!(matches!(lambda_command(Some("index")), Some(Command::IndexHandler)));
    }

    #[test]
    fn unknown_handler_does_not_block_subcommands() {
        let cli = Cli::parse_from([
            "photo-search",
            "--handler",
            "bootstrap",
            "search",
            "--query",
            "x",
        ]);
        assert!(matches!(cli.command, Some(Command::Search { .. })));
        assert!(lambda_command(cli.handler.as_deref()).is_none());
        assert!(lambda_command(None).is_none());
    }

    #[test]
    fn flag_defaults_come_from_core_settings() {
        let cli = Cli::parse_from(["photo-search", "--handler", "index"]);
        assert_eq!(cli.max_labels, LabelSettings::default().max_labels);
        assert_eq!(cli.min_confidence, LabelSettings::default().min_confidence);
        assert_eq!(cli.max_results, SearchSettings::default().max_results);
        assert_eq!(cli.lex_locale_id, IntentSettings::default().locale_id);
    }

    #[test]
    fn settings_flags_parse() {
        let cli = Cli::parse_from([
            "photo-search",
            "--opensearch-index",
            "gallery",
            "--max-results",
            "25",
            "search",
            "--query",
            "dogs",
        ]);
        assert_eq!(cli.opensearch_index, "gallery");
        assert_eq!(cli.max_results, 25);
        assert!(matches!(cli.command, Some(Command::Search { .. })));
    }
}
