//! Settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use bulk_indexer_pipeline::BulkIndexerConfig;
use bulk_indexer_repository::OpenSearchConfig;

use crate::IndexingError;

/// Output format of the logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(IndexingError::config(format!("Unknown log format: {}", other))),
        }
    }
}

/// Everything needed to run the pipeline.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    pub opensearch: OpenSearchConfig,
    pub bulk: BulkIndexerConfig,
    pub log_format: LogFormat,
}

impl IndexerSettings {
    /// Load settings from the process environment, after reading `.env`
    /// when one is present.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `BULK_FLUSH_BYTES`: batch size threshold in bytes (default: 1 MiB)
    /// - `BULK_DRAIN_TIMEOUT_SECS`: wait for in-flight batches on stop (default: 60)
    /// - `BULK_ASSUMED_SHARDS`: shards assumed per index for large loads (default: 5)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, IndexingError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opensearch = match lookup("OPENSEARCH_URL") {
            Some(url) => OpenSearchConfig::new(url),
            None => OpenSearchConfig::default(),
        };
        if let Some(secs) = parse::<u64>(&lookup, "OPENSEARCH_TIMEOUT_SECS")? {
            opensearch = opensearch.with_request_timeout(Duration::from_secs(secs));
        }

        let mut bulk = BulkIndexerConfig::default();
        if let Some(bytes) = parse::<usize>(&lookup, "BULK_FLUSH_BYTES")? {
            if bytes == 0 {
                return Err(IndexingError::config("BULK_FLUSH_BYTES must be positive"));
            }
            bulk = bulk.with_flush_byte_size(bytes);
        }
        if let Some(secs) = parse::<u64>(&lookup, "BULK_DRAIN_TIMEOUT_SECS")? {
            bulk = bulk.with_drain_timeout(Duration::from_secs(secs));
        }
        if let Some(shards) = parse::<usize>(&lookup, "BULK_ASSUMED_SHARDS")? {
            bulk = bulk.with_assumed_shard_count(shards);
        }

        let log_format = match lookup("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            opensearch,
            bulk,
            log_format,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, IndexingError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| IndexingError::config(format!("Invalid {} {:?}: {}", key, value, e)))
        })
        .transpose()
}
