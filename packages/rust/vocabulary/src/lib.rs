//! Legal vocabulary acquisition.
//!
//! The vocabulary is a newline-separated word list, read either from a local
//! file or downloaded over HTTP(S). Every non-blank line becomes one
//! upper-cased [`Word`](wordroots_shared::Word).

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use wordroots_shared::{Result, Vocabulary, WordrootsError};

/// Default timeout in seconds for downloading a word list.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Maximum number of redirects to follow when downloading.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for vocabulary downloads.
const USER_AGENT: &str = concat!("wordroots/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where a word list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularySource {
    /// `http://` or `https://` URL.
    Url(Url),
    /// Local file.
    Path(PathBuf),
}

impl VocabularySource {
    /// Interpret a configured source string.
    ///
    /// `http(s)://` strings are URLs, `file://` URLs become paths, anything
    /// else is taken as a filesystem path.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(WordrootsError::validation("vocabulary source is empty"));
        }

        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(source).map_err(|e| {
                WordrootsError::validation(format!("invalid vocabulary URL {source}: {e}"))
            })?;
            return Ok(Self::Url(url));
        }

        if lower.starts_with("file://") {
            let path = Url::parse(source)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| {
                    WordrootsError::validation(format!("invalid file URL: {source}"))
                })?;
            return Ok(Self::Path(path));
        }

        Ok(Self::Path(PathBuf::from(source)))
    }
}

impl std::fmt::Display for VocabularySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for vocabulary loading.
#[derive(Debug, Clone)]
pub struct VocabularyOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Load and normalize the word list.
///
/// A missing local file is a [`WordrootsError::MissingInput`]; a list with no
/// words at all is rejected, since every later step would silently do nothing.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_vocabulary(
    source: &VocabularySource,
    opts: &VocabularyOptions,
) -> Result<Vocabulary> {
    let text = match source {
        VocabularySource::Url(url) => fetch_word_list(url, opts).await?,
        VocabularySource::Path(path) => read_word_list(path).await?,
    };

    let vocabulary = Vocabulary::parse(&text);
    if vocabulary.is_empty() {
        return Err(WordrootsError::validation(format!(
            "vocabulary source {source} contains no words"
        )));
    }

    info!(words = vocabulary.len(), "loaded vocabulary");
    Ok(vocabulary)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read_word_list(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(WordrootsError::missing_input(path));
    }
    debug!(path = %path.display(), "reading word list from disk");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WordrootsError::io(path, e))
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &VocabularyOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| WordrootsError::Network(format!("failed to build HTTP client: {e}")))
}

async fn fetch_word_list(url: &Url, opts: &VocabularyOptions) -> Result<String> {
    let client = build_client(opts)?;
    info!(%url, "downloading word list");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| WordrootsError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WordrootsError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| WordrootsError::Network(format!("{url}: failed to read body: {e}")))?;

    debug!(bytes = body.len(), "word list downloaded");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wordroots-vocabulary-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parses_url_sources() {
        let source = VocabularySource::parse("https://example.com/words.txt").unwrap();
        assert!(matches!(source, VocabularySource::Url(_)));
    }

    #[test]
    fn parses_path_sources() {
        assert_eq!(
            VocabularySource::parse("  words.txt ").unwrap(),
            VocabularySource::Path(PathBuf::from("words.txt"))
        );
        assert_eq!(
            VocabularySource::parse("file:///tmp/words.txt").unwrap(),
            VocabularySource::Path(PathBuf::from("/tmp/words.txt"))
        );
    }

    #[test]
    fn rejects_empty_source() {
        assert!(VocabularySource::parse("   ").is_err());
    }

    #[tokio::test]
    async fn loads_local_word_list() {
        let dir = temp_dir();
        let path = dir.join("words.txt");
        std::fs::write(&path, "make\nMaking\n\n  run \nRUNNING\n").unwrap();

        let vocabulary = load_vocabulary(&VocabularySource::Path(path), &VocabularyOptions::default())
            .await
            .unwrap();
        assert_eq!(vocabulary.len(), 4);
        assert!(vocabulary.contains("MAKING"));
        assert!(vocabulary.contains("RUN"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_local_file_is_reported() {
        let source = VocabularySource::Path(PathBuf::from("/definitely/not/words.txt"));
        let err = load_vocabulary(&source, &VocabularyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WordrootsError::MissingInput { .. }));
    }

    #[tokio::test]
    async fn blank_word_list_is_rejected() {
        let dir = temp_dir();
        let path = dir.join("blank.txt");
        std::fs::write(&path, "\n   \n").unwrap();

        let err = load_vocabulary(&VocabularySource::Path(path), &VocabularyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WordrootsError::Validation { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn downloads_word_list_from_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/dictionary.txt"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("nation\nnational\nfix\n"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/dictionary.txt", server.uri())).unwrap();
        let vocabulary = load_vocabulary(&VocabularySource::Url(url), &VocabularyOptions::default())
            .await
            .unwrap();

        assert_eq!(vocabulary.len(), 3);
        assert!(vocabulary.contains("NATIONAL"));
    }

    #[tokio::test]
    async fn http_error_is_a_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/dictionary.txt"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/dictionary.txt", server.uri())).unwrap();
        let err = load_vocabulary(&VocabularySource::Url(url), &VocabularyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WordrootsError::Network(_)));
    }
}
