use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::domain::RawEntry;
use crate::fetcher::parser::parse_entries;
use crate::fetcher::{FetchError, Fetcher, HttpFetcher};

/// Where a feed body is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Http(Url),
    File(PathBuf),
}

impl Location {
    /// `http(s)://` URLs go over the network; `file://` URLs and bare paths
    /// are read from disk.
    pub fn resolve(location: &str) -> Result<Self, FetchError> {
        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Location::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Location::File)
                    .map_err(|_| FetchError::UnsupportedScheme(location.to_string())),
                _ => Err(FetchError::UnsupportedScheme(location.to_string())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Location::File(PathBuf::from(location)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Fetches feeds from HTTP(S) or the local filesystem and parses them.
pub struct SourceFetcher {
    http: HttpFetcher,
}

impl SourceFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<RawEntry>, FetchError> {
        let body = match Location::resolve(location)? {
            Location::Http(url) => self.http.get(&url).await?,
            Location::File(path) => tokio::fs::read(&path).await?,
        };

        parse_entries(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Watchlist</title>
    <item><title>Arrival</title><link>https://watch.plex.tv/movie/arrival</link></item>
  </channel>
</rss>"#;

    fn fetcher() -> SourceFetcher {
        SourceFetcher::new(HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap())
    }

    #[test]
    fn test_resolve_http() {
        let loc = Location::resolve("https://rss.plex.tv/abc").unwrap();
        assert!(matches!(loc, Location::Http(url) if url.host_str() == Some("rss.plex.tv")));
    }

    #[test]
    fn test_resolve_bare_path() {
        let loc = Location::resolve("/tmp/watchlist.xml").unwrap();
        assert_eq!(loc, Location::File(PathBuf::from("/tmp/watchlist.xml")));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_file_url() {
        let loc = Location::resolve("file:///tmp/watchlist.xml").unwrap();
        assert_eq!(loc, Location::File(PathBuf::from("/tmp/watchlist.xml")));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = Location::resolve("ftp://example.com/feed.xml");
        assert!(matches!(result, Err(FetchError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_fetch_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RSS.as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let entries = tokio_test::block_on(fetcher().fetch(&path)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title.as_deref(), Some("Arrival"));
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");

        let result = fetcher().fetch(&path.to_string_lossy()).await;
        assert!(matches!(result, Err(FetchError::Io(_))));
    }

    #[tokio::test]
    async fn test_fetch_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<html><body>not a feed</body></html>").unwrap();

        let result = fetcher().fetch(&file.path().to_string_lossy()).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
