use feed_rs::model::Entry;
use feed_rs::parser;
use url::Url;

use crate::domain::RawEntry;
use crate::fetcher::FetchError;

/// Parse an RSS, Atom or JSON feed body into raw entries.
pub fn parse_entries(body: &[u8]) -> Result<Vec<RawEntry>, FetchError> {
    let feed = parser::parse(body)?;
    Ok(feed.entries.into_iter().map(raw_entry).collect())
}

fn raw_entry(entry: Entry) -> RawEntry {
    let thumbnail = entry
        .media
        .iter()
        .flat_map(|media| media.thumbnails.iter())
        .map(|thumb| thumb.image.uri.clone())
        .next();

    RawEntry {
        author: entry.authors.first().map(|a| a.name.clone()),
        link: entry_link(&entry),
        title: entry.title.map(|t| t.content),
        thumbnail,
        published: entry.published,
    }
}

/// The entry's page: its alternate link, else any link, else a guid that is
/// itself an http(s) URL.
fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .or_else(|| {
            Url::parse(&entry.id)
                .ok()
                .filter(|url| matches!(url.scheme(), "http" | "https"))
                .map(|_| entry.id.clone())
        })
}
