use url::form_urlencoded;

use crate::{
    error::Result,
    spotify::ApiClient,
    types::{SearchResponse, Track},
};

/// Searches the catalog for tracks matching `term`.
///
/// The raw term is URL-escaped and sent with `type=track` plus the configured
/// market and limit. Hits without artist or album names get the
/// `Unknown Artist` / `Unknown Album` placeholders instead of failing the page.
///
/// An empty (or whitespace-only) term returns an empty list without touching
/// the network, and a search without matches returns an empty list as well:
/// "no results" is not an error.
///
/// # Example
///
/// ```
/// let tracks = search(&client, "daft punk").await?;
/// println!("Found {} tracks", tracks.len());
/// ```
pub async fn search(client: &ApiClient, term: &str) -> Result<Vec<Track>> {
    if term.trim().is_empty() {
        return Ok(Vec::new());
    }

    let config = client.auth().config();
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("type", "track")
        .append_pair("q", term)
        .append_pair("market", &config.market)
        .append_pair("limit", &config.search_limit.to_string())
        .finish();

    let res: SearchResponse = client.get(&format!("/search?{query}")).await?;

    Ok(res
        .tracks
        .map(|t| t.items)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(Track::from)
        .collect())
}
