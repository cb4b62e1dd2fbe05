use tabled::Table;

use crate::{
    cli::{Context, authorize, spinner},
    error,
    error::{Error, Result},
    info,
    spotify,
    types::{Track, TrackTableRow},
};

pub async fn search(ctx: &Context, term: String) {
    let tracks = match search_authorized(ctx, &term).await {
        Ok(tracks) => tracks,
        Err(e) => error!("Search failed: {}", e),
    };

    if tracks.is_empty() {
        info!("No tracks found for \"{}\"", term);
        return;
    }

    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    let table = Table::new(rows);
    println!("{}", table);
}

/// Runs the search, authorizing first and once more if the client ended up
/// redirecting after a rejected token.
pub(crate) async fn search_authorized(ctx: &Context, term: &str) -> Result<Vec<Track>> {
    authorize(ctx).await?;

    let pb = spinner("Searching Spotify...");
    let first = spotify::search::search(&ctx.client, term).await;
    pb.finish_and_clear();

    match first {
        Err(Error::RedirectIssued) => {
            authorize(ctx).await?;
            spotify::search::search(&ctx.client, term).await
        }
        other => other,
    }
}
