//! Case-insensitive substring search over place titles.
//!
//! Everything here is a pure function of the places and the query. Applying the outcome
//! to markers is left to [`MarkerMirror::apply_visibility`](crate::MarkerMirror::apply_visibility).

use crate::place::{Place, PlaceId};

/// Whether `title` contains `query`, ignoring case. An empty query matches everything.
pub fn matches(title: &str, query: &str) -> bool {
    query.is_empty() || title.to_lowercase().contains(&query.to_lowercase())
}

/// Returns the places whose title matches `query`, in their original order.
pub fn search<'a>(places: &'a [Place], query: &str) -> Vec<&'a Place> {
    let query = query.to_lowercase();
    places
        .iter()
        .filter(|p| matches_folded(&p.title, &query))
        .collect()
}

/// Returns the only place matching `text`, or `None` if zero or several places match.
pub fn unique_match<'a>(places: &'a [Place], text: &str) -> Option<&'a Place> {
    let text = text.to_lowercase();
    let mut hits = places.iter().filter(|p| matches_folded(&p.title, &text));
    match (hits.next(), hits.next()) {
        (Some(place), None) => Some(place),
        _ => None,
    }
}

/// Yields the visibility each place's marker should have for `query`.
pub fn visibility<'a>(
    places: &'a [Place],
    query: &str,
) -> impl Iterator<Item = (PlaceId, bool)> + 'a {
    let query = query.to_lowercase();
    places
        .iter()
        .map(move |p| (p.id(), matches_folded(&p.title, &query)))
}

fn matches_folded(title: &str, folded_query: &str) -> bool {
    folded_query.is_empty() || title.to_lowercase().contains(folded_query)
}
