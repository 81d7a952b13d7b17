// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution: mapping remote records onto canonical games.
//!
//! Create-or-find runs on the platform's stable id; fuzzy title matching is
//! reserved for cross-user comparison, where two independent libraries share
//! no stable id.

use tracing::debug;

use ludex_core::types::{CanonicalGame, RemoteGame};
use ludex_core::{LibraryStore, LudexError, NewCanonicalGame};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes a title for fuzzy comparison: Unicode NFKD with combining
/// marks stripped, lowercased, every non-alphanumeric run collapsed to a
/// single space, trimmed.
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Picks the best candidate for `title`: an exact normalized match wins;
/// otherwise the first candidate whose normalized title contains the search
/// title or vice versa. Exact must beat containment so "Assassin's Creed"
/// never resolves to "Assassin's Creed II".
pub fn match_by_title<'a, T>(
    candidates: &'a [T],
    title: &str,
    title_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let wanted = normalize_title(title);
    if wanted.is_empty() {
        return None;
    }
    if let Some(exact) = candidates
        .iter()
        .find(|c| normalize_title(title_of(c)) == wanted)
    {
        return Some(exact);
    }
    candidates.iter().find(|c| {
        let candidate = normalize_title(title_of(c));
        !candidate.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
    })
}

/// Create-or-find by the platform's stable id. A stable id, once attached
/// to a canonical game, is never reassigned; repeated resolution of the
/// same remote record always lands on the same game id.
pub async fn resolve_canonical_game(
    store: &dyn LibraryStore,
    remote: &RemoteGame,
) -> Result<CanonicalGame, LudexError> {
    if let Some(existing) = store
        .find_game_by_stable_id(remote.platform, &remote.stable_id)
        .await?
    {
        if !existing.platforms.contains(&remote.platform_label) {
            store
                .add_game_platform_label(existing.id, &remote.platform_label)
                .await?;
        }
        return Ok(existing);
    }

    debug!(platform = %remote.platform, stable_id = %remote.stable_id, title = %remote.title,
        "creating canonical game");
    store
        .insert_game(&NewCanonicalGame {
            title: remote.title.clone(),
            cover_url: remote.cover_url.clone(),
            description: None,
            developer: remote.developer.clone(),
            platform: remote.platform,
            stable_id: remote.stable_id.clone(),
            platform_label: remote.platform_label.clone(),
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludex_core::types::Platform;
    use ludex_storage::SqliteStore;
    use proptest::prelude::*;

    #[test]
    fn normalization_strips_diacritics_and_punctuation() {
        assert_eq!(normalize_title("Pokémon™: Let's Go!"), "pokemon let s go");
        assert_eq!(normalize_title("NieR:Automata"), "nier automata");
        assert_eq!(normalize_title("  DOOM (2016)  "), "doom 2016");
        assert_eq!(normalize_title("★☆★"), "");
    }

    #[test]
    fn exact_match_beats_substring_containment() {
        let candidates = vec!["Assassin's Creed II", "Assassin's Creed"];
        let found = match_by_title(&candidates, "Assassin's Creed", |c| *c).unwrap();
        assert_eq!(*found, "Assassin's Creed");
    }

    #[test]
    fn substring_containment_works_both_directions() {
        let candidates = vec!["The Witcher 3: Wild Hunt"];
        assert!(match_by_title(&candidates, "Witcher 3", |c| *c).is_some());
        let candidates = vec!["Witcher 3"];
        assert!(match_by_title(&candidates, "The Witcher 3: Wild Hunt", |c| *c).is_some());
    }

    #[test]
    fn unrelated_titles_do_not_match() {
        let candidates = vec!["Celeste"];
        assert!(match_by_title(&candidates, "Hades", |c| *c).is_none());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(title in ".{0,64}") {
            let once = normalize_title(&title);
            prop_assert_eq!(normalize_title(&once), once.clone());
        }

        #[test]
        fn normalized_titles_hold_only_lowercase_alphanumerics_and_spaces(title in ".{0,64}") {
            let normalized = normalize_title(&title);
            prop_assert!(normalized
                .chars()
                .all(|c| c == ' ' || (c.is_alphanumeric() && !c.is_uppercase())));
            prop_assert!(!normalized.starts_with(' '));
            prop_assert!(!normalized.ends_with(' '));
        }
    }

    fn remote(stable_id: &str, title: &str) -> RemoteGame {
        RemoteGame::new(Platform::Steam, stable_id, title)
    }

    #[tokio::test]
    async fn resolving_twice_yields_the_same_game_id() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let first = resolve_canonical_game(&store, &remote("10", "Counter-Strike"))
            .await
            .unwrap();

        // Upstream renames do not move the stable id to a new game.
        let second = resolve_canonical_game(&store, &remote("10", "Counter-Strike (2003)"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "Counter-Strike");
    }

    #[tokio::test]
    async fn unseen_stable_id_creates_a_new_game() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let a = resolve_canonical_game(&store, &remote("10", "Counter-Strike"))
            .await
            .unwrap();
        let b = resolve_canonical_game(&store, &remote("20", "Team Fortress Classic"))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
