//! Score service client.
//!
//! The backend keeps at most one row per `(player_id, game_id)` holding that
//! player's best score. Submission is keep-maximum: a run that doesn't beat
//! the stored best writes nothing. Reads degrade gracefully, a dead backend
//! shows a zero best and an empty leaderboard, never an error screen.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("player id is required")]
    MissingPlayer,
    #[error("score store: {0}")]
    Store(String),
}

/// One persisted best-score row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: i64,
    pub player_id: String,
    pub username: String,
    pub game_id: String,
    pub high_score: u64,
}

/// Who is playing, as established by the embedding page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub player_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The stored best was raised (or created)
    NewBest,
    /// The run did not beat the stored best; nothing was written
    NotImproved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub username: String,
    pub high_score: u64,
}

/// The four remote primitives the backend exposes.
///
/// Futures here are not `Send`; everything runs on the single wasm thread.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    async fn fetch_best(
        &self,
        player_id: &str,
        game_id: &str,
    ) -> Result<Option<ScoreRow>, ScoreError>;

    /// Top rows for a game, ordered by score descending.
    async fn fetch_top(&self, game_id: &str, limit: usize) -> Result<Vec<ScoreRow>, ScoreError>;

    async fn update_row(&self, id: i64, username: &str, high_score: u64)
        -> Result<(), ScoreError>;

    async fn insert(
        &self,
        player_id: &str,
        username: &str,
        game_id: &str,
        high_score: u64,
    ) -> Result<(), ScoreError>;
}

/// How many rows to over-fetch per requested leaderboard slot, so that one
/// player hogging several top raw rows still leaves enough distinct names.
const LEADERBOARD_OVERSAMPLE: usize = 3;

pub struct ScoreClient<S> {
    store: S,
}

impl<S: ScoreStore> ScoreClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Keep-maximum submission. Reads the stored best, writes only on a
    /// strict improvement.
    ///
    /// The read and the write are two round trips; two sessions for the same
    /// player racing here can lose the smaller update, matching the backend's
    /// surface, which has no conditional write.
    pub async fn submit_score(
        &self,
        identity: &Identity,
        game_id: &str,
        score: u64,
    ) -> Result<SubmitOutcome, ScoreError> {
        if identity.player_id.is_empty() {
            return Err(ScoreError::MissingPlayer);
        }

        let existing = self
            .store
            .fetch_best(&identity.player_id, game_id)
            .await?;

        match existing {
            Some(row) if score <= row.high_score => Ok(SubmitOutcome::NotImproved),
            Some(row) => {
                self.store
                    .update_row(row.id, &identity.username, score)
                    .await?;
                Ok(SubmitOutcome::NewBest)
            }
            None => {
                self.store
                    .insert(&identity.player_id, &identity.username, game_id, score)
                    .await?;
                Ok(SubmitOutcome::NewBest)
            }
        }
    }

    /// Stored best for a player, 0 when absent or unreachable.
    pub async fn user_best(&self, player_id: &str, game_id: &str) -> u64 {
        if player_id.is_empty() {
            return 0;
        }
        match self.store.fetch_best(player_id, game_id).await {
            Ok(row) => row.map(|r| r.high_score).unwrap_or(0),
            Err(err) => {
                log::warn!("user_best({game_id}) failed: {err}");
                0
            }
        }
    }

    /// Top `limit` distinct players for a game, best first. One entry per
    /// player even if the store holds several rows for them; empty on error.
    pub async fn leaderboard(&self, game_id: &str, limit: usize) -> Vec<LeaderboardEntry> {
        let rows = match self
            .store
            .fetch_top(game_id, limit * LEADERBOARD_OVERSAMPLE)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("leaderboard({game_id}) failed: {err}");
                return Vec::new();
            }
        };

        let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(limit);
        for row in rows {
            // Rows arrive best-first, so the first sighting of a player is
            // their best
            if entries.iter().any(|e| e.player_id == row.player_id) {
                continue;
            }
            entries.push(LeaderboardEntry {
                player_id: row.player_id,
                username: row.username,
                high_score: row.high_score,
            });
            if entries.len() == limit {
                break;
            }
        }
        entries
    }
}

/// In-memory store backing native tests and the headless smoke run.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    rows: RefCell<Vec<ScoreRow>>,
    next_id: Cell<i64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }

    /// Seed a raw row directly, bypassing keep-maximum.
    pub fn seed(&self, player_id: &str, username: &str, game_id: &str, high_score: u64) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.rows.borrow_mut().push(ScoreRow {
            id,
            player_id: player_id.into(),
            username: username.into(),
            game_id: game_id.into(),
            high_score,
        });
    }
}

impl ScoreStore for MemoryScoreStore {
    async fn fetch_best(
        &self,
        player_id: &str,
        game_id: &str,
    ) -> Result<Option<ScoreRow>, ScoreError> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|r| r.player_id == player_id && r.game_id == game_id)
            .max_by_key(|r| r.high_score)
            .cloned())
    }

    async fn fetch_top(&self, game_id: &str, limit: usize) -> Result<Vec<ScoreRow>, ScoreError> {
        let mut rows: Vec<ScoreRow> = self
            .rows
            .borrow()
            .iter()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.high_score.cmp(&a.high_score));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn update_row(
        &self,
        id: i64,
        username: &str,
        high_score: u64,
    ) -> Result<(), ScoreError> {
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ScoreError::Store(format!("no row {id}")))?;
        row.username = username.into();
        row.high_score = high_score;
        Ok(())
    }

    async fn insert(
        &self,
        player_id: &str,
        username: &str,
        game_id: &str,
        high_score: u64,
    ) -> Result<(), ScoreError> {
        self.seed(player_id, username, game_id, high_score);
        Ok(())
    }
}

/// PostgREST-style remote store.
#[cfg(target_arch = "wasm32")]
pub use remote::RestScoreStore;

#[cfg(target_arch = "wasm32")]
mod remote {
    use super::{ScoreError, ScoreRow, ScoreStore};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    pub struct RestScoreStore {
        base_url: String,
        api_key: String,
    }

    impl RestScoreStore {
        pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into(),
                api_key: api_key.into(),
            }
        }

        fn table_url(&self, query: &str) -> String {
            format!("{}/rest/v1/scores?{query}", self.base_url)
        }

        async fn request(
            &self,
            method: &str,
            url: &str,
            body: Option<String>,
        ) -> Result<String, ScoreError> {
            let opts = RequestInit::new();
            opts.set_method(method);
            opts.set_mode(RequestMode::Cors);
            if let Some(body) = body {
                opts.set_body(&JsValue::from_str(&body));
            }

            let request = Request::new_with_str_and_init(url, &opts)
                .map_err(|e| ScoreError::Store(format!("{e:?}")))?;
            let headers = request.headers();
            headers
                .set("apikey", &self.api_key)
                .and_then(|_| headers.set("Authorization", &format!("Bearer {}", self.api_key)))
                .and_then(|_| headers.set("Content-Type", "application/json"))
                .map_err(|e| ScoreError::Store(format!("{e:?}")))?;

            let window = web_sys::window()
                .ok_or_else(|| ScoreError::Store("no window".into()))?;
            let response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(|e| ScoreError::Store(format!("{e:?}")))?;
            let response: Response = response
                .dyn_into()
                .map_err(|_| ScoreError::Store("not a Response".into()))?;
            if !response.ok() {
                return Err(ScoreError::Store(format!("HTTP {}", response.status())));
            }
            let text = JsFuture::from(
                response
                    .text()
                    .map_err(|e| ScoreError::Store(format!("{e:?}")))?,
            )
            .await
            .map_err(|e| ScoreError::Store(format!("{e:?}")))?;
            Ok(text.as_string().unwrap_or_default())
        }
    }

    impl ScoreStore for RestScoreStore {
        async fn fetch_best(
            &self,
            player_id: &str,
            game_id: &str,
        ) -> Result<Option<ScoreRow>, ScoreError> {
            let url = self.table_url(&format!(
                "select=*&player_id=eq.{player_id}&game_id=eq.{game_id}\
                 &order=high_score.desc&limit=1"
            ));
            let body = self.request("GET", &url, None).await?;
            let rows: Vec<ScoreRow> =
                serde_json::from_str(&body).map_err(|e| ScoreError::Store(e.to_string()))?;
            Ok(rows.into_iter().next())
        }

        async fn fetch_top(
            &self,
            game_id: &str,
            limit: usize,
        ) -> Result<Vec<ScoreRow>, ScoreError> {
            let url = self.table_url(&format!(
                "select=*&game_id=eq.{game_id}&order=high_score.desc&limit={limit}"
            ));
            let body = self.request("GET", &url, None).await?;
            serde_json::from_str(&body).map_err(|e| ScoreError::Store(e.to_string()))
        }

        async fn update_row(
            &self,
            id: i64,
            username: &str,
            high_score: u64,
        ) -> Result<(), ScoreError> {
            let url = self.table_url(&format!("id=eq.{id}"));
            let body = serde_json::json!({
                "username": username,
                "high_score": high_score,
            });
            self.request("PATCH", &url, Some(body.to_string())).await?;
            Ok(())
        }

        async fn insert(
            &self,
            player_id: &str,
            username: &str,
            game_id: &str,
            high_score: u64,
        ) -> Result<(), ScoreError> {
            let url = self.table_url("");
            let body = serde_json::json!({
                "player_id": player_id,
                "username": username,
                "game_id": game_id,
                "high_score": high_score,
            });
            self.request("POST", &url, Some(body.to_string())).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> Identity {
        Identity {
            player_id: format!("id-{name}"),
            username: name.into(),
        }
    }

    fn client() -> ScoreClient<MemoryScoreStore> {
        ScoreClient::new(MemoryScoreStore::new())
    }

    /// Store whose every call fails, for the degradation paths.
    struct DeadStore;

    impl ScoreStore for DeadStore {
        async fn fetch_best(&self, _: &str, _: &str) -> Result<Option<ScoreRow>, ScoreError> {
            Err(ScoreError::Store("connection refused".into()))
        }
        async fn fetch_top(&self, _: &str, _: usize) -> Result<Vec<ScoreRow>, ScoreError> {
            Err(ScoreError::Store("connection refused".into()))
        }
        async fn update_row(&self, _: i64, _: &str, _: u64) -> Result<(), ScoreError> {
            Err(ScoreError::Store("connection refused".into()))
        }
        async fn insert(&self, _: &str, _: &str, _: &str, _: u64) -> Result<(), ScoreError> {
            Err(ScoreError::Store("connection refused".into()))
        }
    }

    #[test]
    fn submit_keeps_the_maximum() {
        pollster::block_on(async {
            let client = client();
            let alice = player("alice");

            let out = client.submit_score(&alice, "snake", 100).await.unwrap();
            assert_eq!(out, SubmitOutcome::NewBest);
            assert_eq!(client.user_best(&alice.player_id, "snake").await, 100);

            // A worse run writes nothing
            let out = client.submit_score(&alice, "snake", 50).await.unwrap();
            assert_eq!(out, SubmitOutcome::NotImproved);
            assert_eq!(client.user_best(&alice.player_id, "snake").await, 100);

            // A better run updates the existing row in place
            let out = client.submit_score(&alice, "snake", 200).await.unwrap();
            assert_eq!(out, SubmitOutcome::NewBest);
            assert_eq!(client.user_best(&alice.player_id, "snake").await, 200);
            assert_eq!(client.store().row_count(), 1);
        });
    }

    #[test]
    fn equal_score_is_not_an_improvement() {
        pollster::block_on(async {
            let client = client();
            let alice = player("alice");
            client.submit_score(&alice, "snake", 100).await.unwrap();
            let out = client.submit_score(&alice, "snake", 100).await.unwrap();
            assert_eq!(out, SubmitOutcome::NotImproved);
        });
    }

    #[test]
    fn games_track_separate_bests() {
        pollster::block_on(async {
            let client = client();
            let alice = player("alice");
            client.submit_score(&alice, "snake", 100).await.unwrap();
            client.submit_score(&alice, "geodash", 40).await.unwrap();
            assert_eq!(client.user_best(&alice.player_id, "snake").await, 100);
            assert_eq!(client.user_best(&alice.player_id, "geodash").await, 40);
            assert_eq!(client.store().row_count(), 2);
        });
    }

    #[test]
    fn missing_player_is_rejected_before_any_io() {
        pollster::block_on(async {
            let client = ScoreClient::new(DeadStore);
            let nobody = Identity {
                player_id: String::new(),
                username: "ghost".into(),
            };
            let err = client.submit_score(&nobody, "snake", 10).await.unwrap_err();
            assert!(matches!(err, ScoreError::MissingPlayer));
        });
    }

    #[test]
    fn reads_degrade_instead_of_erroring() {
        pollster::block_on(async {
            let client = ScoreClient::new(DeadStore);
            assert_eq!(client.user_best("id-alice", "snake").await, 0);
            assert!(client.leaderboard("snake", 10).await.is_empty());
        });
    }

    #[test]
    fn unknown_player_best_is_zero() {
        pollster::block_on(async {
            let client = client();
            assert_eq!(client.user_best("id-stranger", "snake").await, 0);
        });
    }

    #[test]
    fn leaderboard_dedups_keeping_each_players_best() {
        pollster::block_on(async {
            let client = client();
            let store = client.store();
            // One player with several raw rows mixed among others
            store.seed("id-a", "a", "snake", 50);
            store.seed("id-a", "a", "snake", 80);
            store.seed("id-b", "b", "snake", 30);
            store.seed("id-a", "a", "snake", 80);
            store.seed("id-c", "c", "snake", 10);

            let board = client.leaderboard("snake", 10).await;
            assert_eq!(board.len(), 3);
            assert_eq!(board[0].player_id, "id-a");
            assert_eq!(board[0].high_score, 80);
            assert_eq!(board[1].high_score, 30);
            assert_eq!(board[2].high_score, 10);
        });
    }

    #[test]
    fn leaderboard_is_ordered_and_truncated() {
        pollster::block_on(async {
            let client = client();
            for (i, score) in [40u64, 90, 10, 70, 55].iter().enumerate() {
                client
                    .store()
                    .seed(&format!("id-{i}"), &format!("p{i}"), "snake", *score);
            }
            let board = client.leaderboard("snake", 3).await;
            let scores: Vec<u64> = board.iter().map(|e| e.high_score).collect();
            assert_eq!(scores, vec![90, 70, 55]);
        });
    }

    #[test]
    fn leaderboard_ignores_other_games() {
        pollster::block_on(async {
            let client = client();
            client.store().seed("id-a", "a", "snake", 50);
            client.store().seed("id-b", "b", "geodash", 900);
            let board = client.leaderboard("snake", 10).await;
            assert_eq!(board.len(), 1);
            assert_eq!(board[0].player_id, "id-a");
        });
    }
}
