//! Game service orchestrating one chess game per session.
//!
//! GameService coordinates the SessionRepository, the position model, and the
//! MoveEngine for the full move exchange: load, validate, apply the user's
//! move, request the engine reply, apply it, persist. Work for the same
//! session id is serialized by a per-session lock; different sessions run
//! concurrently.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use shakmaty::uci::UciMove;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use gambit_types::error::{EngineError, GameError};
use gambit_types::game::{BoardView, GameSession, MoveExchange, PlayedMove};

use crate::game::engine::MoveEngine;
use crate::game::repository::SessionRepository;
use crate::position;

/// Orchestrates the per-session move exchange against the external engine.
///
/// Generic over `SessionRepository` and `MoveEngine` to maintain clean
/// architecture (gambit-core never depends on gambit-infra) and to allow
/// test doubles for both collaborators.
pub struct GameService<R: SessionRepository, E: MoveEngine> {
    repo: R,
    engine: E,
    /// Thinking-time budget handed to the engine for each reply.
    time_budget: Duration,
    /// Per-session locks serializing start_game/submit_move for one id.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held mutation lock for one session id.
///
/// Dropping releases the lock and removes the table entry when no other
/// holder or waiter remains, so the lock table stays bounded by the number
/// of sessions currently mutating rather than every id ever seen.
struct SessionLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionLock<'_> {
    fn drop(&mut self) {
        self.guard = None;
        // waiters clone the Arc under the same shard lock remove_if takes,
        // so the count cannot rise between the check and the removal
        self.locks
            .remove_if(&self.session_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl<R: SessionRepository, E: MoveEngine> GameService<R, E> {
    /// Create a new game service with the given collaborators.
    pub fn new(repo: R, engine: E, time_budget: Duration) -> Self {
        Self {
            repo,
            engine,
            time_budget,
            locks: DashMap::new(),
        }
    }

    /// Access the session repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Acquire the mutation lock for a session id.
    ///
    /// The guard is owned so it can be held across the awaits of the full
    /// load/validate/engine/persist sequence; it is released on every exit
    /// path when the guard drops.
    async fn session_lock(&self, session_id: &str) -> SessionLock<'_> {
        let lock = self
            .locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        SessionLock {
            locks: &self.locks,
            session_id: session_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Start a fresh game for a session, overwriting any game in progress.
    ///
    /// The user plays White; the session starts with the canonical starting
    /// position and an empty record.
    pub async fn start_game(&self, session_id: &str) -> Result<GameSession, GameError> {
        let _guard = self.session_lock(session_id).await;

        let now = Utc::now();
        let session = GameSession {
            session_id: session_id.to_string(),
            fen: position::to_fen(&position::starting()),
            record: String::new(),
            started_at: now,
            updated_at: now,
        };
        self.repo.save(&session).await?;
        info!(session_id, "new game started");
        Ok(session)
    }

    /// Submit the user's move and play out one full exchange.
    ///
    /// Nothing is persisted until the engine has answered: if the engine is
    /// unavailable, times out, or replies with garbage, the stored session is
    /// left byte-identical to before the call, so retrying the same move does
    /// not double-apply it.
    pub async fn submit_move(
        &self,
        session_id: &str,
        move_text: &str,
    ) -> Result<MoveExchange, GameError> {
        let _guard = self.session_lock(session_id).await;

        let mut session = self
            .repo
            .load(session_id)
            .await?
            .ok_or(GameError::NoActiveGame)?;
        let mut pos = position::from_fen(&session.fen).map_err(GameError::CorruptPosition)?;

        let uci: UciMove = move_text
            .trim()
            .parse()
            .map_err(|_| GameError::MalformedMove(move_text.to_string()))?;
        let user_move = uci
            .to_move(&pos)
            .map_err(|_| GameError::IllegalMove(move_text.to_string()))?;

        let mut record = session.record.clone();
        let user_san = position::play_recorded(&mut pos, &user_move, &mut record);
        let user_played = PlayedMove {
            uci: uci.to_string(),
            san: user_san,
        };

        // The user's half-move may already end the game; the engine has no
        // reply to make in a terminal position.
        if let Some(outcome) = position::outcome(&pos) {
            session.fen = position::to_fen(&pos);
            session.record = record;
            session.updated_at = Utc::now();
            self.repo.save(&session).await?;
            info!(session_id, %outcome, "game over after user move");
            return Ok(MoveExchange {
                user_move: user_played,
                engine_move: None,
                fen: session.fen,
                record: session.record,
                outcome: Some(outcome),
            });
        }

        let reply = self
            .engine
            .request_move(&position::to_fen(&pos), self.time_budget)
            .await
            .inspect_err(|err| warn!(session_id, %err, "engine failed, session unchanged"))?;

        // The engine is trusted to move legally, but a reply that does not
        // resolve against the position would corrupt the session if applied.
        let reply_uci: UciMove = reply.trim().parse().map_err(|_| {
            EngineError::Protocol(format!("engine returned unparseable move '{reply}'"))
        })?;
        let engine_move = reply_uci.to_move(&pos).map_err(|_| {
            EngineError::Protocol(format!("engine move '{reply}' is not legal in this position"))
        })?;
        let engine_san = position::play_recorded(&mut pos, &engine_move, &mut record);

        session.fen = position::to_fen(&pos);
        session.record = record;
        session.updated_at = Utc::now();
        self.repo.save(&session).await?;

        let outcome = position::outcome(&pos);
        info!(
            session_id,
            user_move = %user_played.san,
            engine_move = %engine_san,
            "move exchange complete"
        );
        Ok(MoveExchange {
            user_move: user_played,
            engine_move: Some(PlayedMove {
                uci: reply_uci.to_string(),
                san: engine_san,
            }),
            fen: session.fen,
            record: session.record,
            outcome,
        })
    }

    /// Read-only view of the session's board.
    pub async fn board(&self, session_id: &str) -> Result<BoardView, GameError> {
        let session = self
            .repo
            .load(session_id)
            .await?
            .ok_or(GameError::NoActiveGame)?;
        let pos = position::from_fen(&session.fen).map_err(GameError::CorruptPosition)?;
        Ok(BoardView {
            ascii: position::render_ascii(&pos),
            outcome: position::outcome(&pos),
            fen: session.fen,
        })
    }

    /// Read-only view of the session's SAN movetext record.
    pub async fn record(&self, session_id: &str) -> Result<String, GameError> {
        let session = self
            .repo
            .load(session_id)
            .await?
            .ok_or(GameError::NoActiveGame)?;
        Ok(session.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const FEN_AFTER_E4_E5: &str =
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";

    /// In-memory session store with a write counter.
    #[derive(Default)]
    struct MemoryRepo {
        sessions: StdMutex<HashMap<String, GameSession>>,
        saves: AtomicU32,
    }

    impl MemoryRepo {
        fn get(&self, session_id: &str) -> Option<GameSession> {
            self.sessions.lock().unwrap().get(session_id).cloned()
        }

        fn insert(&self, session: GameSession) {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.session_id.clone(), session);
        }

        fn save_count(&self) -> u32 {
            self.saves.load(Ordering::SeqCst)
        }
    }

    impl SessionRepository for Arc<MemoryRepo> {
        async fn load(
            &self,
            session_id: &str,
        ) -> Result<Option<GameSession>, gambit_types::error::RepositoryError> {
            Ok(self.get(session_id))
        }

        async fn save(
            &self,
            session: &GameSession,
        ) -> Result<(), gambit_types::error::RepositoryError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.insert(session.clone());
            Ok(())
        }
    }

    /// Engine replying from a fixed script, with an optional per-call delay.
    struct ScriptedEngine {
        replies: StdMutex<VecDeque<&'static str>>,
        delay: Duration,
    }

    impl ScriptedEngine {
        fn replying(replies: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.iter().copied().collect()),
                delay: Duration::ZERO,
            })
        }

        fn replying_slowly(replies: &[&'static str], delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.iter().copied().collect()),
                delay,
            })
        }
    }

    impl MoveEngine for Arc<ScriptedEngine> {
        async fn request_move(&self, _fen: &str, _budget: Duration) -> Result<String, EngineError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(uci) => Ok(uci.to_string()),
                None => Err(EngineError::Unavailable("script exhausted".to_string())),
            }
        }
    }

    /// Repository whose reads work but whose writes always fail.
    struct BrokenWriteRepo(Arc<MemoryRepo>);

    impl SessionRepository for BrokenWriteRepo {
        async fn load(
            &self,
            session_id: &str,
        ) -> Result<Option<GameSession>, gambit_types::error::RepositoryError> {
            Ok(self.0.get(session_id))
        }

        async fn save(
            &self,
            _session: &GameSession,
        ) -> Result<(), gambit_types::error::RepositoryError> {
            Err(gambit_types::error::RepositoryError::Connection)
        }
    }

    /// Engine that always fails without producing a move.
    struct DownEngine;

    impl MoveEngine for DownEngine {
        async fn request_move(&self, _fen: &str, _budget: Duration) -> Result<String, EngineError> {
            Err(EngineError::Unavailable("connection refused".to_string()))
        }
    }

    fn service<E: MoveEngine>(repo: &Arc<MemoryRepo>, engine: E) -> GameService<Arc<MemoryRepo>, E> {
        GameService::new(Arc::clone(repo), engine, Duration::from_millis(250))
    }

    #[tokio::test]
    async fn test_start_game_returns_starting_position() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&[]));

        let session = svc.start_game("s1").await.unwrap();
        assert_eq!(session.fen, STARTING_FEN);
        assert_eq!(session.record, "");

        let board = svc.board("s1").await.unwrap();
        assert_eq!(board.fen, STARTING_FEN);
        assert!(board.outcome.is_none());
        assert_eq!(svc.record("s1").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_start_game_overwrites_game_in_progress() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        svc.start_game("s1").await.unwrap();
        svc.submit_move("s1", "e2e4").await.unwrap();
        svc.start_game("s1").await.unwrap();

        assert_eq!(repo.get("s1").unwrap().fen, STARTING_FEN);
        assert_eq!(repo.get("s1").unwrap().record, "");
    }

    #[tokio::test]
    async fn test_submit_move_full_exchange() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        svc.start_game("s1").await.unwrap();
        let exchange = svc.submit_move("s1", "e2e4").await.unwrap();

        assert_eq!(exchange.user_move.uci, "e2e4");
        assert_eq!(exchange.user_move.san, "e4");
        let engine_move = exchange.engine_move.unwrap();
        assert_eq!(engine_move.uci, "e7e5");
        assert_eq!(engine_move.san, "e5");
        assert_eq!(exchange.fen, FEN_AFTER_E4_E5);
        assert_eq!(exchange.record, "1. e4 e5");
        assert!(exchange.outcome.is_none());

        // stored session equals the returned state, no stale or partial value
        let stored = repo.get("s1").unwrap();
        assert_eq!(stored.fen, FEN_AFTER_E4_E5);
        assert_eq!(stored.record, "1. e4 e5");
        assert_eq!(svc.record("s1").await.unwrap(), "1. e4 e5");
    }

    #[tokio::test]
    async fn test_submit_move_without_game_yields_no_active_game() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        let err = svc.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(err, GameError::NoActiveGame));
        // no session may be created as a side effect
        assert!(repo.get("s1").is_none());
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_move_rejected_without_mutation() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        svc.start_game("s1").await.unwrap();
        let before = repo.get("s1").unwrap();

        for text in ["z9z9", "", "e2", "e2e4e6x"] {
            let err = svc.submit_move("s1", text).await.unwrap_err();
            assert!(matches!(err, GameError::MalformedMove(_)), "input {text:?}");
        }
        assert_eq!(repo.get("s1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_illegal_move_rejected_without_mutation() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        svc.start_game("s1").await.unwrap();
        let before = repo.get("s1").unwrap();

        let err = svc.submit_move("s1", "e2e5").await.unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));
        assert_eq!(repo.get("s1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_session_byte_identical() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, DownEngine);

        svc.start_game("s1").await.unwrap();
        let before = repo.get("s1").unwrap();
        let saves_before = repo.save_count();

        let err = svc.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(
            err,
            GameError::Engine(EngineError::Unavailable(_))
        ));
        assert_eq!(repo.get("s1").unwrap(), before);
        assert_eq!(repo.save_count(), saves_before);

        // the same move can be retried once the engine is back
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));
        let exchange = svc.submit_move("s1", "e2e4").await.unwrap();
        assert_eq!(exchange.fen, FEN_AFTER_E4_E5);
    }

    #[tokio::test]
    async fn test_failed_save_surfaces_store_error() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));
        svc.start_game("s1").await.unwrap();
        let before = repo.get("s1").unwrap();

        // the same backing store seen through a repository that cannot write
        let broken = GameService::new(
            BrokenWriteRepo(Arc::clone(&repo)),
            ScriptedEngine::replying(&["e7e5"]),
            Duration::from_millis(250),
        );

        let err = broken.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(err, GameError::Store(_)));
        assert_eq!(repo.get("s1").unwrap(), before);

        let err = broken.start_game("s2").await.unwrap_err();
        assert!(matches!(err, GameError::Store(_)));
        assert!(repo.get("s2").is_none());
    }

    #[tokio::test]
    async fn test_lock_table_sheds_idle_sessions() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5"]));

        svc.start_game("s1").await.unwrap();
        svc.submit_move("s1", "e2e4").await.unwrap();
        svc.start_game("s2").await.unwrap();

        assert!(svc.locks.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_engine_reply_is_protocol_error_without_mutation() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["(none)"]));

        svc.start_game("s1").await.unwrap();
        let before = repo.get("s1").unwrap();

        let err = svc.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(err, GameError::Engine(EngineError::Protocol(_))));
        assert_eq!(repo.get("s1").unwrap(), before);

        // a parseable but illegal reply is rejected the same way
        let svc = service(&repo, ScriptedEngine::replying(&["e2e4"]));
        let err = svc.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(err, GameError::Engine(EngineError::Protocol(_))));
        assert_eq!(repo.get("s1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_checkmate_by_engine_is_surfaced() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5", "d8h4"]));

        svc.start_game("s1").await.unwrap();
        svc.submit_move("s1", "f2f3").await.unwrap();
        let exchange = svc.submit_move("s1", "g2g4").await.unwrap();

        assert_eq!(exchange.engine_move.unwrap().san, "Qh4#");
        assert_eq!(
            exchange.outcome,
            Some(gambit_types::game::GameOutcome::BlackWins)
        );
        assert_eq!(exchange.record, "1. f3 e5 2. g4 Qh4#");

        // the session stays loadable after game end
        let board = svc.board("s1").await.unwrap();
        assert_eq!(
            board.outcome,
            Some(gambit_types::game::GameOutcome::BlackWins)
        );
    }

    #[tokio::test]
    async fn test_checkmate_by_user_skips_engine() {
        let repo = Arc::new(MemoryRepo::default());
        // scholar's mate, one white move from the end
        let now = Utc::now();
        repo.insert(GameSession {
            session_id: "s1".to_string(),
            fen: "r1bqkbnr/1ppp1ppp/p1n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 0 4"
                .to_string(),
            record: "1. e4 e5 2. Bc4 Nc6 3. Qf3 a6".to_string(),
            started_at: now,
            updated_at: now,
        });
        // a request would fail, proving the engine is never consulted
        let svc = service(&repo, DownEngine);

        let exchange = svc.submit_move("s1", "f3f7").await.unwrap();
        assert_eq!(exchange.user_move.san, "Qxf7#");
        assert!(exchange.engine_move.is_none());
        assert_eq!(
            exchange.outcome,
            Some(gambit_types::game::GameOutcome::WhiteWins)
        );
        assert!(exchange.record.ends_with("4. Qxf7#"));
        assert_eq!(repo.get("s1").unwrap().fen, exchange.fen);
    }

    #[tokio::test]
    async fn test_corrupt_stored_fen_is_reported() {
        let repo = Arc::new(MemoryRepo::default());
        let now = Utc::now();
        repo.insert(GameSession {
            session_id: "s1".to_string(),
            fen: "this is not a fen".to_string(),
            record: String::new(),
            started_at: now,
            updated_at: now,
        });
        let svc = service(&repo, ScriptedEngine::replying(&[]));

        let err = svc.submit_move("s1", "e2e4").await.unwrap_err();
        assert!(matches!(err, GameError::CorruptPosition(_)));
        let err = svc.board("s1").await.unwrap_err();
        assert!(matches!(err, GameError::CorruptPosition(_)));
    }

    #[tokio::test]
    async fn test_concurrent_submits_are_serialized_per_session() {
        let repo = Arc::new(MemoryRepo::default());
        let engine = ScriptedEngine::replying_slowly(
            &["g8f6", "g8f6", "g8f6", "g8f6"],
            Duration::from_millis(20),
        );
        let svc = Arc::new(service(&repo, engine));

        svc.start_game("s1").await.unwrap();

        // Four racing submissions of the same move: without per-session
        // serialization each would load the starting position and all four
        // would "succeed", double-applying the knight move.
        let mut handles = Vec::new();
        for _ in 0..4 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.submit_move("s1", "g1f3").await
            }));
        }

        let mut ok = 0;
        let mut illegal = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(GameError::IllegalMove(_)) => illegal += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(illegal, 3);

        // one write for start_game, one for the single successful exchange
        assert_eq!(repo.save_count(), 2);
        assert_eq!(repo.get("s1").unwrap().record, "1. Nf3 Nf6");
    }

    #[tokio::test]
    async fn test_sessions_do_not_block_each_other() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(&repo, ScriptedEngine::replying(&["e7e5", "e7e5"]));

        svc.start_game("a").await.unwrap();
        svc.start_game("b").await.unwrap();
        let (ra, rb) = tokio::join!(svc.submit_move("a", "e2e4"), svc.submit_move("b", "e2e4"));
        assert_eq!(ra.unwrap().fen, FEN_AFTER_E4_E5);
        assert_eq!(rb.unwrap().fen, FEN_AFTER_E4_E5);
    }
}
