//! Reconciliation controller: applies intents to the session cache, calls the remote store
//! and resynchronises from it when something goes wrong.
//!
//! Gated intents (load, add, delete, reset) hold the busy flag until their last remote call,
//! including any follow-up load, has completed. While the flag is held, further gated intents
//! are dropped with [`IntentError::Busy`]. Score changes skip the gate: they are applied to
//! the cache immediately and persisted in a spawned task.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::client::{
    feedback::{DEFAULT_FEEDBACK_TTL, FeedbackKind, FeedbackTarget},
    remote::{RemoteError, RemoteStore},
    session::Session,
};

/// Yes/no prompt shown before destructive actions.
pub trait Confirm: Send + Sync {
    /// Ask the user; `true` means proceed.
    fn confirm(&self, prompt: String) -> BoxFuture<'static, bool>;
}

/// User requests accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Reload players and channels.
    Load,
    /// Create a player.
    AddPlayer {
        /// Display name, trimmed before use.
        name: String,
        /// Avatar URL, trimmed before use.
        avatar_url: String,
    },
    /// Move a player's score by `delta`, never below zero.
    ChangeScore {
        /// Player identifier.
        id: String,
        /// Signed change.
        delta: i64,
    },
    /// Award `points_per_unit` for each completed unit of a task.
    AddTaskPoints {
        /// Player identifier.
        id: String,
        /// Points awarded per unit.
        points_per_unit: u32,
        /// Units completed; anything below one counts as one.
        quantity: i64,
    },
    /// Remove a player after confirmation.
    DeletePlayer {
        /// Player identifier.
        id: String,
    },
    /// Zero every score; the password is checked by the server.
    ResetAllScores {
        /// Admin password forwarded as-is.
        password: String,
    },
}

impl Intent {
    /// Whether the intent must wait for the busy flag.
    pub fn is_gated(&self) -> bool {
        !matches!(
            self,
            Intent::ChangeScore { .. } | Intent::AddTaskPoints { .. }
        )
    }
}

/// How an accepted intent ended.
#[derive(Debug)]
pub enum Outcome {
    /// All remote calls completed.
    Done,
    /// Nothing to do: declined confirmation, empty board or unchanged score.
    Skipped,
    /// Score applied locally; the handle resolves once the server answered and the cache was
    /// reconciled (or resynchronised).
    Persisting(JoinHandle<Result<(), RemoteError>>),
}

/// Reasons an intent did not complete.
#[derive(Debug, Error)]
pub enum IntentError {
    /// Another gated intent is in flight; this one was dropped.
    #[error("another action is in progress")]
    Busy,
    /// Local input was refused before any remote call.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The identifier is not in the cache.
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
    /// The remote store failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Coerce a quantity field: anything that is not a number of at least one becomes one.
pub fn coerce_quantity(raw: &str) -> i64 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|quantity| *quantity >= 1)
        .unwrap_or(1)
}

/// Score change awarded by a task.
pub fn task_delta(points_per_unit: u32, quantity: i64) -> i64 {
    i64::from(points_per_unit).saturating_mul(quantity.max(1))
}

/// Apply `delta` to `current`, clamping at zero.
pub fn apply_delta(current: u32, delta: i64) -> u32 {
    i64::from(current)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}

/// Releases the busy flag when dropped.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns the session context and drives every intent against the remote store.
pub struct Controller<R> {
    remote: Arc<R>,
    session: Arc<Mutex<Session>>,
    busy: Arc<AtomicBool>,
    confirm: Arc<dyn Confirm>,
}

impl<R> Clone for Controller<R> {
    fn clone(&self) -> Self {
        Self {
            remote: self.remote.clone(),
            session: self.session.clone(),
            busy: self.busy.clone(),
            confirm: self.confirm.clone(),
        }
    }
}

impl<R> Controller<R>
where
    R: RemoteStore + 'static,
{
    /// Build a controller with an empty session.
    pub fn new(remote: Arc<R>, confirm: Arc<dyn Confirm>) -> Self {
        Self::with_feedback_ttl(remote, confirm, DEFAULT_FEEDBACK_TTL)
    }

    /// Build a controller whose feedback messages live for `feedback_ttl`.
    pub fn with_feedback_ttl(
        remote: Arc<R>,
        confirm: Arc<dyn Confirm>,
        feedback_ttl: Duration,
    ) -> Self {
        Self {
            remote,
            session: Arc::new(Mutex::new(Session::new(feedback_ttl))),
            busy: Arc::new(AtomicBool::new(false)),
            confirm,
        }
    }

    /// Whether a gated intent is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Copy of the session as it is now.
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Run `read` against the session without cloning it.
    pub async fn read_session<T>(&self, read: impl FnOnce(&Session) -> T) -> T {
        let guard = self.session.lock().await;
        read(&guard)
    }

    /// Show a message on behalf of the presentation layer.
    pub async fn notify(
        &self,
        target: FeedbackTarget,
        message: impl Into<String>,
        kind: FeedbackKind,
    ) {
        self.session
            .lock()
            .await
            .feedback
            .show(target, message, kind);
    }

    /// Dismiss whatever `target` shows.
    pub async fn clear_feedback(&self, target: FeedbackTarget) {
        self.session.lock().await.feedback.clear(target);
    }

    /// Entry point for every user intent.
    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, IntentError> {
        match intent {
            Intent::ChangeScore { id, delta } => self.change_score(id, delta).await,
            Intent::AddTaskPoints {
                id,
                points_per_unit,
                quantity,
            } => {
                self.change_score(id, task_delta(points_per_unit, quantity))
                    .await
            }
            Intent::Load => {
                let _busy = self.acquire_busy("load")?;
                self.load().await?;
                Ok(Outcome::Done)
            }
            Intent::AddPlayer { name, avatar_url } => {
                let _busy = self.acquire_busy("add player")?;
                self.add_player(name, avatar_url).await
            }
            Intent::DeletePlayer { id } => {
                let _busy = self.acquire_busy("delete player")?;
                self.delete_player(id).await
            }
            Intent::ResetAllScores { password } => {
                let _busy = self.acquire_busy("reset scores")?;
                self.reset_scores(password).await
            }
        }
    }

    fn acquire_busy(&self, action: &'static str) -> Result<BusyGuard, IntentError> {
        BusyGuard::acquire(&self.busy).ok_or_else(|| {
            debug!(action, "dropping intent while another action is in flight");
            IntentError::Busy
        })
    }

    /// Fetch both collections concurrently and apply each result independently.
    async fn load(&self) -> Result<(), RemoteError> {
        let (players, channels) =
            tokio::join!(self.remote.list_players(), self.remote.list_channels());

        let mut session = self.session.lock().await;
        let mut first_error = None;

        match players {
            Ok(players) => {
                debug!(count = players.len(), "players loaded");
                session.cache.replace_players(players);
                session.load_errors.players = None;
            }
            Err(err) => {
                warn!(error = %err, "failed to load players");
                session.cache.replace_players(Vec::new());
                session.load_errors.players = Some(format!("Error loading player data: {err}"));
                first_error.get_or_insert(err);
            }
        }

        match channels {
            Ok(channels) => {
                debug!(count = channels.len(), "channels loaded");
                session.cache.replace_channels(channels);
                session.load_errors.channels = None;
            }
            Err(err) => {
                warn!(error = %err, "failed to load channels");
                session.cache.replace_channels(Vec::new());
                session.load_errors.channels = Some(format!("Error loading channels: {err}"));
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Reload after a failure, taking the busy flag when it is free.
    async fn resync(&self) {
        let _busy = BusyGuard::acquire(&self.busy);
        if let Err(err) = self.load().await {
            warn!(error = %err, "resync failed");
        }
    }

    async fn add_player(&self, name: String, avatar_url: String) -> Result<Outcome, IntentError> {
        let name = name.trim().to_string();
        let avatar_url = avatar_url.trim().to_string();

        if name.is_empty() || avatar_url.is_empty() {
            self.notify(
                FeedbackTarget::AddPlayer,
                "Please enter both name and avatar URL.",
                FeedbackKind::Error,
            )
            .await;
            return Err(IntentError::Validation(
                "name and avatar URL are required".into(),
            ));
        }

        self.clear_feedback(FeedbackTarget::AddPlayer).await;
        match self.remote.add_player(name.clone(), avatar_url).await {
            Ok(created) => {
                info!(player_id = %created.id, "player added");
                self.notify(
                    FeedbackTarget::AddPlayer,
                    format!("Player \"{name}\" added!"),
                    FeedbackKind::Success,
                )
                .await;
                self.load().await?;
                Ok(Outcome::Done)
            }
            Err(err) => {
                warn!(error = %err, "failed to add player");
                self.notify(
                    FeedbackTarget::AddPlayer,
                    format!("Error: {err}"),
                    FeedbackKind::Error,
                )
                .await;
                Err(err.into())
            }
        }
    }

    async fn change_score(&self, id: String, delta: i64) -> Result<Outcome, IntentError> {
        let new_score = {
            let mut session = self.session.lock().await;
            let Some(current) = session.cache.player(&id).map(|player| player.score) else {
                return Err(IntentError::UnknownPlayer(id));
            };

            let new_score = apply_delta(current, delta);
            if new_score == current {
                return Ok(Outcome::Skipped);
            }
            session.cache.upsert_player_score(&id, new_score);
            new_score
        };

        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.persist_score(id, new_score).await });
        Ok(Outcome::Persisting(handle))
    }

    /// Send an optimistic score to the server and reconcile with its answer.
    async fn persist_score(&self, id: String, score: u32) -> Result<(), RemoteError> {
        debug!(player_id = %id, score, "persisting score");
        match self.remote.update_score(id.clone(), score).await {
            Ok(updated) => {
                let reconciled = self
                    .session
                    .lock()
                    .await
                    .cache
                    .upsert_player_score(&id, updated.score);
                if !reconciled {
                    self.resync().await;
                }
                Ok(())
            }
            Err(err) => {
                warn!(player_id = %id, error = %err, "failed to save score; resyncing");
                self.notify(
                    FeedbackTarget::Board,
                    format!("Error saving score: {err}"),
                    FeedbackKind::Error,
                )
                .await;
                self.resync().await;
                Err(err)
            }
        }
    }

    async fn delete_player(&self, id: String) -> Result<Outcome, IntentError> {
        let name = self
            .read_session(|session| session.cache.player(&id).map(|player| player.name.clone()))
            .await
            .ok_or_else(|| IntentError::UnknownPlayer(id.clone()))?;

        let prompt =
            format!("Are you sure you want to delete player \"{name}\"? This cannot be undone.");
        if !self.confirm.confirm(prompt).await {
            debug!(player_id = %id, "delete declined");
            return Ok(Outcome::Skipped);
        }

        match self.remote.delete_player(id.clone()).await {
            Ok(message) => {
                info!(player_id = %id, %message, "player deleted");
            }
            Err(RemoteError::NotFound { message }) => {
                warn!(player_id = %id, %message, "player already gone; treating delete as done");
            }
            Err(err) => {
                warn!(player_id = %id, error = %err, "failed to delete player");
                self.notify(
                    FeedbackTarget::Board,
                    format!("Error deleting player: {err}"),
                    FeedbackKind::Error,
                )
                .await;
                return Err(err.into());
            }
        }

        self.load().await?;
        Ok(Outcome::Done)
    }

    async fn reset_scores(&self, password: String) -> Result<Outcome, IntentError> {
        let empty = self
            .read_session(|session| session.cache.players().is_empty())
            .await;
        if empty {
            return Ok(Outcome::Skipped);
        }

        match self.remote.reset_scores(password).await {
            Ok(summary) => {
                info!(count = summary.count, "scores reset");
                let message = if summary.message.is_empty() {
                    "Scores reset!".to_string()
                } else {
                    summary.message
                };
                self.notify(FeedbackTarget::Board, message, FeedbackKind::Success)
                    .await;
                self.load().await?;
                Ok(Outcome::Done)
            }
            Err(err) => {
                warn!(error = %err, "failed to reset scores; resyncing");
                self.notify(
                    FeedbackTarget::Board,
                    format!("Error: {}", err.server_message()),
                    FeedbackKind::Error,
                )
                .await;
                if let Err(load_err) = self.load().await {
                    warn!(error = %load_err, "resync after reset failure failed");
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex as StdMutex,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::sync::Semaphore;

    use super::*;
    use crate::client::{
        derive::{Standing, leader_announcement},
        records::{ChannelRecord, PlayerRecord, ResetSummary},
        remote::RemoteResult,
    };

    const PASSWORD: &str = "letmein";

    #[derive(Default)]
    struct ServerState {
        players: Vec<PlayerRecord>,
        channels: Vec<ChannelRecord>,
        next_id: u32,
        calls: Vec<&'static str>,
        fail_players: Option<RemoteError>,
        fail_update: Option<RemoteError>,
        fail_delete: Option<RemoteError>,
        fail_channels: Option<RemoteError>,
        fail_reset: Option<RemoteError>,
    }

    /// Scripted server double. When `gate` is set, every call waits for a permit.
    #[derive(Clone, Default)]
    struct ScriptedRemote {
        state: Arc<StdMutex<ServerState>>,
        gate: Arc<StdMutex<Option<Arc<Semaphore>>>>,
    }

    impl ScriptedRemote {
        fn with_players(players: &[(&str, &str, u32)]) -> Self {
            let remote = Self::default();
            {
                let mut state = remote.state.lock().unwrap();
                state.players = players
                    .iter()
                    .map(|(id, name, score)| PlayerRecord {
                        id: (*id).into(),
                        name: (*name).into(),
                        avatar_url: format!("{name}.png"),
                        score: *score,
                    })
                    .collect();
                state.next_id = players.len() as u32;
            }
            remote
        }

        fn edit(&self, edit: impl FnOnce(&mut ServerState)) {
            edit(&mut self.state.lock().unwrap());
        }

        fn calls(&self, name: &str) -> usize {
            let state = self.state.lock().unwrap();
            state.calls.iter().filter(|call| **call == name).count()
        }

        fn hold(&self) -> Arc<Semaphore> {
            let gate = Arc::new(Semaphore::new(0));
            *self.gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        fn run<T: Send + 'static>(
            &self,
            name: &'static str,
            op: impl FnOnce(&mut ServerState) -> RemoteResult<T> + Send + 'static,
        ) -> BoxFuture<'static, RemoteResult<T>> {
            let state = self.state.clone();
            let gate = self.gate.lock().unwrap().clone();
            Box::pin(async move {
                if let Some(gate) = gate {
                    let _permit = gate.acquire().await.expect("gate closed");
                }
                let mut state = state.lock().unwrap();
                state.calls.push(name);
                op(&mut state)
            })
        }
    }

    fn ranked(players: &[PlayerRecord]) -> Vec<PlayerRecord> {
        let mut sorted = players.to_vec();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }

    impl RemoteStore for ScriptedRemote {
        fn list_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerRecord>>> {
            self.run("list_players", |state| match state.fail_players.clone() {
                Some(err) => Err(err),
                None => Ok(ranked(&state.players)),
            })
        }

        fn add_player(
            &self,
            name: String,
            avatar_url: String,
        ) -> BoxFuture<'static, RemoteResult<PlayerRecord>> {
            self.run("add_player", move |state| {
                state.next_id += 1;
                let record = PlayerRecord {
                    id: state.next_id.to_string(),
                    name,
                    avatar_url,
                    score: 0,
                };
                state.players.push(record.clone());
                Ok(record)
            })
        }

        fn update_score(
            &self,
            id: String,
            score: u32,
        ) -> BoxFuture<'static, RemoteResult<PlayerRecord>> {
            self.run("update_score", move |state| {
                if let Some(err) = state.fail_update.clone() {
                    return Err(err);
                }
                let player = state
                    .players
                    .iter_mut()
                    .find(|player| player.id == id)
                    .ok_or_else(|| RemoteError::from_status(404, "Player not found"))?;
                player.score = score;
                Ok(player.clone())
            })
        }

        fn delete_player(&self, id: String) -> BoxFuture<'static, RemoteResult<String>> {
            self.run("delete_player", move |state| {
                if let Some(err) = state.fail_delete.clone() {
                    return Err(err);
                }
                state.players.retain(|player| player.id != id);
                Ok("Player deleted successfully".into())
            })
        }

        fn list_channels(&self) -> BoxFuture<'static, RemoteResult<Vec<ChannelRecord>>> {
            self.run("list_channels", |state| match state.fail_channels.clone() {
                Some(err) => Err(err),
                None => Ok(state.channels.clone()),
            })
        }

        fn reset_scores(
            &self,
            password: String,
        ) -> BoxFuture<'static, RemoteResult<ResetSummary>> {
            self.run("reset_scores", move |state| {
                if let Some(err) = state.fail_reset.clone() {
                    return Err(err);
                }
                if password != PASSWORD {
                    return Err(RemoteError::from_status(403, "Forbidden: Incorrect password"));
                }
                let mut count = 0;
                for player in state.players.iter_mut().filter(|p| p.score != 0) {
                    player.score = 0;
                    count += 1;
                }
                Ok(ResetSummary {
                    message: format!("Scores reset for {count} players."),
                    count,
                })
            })
        }
    }

    struct Answer {
        yes: bool,
        asked: AtomicUsize,
    }

    impl Answer {
        fn new(yes: bool) -> Arc<Self> {
            Arc::new(Self {
                yes,
                asked: AtomicUsize::new(0),
            })
        }
    }

    impl Confirm for Answer {
        fn confirm(&self, _prompt: String) -> BoxFuture<'static, bool> {
            self.asked.fetch_add(1, Ordering::SeqCst);
            let yes = self.yes;
            Box::pin(async move { yes })
        }
    }

    fn controller(remote: &ScriptedRemote, confirm: Arc<Answer>) -> Controller<ScriptedRemote> {
        Controller::new(Arc::new(remote.clone()), confirm)
    }

    async fn score_of(controller: &Controller<ScriptedRemote>, id: &str) -> Option<u32> {
        controller
            .read_session(|s| s.cache().player(id).map(|p| p.score))
            .await
    }

    async fn settle(outcome: Outcome) -> Result<(), RemoteError> {
        match outcome {
            Outcome::Persisting(handle) => handle.await.expect("persist task panicked"),
            _ => Ok(()),
        }
    }

    #[tokio::test]
    async fn load_replaces_both_collections() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 2), ("2", "Bob", 7)]);
        remote.edit(|s| {
            s.channels = vec![ChannelRecord {
                username: "news".into(),
                scheduled_messages_count: 12,
            }]
        });
        let controller = controller(&remote, Answer::new(true));

        controller.dispatch(Intent::Load).await.unwrap();

        let session = controller.snapshot().await;
        let ids: Vec<_> = session.cache().players().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(session.cache().channels().len(), 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn failed_player_load_keeps_channels() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 2)]);
        remote.edit(|s| {
            s.channels = vec![ChannelRecord {
                username: "news".into(),
                scheduled_messages_count: 3,
            }];
            s.fail_players = Some(RemoteError::Transport("connection refused".into()));
        });
        let controller = controller(&remote, Answer::new(true));

        let result = controller.dispatch(Intent::Load).await;
        assert!(matches!(result, Err(IntentError::Remote(RemoteError::Transport(_)))));

        let session = controller.snapshot().await;
        assert!(session.cache().players().is_empty());
        assert_eq!(session.cache().channels().len(), 1);
        assert!(session.load_errors().players.is_some());
        assert!(session.load_errors().channels.is_none());
    }

    #[tokio::test]
    async fn failed_channel_load_keeps_players() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 2)]);
        remote.edit(|s| {
            s.fail_channels = Some(RemoteError::from_status(503, "storage unavailable"));
        });
        let controller = controller(&remote, Answer::new(true));

        let result = controller.dispatch(Intent::Load).await;
        assert!(matches!(
            result,
            Err(IntentError::Remote(RemoteError::StoreFailure { status: 503, .. }))
        ));

        let session = controller.snapshot().await;
        assert_eq!(session.cache().players().len(), 1);
        assert!(session.cache().channels().is_empty());
        assert!(session.load_errors().players.is_none());
        assert!(
            session
                .load_errors()
                .channels
                .as_deref()
                .is_some_and(|message| message.starts_with("Error loading channels"))
        );
    }

    #[tokio::test]
    async fn valid_add_clears_the_previous_message_before_the_call() {
        let remote = ScriptedRemote::default();
        let controller = controller(&remote, Answer::new(true));
        controller
            .notify(FeedbackTarget::AddPlayer, "stale", FeedbackKind::Error)
            .await;

        let release = remote.hold();
        let in_flight = tokio::spawn({
            let controller = controller.clone();
            async move {
                controller
                    .dispatch(Intent::AddPlayer {
                        name: "Ann".into(),
                        avatar_url: "a.png".into(),
                    })
                    .await
            }
        });

        for _ in 0..1_000 {
            let shown = controller
                .read_session(|s| s.feedback().current(FeedbackTarget::AddPlayer).cloned())
                .await;
            if shown.is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let shown = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::AddPlayer).cloned())
            .await;
        assert!(shown.is_none());
        assert_eq!(remote.calls("add_player"), 0);

        release.add_permits(Semaphore::MAX_PERMITS / 2);
        in_flight.await.unwrap().unwrap();
        let shown = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::AddPlayer).cloned())
            .await
            .unwrap();
        assert_eq!(shown.message, "Player \"Ann\" added!");
    }

    #[tokio::test]
    async fn blank_player_fields_never_reach_the_server() {
        let remote = ScriptedRemote::default();
        let controller = controller(&remote, Answer::new(true));

        let result = controller
            .dispatch(Intent::AddPlayer {
                name: "   ".into(),
                avatar_url: "a.png".into(),
            })
            .await;

        assert!(matches!(result, Err(IntentError::Validation(_))));
        assert_eq!(remote.calls("add_player"), 0);
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::AddPlayer).cloned())
            .await
            .unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Error);
    }

    #[tokio::test]
    async fn adding_a_player_reloads_from_the_server() {
        let remote = ScriptedRemote::default();
        let controller = controller(&remote, Answer::new(true));

        controller
            .dispatch(Intent::AddPlayer {
                name: " Ann ".into(),
                avatar_url: "a.png".into(),
            })
            .await
            .unwrap();

        let session = controller.snapshot().await;
        let players = session.cache().players();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Ann");
        assert_eq!(players[0].score, 0);
        assert_eq!(remote.calls("list_players"), 1);
        assert_eq!(leader_announcement(players), Standing::StartScoring);
    }

    #[tokio::test]
    async fn score_change_is_visible_before_the_server_answers() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 4)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        let release = remote.hold();
        let outcome = controller
            .dispatch(Intent::ChangeScore {
                id: "1".into(),
                delta: 3,
            })
            .await
            .unwrap();

        assert_eq!(score_of(&controller, "1").await, Some(7));
        assert!(!controller.is_busy());

        release.add_permits(Semaphore::MAX_PERMITS / 2);
        settle(outcome).await.unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(7));
        assert_eq!(remote.calls("update_score"), 1);
    }

    #[tokio::test]
    async fn failed_score_save_restores_the_server_value() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 4)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();
        remote.edit(|s| {
            s.fail_update = Some(RemoteError::from_status(503, "storage unavailable"));
            s.players[0].score = 10;
        });

        let outcome = controller
            .dispatch(Intent::ChangeScore {
                id: "1".into(),
                delta: 3,
            })
            .await
            .unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(7));

        let result = settle(outcome).await;
        assert!(matches!(result, Err(RemoteError::StoreFailure { status: 503, .. })));
        assert_eq!(score_of(&controller, "1").await, Some(10));
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::Board).cloned())
            .await
            .unwrap();
        assert!(feedback.message.starts_with("Error saving score"));
    }

    #[tokio::test]
    async fn score_save_for_vanished_player_resyncs_it_away() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 4), ("2", "Bob", 1)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();
        remote.edit(|s| s.players.retain(|player| player.id != "1"));

        let outcome = controller
            .dispatch(Intent::ChangeScore {
                id: "1".into(),
                delta: 2,
            })
            .await
            .unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(6));

        let result = settle(outcome).await;
        assert!(matches!(result, Err(RemoteError::NotFound { .. })));
        assert_eq!(score_of(&controller, "1").await, None);
        assert_eq!(score_of(&controller, "2").await, Some(1));
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::Board).cloned())
            .await
            .unwrap();
        assert_eq!(feedback.kind, FeedbackKind::Error);
        assert!(feedback.message.starts_with("Error saving score"));
        assert!(feedback.message.contains("not found"));
    }

    #[tokio::test]
    async fn scores_never_go_negative() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 2)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        for delta in [-1, -5, 3, -100, 1, -1, -1] {
            let outcome = controller
                .dispatch(Intent::ChangeScore {
                    id: "1".into(),
                    delta,
                })
                .await
                .unwrap();
            settle(outcome).await.unwrap();
            let remote_score = remote.state.lock().unwrap().players[0].score;
            assert_eq!(score_of(&controller, "1").await, Some(remote_score));
        }
        assert_eq!(score_of(&controller, "1").await, Some(0));
    }

    #[tokio::test]
    async fn decrement_at_zero_is_skipped() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 0)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        let outcome = controller
            .dispatch(Intent::ChangeScore {
                id: "1".into(),
                delta: -2,
            })
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(remote.calls("update_score"), 0);
    }

    #[tokio::test]
    async fn task_points_coerce_quantity() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 0)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        let outcome = controller
            .dispatch(Intent::AddTaskPoints {
                id: "1".into(),
                points_per_unit: 3,
                quantity: 0,
            })
            .await
            .unwrap();
        settle(outcome).await.unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(3));

        let outcome = controller
            .dispatch(Intent::AddTaskPoints {
                id: "1".into(),
                points_per_unit: 7,
                quantity: coerce_quantity("2"),
            })
            .await
            .unwrap();
        settle(outcome).await.unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(17));
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(coerce_quantity("4"), 4);
        assert_eq!(coerce_quantity("0"), 1);
        assert_eq!(coerce_quantity("-3"), 1);
        assert_eq!(coerce_quantity("abc"), 1);
        assert_eq!(task_delta(7, 3), 21);
        assert_eq!(apply_delta(2, -5), 0);
        assert_eq!(apply_delta(u32::MAX, 1), u32::MAX);
    }

    #[tokio::test]
    async fn declined_delete_never_calls_the_server() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 1)]);
        let answer = Answer::new(false);
        let controller = controller(&remote, answer.clone());
        controller.dispatch(Intent::Load).await.unwrap();

        let outcome = controller
            .dispatch(Intent::DeletePlayer { id: "1".into() })
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(answer.asked.load(Ordering::SeqCst), 1);
        assert_eq!(remote.calls("delete_player"), 0);
        assert_eq!(score_of(&controller, "1").await, Some(1));
    }

    #[tokio::test]
    async fn confirmed_delete_reloads() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 1), ("2", "Bob", 2)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        controller
            .dispatch(Intent::DeletePlayer { id: "1".into() })
            .await
            .unwrap();

        assert_eq!(remote.calls("delete_player"), 1);
        assert_eq!(score_of(&controller, "1").await, None);
        assert_eq!(score_of(&controller, "2").await, Some(2));
    }

    #[tokio::test]
    async fn delete_of_missing_player_is_a_soft_success() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 1)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();
        remote.edit(|s| s.fail_delete = Some(RemoteError::from_status(404, "Player not found")));

        let outcome = controller
            .dispatch(Intent::DeletePlayer { id: "1".into() })
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Done));
        assert_eq!(remote.calls("list_players"), 2);
    }

    #[tokio::test]
    async fn gated_intents_are_dropped_while_busy() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 1)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        let release = remote.hold();
        let in_flight = tokio::spawn({
            let controller = controller.clone();
            async move {
                controller
                    .dispatch(Intent::AddPlayer {
                        name: "Bob".into(),
                        avatar_url: "b.png".into(),
                    })
                    .await
            }
        });
        while !controller.is_busy() {
            tokio::task::yield_now().await;
        }

        let before = controller.snapshot().await.cache().clone();
        for intent in [
            Intent::AddPlayer {
                name: "Cy".into(),
                avatar_url: "c.png".into(),
            },
            Intent::DeletePlayer { id: "1".into() },
            Intent::ResetAllScores {
                password: PASSWORD.into(),
            },
            Intent::Load,
        ] {
            assert!(matches!(
                controller.dispatch(intent).await,
                Err(IntentError::Busy)
            ));
        }
        assert_eq!(controller.snapshot().await.cache(), &before);

        let outcome = controller
            .dispatch(Intent::ChangeScore {
                id: "1".into(),
                delta: 1,
            })
            .await
            .unwrap();
        assert_eq!(score_of(&controller, "1").await, Some(2));

        release.add_permits(Semaphore::MAX_PERMITS / 2);
        in_flight.await.unwrap().unwrap();
        settle(outcome).await.unwrap();

        assert!(!controller.is_busy());
        assert_eq!(remote.calls("add_player"), 1);
        assert_eq!(remote.calls("delete_player"), 0);
        assert_eq!(remote.calls("reset_scores"), 0);
    }

    #[tokio::test]
    async fn wrong_reset_password_leaves_scores_and_resyncs() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 10), ("2", "Bob", 10)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        let result = controller
            .dispatch(Intent::ResetAllScores {
                password: "wrong".into(),
            })
            .await;

        match result {
            Err(IntentError::Remote(err)) => {
                assert!(matches!(err, RemoteError::Rejected { status: 403, .. }))
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(remote.calls("list_players"), 2);
        assert_eq!(score_of(&controller, "1").await, Some(10));
        assert_eq!(score_of(&controller, "2").await, Some(10));
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::Board).cloned())
            .await
            .unwrap();
        assert_eq!(feedback.message, "Error: Forbidden: Incorrect password");
    }

    #[tokio::test]
    async fn reset_with_password_zeroes_scores() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 10), ("2", "Bob", 0)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();

        controller
            .dispatch(Intent::ResetAllScores {
                password: PASSWORD.into(),
            })
            .await
            .unwrap();

        assert_eq!(score_of(&controller, "1").await, Some(0));
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::Board).cloned())
            .await
            .unwrap();
        assert_eq!(feedback.message, "Scores reset for 1 players.");
    }

    #[tokio::test]
    async fn reset_store_failure_shows_the_server_text() {
        let remote = ScriptedRemote::with_players(&[("1", "Ann", 3)]);
        let controller = controller(&remote, Answer::new(true));
        controller.dispatch(Intent::Load).await.unwrap();
        remote.edit(|s| {
            s.fail_reset = Some(RemoteError::from_status(500, "Failed to reset scores"));
        });

        let result = controller
            .dispatch(Intent::ResetAllScores {
                password: PASSWORD.into(),
            })
            .await;

        assert!(matches!(
            result,
            Err(IntentError::Remote(RemoteError::StoreFailure { status: 500, .. }))
        ));
        assert_eq!(remote.calls("list_players"), 2);
        let feedback = controller
            .read_session(|s| s.feedback().current(FeedbackTarget::Board).cloned())
            .await
            .unwrap();
        assert_eq!(feedback.message, "Error: Failed to reset scores");
    }

    #[tokio::test]
    async fn reset_on_empty_board_is_skipped() {
        let remote = ScriptedRemote::default();
        let controller = controller(&remote, Answer::new(true));

        let outcome = controller
            .dispatch(Intent::ResetAllScores {
                password: PASSWORD.into(),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Skipped));
        assert_eq!(remote.calls("reset_scores"), 0);
    }
}
