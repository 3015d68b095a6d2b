//! The streaming session controller.
//!
//! One [`RunTurn::execute`] drives a full conversational turn: classify the
//! newest human message and apply its mutation, render the system prompt,
//! strip control messages from the history, open the backend stream under a
//! fresh per-session cancellation token, forward chunks to the caller, and
//! record the full reply on completion.
//!
//! Nothing below this controller propagates errors past it: callers see a
//! chunk stream, the distinct aborted outcome, or a generic failure.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{stream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use emcee_domain::default_enabled_ids;
use emcee_shared::{latest_enabled_mods, latest_user_message, ChatRole, ChatTurn};

use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest, LlmStream};
use crate::stores::{GameDirectory, GameSession};
use crate::use_cases::classify::{self, TurnClassifier};
use crate::use_cases::prompt::build_system_prompt;

/// Terminal failure modes of one turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The turn was cancelled: by the caller, or by a newer turn for the same
    /// session replacing it. Expected, never logged as an error.
    #[error("request aborted")]
    Aborted,
    /// The backend call failed. Logged server-side, surfaced as an opaque
    /// failure; no retry.
    #[error("backend request failed: {0}")]
    Backend(#[from] LlmError),
}

/// Stream of reply chunks; a terminal `Err` item is the aborted or failed
/// outcome for a turn that had already started streaming.
pub type TurnStream = Pin<Box<dyn Stream<Item = Result<String, TurnError>> + Send>>;

/// Streaming session controller.
pub struct RunTurn {
    games: Arc<GameDirectory>,
    llm: Arc<dyn LlmPort>,
    classifier: Arc<dyn TurnClassifier>,
}

impl RunTurn {
    pub fn new(
        games: Arc<GameDirectory>,
        llm: Arc<dyn LlmPort>,
        classifier: Arc<dyn TurnClassifier>,
    ) -> Self {
        Self {
            games,
            llm,
            classifier,
        }
    }

    /// Run one conversational turn against the given session.
    ///
    /// Classification and prompt building cannot fail; the only error paths
    /// are an abort racing the backend call and the backend call itself.
    pub async fn execute(
        &self,
        session_id: &str,
        messages: Vec<ChatTurn>,
    ) -> Result<TurnStream, TurnError> {
        let session = self.games.session(session_id);

        // Newest control message wins; registry default otherwise.
        let enabled_mods = latest_enabled_mods(&messages).unwrap_or_else(default_enabled_ids);

        // Classify the newest human message and apply its single mutation.
        if let Some(user) = latest_user_message(&messages) {
            let content = user.content.clone();
            session.with_state(|state| {
                let classification = self.classifier.classify(state, &content);
                tracing::debug!(session_id, ?classification, "classified user message");
                classify::apply(&classification, state);
            });
        }

        let state = session.snapshot();
        let system_prompt = build_system_prompt(&state, &enabled_mods);

        // Control-role messages must never reach the backend as conversation
        // turns.
        let history: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| m.role != ChatRole::System)
            .map(to_backend_message)
            .collect();
        let request = LlmRequest::new(history).with_system_prompt(system_prompt);

        let (turn_id, token) = session.begin_turn();

        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => {
                session.finish_turn(turn_id);
                return Err(TurnError::Aborted);
            }
            result = self.llm.stream_chat(request) => result,
        };

        match opened {
            Ok(inner) => Ok(forward_stream(session, turn_id, token, inner)),
            Err(err) => {
                session.finish_turn(turn_id);
                tracing::error!(session_id, error = %err, "backend call failed");
                Err(TurnError::Backend(err))
            }
        }
    }
}

fn to_backend_message(turn: &ChatTurn) -> ChatMessage {
    match turn.role {
        ChatRole::Assistant => ChatMessage::assistant(&turn.content),
        // Unknown roles default to user; System never gets here.
        _ => ChatMessage::user(&turn.content),
    }
}

/// State carried across polls of one forwarded turn.
struct Forward {
    session: Arc<GameSession>,
    turn_id: Uuid,
    token: CancellationToken,
    inner: LlmStream,
    text: String,
    done: bool,
}

impl Drop for Forward {
    fn drop(&mut self) {
        // Caller dropped the stream mid-flight (e.g. client disconnect):
        // release the session's in-flight slot without recording a reply.
        if !self.done {
            self.session.finish_turn(self.turn_id);
        }
    }
}

enum Step {
    Aborted,
    Next(Option<Result<String, LlmError>>),
}

/// Forward backend chunks to the caller, accumulating the full reply.
///
/// On normal completion the accumulated text is written back into the game
/// state within this same turn; cancellation and backend failure leave the
/// state untouched.
fn forward_stream(
    session: Arc<GameSession>,
    turn_id: Uuid,
    token: CancellationToken,
    inner: LlmStream,
) -> TurnStream {
    let forward = Forward {
        session,
        turn_id,
        token,
        inner,
        text: String::new(),
        done: false,
    };

    Box::pin(stream::unfold(forward, |mut fwd| async move {
        if fwd.done {
            return None;
        }

        let step = tokio::select! {
            biased;
            _ = fwd.token.cancelled() => Step::Aborted,
            next = fwd.inner.next() => Step::Next(next),
        };

        match step {
            Step::Aborted => {
                fwd.done = true;
                fwd.session.finish_turn(fwd.turn_id);
                tracing::debug!(turn_id = %fwd.turn_id, "turn aborted mid-stream");
                Some((Err(TurnError::Aborted), fwd))
            }
            Step::Next(Some(Ok(chunk))) => {
                fwd.text.push_str(&chunk);
                Some((Ok(chunk), fwd))
            }
            Step::Next(Some(Err(err))) => {
                fwd.done = true;
                fwd.session.finish_turn(fwd.turn_id);
                tracing::error!(turn_id = %fwd.turn_id, error = %err, "backend stream failed");
                Some((Err(TurnError::Backend(err)), fwd))
            }
            Step::Next(None) => {
                fwd.done = true;
                fwd.session
                    .with_state(|state| state.record_ai_message(fwd.text.clone()));
                fwd.session.finish_turn(fwd.turn_id);
                tracing::debug!(turn_id = %fwd.turn_id, chars = fwd.text.len(), "turn completed");
                None
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::use_cases::classify::HeuristicClassifier;

    /// Mock backend with a scripted stream, capturing the last request.
    struct MockLlm {
        behavior: MockBehavior,
        last_request: Mutex<Option<LlmRequest>>,
    }

    #[derive(Clone)]
    enum MockBehavior {
        /// Yield these chunks, then complete.
        Chunks(Vec<&'static str>),
        /// Fail before the stream opens.
        OpenFails,
        /// Open a stream that never yields.
        Hangs,
        /// Yield one chunk, then fail mid-stream.
        FailsMidStream,
    }

    impl MockLlm {
        fn new(behavior: MockBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                last_request: Mutex::new(None),
            })
        }

        fn last_request(&self) -> LlmRequest {
            self.last_request
                .lock()
                .expect("lock")
                .clone()
                .expect("a request was made")
        }
    }

    #[async_trait]
    impl LlmPort for MockLlm {
        async fn stream_chat(&self, request: LlmRequest) -> Result<LlmStream, LlmError> {
            *self.last_request.lock().expect("lock") = Some(request);
            match &self.behavior {
                MockBehavior::Chunks(chunks) => {
                    let items: Vec<Result<String, LlmError>> =
                        chunks.iter().map(|c| Ok(c.to_string())).collect();
                    Ok(Box::pin(stream::iter(items)))
                }
                MockBehavior::OpenFails => {
                    Err(LlmError::RequestFailed("connection refused".to_string()))
                }
                MockBehavior::Hangs => {
                    Ok(Box::pin(stream::pending::<Result<String, LlmError>>()))
                }
                MockBehavior::FailsMidStream => Ok(Box::pin(stream::iter(vec![
                    Ok("partial".to_string()),
                    Err(LlmError::RequestFailed("rate limited".to_string())),
                ]))),
            }
        }
    }

    fn run_turn(llm: Arc<MockLlm>) -> (RunTurn, Arc<GameDirectory>) {
        let games = Arc::new(GameDirectory::new());
        let turn = RunTurn::new(games.clone(), llm, Arc::new(HeuristicClassifier));
        (turn, games)
    }

    async fn drain(mut stream: TurnStream) -> Vec<Result<String, TurnError>> {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_completed_turn_records_full_reply() {
        let llm = MockLlm::new(MockBehavior::Chunks(vec!["Welcome, ", "Alice!"]));
        let (turn, games) = run_turn(llm);

        let stream = turn
            .execute("default", vec![ChatTurn::user("Alice")])
            .await
            .expect("stream opens");
        let items = drain(stream).await;

        let chunks: Vec<String> = items.into_iter().map(|i| i.expect("chunk")).collect();
        assert_eq!(chunks, vec!["Welcome, ", "Alice!"]);

        let state = games.session("default").snapshot();
        assert_eq!(state.last_ai_message, "Welcome, Alice!");
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_control_messages_never_reach_the_backend() {
        let llm = MockLlm::new(MockBehavior::Chunks(vec!["ok"]));
        let (turn, _games) = run_turn(llm.clone());

        let history = vec![
            ChatTurn::assistant("Hey there! What's your name?"),
            ChatTurn::system("Mods updated: Enabled mods: drinking_game, trivia_master"),
            ChatTurn::user("Alice"),
        ];
        let stream = turn.execute("default", history).await.expect("stream opens");
        drain(stream).await;

        let request = llm.last_request();
        assert_eq!(request.messages.len(), 2);
        assert!(request
            .messages
            .iter()
            .all(|m| m.role != crate::infrastructure::ports::MessageRole::System));
        let system_prompt = request.system_prompt.expect("system prompt set");
        assert!(system_prompt
            .contains("The following mods are enabled: drinking_game, trivia_master."));
    }

    #[tokio::test]
    async fn test_default_mods_apply_without_control_message() {
        let llm = MockLlm::new(MockBehavior::Chunks(vec!["ok"]));
        let (turn, _games) = run_turn(llm.clone());

        let stream = turn
            .execute("default", vec![ChatTurn::user("Alice")])
            .await
            .expect("stream opens");
        drain(stream).await;

        let system_prompt = llm.last_request().system_prompt.expect("system prompt set");
        assert!(system_prompt.contains("The following mods are enabled: drinking_game."));
    }

    #[tokio::test]
    async fn test_newer_turn_aborts_the_in_flight_call() {
        let llm = MockLlm::new(MockBehavior::Hangs);
        let (turn, games) = run_turn(llm);

        let mut first = turn
            .execute("default", vec![ChatTurn::user("Alice")])
            .await
            .expect("first stream opens");

        // A second turn for the same session replaces the registration and
        // cancels the first turn's token.
        let _second = turn
            .execute("default", vec![ChatTurn::user("Bob")])
            .await
            .expect("second stream opens");

        let outcome = first.next().await;
        assert!(matches!(outcome, Some(Err(TurnError::Aborted))));
        assert!(first.next().await.is_none());

        // The aborted turn must not have written a reply.
        assert_eq!(games.session("default").snapshot().last_ai_message, "");
    }

    #[tokio::test]
    async fn test_open_failure_is_the_generic_failure_outcome() {
        let llm = MockLlm::new(MockBehavior::OpenFails);
        let (turn, games) = run_turn(llm);

        let outcome = turn
            .execute("default", vec![ChatTurn::user("Alice")])
            .await;
        assert!(matches!(outcome, Err(TurnError::Backend(_))));

        // Classification still ran before the backend call.
        assert_eq!(games.session("default").snapshot().players.len(), 1);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_does_not_record_partial_reply() {
        let llm = MockLlm::new(MockBehavior::FailsMidStream);
        let (turn, games) = run_turn(llm);

        let stream = turn
            .execute("default", vec![ChatTurn::user("Alice")])
            .await
            .expect("stream opens");
        let items = drain(stream).await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], Ok(ref chunk) if chunk == "partial"));
        assert!(matches!(items[1], Err(TurnError::Backend(_))));
        assert_eq!(games.session("default").snapshot().last_ai_message, "");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let llm = MockLlm::new(MockBehavior::Chunks(vec!["ok"]));
        let (turn, games) = run_turn(llm);

        let stream = turn
            .execute("living-room", vec![ChatTurn::user("Alice")])
            .await
            .expect("stream opens");
        drain(stream).await;

        assert_eq!(games.session("living-room").snapshot().players.len(), 1);
        assert_eq!(games.session("kitchen").snapshot().players.len(), 0);
    }

    #[tokio::test]
    async fn test_full_pregame_flow_starts_the_game_and_advances_turns() {
        let llm = MockLlm::new(MockBehavior::Chunks(vec!["ok"]));
        let (turn, games) = run_turn(llm);

        for message in ["Alice", "ready", "Bob", "ready"] {
            let stream = turn
                .execute("default", vec![ChatTurn::user(message)])
                .await
                .expect("stream opens");
            drain(stream).await;
        }

        let state = games.session("default").snapshot();
        assert!(state.game_started);
        assert_eq!(state.roster(), vec!["Alice", "Bob"]);
        assert_eq!(state.current_player_index, 0);

        // Post-start, every human message advances the pointer.
        let stream = turn
            .execute("default", vec![ChatTurn::user("done with my challenge")])
            .await
            .expect("stream opens");
        drain(stream).await;
        assert_eq!(
            games.session("default").snapshot().current_player_index,
            1
        );
    }
}
