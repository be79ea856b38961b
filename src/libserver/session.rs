use crate::libcommon::message::{Answer, INVALID_MOVE_TEXT, ROUND_ERROR_TEXT};
use crate::libcommon::{resolve, Choice, ClientMessage, Role, ServerMessage};
use crate::libserver::{Client, SessionConfig, SessionError};
use futures::future::join;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingStart,
    SolicitingMoves,
    Resolving(Choice, Choice),
    OfferingRematch,
    Restarting,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Someone answered the rematch prompt with anything but yes.
    Declined,
    /// A move never arrived or was not a legal choice.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub rounds: usize,
    pub ending: Ending,
}

/// Choices submitted this round, by role.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord([Option<Choice>; 2]);

impl MoveRecord {
    pub fn set(&mut self, role: Role, choice: Choice) {
        self.0[role.index()] = Some(choice);
    }

    #[cfg(test)]
    pub fn get(&self, role: Role) -> Option<Choice> {
        self.0[role.index()]
    }

    pub fn both(&self) -> Option<(Choice, Choice)> {
        match self.0 {
            [Some(p1), Some(p2)] => Some((p1, p2)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.0 = [None, None];
    }
}

/// One match between two paired connections, from the start notices until
/// someone declines a rematch or a round falls apart.
pub struct GameSession {
    p1: Arc<Client>,
    p2: Arc<Client>,
    moves: MoveRecord,
    game_over: bool,
    rounds: usize,
    config: SessionConfig,
}

impl GameSession {
    pub fn new(p1: Arc<Client>, p2: Arc<Client>, config: SessionConfig) -> GameSession {
        GameSession {
            p1,
            p2,
            moves: MoveRecord::default(),
            game_over: false,
            rounds: 0,
            config,
        }
    }

    pub async fn run(mut self) -> Summary {
        let mut state = State::AwaitingStart;
        while state != State::Ended {
            state = match state {
                State::AwaitingStart => self.announce(),
                State::SolicitingMoves => self.solicit_moves().await,
                State::Resolving(move1, move2) => self.reveal(move1, move2),
                State::OfferingRematch => self.offer_rematch().await,
                State::Restarting => self.restart(),
                State::Ended => State::Ended,
            };
        }
        // only a resolved round can be followed by a rematch vote
        let ending = if self.game_over {
            Ending::Declined
        } else {
            Ending::Aborted
        };
        let summary = Summary {
            rounds: self.rounds,
            ending,
        };
        info!(
            "session {} vs {} over after {} round(s): {:?}",
            self.p1.addr, self.p2.addr, summary.rounds, summary.ending
        );
        summary
    }

    fn client(&self, role: Role) -> &Client {
        match role {
            Role::Player1 => &self.p1,
            Role::Player2 => &self.p2,
        }
    }

    fn send(&self, role: Role, msg: &ServerMessage) {
        let client = self.client(role);
        if let Err(e) = client.send(msg) {
            debug!("not sent to {}: {}", client.addr, e);
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for role in Role::BOTH {
            self.send(role, msg);
        }
    }

    fn announce(&self) -> State {
        for role in Role::BOTH {
            self.send(role, &ServerMessage::start(role));
        }
        State::SolicitingMoves
    }

    async fn solicit_moves(&mut self) -> State {
        self.broadcast(&ServerMessage::your_move());

        let (first, second) = join(
            self.collect_move(Role::Player1),
            self.collect_move(Role::Player2),
        )
        .await;

        for (role, collected) in [(Role::Player1, first), (Role::Player2, second)] {
            match collected {
                Ok(choice) => self.moves.set(role, choice),
                Err(e) => warn!("no move from {}: {}", self.client(role).addr, e),
            }
        }

        // the record starts empty each round, so a gap means a failed collection
        match self.moves.both() {
            Some((move1, move2)) => State::Resolving(move1, move2),
            None => {
                self.broadcast(&ServerMessage::error(ROUND_ERROR_TEXT));
                State::Ended
            }
        }
    }

    async fn collect_move(&self, role: Role) -> Result<Choice, SessionError> {
        let client = self.client(role);
        let text = match receive(client, self.config.move_timeout).await {
            Ok(text) => text,
            Err(SessionError::Binary) => {
                self.send(role, &ServerMessage::error(INVALID_MOVE_TEXT));
                return Err(SessionError::Binary);
            }
            Err(e) => return Err(e),
        };
        match ClientMessage::decode(&text) {
            Ok(ClientMessage::Move { choice }) => Ok(choice),
            Ok(_) => {
                self.send(role, &ServerMessage::error(INVALID_MOVE_TEXT));
                Err(SessionError::Unexpected)
            }
            Err(e) => {
                self.send(role, &ServerMessage::error(INVALID_MOVE_TEXT));
                Err(e.into())
            }
        }
    }

    fn reveal(&mut self, move1: Choice, move2: Choice) -> State {
        let result = resolve(move1, move2);
        debug!("{} vs {}: {:?}", move1, move2, result);
        self.broadcast(&ServerMessage::Result {
            move1,
            move2,
            result,
        });
        self.rounds += 1;
        self.game_over = true;
        State::OfferingRematch
    }

    async fn offer_rematch(&self) -> State {
        self.broadcast(&ServerMessage::Rematch);

        let (first, second) = join(
            self.collect_rematch(Role::Player1),
            self.collect_rematch(Role::Player2),
        )
        .await;

        if first && second {
            State::Restarting
        } else {
            self.broadcast(&ServerMessage::end());
            State::Ended
        }
    }

    async fn collect_rematch(&self, role: Role) -> bool {
        let client = self.client(role);
        let answer = receive(client, self.config.rematch_timeout)
            .await
            .and_then(|text| ClientMessage::decode(&text).map_err(SessionError::from));
        match answer {
            Ok(ClientMessage::Rematch {
                rematch: Answer::Yes,
            }) => true,
            Ok(_) => false,
            Err(e) => {
                debug!("no rematch answer from {}: {}", client.addr, e);
                false
            }
        }
    }

    fn restart(&mut self) -> State {
        self.moves.clear();
        self.game_over = false;
        State::SolicitingMoves
    }
}

async fn receive(client: &Client, limit: Option<Duration>) -> Result<String, SessionError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, client.recv())
            .await
            .map_err(|_| SessionError::Timeout)?,
        None => client.recv().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libcommon::Outcome;
    use crate::libserver::client::testing::Remote;
    use tokio::task::JoinHandle;

    const ROCK: &str = r#"{"move": "rock"}"#;
    const PAPER: &str = r#"{"move": "paper"}"#;
    const SCISSORS: &str = r#"{"move": "scissors"}"#;
    const YES: &str = r#"{"rematch": "yes"}"#;
    const NO: &str = r#"{"rematch": "no"}"#;

    fn start(config: SessionConfig) -> (Remote, Remote, JoinHandle<Summary>) {
        let (c1, r1) = Remote::connect(6001);
        let (c2, r2) = Remote::connect(6002);
        let session = GameSession::new(c1, c2, config);
        (r1, r2, tokio::spawn(session.run()))
    }

    async fn expect_opening(remote: &mut Remote, role: Role) {
        assert_eq!(remote.next().await, ServerMessage::start(role));
        assert_eq!(remote.next().await, ServerMessage::your_move());
    }

    #[test]
    fn test_move_record() {
        let mut moves = MoveRecord::default();
        assert_eq!(moves.both(), None);
        moves.set(Role::Player2, Choice::Paper);
        assert_eq!(moves.get(Role::Player1), None);
        assert_eq!(moves.get(Role::Player2), Some(Choice::Paper));
        moves.set(Role::Player1, Choice::Rock);
        assert_eq!(moves.both(), Some((Choice::Rock, Choice::Paper)));
        moves.clear();
        assert_eq!(moves, MoveRecord::default());
    }

    #[tokio::test]
    async fn test_single_round_then_decline() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(ROCK);
        r2.say(SCISSORS);

        let result = ServerMessage::Result {
            move1: Choice::Rock,
            move2: Choice::Scissors,
            result: Outcome::Player1Wins,
        };
        for remote in [&mut r1, &mut r2] {
            assert_eq!(remote.next().await, result);
            assert_eq!(remote.next().await, ServerMessage::Rematch);
        }

        r1.say(YES);
        r2.say(NO);
        assert_eq!(r1.next().await, ServerMessage::end());
        assert_eq!(r2.next().await, ServerMessage::end());

        let summary = session.await.unwrap();
        assert_eq!(
            summary,
            Summary {
                rounds: 1,
                ending: Ending::Declined
            }
        );
        assert!(r1.pending().is_empty());
        assert!(r2.pending().is_empty());
    }

    #[tokio::test]
    async fn test_rematches_skip_start_notice() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        let rematches = 3;
        for round in 0..=rematches {
            if round > 0 {
                assert_eq!(r1.next().await, ServerMessage::your_move());
                assert_eq!(r2.next().await, ServerMessage::your_move());
            }
            r1.say(PAPER);
            r2.say(PAPER);
            for remote in [&mut r1, &mut r2] {
                assert!(matches!(
                    remote.next().await,
                    ServerMessage::Result {
                        result: Outcome::Draw,
                        ..
                    }
                ));
                assert_eq!(remote.next().await, ServerMessage::Rematch);
            }
            let answer = if round < rematches { YES } else { NO };
            r1.say(YES);
            r2.say(answer);
        }

        assert_eq!(r1.next().await, ServerMessage::end());
        assert_eq!(r2.next().await, ServerMessage::end());
        let summary = session.await.unwrap();
        assert_eq!(summary.rounds, rematches + 1);
        assert!(r1.pending().is_empty());
        assert!(r2.pending().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_mid_move() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r2.say(PAPER);
        r1.hang_up();

        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        let summary = session.await.unwrap();
        assert_eq!(
            summary,
            Summary {
                rounds: 0,
                ending: Ending::Aborted
            }
        );
        assert!(r2.pending().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_move_fails_round() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r2.say(ROCK);
        r1.say(r#"{"move": "lizard"}"#);

        assert_eq!(r1.next().await, ServerMessage::error(INVALID_MOVE_TEXT));
        assert_eq!(r1.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));

        let summary = session.await.unwrap();
        assert_eq!(summary.ending, Ending::Aborted);
        assert_eq!(summary.rounds, 0);
        assert!(r1.pending().is_empty());
        assert!(r2.pending().is_empty());
    }

    #[tokio::test]
    async fn test_binary_move_is_rejected_immediately() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.send_binary();

        // the sender hears about it before the opponent has moved
        assert_eq!(r1.next().await, ServerMessage::error(INVALID_MOVE_TEXT));
        assert!(r2.pending().is_empty());

        r2.say(ROCK);
        assert_eq!(r1.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(session.await.unwrap().ending, Ending::Aborted);
    }

    #[tokio::test]
    async fn test_rematch_answer_as_move_is_rejected() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(YES);
        r2.say(SCISSORS);

        assert_eq!(r1.next().await, ServerMessage::error(INVALID_MOVE_TEXT));
        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(session.await.unwrap().ending, Ending::Aborted);
    }

    #[tokio::test]
    async fn test_garbage_rematch_answer_counts_as_no() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(SCISSORS);
        r2.say(ROCK);
        for remote in [&mut r1, &mut r2] {
            assert!(matches!(
                remote.next().await,
                ServerMessage::Result {
                    result: Outcome::Player2Wins,
                    ..
                }
            ));
            assert_eq!(remote.next().await, ServerMessage::Rematch);
        }

        r1.say(YES);
        r2.say("sure, why not");
        assert_eq!(r1.next().await, ServerMessage::end());
        assert_eq!(r2.next().await, ServerMessage::end());
        assert_eq!(session.await.unwrap().ending, Ending::Declined);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_timeout_aborts_round() {
        let config = SessionConfig {
            move_timeout: Some(Duration::from_millis(500)),
            rematch_timeout: None,
        };
        let (mut r1, mut r2, session) = start(config);
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(ROCK);

        assert_eq!(r1.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        assert_eq!(session.await.unwrap().ending, Ending::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rematch_timeout_counts_as_no() {
        let config = SessionConfig {
            move_timeout: None,
            rematch_timeout: Some(Duration::from_millis(500)),
        };
        let (mut r1, mut r2, session) = start(config);
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(ROCK);
        r2.say(ROCK);
        for remote in [&mut r1, &mut r2] {
            remote.next().await;
            assert_eq!(remote.next().await, ServerMessage::Rematch);
        }

        r1.say(YES);
        assert_eq!(r1.next().await, ServerMessage::end());
        assert_eq!(r2.next().await, ServerMessage::end());
        let summary = session.await.unwrap();
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.ending, Ending::Declined);
    }

    #[tokio::test]
    async fn test_peer_gone_between_rounds_is_detected_lazily() {
        let (mut r1, mut r2, session) = start(SessionConfig::default());
        expect_opening(&mut r1, Role::Player1).await;
        expect_opening(&mut r2, Role::Player2).await;

        r1.say(PAPER);
        r2.say(ROCK);
        for remote in [&mut r1, &mut r2] {
            remote.next().await;
            assert_eq!(remote.next().await, ServerMessage::Rematch);
        }
        r1.say(YES);
        r2.say(YES);
        assert_eq!(r1.next().await, ServerMessage::your_move());
        assert_eq!(r2.next().await, ServerMessage::your_move());

        r1.hang_up();
        assert_eq!(r2.next().await, ServerMessage::error(ROUND_ERROR_TEXT));
        let summary = session.await.unwrap();
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.ending, Ending::Aborted);
    }
}
