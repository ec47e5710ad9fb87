use super::bot::Bot;
use super::broadcast::Subscribers;
use super::command::Command;
use super::event::Event;
use super::table::Table;
use crate::UserId;
use crate::error::Error;
use crate::repo::HandRecordRow;
use crate::repo::Repository;
use crate::server::dto::RevealDto;
use crate::server::dto::ServerMessage;
use crate::server::dto::WinnerDto;
use crate::timer::Handle;
use crate::timer::Timers;
use crate::tournament::controller::Report;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Grace,
    Clock,
    Bot,
}

/// Runs one Table in its own task: single-writer over the table state,
/// FIFO over the mailbox, timers delivered back through the mailbox so
/// every mutation happens on this serialized context.
pub struct TableActor {
    table: Table,
    subs: Subscribers,
    repo: Arc<dyn Repository>,
    report: UnboundedSender<Report>,
    mailbox: UnboundedSender<Command>,
    timer: Option<Handle>,
    epoch: u64,
    phase: Phase,
    bot: Bot,
    last_actor: Option<UserId>,
}

impl TableActor {
    pub fn spawn(
        table: Table,
        repo: Arc<dyn Repository>,
        report: UnboundedSender<Report>,
        bot_seed: u64,
    ) -> UnboundedSender<Command> {
        let (tx, rx) = unbounded_channel();
        let actor = Self {
            table,
            subs: Subscribers::default(),
            repo,
            report,
            mailbox: tx.clone(),
            timer: None,
            epoch: 0,
            phase: Phase::Idle,
            bot: Bot::new(bot_seed),
            last_actor: None,
        };
        tokio::spawn(actor.run(rx));
        tx
    }

    async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle(command).await;
        }
        self.disarm();
        log::info!("table {} actor drained", self.table.number());
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Deal => match self.table.start_hand() {
                Ok(events) => self.emit(events).await,
                Err(e) => {
                    log::warn!("table {} cannot deal: {}", self.table.number(), e);
                    let _ = self.report.send(Report::DealDeclined {
                        table: self.table.id(),
                        seated: self.table.dealt_in(),
                    });
                }
            },
            Command::SetBlinds {
                level,
                small_blind,
                big_blind,
            } => {
                self.table.set_blinds(level, (small_blind, big_blind));
                log::info!(
                    "table {} blinds now {}/{} (level {})",
                    self.table.number(),
                    small_blind,
                    big_blind,
                    level
                );
                self.subs.send_state(&self.table);
            }
            Command::Act {
                session,
                user,
                action,
            } => match self.table.act(user, action) {
                Ok(events) => {
                    self.last_actor = Some(user);
                    self.emit(events).await;
                }
                // duplicate submission for an already-consumed turn
                Err(Error::OutOfTurn) if self.last_actor == Some(user) => {}
                Err(e) => self.subs.send_to(session, &ServerMessage::from(&e)),
            },
            Command::Timeout { epoch } if epoch == self.epoch => self.expire().await,
            Command::Timeout { .. } => {}
            Command::Subscribe { session, user, tx } => {
                self.subs.subscribe(session, user, tx);
                self.subs.send_state_to(session, &self.table);
            }
            Command::Unsubscribe { session } => self.subs.unsubscribe(session),
            Command::Broadcast { message } => self.subs.send(&message),
            Command::AddSeat { seat, reply } => {
                let added = self.table.add_seat(seat);
                let _ = reply.send(added);
                self.subs.send_state(&self.table);
            }
            Command::TakeSeat { rule, reply } => {
                let taken = self.table.take_seat(rule);
                let _ = reply.send(taken);
                self.subs.send_state(&self.table);
            }
            Command::Shutdown => unreachable!("drained in run"),
        }
    }

    /// a turn clock ran out: advance the grace phase, auto-act a
    /// human, or roll the bot policy
    async fn expire(&mut self) {
        match self.phase {
            Phase::Idle => {}
            Phase::Grace => {
                self.phase = Phase::Clock;
                self.arm(Duration::from_millis(crate::TURN_CLOCK_MILLIS));
            }
            Phase::Clock => match self.table.act_timeout() {
                Ok(events) => self.emit(events).await,
                Err(e) => log::warn!("table {} auto-act failed: {}", self.table.number(), e),
            },
            Phase::Bot => {
                let decision = self.table.bot_view().map(|view| self.bot.decide(view));
                let events = match decision {
                    None => return,
                    Some(action) => self
                        .table
                        .act_bot(action)
                        .or_else(|_| self.table.act_timeout()),
                };
                match events {
                    Ok(events) => self.emit(events).await,
                    Err(e) => log::warn!("table {} bot act failed: {}", self.table.number(), e),
                }
            }
        }
    }

    /// apply one transition's events: broadcast, arm timers, persist
    /// and report at hand boundaries
    async fn emit(&mut self, events: Vec<Event>) {
        let table_id = self.table.id();
        let mut settled: Option<HandRecordRow> = None;
        let mut eliminated = Vec::new();
        let mut finished = false;
        for event in events {
            match event {
                Event::Dealt { street, cards } => {
                    log::debug!("table {} deals {}: {:?}", self.table.number(), street, cards);
                }
                Event::Applied {
                    user,
                    action,
                    amount,
                    auto,
                    ..
                } => {
                    self.subs.send(&ServerMessage::ActionApplied {
                        table_id,
                        user_id: user,
                        action: action.label().to_string(),
                        amount,
                        auto,
                    });
                }
                Event::TurnBegin { user, bot, .. } => self.begin_turn(user, bot),
                Event::Settled {
                    pot,
                    winners,
                    reveals,
                    board,
                    history,
                } => {
                    self.subs.send(&ServerMessage::HandResult {
                        table_id,
                        winners: winners
                            .iter()
                            .map(|w| WinnerDto {
                                user_id: w.user,
                                amount: w.amount,
                                category: w.category.map(str::to_string),
                            })
                            .collect(),
                        reveals: reveals
                            .iter()
                            .map(|(user, hole)| RevealDto {
                                user_id: *user,
                                cards: hole.cards(),
                            })
                            .collect(),
                    });
                    settled = Some(HandRecordRow {
                        game: table_id,
                        hand_number: self.table.hands_dealt(),
                        pot,
                        board: serde_json::to_string(&board).expect("cards serialize"),
                        history: serde_json::to_string(&history).expect("records serialize"),
                        winners: serde_json::to_string(
                            &winners.iter().map(|w| w.user).collect::<Vec<UserId>>(),
                        )
                        .expect("ids serialize"),
                    });
                    finished = true;
                }
                Event::Eliminated { order } => eliminated = order,
                Event::Aborted { reason } => {
                    log::error!("table {} hand voided: {}", self.table.number(), reason);
                    finished = true;
                }
            }
        }
        self.subs.send_state(&self.table);
        if finished {
            self.disarm();
            self.phase = Phase::Idle;
            self.last_actor = None;
            self.settle(settled, eliminated).await;
        }
    }

    /// start the turn clock: bots get one short fuse, humans get a
    /// grace phase then a visible countdown
    fn begin_turn(&mut self, user: UserId, bot: bool) {
        self.disarm();
        self.epoch += 1;
        if bot {
            self.phase = Phase::Bot;
            self.arm(Duration::from_millis(crate::BOT_CLOCK_MILLIS));
        } else {
            self.phase = Phase::Grace;
            let duration = crate::TURN_GRACE_MILLIS + crate::TURN_CLOCK_MILLIS;
            self.subs.send(&ServerMessage::TurnBegin {
                table_id: self.table.id(),
                user_id: user,
                deadline_epoch_ms: crate::epoch_millis() + duration,
                duration_ms: duration,
            });
            self.arm(Duration::from_millis(crate::TURN_GRACE_MILLIS));
        }
    }

    fn arm(&mut self, delay: Duration) {
        let epoch = self.epoch;
        let tx = self.mailbox.clone();
        self.timer = Some(Timers::once(delay, move || {
            let _ = tx.send(Command::Timeout { epoch });
        }));
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// hand boundary: durable writes are awaited and retried before
    /// the controller may hand us the next deal
    async fn settle(&mut self, record: Option<HandRecordRow>, eliminated: Vec<UserId>) {
        let game = self.table.id();
        let mut failed = None;
        for seat in self.table.seats().values() {
            let repo = self.repo.clone();
            let (user, chips, status) = (seat.user(), seat.chips(), seat.status());
            if let Err(e) =
                crate::repo::retried(|| repo.update_chips(game, user, chips)).await
            {
                failed = Some(e);
                break;
            }
            if let Err(e) =
                crate::repo::retried(|| repo.update_seat_status(game, user, status)).await
            {
                failed = Some(e);
                break;
            }
        }
        if failed.is_none() {
            if let Some(ref record) = record {
                if let Err(e) = crate::repo::retried(|| self.repo.append_hand_record(record)).await
                {
                    failed = Some(e);
                }
            }
        }
        match failed {
            Some(e) => {
                log::error!("table {} boundary write failed: {}", self.table.number(), e);
                let _ = self.report.send(Report::Paused {
                    table: game,
                    reason: e.to_string(),
                });
            }
            None => {
                let _ = self.report.send(Report::HandFinished {
                    table: game,
                    eliminated,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::seat::Seat;
    use crate::repo::GameRow;
    use crate::repo::GameStatus;
    use crate::repo::MemoryRepo;
    use crate::repo::SeatRow;
    use crate::table::table::Table;
    use tokio::sync::mpsc::UnboundedReceiver;

    const GAME: crate::TableId = 9;

    async fn setup(
        bots: bool,
        stacks: &[(u8, crate::Chips)],
    ) -> (
        UnboundedSender<Command>,
        UnboundedReceiver<Report>,
        Arc<MemoryRepo>,
    ) {
        let repo = Arc::new(MemoryRepo::default());
        let mut table = Table::new(GAME, 1, 1, 10, (1, 2), 0);
        let mut rows = Vec::new();
        for &(n, chips) in stacks {
            let user = 100 + n as UserId;
            table
                .seat_player(Seat::new(n, user, format!("p{}", n), bots, chips))
                .unwrap();
            rows.push(SeatRow {
                game: GAME,
                user,
                number: n,
                chips,
                status: crate::gameplay::seat::Status::Active,
            });
        }
        let game = GameRow {
            id: GAME,
            tournament: 1,
            number: 1,
            status: GameStatus::Active,
            level: 0,
            small_blind: 1,
            big_blind: 2,
        };
        repo.create_game(&game, &rows).await.unwrap();
        let (reports_tx, reports_rx) = unbounded_channel();
        let tx = TableActor::spawn(table, repo.clone(), reports_tx, 42);
        (tx, reports_rx, repo)
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(json) = rx.try_recv() {
            messages.push(serde_json::from_str(&json).unwrap());
        }
        messages
    }

    #[tokio::test(start_paused = true)]
    async fn expired_turn_clock_auto_folds_with_the_auto_flag() {
        let (tx, _reports, _repo) = setup(false, &[(1, 100), (2, 100)]).await;
        let (sub_tx, mut sub_rx) = unbounded_channel();
        tx.send(Command::Subscribe {
            session: 1,
            user: None,
            tx: sub_tx,
        })
        .unwrap();
        tx.send(Command::Deal).unwrap();
        // grace plus countdown and a little slack
        tokio::time::sleep(Duration::from_millis(21_000)).await;
        let messages = drain(&mut sub_rx);
        let auto_fold = messages.iter().any(|m| {
            matches!(
                m,
                ServerMessage::ActionApplied {
                    action,
                    auto: true,
                    ..
                } if action == "FOLD"
            )
        });
        assert!(auto_fold, "timeout should fold the blind-owing seat");
        assert!(
            messages
                .iter()
                .any(|m| matches!(m, ServerMessage::HandResult { .. })),
            "folding heads-up ends the hand"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn turn_begin_carries_a_twenty_second_deadline() {
        let (tx, _reports, _repo) = setup(false, &[(1, 100), (2, 100)]).await;
        let (sub_tx, mut sub_rx) = unbounded_channel();
        tx.send(Command::Subscribe {
            session: 1,
            user: None,
            tx: sub_tx,
        })
        .unwrap();
        tx.send(Command::Deal).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let messages = drain(&mut sub_rx);
        match messages
            .iter()
            .find(|m| matches!(m, ServerMessage::TurnBegin { .. }))
        {
            Some(ServerMessage::TurnBegin { duration_ms, .. }) => {
                assert_eq!(*duration_ms, 20_000);
            }
            _ => panic!("turn-begin not broadcast"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_submissions_are_dropped_silently() {
        let (tx, _reports, _repo) = setup(false, &[(1, 100), (2, 100)]).await;
        let (sub_tx, mut sub_rx) = unbounded_channel();
        tx.send(Command::Subscribe {
            session: 1,
            user: None,
            tx: sub_tx,
        })
        .unwrap();
        tx.send(Command::Deal).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let actor = drain(&mut sub_rx)
            .iter()
            .find_map(|m| match m {
                ServerMessage::TurnBegin { user_id, .. } => Some(*user_id),
                _ => None,
            })
            .expect("someone is on the clock");

        tx.send(Command::Act {
            session: 1,
            user: actor,
            action: crate::gameplay::action::Action::Call,
        })
        .unwrap();
        tx.send(Command::Act {
            session: 1,
            user: actor,
            action: crate::gameplay::action::Action::Call,
        })
        .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let messages = drain(&mut sub_rx);
        assert!(
            !messages
                .iter()
                .any(|m| matches!(m, ServerMessage::Error { .. })),
            "the duplicate must be dropped, not answered"
        );
        // a genuinely foreign user still gets the out-of-turn error
        tx.send(Command::Act {
            session: 1,
            user: 999,
            action: crate::gameplay::action::Action::Call,
        })
        .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let messages = drain(&mut sub_rx);
        assert!(
            messages
                .iter()
                .any(|m| matches!(m, ServerMessage::Error { code, .. } if code == "out-of-turn"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn bots_play_a_hand_to_the_boundary_writes() {
        let (tx, mut reports, repo) = setup(true, &[(1, 100), (2, 100), (3, 100)]).await;
        tx.send(Command::Deal).unwrap();
        let report = tokio::time::timeout(Duration::from_secs(600), reports.recv())
            .await
            .expect("bots finish a hand well inside the budget")
            .expect("actor alive");
        match report {
            Report::HandFinished { table, .. } => assert_eq!(table, GAME),
            other => panic!("unexpected report: {:?}", other),
        }
        let (_, seats) = repo.find_game_with_seats(GAME).await.unwrap();
        assert_eq!(
            seats.iter().map(|s| s.chips).sum::<crate::Chips>(),
            300,
            "boundary write must persist a conserved chip supply"
        );
        assert_eq!(repo.hand_records(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blind_pushes_apply_to_the_next_hand_only() {
        let (tx, mut reports, repo) = setup(true, &[(1, 100), (2, 100)]).await;
        tx.send(Command::Deal).unwrap();
        tx.send(Command::SetBlinds {
            level: 1,
            small_blind: 5,
            big_blind: 10,
        })
        .unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(600), reports.recv())
            .await
            .expect("hand finishes")
            .expect("actor alive");
        // the archived first hand was played at the old blinds
        assert_eq!(repo.hand_records(), 1);
        let (sub_tx, mut sub_rx) = unbounded_channel();
        tx.send(Command::Subscribe {
            session: 7,
            user: None,
            tx: sub_tx,
        })
        .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let state = drain(&mut sub_rx)
            .into_iter()
            .find_map(|m| match m {
                ServerMessage::TableState(state) => Some(state),
                _ => None,
            })
            .expect("snapshot on subscribe");
        assert_eq!((state.small_blind, state.big_blind), (5, 10));
    }
}
