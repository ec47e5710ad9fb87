use super::seating;
use super::seating::MovePlan;
use super::seating::TableView;
use super::tournament::Status;
use super::tournament::Tournament;
use crate::TableId;
use crate::UserId;
use crate::error::{Error, Result};
use crate::gameplay::seat::Seat;
use crate::repo::GameRow;
use crate::repo::GameStatus;
use crate::repo::RegStatus;
use crate::repo::Repository;
use crate::repo::SeatRow;
use crate::repo::retried;
use crate::server::dto::ServerMessage;
use crate::server::lobby::Registry;
use crate::table::actor::TableActor;
use crate::table::command::Command;
use crate::table::table::Table;
use crate::timer::Handle;
use crate::timer::Timers;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// A registered player as the lobby knows them: opaque id, a display
/// name, and whether a policy bot plays the seat.
#[derive(Debug, Clone)]
pub struct Registrant {
    pub user: UserId,
    pub name: String,
    pub bot: bool,
}

/// Admin-plane operations on one tournament.
#[derive(Debug)]
pub enum Directive {
    OpenRegistration { reply: oneshot::Sender<Result<()>> },
    Register {
        registrant: Registrant,
        reply: oneshot::Sender<Result<()>>,
    },
    Unregister {
        user: UserId,
        reply: oneshot::Sender<Result<()>>,
    },
    CloseRegistration { reply: oneshot::Sender<Result<()>> },
    Start { reply: oneshot::Sender<Result<()>> },
    Cancel { reply: oneshot::Sender<Result<()>> },
    ForceAdvanceBlind { reply: oneshot::Sender<Result<()>> },
    Status {
        reply: oneshot::Sender<TournamentView>,
    },
    Tick,
}

/// What the tables send back up.
#[derive(Debug)]
pub enum Report {
    HandFinished {
        table: TableId,
        eliminated: Vec<UserId>,
    },
    DealDeclined { table: TableId, seated: usize },
    Paused { table: TableId, reason: String },
}

/// Snapshot answered to status queries.
#[derive(Debug, Clone)]
pub struct TournamentView {
    pub tournament: Tournament,
    pub remaining: u32,
    pub level: usize,
}

struct TableHandle {
    number: u32,
    tx: UnboundedSender<Command>,
    count: usize,
    busy: bool,
    paused: bool,
}

/// Client handle to a controller actor.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: UnboundedSender<Directive>,
}

impl ControllerHandle {
    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Directive,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .map_err(|_| Error::Transient("controller gone".into()))?;
        rx.await.map_err(|_| Error::Transient("controller gone".into()))
    }

    pub async fn open_registration(&self) -> Result<()> {
        self.ask(|reply| Directive::OpenRegistration { reply }).await?
    }
    pub async fn register(&self, registrant: Registrant) -> Result<()> {
        self.ask(|reply| Directive::Register { registrant, reply }).await?
    }
    pub async fn unregister(&self, user: UserId) -> Result<()> {
        self.ask(|reply| Directive::Unregister { user, reply }).await?
    }
    pub async fn close_registration(&self) -> Result<()> {
        self.ask(|reply| Directive::CloseRegistration { reply }).await?
    }
    pub async fn start(&self) -> Result<()> {
        self.ask(|reply| Directive::Start { reply }).await?
    }
    pub async fn cancel(&self) -> Result<()> {
        self.ask(|reply| Directive::Cancel { reply }).await?
    }
    pub async fn force_advance_blind(&self) -> Result<()> {
        self.ask(|reply| Directive::ForceAdvanceBlind { reply }).await?
    }
    pub async fn status(&self) -> Result<TournamentView> {
        self.ask(|reply| Directive::Status { reply }).await
    }
}

/// Drives one tournament from registration to completion: seating,
/// blind progression, consolidation, standings. A serialized actor;
/// tables report in over an unbounded channel.
pub struct Controller {
    tournament: Tournament,
    repo: Arc<dyn Repository>,
    registry: Arc<Registry>,
    registrants: BTreeMap<UserId, Registrant>,
    tables: BTreeMap<TableId, TableHandle>,
    live: BTreeSet<UserId>,
    finish_order: Vec<UserId>,
    level: usize,
    reports_tx: UnboundedSender<Report>,
    directives_tx: UnboundedSender<Directive>,
    ticker: Option<Handle>,
    started: Option<tokio::time::Instant>,
}

impl Controller {
    pub fn spawn(
        tournament: Tournament,
        repo: Arc<dyn Repository>,
        registry: Arc<Registry>,
    ) -> ControllerHandle {
        let (directives_tx, directives_rx) = unbounded_channel();
        let (reports_tx, reports_rx) = unbounded_channel();
        let controller = Self {
            tournament,
            repo,
            registry,
            registrants: BTreeMap::new(),
            tables: BTreeMap::new(),
            live: BTreeSet::new(),
            finish_order: Vec::new(),
            level: 0,
            reports_tx,
            directives_tx: directives_tx.clone(),
            ticker: None,
            started: None,
        };
        tokio::spawn(controller.run(directives_rx, reports_rx));
        ControllerHandle { tx: directives_tx }
    }

    async fn run(
        mut self,
        mut directives: UnboundedReceiver<Directive>,
        mut reports: UnboundedReceiver<Report>,
    ) {
        loop {
            tokio::select! {
                directive = directives.recv() => match directive {
                    Some(directive) => {
                        if self.on_directive(directive).await {
                            break;
                        }
                    }
                    None => break,
                },
                report = reports.recv() => match report {
                    Some(report) => self.on_report(report).await,
                    None => break,
                },
            }
        }
        self.teardown();
        log::info!("tournament {} controller drained", self.tournament.id);
    }

    /// returns true when the tournament is over and the actor may stop
    async fn on_directive(&mut self, directive: Directive) -> bool {
        match directive {
            Directive::OpenRegistration { reply } => {
                let _ = reply.send(self.open_registration().await);
            }
            Directive::Register { registrant, reply } => {
                let _ = reply.send(self.register(registrant).await);
            }
            Directive::Unregister { user, reply } => {
                let _ = reply.send(self.unregister(user).await);
            }
            Directive::CloseRegistration { reply } => {
                let _ = reply.send(self.close_registration().await);
            }
            Directive::Start { reply } => {
                let _ = reply.send(self.start().await);
            }
            Directive::Cancel { reply } => {
                let result = self.cancel().await;
                let terminal = result.is_ok();
                let _ = reply.send(result);
                return terminal;
            }
            Directive::ForceAdvanceBlind { reply } => {
                let _ = reply.send(self.advance_level(self.level + 1).await);
            }
            Directive::Status { reply } => {
                let _ = reply.send(TournamentView {
                    tournament: self.tournament.clone(),
                    remaining: self.live.len() as u32,
                    level: self.level,
                });
            }
            Directive::Tick => self.tick().await,
        }
        false
    }

    async fn on_report(&mut self, report: Report) {
        match report {
            Report::HandFinished { table, eliminated } => {
                if let Some(handle) = self.tables.get_mut(&table) {
                    handle.busy = false;
                    handle.count -= eliminated.len().min(handle.count);
                }
                for user in eliminated {
                    if self.live.remove(&user) {
                        self.finish_order.push(user);
                        log::info!(
                            "tournament {}: {} eliminated in place {}",
                            self.tournament.id,
                            user,
                            self.live.len() + 1
                        );
                    }
                }
                if self.live.len() <= 1 {
                    self.complete().await;
                } else {
                    self.consolidate().await;
                    self.deal_idle_tables();
                }
            }
            Report::DealDeclined { table, seated } => {
                if let Some(handle) = self.tables.get_mut(&table) {
                    handle.busy = false;
                    // resync the mirror with the table's own count
                    handle.count = seated;
                }
                self.consolidate().await;
                self.deal_idle_tables();
            }
            Report::Paused { table, reason } => {
                log::error!(
                    "tournament {}: table {} paused: {}",
                    self.tournament.id,
                    table,
                    reason
                );
                if let Some(handle) = self.tables.get_mut(&table) {
                    handle.busy = false;
                    handle.paused = true;
                }
            }
        }
    }

    async fn open_registration(&mut self) -> Result<()> {
        self.tournament.advance(Status::Registering)?;
        self.save().await
    }

    async fn register(&mut self, registrant: Registrant) -> Result<()> {
        if self.tournament.status != Status::Registering {
            return Err(Error::InvalidState("registration is not open".into()));
        }
        if self.registrants.contains_key(&registrant.user) {
            return Err(Error::AlreadyRegistered);
        }
        if self.registrants.len() as u32 >= self.tournament.max_players {
            return Err(Error::TournamentFull);
        }
        let (id, user) = (self.tournament.id, registrant.user);
        retried(|| self.repo.upsert_registration(id, user, RegStatus::Confirmed)).await?;
        self.registrants.insert(registrant.user, registrant);
        Ok(())
    }

    async fn unregister(&mut self, user: UserId) -> Result<()> {
        if self.tournament.status != Status::Registering {
            return Err(Error::InvalidState("registration is not open".into()));
        }
        if !self.registrants.contains_key(&user) {
            return Err(Error::NotRegistered);
        }
        let id = self.tournament.id;
        retried(|| self.repo.delete_registration(id, user)).await?;
        self.registrants.remove(&user);
        Ok(())
    }

    async fn close_registration(&mut self) -> Result<()> {
        if self.registrants.len() < 2 {
            return Err(Error::InvalidState("insufficient players".into()));
        }
        self.tournament.advance(Status::Seated)?;
        let registrants = self.registrants.values().cloned().collect::<Vec<_>>();
        let assignments = seating::partition(registrants, self.tournament.seats_per_table);
        let blinds = self.tournament.schedule.blinds(0);
        for (index, assigned) in assignments.into_iter().enumerate() {
            let number = index as u32 + 1;
            let id = self.tournament.id * 1_000 + number as TableId;
            let mut table = Table::new(
                id,
                self.tournament.id,
                number,
                self.tournament.seats_per_table,
                blinds,
                0,
            );
            let mut rows = Vec::new();
            for (seat_number, registrant) in assigned.iter() {
                self.live.insert(registrant.user);
                table.seat_player(Seat::new(
                    *seat_number,
                    registrant.user,
                    registrant.name.clone(),
                    registrant.bot,
                    self.tournament.starting_chips,
                ))?;
                rows.push(SeatRow {
                    game: id,
                    user: registrant.user,
                    number: *seat_number,
                    chips: self.tournament.starting_chips,
                    status: crate::gameplay::seat::Status::Active,
                });
            }
            let game = self.game_row(id, number, GameStatus::Active);
            retried(|| self.repo.create_game(&game, &rows)).await?;
            let count = rows.len();
            let tx = TableActor::spawn(table, self.repo.clone(), self.reports_tx.clone(), id);
            self.registry.insert(id, tx.clone());
            self.tables.insert(
                id,
                TableHandle {
                    number,
                    tx,
                    count,
                    busy: false,
                    paused: false,
                },
            );
            log::info!(
                "tournament {}: table {} seated with {} players",
                self.tournament.id,
                number,
                count
            );
        }
        self.save().await
    }

    async fn start(&mut self) -> Result<()> {
        if self.live.len() < 2 {
            return Err(Error::InvalidState("insufficient players".into()));
        }
        self.tournament.advance(Status::Running)?;
        self.tournament.actual_start = Some(crate::epoch_millis() / 1_000);
        self.started = Some(tokio::time::Instant::now());
        self.save().await?;
        self.deal_idle_tables();
        let tick = self.directives_tx.clone();
        self.ticker = Some(Timers::every(
            Duration::from_secs(crate::BLIND_TICK_SECS),
            move || {
                let _ = tick.send(Directive::Tick);
            },
        ));
        self.broadcast_state();
        Ok(())
    }

    async fn cancel(&mut self) -> Result<()> {
        self.tournament.advance(Status::Cancelled)?;
        self.save().await?;
        self.broadcast_state();
        self.close_all_tables().await;
        Ok(())
    }

    async fn tick(&mut self) {
        if self.tournament.status != Status::Running {
            return;
        }
        let elapsed = self
            .started
            .map(|start| start.elapsed().as_secs())
            .unwrap_or(0);
        let level = self.tournament.schedule.level_at(elapsed);
        if level > self.level {
            if let Err(e) = self.advance_level(level).await {
                log::warn!("tournament {}: blind advance failed: {}", self.tournament.id, e);
            }
        }
    }

    /// push new blinds to every table; they apply to the next hand
    async fn advance_level(&mut self, level: usize) -> Result<()> {
        if self.tournament.status != Status::Running {
            return Err(Error::InvalidState("tournament is not running".into()));
        }
        let capped = level.min(self.tournament.schedule.levels().len() - 1);
        if capped <= self.level {
            return Ok(());
        }
        self.level = capped;
        let (small_blind, big_blind) = self.tournament.schedule.blinds(capped);
        log::info!(
            "tournament {}: blinds to {}/{} (level {})",
            self.tournament.id,
            small_blind,
            big_blind,
            capped
        );
        for (&id, handle) in self.tables.iter() {
            let _ = handle.tx.send(Command::SetBlinds {
                level: capped,
                small_blind,
                big_blind,
            });
            let game = self.game_row(id, handle.number, GameStatus::Active);
            retried(|| self.repo.update_game(&game)).await?;
        }
        self.broadcast_state();
        Ok(())
    }

    /// between hands: break surplus tables and even out stacks-per-table
    async fn consolidate(&mut self) {
        loop {
            let views = self
                .tables
                .iter()
                .map(|(&id, h)| TableView {
                    id,
                    number: h.number,
                    count: h.count,
                    busy: h.busy || h.paused,
                })
                .collect::<Vec<TableView>>();
            let plan = match seating::next_move(&views, self.tournament.seats_per_table) {
                Some(plan) => plan,
                None => break,
            };
            if !self.execute(plan).await {
                log::warn!(
                    "tournament {}: consolidation move {:?} did not apply",
                    self.tournament.id,
                    plan
                );
                break;
            }
        }
    }

    /// relocate one player; best effort, never blocks hand progress
    async fn execute(&mut self, plan: MovePlan) -> bool {
        let Some(donor) = self.tables.get(&plan.from) else {
            return false;
        };
        let (take_tx, take_rx) = oneshot::channel();
        if donor
            .tx
            .send(Command::TakeSeat {
                rule: plan.rule,
                reply: take_tx,
            })
            .is_err()
        {
            return false;
        }
        let Ok(Some(seat)) = take_rx.await else {
            return false;
        };
        let user = seat.user();
        let chips = seat.chips();
        let Some(recipient) = self.tables.get(&plan.to) else {
            return false;
        };
        let (add_tx, add_rx) = oneshot::channel();
        if recipient
            .tx
            .send(Command::AddSeat {
                seat,
                reply: add_tx,
            })
            .is_err()
        {
            return false;
        }
        let number = match add_rx.await {
            Ok(Ok(number)) => number,
            _ => return false,
        };
        if let Some(donor) = self.tables.get_mut(&plan.from) {
            donor.count -= 1;
        }
        if let Some(recipient) = self.tables.get_mut(&plan.to) {
            recipient.count += 1;
        }
        let row = SeatRow {
            game: plan.to,
            user,
            number,
            chips,
            status: crate::gameplay::seat::Status::Active,
        };
        let (game_number, game) = {
            let recipient = self.tables.get(&plan.to).expect("recipient exists");
            (recipient.number, self.game_row(plan.to, recipient.number, GameStatus::Active))
        };
        if let Err(e) = retried(|| self.repo.create_game(&game, std::slice::from_ref(&row))).await {
            log::error!("tournament {}: seat relocation write failed: {}", self.tournament.id, e);
        }
        log::info!(
            "tournament {}: moved {} to table {} seat {}",
            self.tournament.id,
            user,
            game_number,
            number
        );
        if self.tables.get(&plan.from).map(|h| h.count) == Some(0) {
            self.close_table(plan.from).await;
        }
        true
    }

    /// idle tables with two or more stacks get the next hand
    fn deal_idle_tables(&mut self) {
        if self.tournament.status != Status::Running {
            return;
        }
        for handle in self.tables.values_mut() {
            if !handle.busy && !handle.paused && handle.count >= 2 {
                if handle.tx.send(Command::Deal).is_ok() {
                    handle.busy = true;
                }
            }
        }
    }

    async fn complete(&mut self) {
        if self.tournament.status.is_terminal() {
            return;
        }
        if let Err(e) = self.tournament.advance(Status::Completed) {
            log::error!("tournament {}: completion failed: {}", self.tournament.id, e);
            return;
        }
        let _ = self.save().await;
        for (index, user) in self.standings().iter().enumerate() {
            log::info!(
                "tournament {}: place {}: {}",
                self.tournament.id,
                index + 1,
                user
            );
        }
        self.broadcast_state();
        self.close_all_tables().await;
    }

    /// champion first, then reverse elimination order
    pub fn standings(&self) -> Vec<UserId> {
        self.live
            .iter()
            .copied()
            .chain(self.finish_order.iter().rev().copied())
            .collect()
    }

    async fn close_table(&mut self, id: TableId) {
        if let Some(handle) = self.tables.remove(&id) {
            let game = self.game_row(id, handle.number, GameStatus::Closed);
            if let Err(e) = retried(|| self.repo.update_game(&game)).await {
                log::error!("tournament {}: closing table write failed: {}", self.tournament.id, e);
            }
            let _ = handle.tx.send(Command::Shutdown);
            self.registry.remove(id);
            log::info!("tournament {}: table {} closed", self.tournament.id, handle.number);
        }
    }

    async fn close_all_tables(&mut self) {
        let ids = self.tables.keys().copied().collect::<Vec<TableId>>();
        for id in ids {
            self.close_table(id).await;
        }
    }

    fn broadcast_state(&self) {
        let message = ServerMessage::TournamentState {
            id: self.tournament.id,
            status: self.tournament.status.as_str().to_string(),
            current_blind_level: self.level,
            remaining_players: self.live.len() as u32,
        };
        for handle in self.tables.values() {
            let _ = handle.tx.send(Command::Broadcast {
                message: message.clone(),
            });
        }
    }

    fn game_row(&self, id: TableId, number: u32, status: GameStatus) -> GameRow {
        let (small_blind, big_blind) = self.tournament.schedule.blinds(self.level);
        GameRow {
            id,
            tournament: self.tournament.id,
            number,
            status,
            level: self.level,
            small_blind,
            big_blind,
        }
    }

    async fn save(&mut self) -> Result<()> {
        let tournament = self.tournament.clone();
        retried(|| self.repo.save_tournament(&tournament)).await
    }

    fn teardown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
        for (&id, handle) in self.tables.iter() {
            let _ = handle.tx.send(Command::Shutdown);
            self.registry.remove(id);
        }
        self.tables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MemoryRepo;
    use crate::tournament::schedule::{BlindLevel, BlindSchedule};
    use std::time::Duration;

    fn tournament(id: u64, max_players: u32, seats_per_table: u8) -> Tournament {
        Tournament {
            id,
            name: "nightly".into(),
            scheduled_start: 0,
            actual_start: None,
            max_players,
            seats_per_table,
            starting_chips: 200,
            schedule: BlindSchedule::new(vec![
                BlindLevel::from((10, 20, Some(60))),
                BlindLevel::from((50, 100, Some(60))),
                BlindLevel::from((200, 400, None)),
            ])
            .unwrap(),
            prize_places: 3,
            status: Status::Scheduled,
        }
    }

    fn registrant(user: UserId, bot: bool) -> Registrant {
        Registrant {
            user,
            name: format!("u{}", user),
            bot,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn registration_rules_are_enforced() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        let handle = Controller::spawn(tournament(1, 3, 3), repo.clone(), registry);

        // registration before opening is rejected
        assert!(matches!(
            handle.register(registrant(10, false)).await,
            Err(Error::InvalidState(_))
        ));
        handle.open_registration().await.unwrap();
        handle.register(registrant(10, false)).await.unwrap();
        assert!(matches!(
            handle.register(registrant(10, false)).await,
            Err(Error::AlreadyRegistered)
        ));
        handle.register(registrant(11, false)).await.unwrap();
        handle.register(registrant(12, false)).await.unwrap();
        assert!(matches!(
            handle.register(registrant(13, false)).await,
            Err(Error::TournamentFull)
        ));
        handle.unregister(11).await.unwrap();
        assert!(matches!(
            handle.unregister(11).await,
            Err(Error::NotRegistered)
        ));
        assert_eq!(repo.count_confirmed(1).await.unwrap(), 2);

        // out-of-order lifecycle transitions are rejected
        assert!(matches!(handle.start().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn seating_materializes_balanced_tables() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        let handle = Controller::spawn(tournament(2, 32, 6), repo.clone(), registry.clone());
        handle.open_registration().await.unwrap();
        for user in 0..14u64 {
            handle.register(registrant(user, false)).await.unwrap();
        }
        handle.close_registration().await.unwrap();

        let view = handle.status().await.unwrap();
        assert_eq!(view.tournament.status, Status::Seated);
        assert_eq!(view.remaining, 14);

        // 14 players over tables of 6 means three tables, sizes 5/5/4
        let mut sizes = Vec::new();
        for number in 1..=3u64 {
            let id = 2 * 1_000 + number;
            let (game, seats) = repo.find_game_with_seats(id).await.unwrap();
            assert_eq!(game.number as u64, number);
            let mut numbers = seats.iter().map(|s| s.number).collect::<Vec<u8>>();
            numbers.sort_unstable();
            let unique = numbers.len();
            numbers.dedup();
            assert_eq!(numbers.len(), unique, "seat numbers are unique");
            assert!(numbers.iter().all(|n| (1..=6).contains(n)));
            assert!(seats.iter().all(|s| s.chips == 200));
            assert!(registry.get(id).is_some(), "table actor registered");
            sizes.push(seats.len());
        }
        sizes.sort_unstable();
        assert_eq!(sizes, vec![4, 5, 5]);
        assert!(repo.find_game_with_seats(2_004).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_tears_the_tournament_down() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        let handle = Controller::spawn(tournament(3, 8, 4), repo.clone(), registry.clone());
        handle.open_registration().await.unwrap();
        for user in 0..4u64 {
            handle.register(registrant(user, true)).await.unwrap();
        }
        handle.close_registration().await.unwrap();
        handle.cancel().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            repo.find_tournament(3).await.unwrap().status,
            Status::Cancelled
        );
        assert!(registry.get(3_001).is_none(), "tables deregistered");
        // a cancelled tournament never resumes
        assert!(handle.start().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn bots_play_the_tournament_to_completion() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        let handle = Controller::spawn(tournament(4, 6, 3), repo.clone(), registry.clone());
        handle.open_registration().await.unwrap();
        for user in 0..6u64 {
            handle.register(registrant(user, true)).await.unwrap();
        }
        handle.close_registration().await.unwrap();
        handle.start().await.unwrap();
        assert_eq!(
            handle.status().await.unwrap().tournament.status,
            Status::Running
        );

        let mut completed = false;
        for _ in 0..8_000 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let view = handle.status().await.unwrap();
            if view.tournament.status == Status::Completed {
                assert_eq!(view.remaining, 1);
                completed = true;
                break;
            }
        }
        assert!(completed, "blinds escalate until a single stack remains");
        assert_eq!(
            repo.find_tournament(4).await.unwrap().status,
            Status::Completed
        );
        // every table was closed and deregistered on the way out
        assert!(registry.get(4_001).is_none());
        assert!(registry.get(4_002).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn blind_levels_follow_the_clock_between_hands() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        // two humans who never act: hands end by timeout folds while
        // the clock walks the blind ladder
        let handle = Controller::spawn(tournament(5, 4, 4), repo.clone(), registry.clone());
        handle.open_registration().await.unwrap();
        handle.register(registrant(1, false)).await.unwrap();
        handle.register(registrant(2, false)).await.unwrap();
        handle.close_registration().await.unwrap();
        handle.start().await.unwrap();

        tokio::time::sleep(Duration::from_secs(65)).await;
        let view = handle.status().await.unwrap();
        assert!(view.level >= 1, "level should advance after a minute");
        let (_, seats) = repo.find_game_with_seats(5_001).await.unwrap();
        assert_eq!(
            seats.iter().map(|s| s.chips).sum::<crate::Chips>(),
            400,
            "timeout hands persist a conserved supply"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn force_advance_pushes_one_level() {
        let repo = Arc::new(MemoryRepo::default());
        let registry = Arc::new(Registry::default());
        let handle = Controller::spawn(tournament(6, 4, 4), repo.clone(), registry);
        handle.open_registration().await.unwrap();
        handle.register(registrant(1, true)).await.unwrap();
        handle.register(registrant(2, true)).await.unwrap();
        handle.close_registration().await.unwrap();
        // cannot advance blinds before the clock starts
        assert!(handle.force_advance_blind().await.is_err());
        handle.start().await.unwrap();
        handle.force_advance_blind().await.unwrap();
        assert_eq!(handle.status().await.unwrap().level, 1);
    }
}
