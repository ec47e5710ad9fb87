use crate::SessionId;
use crate::TableId;
use crate::TournamentId;
use crate::error::{Error, Result};
use crate::repo::Repository;
use crate::server::dto::CreateTournament;
use crate::table::command::Command;
use crate::tournament::controller::Controller;
use crate::tournament::controller::ControllerHandle;
use crate::tournament::schedule::BlindSchedule;
use crate::tournament::tournament::Status;
use crate::tournament::tournament::Tournament;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// Routing surface from client sessions to table actors. The only
/// process-wide mutable state besides the repository pool.
#[derive(Default)]
pub struct Registry {
    tables: std::sync::RwLock<HashMap<TableId, UnboundedSender<Command>>>,
}

impl Registry {
    pub fn insert(&self, id: TableId, tx: UnboundedSender<Command>) {
        self.tables.write().unwrap().insert(id, tx);
    }
    pub fn remove(&self, id: TableId) {
        self.tables.write().unwrap().remove(&id);
    }
    pub fn get(&self, id: TableId) -> Option<UnboundedSender<Command>> {
        self.tables.read().unwrap().get(&id).cloned()
    }
}

/// Manages live tournaments and hands out session ids.
pub struct Lobby {
    repo: Arc<dyn Repository>,
    registry: Arc<Registry>,
    controllers: RwLock<HashMap<TournamentId, ControllerHandle>>,
    tournaments: AtomicU64,
    sessions: AtomicU64,
}

impl Lobby {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            registry: Arc::new(Registry::default()),
            controllers: RwLock::new(HashMap::new()),
            tournaments: AtomicU64::new(1),
            sessions: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn next_session(&self) -> SessionId {
        self.sessions.fetch_add(1, Ordering::Relaxed)
    }

    /// validate, persist and spawn a SCHEDULED tournament
    pub async fn create(&self, request: CreateTournament) -> Result<TournamentId> {
        let id = self.tournaments.fetch_add(1, Ordering::Relaxed);
        let tournament = Tournament {
            id,
            name: request.name,
            scheduled_start: request.scheduled_start,
            actual_start: None,
            max_players: request.max_players,
            seats_per_table: request.seats_per_table,
            starting_chips: request.starting_chips,
            schedule: BlindSchedule::new(request.blind_levels)?,
            prize_places: request.prize_places,
            status: Status::Scheduled,
        };
        tournament.validate()?;
        crate::repo::retried(|| self.repo.save_tournament(&tournament)).await?;
        let handle = Controller::spawn(tournament, self.repo.clone(), self.registry.clone());
        self.controllers.write().await.insert(id, handle);
        Ok(id).inspect(|id| log::info!("created tournament {}", id))
    }

    pub async fn controller(&self, id: TournamentId) -> Result<ControllerHandle> {
        self.controllers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    pub async fn drop_controller(&self, id: TournamentId) {
        self.controllers.write().await.remove(&id);
    }
}
