pub mod memory;
pub use memory::*;

pub mod postgres;
pub use postgres::*;

use crate::Chips;
use crate::TableId;
use crate::TournamentId;
use crate::UserId;
use crate::error::Result;
use crate::gameplay::seat::Status as SeatStatus;
use crate::tournament::tournament::Status;
use crate::tournament::tournament::Tournament;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl RegStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegStatus::Pending => "PENDING",
            RegStatus::Confirmed => "CONFIRMED",
            RegStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Closed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "ACTIVE",
            GameStatus::Closed => "CLOSED",
        }
    }
}

/// game record: one table of one tournament
#[derive(Debug, Clone)]
pub struct GameRow {
    pub id: TableId,
    pub tournament: TournamentId,
    pub number: u32,
    pub status: GameStatus,
    pub level: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

/// seat record: one player at one table
#[derive(Debug, Clone)]
pub struct SeatRow {
    pub game: TableId,
    pub user: UserId,
    pub number: u8,
    pub chips: Chips,
    pub status: SeatStatus,
}

/// write-only archive of a settled hand
#[derive(Debug, Clone)]
pub struct HandRecordRow {
    pub game: TableId,
    pub hand_number: u64,
    pub pot: Chips,
    pub board: String,
    pub history: String,
    pub winners: String,
}

/// The persistence surface the engine depends on. Mutations are
/// strongly consistent within a single tournament; nothing is promised
/// across tournaments.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    async fn find_tournament(&self, id: TournamentId) -> Result<Tournament>;
    async fn save_tournament(&self, tournament: &Tournament) -> Result<()>;
    async fn list_tournaments(&self, status: Status) -> Result<Vec<Tournament>>;

    async fn upsert_registration(
        &self,
        id: TournamentId,
        user: UserId,
        status: RegStatus,
    ) -> Result<()>;
    async fn delete_registration(&self, id: TournamentId, user: UserId) -> Result<()>;
    async fn count_confirmed(&self, id: TournamentId) -> Result<u32>;
    async fn list_confirmed(&self, id: TournamentId) -> Result<Vec<UserId>>;

    async fn create_game(&self, game: &GameRow, seats: &[SeatRow]) -> Result<()>;
    async fn update_game(&self, game: &GameRow) -> Result<()>;
    async fn update_chips(&self, game: TableId, user: UserId, chips: Chips) -> Result<()>;
    async fn update_seat_status(
        &self,
        game: TableId,
        user: UserId,
        status: SeatStatus,
    ) -> Result<()>;
    async fn find_game_with_seats(&self, id: TableId) -> Result<(GameRow, Vec<SeatRow>)>;

    async fn append_hand_record(&self, record: &HandRecordRow) -> Result<()>;
}

/// Bounded exponential backoff around a repository write. Transient
/// failures are retried; anything else surfaces immediately.
pub async fn retried<T, F, Fut>(op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = std::time::Duration::from_millis(crate::REPO_BACKOFF_MILLIS);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < crate::REPO_RETRY_LIMIT => {
                log::warn!("repository attempt {} failed, retrying: {}", attempt, e);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retried_gives_up_after_the_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let inner = calls.clone();
        let result: Result<()> = retried(move || {
            let calls = inner.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Transient("down".into()))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), crate::REPO_RETRY_LIMIT);
    }

    #[tokio::test(start_paused = true)]
    async fn retried_recovers_from_a_blip() {
        let calls = Arc::new(AtomicU32::new(0));
        let inner = calls.clone();
        let result: Result<u8> = retried(move || {
            let calls = inner.clone();
            async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(Error::Transient("down".into())),
                    _ => Ok(7),
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn retried_does_not_retry_hard_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let inner = calls.clone();
        let result: Result<()> = retried(move || {
            let calls = inner.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::NotFound)
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
