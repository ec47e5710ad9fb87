use super::*;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process repository for tests and database-less deployments.
#[derive(Default)]
pub struct MemoryRepo {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Tournament>,
    registrations: HashMap<(TournamentId, UserId), RegStatus>,
    games: HashMap<TableId, GameRow>,
    seats: HashMap<(TableId, UserId), SeatRow>,
    hands: Vec<HandRecordRow>,
}

#[async_trait::async_trait]
impl Repository for MemoryRepo {
    async fn find_tournament(&self, id: TournamentId) -> Result<Tournament> {
        self.inner
            .lock()
            .unwrap()
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(crate::error::Error::NotFound)
    }

    async fn save_tournament(&self, tournament: &Tournament) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn list_tournaments(&self, status: Status) -> Result<Vec<Tournament>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tournaments
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn upsert_registration(
        &self,
        id: TournamentId,
        user: UserId,
        status: RegStatus,
    ) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .registrations
            .insert((id, user), status);
        Ok(())
    }

    async fn delete_registration(&self, id: TournamentId, user: UserId) -> Result<()> {
        self.inner.lock().unwrap().registrations.remove(&(id, user));
        Ok(())
    }

    async fn count_confirmed(&self, id: TournamentId) -> Result<u32> {
        Ok(self.list_confirmed(id).await?.len() as u32)
    }

    async fn list_confirmed(&self, id: TournamentId) -> Result<Vec<UserId>> {
        let mut users = self
            .inner
            .lock()
            .unwrap()
            .registrations
            .iter()
            .filter(|((t, _), status)| *t == id && **status == RegStatus::Confirmed)
            .map(|((_, u), _)| *u)
            .collect::<Vec<UserId>>();
        users.sort_unstable();
        Ok(users)
    }

    async fn create_game(&self, game: &GameRow, seats: &[SeatRow]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.games.insert(game.id, game.clone());
        for seat in seats {
            inner.seats.insert((seat.game, seat.user), seat.clone());
        }
        Ok(())
    }

    async fn update_game(&self, game: &GameRow) -> Result<()> {
        self.inner.lock().unwrap().games.insert(game.id, game.clone());
        Ok(())
    }

    async fn update_chips(&self, game: TableId, user: UserId, chips: Chips) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .seats
            .get_mut(&(game, user))
            .map(|seat| seat.chips = chips)
            .ok_or(crate::error::Error::NotFound)
    }

    async fn update_seat_status(
        &self,
        game: TableId,
        user: UserId,
        status: SeatStatus,
    ) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .seats
            .get_mut(&(game, user))
            .map(|seat| seat.status = status)
            .ok_or(crate::error::Error::NotFound)
    }

    async fn find_game_with_seats(&self, id: TableId) -> Result<(GameRow, Vec<SeatRow>)> {
        let inner = self.inner.lock().unwrap();
        let game = inner
            .games
            .get(&id)
            .cloned()
            .ok_or(crate::error::Error::NotFound)?;
        let mut seats = inner
            .seats
            .values()
            .filter(|s| s.game == id)
            .cloned()
            .collect::<Vec<SeatRow>>();
        seats.sort_by_key(|s| s.number);
        Ok((game, seats))
    }

    async fn append_hand_record(&self, record: &HandRecordRow) -> Result<()> {
        self.inner.lock().unwrap().hands.push(record.clone());
        Ok(())
    }
}

impl MemoryRepo {
    /// test visibility into the archive
    pub fn hand_records(&self) -> usize {
        self.inner.lock().unwrap().hands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::schedule::{BlindLevel, BlindSchedule};

    fn tournament(id: TournamentId) -> Tournament {
        Tournament {
            id,
            name: "t".into(),
            scheduled_start: 0,
            actual_start: None,
            max_players: 9,
            seats_per_table: 3,
            starting_chips: 100,
            schedule: BlindSchedule::new(vec![BlindLevel::from((1, 2, None))]).unwrap(),
            prize_places: 1,
            status: Status::Scheduled,
        }
    }

    #[tokio::test]
    async fn round_trips_tournaments() {
        let repo = MemoryRepo::default();
        assert!(repo.find_tournament(1).await.is_err());
        repo.save_tournament(&tournament(1)).await.unwrap();
        assert_eq!(repo.find_tournament(1).await.unwrap().id, 1);
        assert_eq!(repo.list_tournaments(Status::Scheduled).await.unwrap().len(), 1);
        assert!(repo.list_tournaments(Status::Running).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn registration_is_keyed_by_tournament_and_user() {
        let repo = MemoryRepo::default();
        repo.upsert_registration(1, 10, RegStatus::Confirmed).await.unwrap();
        repo.upsert_registration(1, 10, RegStatus::Confirmed).await.unwrap();
        repo.upsert_registration(1, 11, RegStatus::Pending).await.unwrap();
        repo.upsert_registration(2, 10, RegStatus::Confirmed).await.unwrap();
        assert_eq!(repo.count_confirmed(1).await.unwrap(), 1);
        assert_eq!(repo.list_confirmed(1).await.unwrap(), vec![10]);
        repo.delete_registration(1, 10).await.unwrap();
        assert_eq!(repo.count_confirmed(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn games_carry_their_seats() {
        let repo = MemoryRepo::default();
        let game = GameRow {
            id: 5,
            tournament: 1,
            number: 1,
            status: GameStatus::Active,
            level: 0,
            small_blind: 1,
            big_blind: 2,
        };
        let seats = vec![
            SeatRow { game: 5, user: 10, number: 2, chips: 100, status: SeatStatus::Active },
            SeatRow { game: 5, user: 11, number: 1, chips: 100, status: SeatStatus::Active },
        ];
        repo.create_game(&game, &seats).await.unwrap();
        repo.update_chips(5, 10, 42).await.unwrap();
        repo.update_seat_status(5, 11, SeatStatus::Eliminated).await.unwrap();
        let (found, seats) = repo.find_game_with_seats(5).await.unwrap();
        assert_eq!(found.number, 1);
        assert_eq!(seats[0].number, 1);
        assert_eq!(seats[0].status, SeatStatus::Eliminated);
        assert_eq!(seats[1].chips, 42);
    }
}
