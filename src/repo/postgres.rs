use super::*;
use crate::error::Error;
use std::sync::Arc;

/// Postgres-backed repository over a shared connection.
pub struct Postgres {
    client: Arc<tokio_postgres::Client>,
}

impl From<Arc<tokio_postgres::Client>> for Postgres {
    fn from(client: Arc<tokio_postgres::Client>) -> Self {
        Self { client }
    }
}

fn transient(e: tokio_postgres::Error) -> Error {
    Error::Transient(e.to_string())
}

impl From<&tokio_postgres::Row> for GameRow {
    fn from(row: &tokio_postgres::Row) -> Self {
        Self {
            id: row.get::<_, i64>("id") as TableId,
            tournament: row.get::<_, i64>("tournament_id") as TournamentId,
            number: row.get::<_, i32>("table_number") as u32,
            status: match row.get::<_, &str>("status") {
                "CLOSED" => GameStatus::Closed,
                _ => GameStatus::Active,
            },
            level: row.get::<_, i32>("current_blind_level") as usize,
            small_blind: row.get::<_, i64>("small_blind") as Chips,
            big_blind: row.get::<_, i64>("big_blind") as Chips,
        }
    }
}

impl From<&tokio_postgres::Row> for SeatRow {
    fn from(row: &tokio_postgres::Row) -> Self {
        Self {
            game: row.get::<_, i64>("game_id") as TableId,
            user: row.get::<_, i64>("user_id") as UserId,
            number: row.get::<_, i32>("seat_number") as u8,
            chips: row.get::<_, i64>("chips") as Chips,
            status: SeatStatus::try_from(row.get::<_, &str>("status")).unwrap_or(SeatStatus::Active),
        }
    }
}

impl Postgres {
    /// create the schema if it does not exist yet
    pub async fn migrate(&self) -> Result<()> {
        self.client
            .batch_execute(
                r#"
                CREATE TABLE IF NOT EXISTS tournament (
                    id                  BIGINT PRIMARY KEY,
                    name                TEXT NOT NULL,
                    start_time          BIGINT NOT NULL,
                    actual_start_time   BIGINT,
                    max_players         INT NOT NULL,
                    seats_per_table     INT NOT NULL,
                    starting_chips      BIGINT NOT NULL,
                    blind_schedule_json TEXT NOT NULL,
                    prize_places        INT NOT NULL,
                    status              TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS tournament_registration (
                    tournament_id   BIGINT NOT NULL,
                    user_id         BIGINT NOT NULL,
                    status          TEXT NOT NULL,
                    UNIQUE (tournament_id, user_id)
                );
                CREATE TABLE IF NOT EXISTS game (
                    id                  BIGINT PRIMARY KEY,
                    tournament_id       BIGINT NOT NULL,
                    table_number        INT NOT NULL,
                    status              TEXT NOT NULL,
                    current_blind_level INT NOT NULL,
                    small_blind         BIGINT NOT NULL,
                    big_blind           BIGINT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS seat (
                    game_id     BIGINT NOT NULL,
                    user_id     BIGINT NOT NULL,
                    seat_number INT NOT NULL,
                    chips       BIGINT NOT NULL,
                    status      TEXT NOT NULL,
                    UNIQUE (game_id, seat_number),
                    UNIQUE (game_id, user_id)
                );
                CREATE TABLE IF NOT EXISTS hand_record (
                    id                   BIGSERIAL PRIMARY KEY,
                    game_id              BIGINT NOT NULL,
                    hand_number          BIGINT NOT NULL,
                    pot                  BIGINT NOT NULL,
                    community_cards_json TEXT NOT NULL,
                    history_json         TEXT NOT NULL,
                    winner_user_ids_json TEXT NOT NULL,
                    created_at           TIMESTAMPTZ NOT NULL DEFAULT now()
                );
                "#,
            )
            .await
            .map_err(transient)
    }
}

#[async_trait::async_trait]
impl Repository for Postgres {
    async fn find_tournament(&self, id: TournamentId) -> Result<Tournament> {
        let rows = self
            .client
            .query("SELECT * FROM tournament WHERE id = $1", &[&(id as i64)])
            .await
            .map_err(transient)?;
        let row = rows.first().ok_or(Error::NotFound)?;
        let schedule = serde_json::from_str(row.get::<_, &str>("blind_schedule_json"))
            .map_err(|e| Error::Fatal(format!("corrupt blind schedule: {}", e)))?;
        Ok(Tournament {
            id,
            name: row.get::<_, String>("name"),
            scheduled_start: row.get::<_, i64>("start_time") as u64,
            actual_start: row.get::<_, Option<i64>>("actual_start_time").map(|t| t as u64),
            max_players: row.get::<_, i32>("max_players") as u32,
            seats_per_table: row.get::<_, i32>("seats_per_table") as u8,
            starting_chips: row.get::<_, i64>("starting_chips") as Chips,
            schedule,
            prize_places: row.get::<_, i32>("prize_places") as u32,
            status: Status::try_from(row.get::<_, &str>("status"))
                .map_err(|e| Error::Fatal(e))?,
        })
    }

    async fn save_tournament(&self, t: &Tournament) -> Result<()> {
        let schedule = serde_json::to_string(&t.schedule)
            .map_err(|e| Error::Fatal(format!("unserializable blind schedule: {}", e)))?;
        self.client
            .execute(
                r#"
                INSERT INTO tournament
                    (id, name, start_time, actual_start_time, max_players,
                     seats_per_table, starting_chips, blind_schedule_json, prize_places, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (id) DO UPDATE SET
                    actual_start_time = EXCLUDED.actual_start_time,
                    status = EXCLUDED.status
                "#,
                &[
                    &(t.id as i64),
                    &t.name,
                    &(t.scheduled_start as i64),
                    &t.actual_start.map(|v| v as i64),
                    &(t.max_players as i32),
                    &(t.seats_per_table as i32),
                    &(t.starting_chips as i64),
                    &schedule,
                    &(t.prize_places as i32),
                    &t.status.as_str(),
                ],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn list_tournaments(&self, status: Status) -> Result<Vec<Tournament>> {
        let rows = self
            .client
            .query("SELECT id FROM tournament WHERE status = $1", &[&status.as_str()])
            .await
            .map_err(transient)?;
        let mut tournaments = Vec::with_capacity(rows.len());
        for row in rows {
            tournaments.push(self.find_tournament(row.get::<_, i64>("id") as TournamentId).await?);
        }
        Ok(tournaments)
    }

    async fn upsert_registration(
        &self,
        id: TournamentId,
        user: UserId,
        status: RegStatus,
    ) -> Result<()> {
        self.client
            .execute(
                r#"
                INSERT INTO tournament_registration (tournament_id, user_id, status)
                VALUES ($1, $2, $3)
                ON CONFLICT (tournament_id, user_id) DO UPDATE SET status = EXCLUDED.status
                "#,
                &[&(id as i64), &(user as i64), &status.as_str()],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn delete_registration(&self, id: TournamentId, user: UserId) -> Result<()> {
        self.client
            .execute(
                "DELETE FROM tournament_registration WHERE tournament_id = $1 AND user_id = $2",
                &[&(id as i64), &(user as i64)],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn count_confirmed(&self, id: TournamentId) -> Result<u32> {
        self.client
            .query_one(
                "SELECT COUNT(*) AS n FROM tournament_registration WHERE tournament_id = $1 AND status = 'CONFIRMED'",
                &[&(id as i64)],
            )
            .await
            .map(|row| row.get::<_, i64>("n") as u32)
            .map_err(transient)
    }

    async fn list_confirmed(&self, id: TournamentId) -> Result<Vec<UserId>> {
        self.client
            .query(
                "SELECT user_id FROM tournament_registration WHERE tournament_id = $1 AND status = 'CONFIRMED' ORDER BY user_id",
                &[&(id as i64)],
            )
            .await
            .map(|rows| rows.iter().map(|r| r.get::<_, i64>("user_id") as UserId).collect())
            .map_err(transient)
    }

    async fn create_game(&self, game: &GameRow, seats: &[SeatRow]) -> Result<()> {
        self.update_game(game).await?;
        for seat in seats {
            self.client
                .execute(
                    r#"
                    INSERT INTO seat (game_id, user_id, seat_number, chips, status)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (game_id, user_id) DO UPDATE SET
                        seat_number = EXCLUDED.seat_number,
                        chips = EXCLUDED.chips,
                        status = EXCLUDED.status
                    "#,
                    &[
                        &(seat.game as i64),
                        &(seat.user as i64),
                        &(seat.number as i32),
                        &(seat.chips as i64),
                        &seat.status.as_str(),
                    ],
                )
                .await
                .map_err(transient)?;
        }
        Ok(())
    }

    async fn update_game(&self, game: &GameRow) -> Result<()> {
        self.client
            .execute(
                r#"
                INSERT INTO game
                    (id, tournament_id, table_number, status, current_blind_level, small_blind, big_blind)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO UPDATE SET
                    status = EXCLUDED.status,
                    current_blind_level = EXCLUDED.current_blind_level,
                    small_blind = EXCLUDED.small_blind,
                    big_blind = EXCLUDED.big_blind
                "#,
                &[
                    &(game.id as i64),
                    &(game.tournament as i64),
                    &(game.number as i32),
                    &game.status.as_str(),
                    &(game.level as i32),
                    &(game.small_blind as i64),
                    &(game.big_blind as i64),
                ],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn update_chips(&self, game: TableId, user: UserId, chips: Chips) -> Result<()> {
        self.client
            .execute(
                "UPDATE seat SET chips = $3 WHERE game_id = $1 AND user_id = $2",
                &[&(game as i64), &(user as i64), &(chips as i64)],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn update_seat_status(
        &self,
        game: TableId,
        user: UserId,
        status: SeatStatus,
    ) -> Result<()> {
        self.client
            .execute(
                "UPDATE seat SET status = $3 WHERE game_id = $1 AND user_id = $2",
                &[&(game as i64), &(user as i64), &status.as_str()],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }

    async fn find_game_with_seats(&self, id: TableId) -> Result<(GameRow, Vec<SeatRow>)> {
        let games = self
            .client
            .query("SELECT * FROM game WHERE id = $1", &[&(id as i64)])
            .await
            .map_err(transient)?;
        let game = games.first().map(GameRow::from).ok_or(Error::NotFound)?;
        let seats = self
            .client
            .query(
                "SELECT * FROM seat WHERE game_id = $1 ORDER BY seat_number",
                &[&(id as i64)],
            )
            .await
            .map_err(transient)?;
        Ok((game, seats.iter().map(SeatRow::from).collect()))
    }

    async fn append_hand_record(&self, record: &HandRecordRow) -> Result<()> {
        self.client
            .execute(
                r#"
                INSERT INTO hand_record
                    (game_id, hand_number, pot, community_cards_json, history_json, winner_user_ids_json)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
                &[
                    &(record.game as i64),
                    &(record.hand_number as i64),
                    &(record.pot as i64),
                    &record.board,
                    &record.history,
                    &record.winners,
                ],
            )
            .await
            .map(|_| ())
            .map_err(transient)
    }
}
