pub mod cards;
pub mod error;
pub mod gameplay;
pub mod repo;
pub mod server;
pub mod table;
pub mod timer;
pub mod tournament;

/// dimensional analysis types
pub type Chips = u32;
pub type UserId = u64;
pub type TableId = u64;
pub type TournamentId = u64;
pub type SessionId = u64;

// turn clock parameters, milliseconds
const TURN_GRACE_MILLIS: u64 = 10_000;
const TURN_CLOCK_MILLIS: u64 = 10_000;
const BOT_CLOCK_MILLIS: u64 = 3_000;

// tournament cadence
const BLIND_TICK_SECS: u64 = 60;

// repository retry parameters
const REPO_RETRY_LIMIT: u32 = 3;
const REPO_BACKOFF_MILLIS: u64 = 100;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// milliseconds since the unix epoch, for wire deadlines
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_millis() as u64
}

/// initialize logging and exit on ctrl-c
pub fn init() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("forcing exit");
        std::process::exit(0);
    });
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// get a database connection and return the client
pub async fn db() -> std::sync::Arc<tokio_postgres::Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    std::sync::Arc::new(client)
}
