pub mod dto;
pub use dto::*;

pub mod lobby;
pub use lobby::*;

pub mod server;
pub use server::*;

pub mod session;
pub use session::*;
