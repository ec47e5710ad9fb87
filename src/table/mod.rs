pub mod actor;
pub use actor::*;

pub mod bot;
pub use bot::*;

pub mod broadcast;
pub use broadcast::*;

pub mod command;
pub use command::*;

pub mod event;
pub use event::*;

pub mod snapshot;
pub use snapshot::*;

pub mod table;
pub use table::*;
