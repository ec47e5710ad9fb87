pub mod controller;
pub use controller::*;

pub mod schedule;
pub use schedule::*;

pub mod seating;
pub use seating::*;

pub mod tournament;
pub use tournament::*;
