pub mod health;
pub mod scoreboard;
pub mod validation;
