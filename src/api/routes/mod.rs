//! Route groups, one per resource.

pub mod games;
pub mod health;
pub mod leaderboard;
pub mod players;
