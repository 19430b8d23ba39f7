pub mod event;
pub mod level;
pub mod save;
pub mod schedule;
pub mod step;
pub mod world;
