pub mod draw;
pub mod gamepad;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod reward;
pub mod sound;
