pub mod capability;
pub mod classify;
pub mod core;
pub mod interpret;
pub mod main;
pub mod render_loop;
pub mod run_effect;
pub mod session;
