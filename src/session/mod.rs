//! Application state, the collaborator inbox and the render-loop driver.

pub mod inbox;
pub mod player;
pub mod state;
