pub mod catalog;
pub mod playback_state;
pub mod state_manager;
pub mod state_store;
