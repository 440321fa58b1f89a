//! Pool account payloads.
//!
//! Notifications arrive as raw bytes; [`PoolState::decode`] turns them into
//! the normalised record written to application state.

mod pool_state;

pub use pool_state::PoolState;
