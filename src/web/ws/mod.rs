//! WebSocket streams.

pub mod folder_size;

pub use folder_size::folder_size_ws_handler;
