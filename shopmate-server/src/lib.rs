//! Channel adapter, product dialog, and HTTP server for the shopping
//! assistant.
//!
//! The server exposes two routes: the channel message webhook
//! (`POST /api/messages`) and a liveness check (`GET /ping`). Inbound
//! activities flow adapter → dialog → search (product lookup) → model
//! (completion) → reply; every turn completes and persists conversation
//! state regardless of success, and all failures surface to the user as
//! fixed, safe text.

pub mod activity;
pub mod adapter;
pub mod dialog;
pub mod server;
pub mod state;

pub use activity::{Activity, ChannelAccount, ConversationAccount};
pub use adapter::{AdapterError, ChannelAdapter, ChannelCredentials, TURN_ERROR_TEXT, TurnHandler};
pub use dialog::{Assistant, FALLBACK_PRODUCT_ID, LOOKUP_ERROR_TEXT, ProductDialog, ProductSource};
pub use server::{AppState, ServerConfig, app_router, run_server};
pub use state::{ConversationRecord, ConversationState, MemoryStorage, UserState};
