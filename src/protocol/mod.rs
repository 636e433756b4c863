//! # Hook Pipeline
//!
//! Plugin interception of incoming traffic, run before the server's own
//! protocol logic.
//!
//! ## Components
//! - **Response**: two-flag control signal plus payload/secondary slots
//! - **Channel**: ordered handler chain with veto and rewrite
//! - **Broker**: one channel per packet kind, named entry points
//! - **Intake**: applies the final response to the server's own handling
//!
//! ## Flow
//! ```text
//! transport -> classify -> HookBroker::dispatch -> handler chain -> Response
//!           -> continue_server? -> server handling (rewritten payload)
//! ```

pub mod broker;
pub mod channel;
pub mod intake;
pub mod response;
