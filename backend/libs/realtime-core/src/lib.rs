//! Realtime primitives shared by the huddle services
//!
//! Topic naming, change-event envelopes, presence roster flattening, the
//! keyed-list reducer that applies live diffs to a fetched snapshot, and
//! disposable subscription handles.

pub mod bridge;
pub mod event;
pub mod roster;
pub mod subscription;
pub mod sync;
pub mod topic;

pub use bridge::BridgeEnvelope;
pub use event::{ChangeEvent, ChangeOp, RealtimeEvent, TypingState};
pub use roster::{flatten_roster, PresenceState};
pub use subscription::Subscription;
pub use sync::{InsertOrder, Keyed, SyncedList};
pub use topic::Topic;
