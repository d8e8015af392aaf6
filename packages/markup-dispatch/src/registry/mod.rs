//! Handler registry: tag handlers, their ids, and the name table.
//!
//! Handlers are registered for a comma-separated list of tag names. The
//! registry maps each normalized name to a [`HandlerId`] and keeps every
//! distinct handler instance once. Overrides pushed while parsing are
//! recorded as undo frames so the table can be restored exactly.

mod core;
mod handler;

pub use self::core::{FrameId, HandlerRegistry};
pub use handler::{Binding, HandlerBinding, HandlerId, TagHandler};
