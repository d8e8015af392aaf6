//! Markup Dispatch - A stack-scoped tag dispatch engine for markup parsing.
//!
//! This crate splits markup text into text runs and tags and routes each
//! tag to the handler registered for its name. Handlers decide whether to
//! recurse into a tag's content and may temporarily rebind other tag names
//! for the duration of that recursion.
//!
//! # Example
//!
//! ```
//! use markup_dispatch::outline::{ElementHandler, OutlineBuilder, OutlineNode};
//! use markup_dispatch::Parser;
//!
//! let mut parser = Parser::new(OutlineBuilder::new());
//! parser.add_handler(ElementHandler::new("B,I")).unwrap();
//!
//! let outline = parser.parse("plain <b>bold <i>both</i></b>").unwrap();
//! assert_eq!(outline[0], OutlineNode::text("plain"));
//! assert_eq!(outline[1].plain_text(), "bold both");
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: The scan-and-dispatch engine and its lifecycle
//! - [`registry`]: Tag handlers and the name table with its override stack
//! - [`flavor`]: Hooks a concrete parser flavor supplies
//! - [`tag`]: Tags and their offsets
//! - [`cache`]: Tag sources and the default tag cache
//! - [`resolver`]: Resource resolution for external references
//! - [`config`]: Constants, tag-name helpers and configuration
//! - [`error`]: Error types and Result alias
//! - [`outline`]: A structure-recording flavor with reusable handlers
//! - [`cli`]: Command-line interface

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod flavor;
pub mod outline;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod tag;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use cache::{TagCache, TagSource};
pub use config::{DispatchConfig, ParserConfig};
pub use error::{DispatchError, Result};
pub use flavor::ParserFlavor;
pub use parser::{Parser, ParserId};
pub use registry::{Binding, FrameId, HandlerBinding, HandlerId, TagHandler};
pub use resolver::{FsResolver, ResourceResolver};
pub use tag::{Tag, TagKind};
