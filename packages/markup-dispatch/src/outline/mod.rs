//! Outline flavor: records document structure as a tree.
//!
//! The outline flavor is a generic consumer of the dispatch engine. Its
//! product is a list of [`OutlineNode`]s, built by handlers that open and
//! close elements around their recursion:
//!
//! - [`ElementHandler`] records tags as elements.
//! - [`ScopeHandler`] records container tags and claims other tag names
//!   while the container's content is scanned.
//! - [`IncludeHandler`] splices in text fetched through the parser's
//!   resource resolver.
//!
//! # Example
//!
//! ```
//! use markup_dispatch::config::DispatchConfig;
//! use markup_dispatch::outline::{create_outline_parser, OutlineNode};
//!
//! let config = DispatchConfig::from_yaml("elements: [b]").unwrap();
//! let mut parser = create_outline_parser(&config).unwrap();
//!
//! let outline = parser.parse("a<b>c</b>d").unwrap();
//! assert_eq!(outline[1], OutlineNode::element("b", vec![OutlineNode::text("c")]));
//! ```

mod builder;
mod config;
mod handlers;
mod render;

pub use builder::{OutlineBuilder, OutlineNode};
pub use config::create_outline_parser;
pub use handlers::{ElementHandler, IncludeHandler, ScopeHandler};
pub use render::render_tree;
