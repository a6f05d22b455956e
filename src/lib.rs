#![doc(html_root_url = "https://docs.rs/vnode-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A keyed virtual-DOM reconciler.
//!
//! Describe the desired tree with [`h`] and [`text`], then hand it to [`Container::render`].
//! The first render mounts it, later ones patch the live nodes towards the new description
//! through an injected [`HostRenderer`], reusing every node whose kind, tag and key still match.

pub mod attr;
mod container;
pub mod diff;
pub mod error;
pub mod host;
mod mount;
pub mod vnode;

#[cfg(feature = "web")]
pub mod load;
#[cfg(feature = "web")]
mod rc_hash_map;
#[cfg(feature = "web")]
pub mod web;

pub use attr::{attrs, style, AttrValue, Attrs, Listener, Style};
pub use container::{Container, RenderSession};
pub use diff::{RenderConfig, RenderStats};
pub use error::{RenderError, RenderResult};
pub use host::HostRenderer;
pub use vnode::{h, text, ChildSet, Element, Key, Siblings, Text, VNode};

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}
