//! The boundary to whatever actually holds the rendered nodes.

use crate::attr::Listener;
use core::fmt::Debug;

/// Node creation and mutation, injected into the reconciler.
///
/// Handles are cheap clones that refer to the same host node (a [`web_sys::Node`] is a JS reference, for example).
/// The reconciler never inspects them except through [`next_sibling`](`HostRenderer::next_sibling`),
/// and never retries a failed call: any `Err` aborts the render.
pub trait HostRenderer {
	type Node: Clone + Debug;
	type Error: std::error::Error + 'static;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;
	fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

	/// Reads a text node's content. Text patching compares it against the stored text before writing.
	fn text(&self, node: &Self::Node) -> Result<String, Self::Error>;
	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error>;

	fn set_style(&mut self, node: &Self::Node, property: &str, value: &str) -> Result<(), Self::Error>;

	/// Resets a style property to its default.
	fn remove_style(&mut self, node: &Self::Node, property: &str) -> Result<(), Self::Error> {
		self.set_style(node, property, "")
	}

	fn set_class(&mut self, node: &Self::Node, class: &str) -> Result<(), Self::Error>;
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error>;
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

	fn add_event_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), Self::Error>;
	fn remove_event_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), Self::Error>;

	/// Notifies the host that a listener binding went away together with its (removed) node.
	///
	/// No host call is required for the binding itself. This exists so hosts can release per-listener resources.
	fn release_listener(&mut self, event: &str, listener: &Listener) {
		let _ = (event, listener);
	}

	/// Inserts (or moves) `child` into `parent`, immediately before `before` or at the end if that is [`None`].
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: Option<&Self::Node>) -> Result<(), Self::Error>;

	/// Removes `child` from `parent`.
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

	fn next_sibling(&self, node: &Self::Node) -> Result<Option<Self::Node>, Self::Error>;

	/// Called once after each render, whether or not it succeeded.
	fn flush(&mut self) {}
}
