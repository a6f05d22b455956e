//! A [`HostRenderer`] that renders into the browser DOM through [`web_sys`].

use crate::{attr::Listener, host::HostRenderer, rc_hash_map::RcHashMap};
use js_sys::Function;
use thiserror::Error;
use tracing::{info, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

/// A failed DOM call, carrying whatever JavaScript threw.
#[derive(Debug, Error)]
#[error("DOM operation failed: {0:?}")]
pub struct DomError(pub JsValue);

impl DomError {
	fn message(message: &str) -> Self {
		Self(JsValue::from_str(message))
	}
}

impl From<JsValue> for DomError {
	fn from(value: JsValue) -> Self {
		Self(value)
	}
}

/// Renders into a [`web_sys::Document`].
///
/// Each distinct [`Listener`] is wrapped into a single JavaScript closure, shared by every element it is bound on.
/// Closures are reference-counted per renderer and freed by [`flush`](`HostRenderer::flush`) once unused.
/// Dropping the renderer makes any still-bound event listeners throw when invoked.
#[allow(clippy::type_complexity)]
pub struct WebRenderer {
	document: web_sys::Document,
	closures: RcHashMap<usize, u16, Closure<dyn Fn(web_sys::Event)>>,
}

impl WebRenderer {
	/// Renders into the current window's document.
	///
	/// # Errors
	///
	/// Fails outside of a browser window context.
	pub fn new() -> Result<Self, DomError> {
		let document = web_sys::window()
			.and_then(|window| window.document())
			.ok_or_else(|| DomError::message("vnode-dom: No window document found."))?;
		Ok(Self::with_document(document))
	}

	#[must_use]
	pub fn with_document(document: web_sys::Document) -> Self {
		Self {
			document,
			closures: RcHashMap::new(),
		}
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// The number of JavaScript closures currently held for listeners.
	#[must_use]
	pub fn closure_count(&self) -> usize {
		self.closures.len()
	}

	fn element(node: &web_sys::Node) -> Result<&web_sys::Element, DomError> {
		node.dyn_ref::<web_sys::Element>().ok_or_else(|| DomError::message("vnode-dom: Expected an element."))
	}

	fn html_element(node: &web_sys::Node) -> Option<&web_sys::HtmlElement> {
		let html_element = node.dyn_ref::<web_sys::HtmlElement>();
		if html_element.is_none() {
			warn!("Inline style is only supported on HTML elements. Skipping for {:?}.", node);
		}
		html_element
	}
}

impl HostRenderer for WebRenderer {
	type Node = web_sys::Node;
	type Error = DomError;

	fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error> {
		Ok(self.document.create_element(tag)?.into())
	}

	fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error> {
		Ok(self.document.create_text_node(text).into())
	}

	fn text(&self, node: &Self::Node) -> Result<String, Self::Error> {
		Ok(match node.dyn_ref::<web_sys::CharacterData>() {
			Some(character_data) => character_data.data(),
			None => node.text_content().unwrap_or_default(),
		})
	}

	fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error> {
		match node.dyn_ref::<web_sys::CharacterData>() {
			Some(character_data) => character_data.set_data(text),
			None => node.set_text_content(Some(text)),
		}
		Ok(())
	}

	fn set_style(&mut self, node: &Self::Node, property: &str, value: &str) -> Result<(), Self::Error> {
		if let Some(html_element) = Self::html_element(node) {
			html_element.style().set_property(property, value)?;
		}
		Ok(())
	}

	fn remove_style(&mut self, node: &Self::Node, property: &str) -> Result<(), Self::Error> {
		if let Some(html_element) = Self::html_element(node) {
			html_element.style().remove_property(property)?;
		}
		Ok(())
	}

	fn set_class(&mut self, node: &Self::Node, class: &str) -> Result<(), Self::Error> {
		Self::element(node)?.set_class_name(class);
		Ok(())
	}

	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), Self::Error> {
		Ok(Self::element(node)?.set_attribute(name, value)?)
	}

	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error> {
		Ok(Self::element(node)?.remove_attribute(name)?)
	}

	#[instrument(skip(self, node))]
	fn add_event_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), Self::Error> {
		let closure = self
			.closures
			.increment_or_insert_with(listener.id(), || {
				trace!("Creating closure.");
				let listener = listener.clone();
				Closure::wrap(Box::new(move |event: web_sys::Event| listener.call(&event)) as Box<dyn Fn(web_sys::Event)>)
			})
			.map_err(|_| DomError::message("vnode-dom: Too many (more than 65k) active bindings of the same listener."))?;
		Ok(node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())?)
	}

	#[instrument(skip(self, node))]
	fn remove_event_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), Self::Error> {
		match self.closures.weak_decrement(&listener.id()) {
			Ok(Some(closure)) => Ok(node.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())?),
			Ok(None) | Err(_) => Err(DomError::message("vnode-dom: Tried to remove a listener that isn't bound.")),
		}
	}

	fn release_listener(&mut self, event: &str, listener: &Listener) {
		if !matches!(self.closures.weak_decrement(&listener.id()), Ok(Some(_))) {
			warn!(event_type = event, ?listener, "Released a listener that wasn't bound.");
		}
	}

	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: Option<&Self::Node>) -> Result<(), Self::Error> {
		parent.insert_before(child, before)?;
		Ok(())
	}

	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error> {
		parent.remove_child(child)?;
		Ok(())
	}

	fn next_sibling(&self, node: &Self::Node) -> Result<Option<Self::Node>, Self::Error> {
		Ok(node.next_sibling())
	}

	fn flush(&mut self) {
		let freed = self.closures.drain_weak().count();
		trace!("Freed {} listener closure(s).", freed);
		info!("Listener closure count/cached capacity: {}/{}", self.closures.len(), self.closures.capacity());
	}
}
