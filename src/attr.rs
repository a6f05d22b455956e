//! Attribute values and the attribute/event patch protocol.
//!
//! Attribute lists are ordered `(name, value)` pairs, so host calls happen in a predictable order.
//! Three names are special:
//!
//! - `style` takes a [`Style`] map that is merged property by property,
//! - `class` is replaced as a whole,
//! - anything starting with [`EVENT_PREFIX`] binds a [`Listener`] for the event type after the prefix.

use crate::host::HostRenderer;
use compact_str::CompactString;
use core::{
	any::Any,
	fmt::{self, Debug, Formatter},
};
use std::rc::Rc;
use tracing::{debug, trace};

/// Marks an attribute name as an event binding, as in `@click`.
pub const EVENT_PREFIX: char = '@';

pub type Attrs = Vec<(CompactString, AttrValue)>;

/// Inline style properties, as `(property, value)` pairs.
pub type Style = Vec<(CompactString, CompactString)>;

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
	Text(CompactString),
	Style(Style),
	Listener(Listener),
}

/// An event callback. Listeners are equal only if they are the same allocation.
///
/// The event is passed type-erased. [`WebRenderer`](`crate::web::WebRenderer`) passes a [`web_sys::Event`].
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&dyn Any)>);
impl Listener {
	pub fn new(handler: impl Fn(&dyn Any) + 'static) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	/// Identity of the underlying allocation, usable as a map key.
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}
impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}
impl Eq for Listener {}
impl Debug for Listener {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Listener({:#x})", self.id())
	}
}

impl AttrValue {
	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			AttrValue::Text(text) => Some(text),
			_ => None,
		}
	}
}
impl From<&str> for AttrValue {
	fn from(text: &str) -> Self {
		AttrValue::Text(text.into())
	}
}
impl From<String> for AttrValue {
	fn from(text: String) -> Self {
		AttrValue::Text(text.into())
	}
}
impl From<CompactString> for AttrValue {
	fn from(text: CompactString) -> Self {
		AttrValue::Text(text)
	}
}
impl From<Style> for AttrValue {
	fn from(style: Style) -> Self {
		AttrValue::Style(style)
	}
}
impl From<Listener> for AttrValue {
	fn from(listener: Listener) -> Self {
		AttrValue::Listener(listener)
	}
}

pub fn attrs<K: Into<CompactString>>(pairs: impl IntoIterator<Item = (K, AttrValue)>) -> Attrs {
	pairs.into_iter().map(|(name, value)| (name.into(), value)).collect()
}

pub fn style<K: Into<CompactString>, V: Into<CompactString>>(pairs: impl IntoIterator<Item = (K, V)>) -> AttrValue {
	AttrValue::Style(pairs.into_iter().map(|(property, value)| (property.into(), value.into())).collect())
}

pub(crate) fn get<'a>(attrs: &'a Attrs, name: &str) -> Option<&'a AttrValue> {
	attrs.iter().find(|(n, _)| n == name).map(|(_, value)| value)
}

/// Serializes a style map as CSS declarations, as it would appear in a `style` attribute.
#[must_use]
pub fn css_text(style: &[(CompactString, CompactString)]) -> String {
	style.iter().map(|(property, value)| format!("{}: {};", property, value)).collect::<Vec<_>>().join(" ")
}

/// Brings one attribute of `node` from `previous` to `next`, where [`None`] means absent.
///
/// The full delta is computed from both sides each time, so repeating a call changes nothing further.
pub fn patch_attribute<H: HostRenderer + ?Sized>(host: &mut H, node: &H::Node, name: &str, previous: Option<&AttrValue>, next: Option<&AttrValue>) -> Result<(), H::Error> {
	if let Some(event) = name.strip_prefix(EVENT_PREFIX) {
		return patch_listener(host, node, event, previous, next);
	}

	match (name, next) {
		("style", Some(AttrValue::Style(next))) => {
			if let Some(AttrValue::Text(_)) = previous {
				trace!("Replacing inline style text with properties");
				host.remove_attribute(node, name)?;
			}
			for (property, value) in next {
				host.set_style(node, property, value)?;
			}
			if let Some(AttrValue::Style(previous)) = previous {
				for (property, _) in previous.iter().filter(|(p, _)| next.iter().all(|(n, _)| n != p)) {
					trace!(property = property.as_str(), "Clearing style property");
					host.remove_style(node, property)?;
				}
			}
			Ok(())
		}
		("style", None) => match previous {
			Some(AttrValue::Style(previous)) => {
				for (property, _) in previous {
					host.remove_style(node, property)?;
				}
				Ok(())
			}
			_ => host.remove_attribute(node, name),
		},

		("class", Some(AttrValue::Text(class))) => host.set_class(node, class),

		(_, Some(AttrValue::Text(value))) => host.set_attribute(node, name, value),
		(_, Some(AttrValue::Style(style))) => host.set_attribute(node, name, &css_text(style)),
		(_, Some(AttrValue::Listener(listener))) => {
			debug!(attribute = name, ?listener, "Ignoring listener on non-event attribute");
			Ok(())
		}
		(_, None) => host.remove_attribute(node, name),
	}
}

fn patch_listener<H: HostRenderer + ?Sized>(host: &mut H, node: &H::Node, event: &str, previous: Option<&AttrValue>, next: Option<&AttrValue>) -> Result<(), H::Error> {
	if let Some(AttrValue::Listener(previous)) = previous {
		host.remove_event_listener(node, event, previous)?;
	}
	match next {
		Some(AttrValue::Listener(next)) => host.add_event_listener(node, event, next),
		Some(other) => {
			debug!(event_type = event, value = ?other, "Ignoring non-listener value for event binding");
			Ok(())
		}
		None => Ok(()),
	}
}
