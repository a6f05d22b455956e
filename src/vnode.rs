//! The virtual node model.
//!
//! A [`VNode`] tree is a pure description, built fresh for each render.
//! The only thing the reconciler ever writes into it is each node's anchor, the host node it was mounted as.

use crate::attr::{AttrValue, Attrs};
use compact_str::CompactString;
use core::fmt::{self, Debug, Display, Formatter};
use smallvec::SmallVec;

/// Stable identity of a sibling across renders, used only for keyed list reconciliation.
///
/// Integer keys are stored in their decimal form, so `Key::from(1)` and `Key::from("1")` are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(CompactString);
impl Key {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Debug for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Debug::fmt(self.as_str(), f)
	}
}
impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Debug::fmt(self.as_str(), f)
	}
}
impl From<&str> for Key {
	fn from(key: &str) -> Self {
		Self(key.into())
	}
}
impl From<String> for Key {
	fn from(key: String) -> Self {
		Self(key.into())
	}
}
impl From<CompactString> for Key {
	fn from(key: CompactString) -> Self {
		Self(key)
	}
}
macro_rules! key_from_integer {
	($($int:ty),*) => {$(
		impl From<$int> for Key {
			fn from(key: $int) -> Self {
				Self(compact_str::format_compact!("{}", key))
			}
		}
	)*};
}
key_from_integer!(i32, i64, u32, u64, usize);

/// A node in the desired tree, generic over the host's node handle type `N`.
#[non_exhaustive]
pub enum VNode<N> {
	Element(Box<Element<N>>),
	Text(Text<N>),
}

pub struct Element<N> {
	pub tag: CompactString,
	pub attrs: Attrs,
	pub children: ChildSet<N>,
	pub key: Option<Key>,
	pub(crate) anchor: Option<N>,
}

pub struct Text<N> {
	pub text: CompactString,
	pub(crate) anchor: Option<N>,
}

/// The children of an [`Element`], in the shape they were given.
pub enum ChildSet<N> {
	Empty,
	Single(Box<VNode<N>>),
	Multiple(Siblings<N>),
}

/// A child sequence that is never empty.
pub struct Siblings<N>(SmallVec<[VNode<N>; 4]>);

/// Creates an element node.
///
/// A `"key"` entry in `attrs` is removed from the attribute list and becomes the node's [`Key`].
/// Tags are not validated here.
pub fn h<N>(tag: impl Into<CompactString>, attrs: Option<Attrs>, children: impl Into<ChildSet<N>>) -> VNode<N> {
	let mut attrs = attrs.unwrap_or_default();
	let key = attrs.iter().position(|(name, _)| name == "key").and_then(|i| match attrs.remove(i).1 {
		AttrValue::Text(key) => Some(Key(key)),
		_ => None,
	});
	VNode::Element(Box::new(Element {
		tag: tag.into(),
		attrs,
		children: children.into(),
		key,
		anchor: None,
	}))
}

/// Creates a text node.
pub fn text<N>(text: impl Into<CompactString>) -> VNode<N> {
	VNode::Text(Text { text: text.into(), anchor: None })
}

impl<N> VNode<N> {
	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		match self {
			VNode::Element(element) => element.key.as_ref(),
			VNode::Text(_) => None,
		}
	}

	/// The host node this vnode was mounted as, if any.
	#[must_use]
	pub fn anchor(&self) -> Option<&N> {
		match self {
			VNode::Element(element) => element.anchor.as_ref(),
			VNode::Text(text) => text.anchor.as_ref(),
		}
	}

	pub(crate) fn set_anchor(&mut self, anchor: N) {
		match self {
			VNode::Element(element) => element.anchor = Some(anchor),
			VNode::Text(text) => text.anchor = Some(anchor),
		}
	}

	pub(crate) fn take_anchor(&mut self) -> Option<N> {
		match self {
			VNode::Element(element) => element.anchor.take(),
			VNode::Text(text) => text.anchor.take(),
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&Element<N>> {
		match self {
			VNode::Element(element) => Some(element),
			VNode::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			VNode::Text(text) => Some(&text.text),
			VNode::Element(_) => None,
		}
	}

	/// Attaches a key to an element node. Text nodes can't be keyed, so they are returned unchanged.
	#[must_use]
	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		if let VNode::Element(element) = &mut self {
			element.key = Some(key.into());
		}
		self
	}

	pub(crate) fn kind(&self) -> &'static str {
		match self {
			VNode::Element(_) => "element",
			VNode::Text(_) => "text",
		}
	}
}

impl<N> Element<N> {
	pub(crate) fn anchor(&self) -> Option<&N> {
		self.anchor.as_ref()
	}
}

impl<N> ChildSet<N> {
	#[must_use]
	pub fn is_empty(&self) -> bool {
		matches!(self, ChildSet::Empty)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		match self {
			ChildSet::Empty => 0,
			ChildSet::Single(_) => 1,
			ChildSet::Multiple(siblings) => siblings.len(),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &VNode<N>> {
		let (single, multiple): (Option<&VNode<N>>, &[VNode<N>]) = match self {
			ChildSet::Empty => (None, &[]),
			ChildSet::Single(child) => (Some(&**child), &[]),
			ChildSet::Multiple(siblings) => (None, siblings.as_slice()),
		};
		single.into_iter().chain(multiple.iter())
	}

	pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut VNode<N>> {
		let (single, multiple): (Option<&mut VNode<N>>, &mut [VNode<N>]) = match self {
			ChildSet::Empty => (None, Default::default()),
			ChildSet::Single(child) => (Some(&mut **child), Default::default()),
			ChildSet::Multiple(siblings) => (None, siblings.as_mut_slice()),
		};
		single.into_iter().chain(multiple.iter_mut())
	}
}

impl<N> Siblings<N> {
	/// Returns [`None`] if `nodes` is empty.
	pub fn new(nodes: impl IntoIterator<Item = VNode<N>>) -> Option<Self> {
		let nodes: SmallVec<_> = nodes.into_iter().collect();
		if nodes.is_empty() {
			None
		} else {
			Some(Self(nodes))
		}
	}

	#[must_use]
	#[allow(clippy::len_without_is_empty)] // Never empty.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn first(&self) -> &VNode<N> {
		&self.0[0]
	}

	#[must_use]
	pub fn as_slice(&self) -> &[VNode<N>] {
		&self.0
	}

	pub(crate) fn as_mut_slice(&mut self) -> &mut [VNode<N>] {
		&mut self.0
	}
}

impl<N> From<()> for ChildSet<N> {
	fn from((): ()) -> Self {
		ChildSet::Empty
	}
}
impl<N, T: Into<ChildSet<N>>> From<Option<T>> for ChildSet<N> {
	fn from(children: Option<T>) -> Self {
		children.map_or(ChildSet::Empty, Into::into)
	}
}
impl<N> From<VNode<N>> for ChildSet<N> {
	fn from(child: VNode<N>) -> Self {
		ChildSet::Single(Box::new(child))
	}
}
impl<N> From<&str> for ChildSet<N> {
	fn from(child: &str) -> Self {
		text(child).into()
	}
}
impl<N> From<String> for ChildSet<N> {
	fn from(child: String) -> Self {
		text(child).into()
	}
}
impl<N> From<Vec<VNode<N>>> for ChildSet<N> {
	fn from(children: Vec<VNode<N>>) -> Self {
		Siblings::new(children).map_or(ChildSet::Empty, ChildSet::Multiple)
	}
}
impl<N, const LEN: usize> From<[VNode<N>; LEN]> for ChildSet<N> {
	fn from(children: [VNode<N>; LEN]) -> Self {
		Siblings::new(children).map_or(ChildSet::Empty, ChildSet::Multiple)
	}
}

impl<N: Debug> Debug for VNode<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			VNode::Element(element) => f
				.debug_struct("Element")
				.field("tag", &element.tag)
				.field("key", &element.key)
				.field("attrs", &element.attrs)
				.field("children", &element.children)
				.field("anchor", &element.anchor)
				.finish(),
			VNode::Text(text) => f.debug_struct("Text").field("text", &text.text).field("anchor", &text.anchor).finish(),
		}
	}
}
impl<N: Debug> Debug for ChildSet<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ChildSet::Empty => f.write_str("Empty"),
			ChildSet::Single(child) => f.debug_tuple("Single").field(child).finish(),
			ChildSet::Multiple(siblings) => f.debug_tuple("Multiple").field(&siblings.as_slice()).finish(),
		}
	}
}
