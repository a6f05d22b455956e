//! Node-level patching and children reconciliation.
//!
//! # Keyed Children
//!
//! When both the previous and next child lists have several entries, children are matched by [`Key`](`crate::Key`) in a single pass:
//!
//! - `last_index` tracks the highest previous position matched so far.
//! - A next child whose key matches the previous child at `j` is patched in place.
//!   If `j < last_index` it was overtaken and is moved behind its new preceding sibling, otherwise `last_index = j`.
//! - A next child without a match is mounted behind its new preceding sibling,
//!   or before the first previous child if it is first.
//! - Finally, every previous child that wasn't matched is removed.
//!
//! Nodes matched in increasing previous order stay put, which is correct but not move-minimal:
//! Reversing a list of `n` children moves `n - 1` of them.
//!
//! Children without keys never match anything, so an unkeyed list is removed and remounted in full on each patch.

use crate::{
	attr::{self, patch_attribute, AttrValue, EVENT_PREFIX},
	error::{RenderError, RenderResult},
	host::HostRenderer,
	vnode::{ChildSet, Element, Text, VNode},
};
use hashbrown::HashSet;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, error, instrument, trace, trace_span};

/// Default maximum tree depth.
const DEFAULT_DEPTH_LIMIT: usize = 512;

/// Configuration for mounting and patching.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
	/// Maximum nesting depth before a render fails with [`RenderError::DepthLimit`].
	/// Default: 512
	pub depth_limit: usize,
	/// Whether sibling keys are checked for duplicates before a child list is mounted or reconciled.
	/// Default: `true`
	pub check_duplicate_keys: bool,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			depth_limit: DEFAULT_DEPTH_LIMIT,
			check_duplicate_keys: true,
		}
	}
}

impl RenderConfig {
	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	/// Skipping the check leaves reordering among duplicate keys unspecified.
	#[must_use]
	pub fn with_duplicate_key_check(mut self, check_duplicate_keys: bool) -> Self {
		self.check_duplicate_keys = check_duplicate_keys;
		self
	}
}

/// What a single render did to the host tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
	/// Nodes created, counting each descendant.
	pub nodes_mounted: usize,
	/// Nodes removed from their parent (descendants not counted).
	pub nodes_removed: usize,
	/// Keyed children moved to a new position.
	pub nodes_moved: usize,
	/// Nodes replaced wholesale due to a kind or tag mismatch.
	pub nodes_replaced: usize,
	/// Text nodes whose content was overwritten.
	pub texts_updated: usize,
	/// Attribute protocol invocations.
	pub attrs_patched: usize,
}

impl RenderStats {
	/// Whether the render touched the host tree at all.
	#[must_use]
	pub fn has_changes(&self) -> bool {
		*self != Self::default()
	}
}

/// One render's worth of tree walking, borrowing the host for its duration.
pub(crate) struct Reconciler<'a, H: HostRenderer + ?Sized> {
	pub(crate) host: &'a mut H,
	pub(crate) config: RenderConfig,
	pub(crate) stats: RenderStats,
}

impl<'a, H: HostRenderer + ?Sized> Reconciler<'a, H> {
	pub(crate) fn new(host: &'a mut H, config: RenderConfig) -> Self {
		Self {
			host,
			config,
			stats: RenderStats::default(),
		}
	}

	pub(crate) fn check_depth(&self, depth: usize) -> RenderResult<(), H::Error> {
		if depth > self.config.depth_limit {
			return Err(RenderError::DepthLimit { limit: self.config.depth_limit });
		}
		Ok(())
	}

	pub(crate) fn check_keys(&self, siblings: &[VNode<H::Node>]) -> RenderResult<(), H::Error> {
		if !self.config.check_duplicate_keys {
			return Ok(());
		}
		let mut seen = HashSet::with_capacity(siblings.len());
		for key in siblings.iter().filter_map(VNode::key) {
			if !seen.insert(key) {
				return Err(RenderError::DuplicateKey { key: key.clone() });
			}
		}
		Ok(())
	}

	/// Reconciles `previous` (currently rendered inside `container`) towards `next`.
	///
	/// On success, every node in `next` carries an anchor.
	#[instrument(skip(self, previous, next, container))]
	pub(crate) fn patch(&mut self, previous: &mut VNode<H::Node>, next: &mut VNode<H::Node>, container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		self.check_depth(depth)?;

		match (previous, next) {
			(VNode::Text(previous), VNode::Text(next)) => self.patch_text(previous, next),
			(VNode::Element(previous), VNode::Element(next)) if previous.tag == next.tag => self.patch_element(previous, next, depth),
			(previous, next) => self.replace(previous, next, container, depth),
		}
	}

	fn patch_text(&mut self, previous: &Text<H::Node>, next: &mut Text<H::Node>) -> RenderResult<(), H::Error> {
		let span = trace_span!("Patching text", previous = previous.text.as_str(), next = next.text.as_str());
		let _enter = span.enter();

		let anchor = previous.anchor.clone().ok_or(RenderError::MissingAnchor)?;
		let live = self.host.text(&anchor).map_err(RenderError::Host)?;
		let diverged = live.as_str() != previous.text.as_str();
		if diverged {
			error!("Unexpected text data: Expected {:?} but found {:?}. Overwriting.", previous.text, live);
		}
		if diverged || previous.text != next.text {
			self.host.set_text(&anchor, &next.text).map_err(RenderError::Host)?;
			self.stats.texts_updated += 1;
		}
		next.anchor = Some(anchor);
		Ok(())
	}

	fn patch_element(&mut self, previous: &mut Element<H::Node>, next: &mut Element<H::Node>, depth: usize) -> RenderResult<(), H::Error> {
		debug_assert_eq!(previous.tag, next.tag);
		let span = trace_span!("Patching element", tag = next.tag.as_str(), key = ?next.key);
		let _enter = span.enter();

		let anchor = previous.anchor().cloned().ok_or(RenderError::MissingAnchor)?;

		for (name, value) in &next.attrs {
			let previous_value = attr::get(&previous.attrs, name);
			if previous_value == Some(value) {
				continue;
			}
			patch_attribute(&mut *self.host, &anchor, name, previous_value, Some(value)).map_err(RenderError::Host)?;
			self.stats.attrs_patched += 1;
		}
		for (name, value) in &previous.attrs {
			if attr::get(&next.attrs, name).is_none() {
				trace!(attribute = name.as_str(), "Clearing attribute");
				patch_attribute(&mut *self.host, &anchor, name, Some(value), None).map_err(RenderError::Host)?;
				self.stats.attrs_patched += 1;
			}
		}

		next.anchor = Some(anchor.clone());
		self.patch_children(&mut previous.children, &mut next.children, &anchor, depth + 1)
	}

	/// Removes `previous` and mounts `next` in its place. Nothing below `previous` is salvaged.
	fn replace(&mut self, previous: &mut VNode<H::Node>, next: &mut VNode<H::Node>, container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		let span = trace_span!("Replacing mismatching", previous = previous.kind(), next = next.kind());
		let _enter = span.enter();

		let old = previous.take_anchor().ok_or(RenderError::MissingAnchor)?;
		self.release_listeners(previous);
		let next_sibling = self.host.next_sibling(&old).map_err(RenderError::Host)?;
		self.host.remove_child(container, &old).map_err(RenderError::Host)?;
		self.stats.nodes_replaced += 1;
		self.mount(next, container, next_sibling.as_ref(), depth)
	}

	fn remove(&mut self, previous: &mut VNode<H::Node>, container: &H::Node) -> RenderResult<(), H::Error> {
		let span = trace_span!("Removing", kind = previous.kind(), key = ?previous.key());
		let _enter = span.enter();

		let anchor = previous.take_anchor().ok_or(RenderError::MissingAnchor)?;
		self.release_listeners(previous);
		self.host.remove_child(container, &anchor).map_err(RenderError::Host)?;
		self.stats.nodes_removed += 1;
		Ok(())
	}

	/// Tells the host about every listener bound inside a subtree that is about to be removed.
	pub(crate) fn release_listeners(&mut self, removed: &VNode<H::Node>) {
		if let VNode::Element(element) = removed {
			for (name, value) in &element.attrs {
				if let (Some(event), AttrValue::Listener(listener)) = (name.strip_prefix(EVENT_PREFIX), value) {
					self.host.release_listener(event, listener);
				}
			}
			for child in element.children.iter() {
				self.release_listeners(child);
			}
		}
	}

	fn remove_each(&mut self, previous: &mut ChildSet<H::Node>, container: &H::Node) -> RenderResult<(), H::Error> {
		for child in previous.iter_mut() {
			self.remove(child, container)?;
		}
		Ok(())
	}

	#[instrument(skip(self, previous, next, container))]
	fn patch_children(&mut self, previous: &mut ChildSet<H::Node>, next: &mut ChildSet<H::Node>, container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		if let ChildSet::Multiple(siblings) = next {
			self.check_keys(siblings.as_slice())?;
		}

		match (previous, next) {
			(ChildSet::Empty, ChildSet::Empty) => Ok(()),
			(ChildSet::Empty, next) => self.mount_each(next, container, depth),
			(ChildSet::Single(previous), ChildSet::Single(next)) => self.patch(previous, next, container, depth),
			(ChildSet::Multiple(previous), ChildSet::Multiple(next)) => self.patch_keyed(previous.as_mut_slice(), next.as_mut_slice(), container, depth),
			(previous, next) => {
				// The previous children are never reused here, even if one of them would match.
				self.remove_each(previous, container)?;
				self.mount_each(next, container, depth)
			}
		}
	}

	fn patch_keyed(&mut self, previous: &mut [VNode<H::Node>], next: &mut [VNode<H::Node>], container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		let span = trace_span!("Reconciling keyed children", previous = previous.len(), next = next.len());
		let _enter = span.enter();

		if next.iter().all(|child| child.key().is_none()) {
			debug!("No keys among next children; every previous child will be removed and every next child mounted.");
		}

		// Each previous child is matched at most once, even among duplicate keys.
		let mut matched: SmallVec<[bool; 16]> = smallvec![false; previous.len()];
		let mut last_index = 0;
		for i in 0..next.len() {
			let (placed, rest) = next.split_at_mut(i);
			let next_child = &mut rest[0];

			let found = next_child
				.key()
				.and_then(|key| previous.iter().zip(&matched).position(|(child, &taken)| !taken && child.key() == Some(key)));
			match found {
				Some(j) => {
					matched[j] = true;
					self.patch(&mut previous[j], next_child, container, depth)?;
					if j < last_index {
						let span = trace_span!("Moving keyed child", key = ?next_child.key(), from = j, to = i);
						let _enter = span.enter();
						let reference = self.reference_after(placed.last(), previous)?;
						let anchor = next_child.anchor().ok_or(RenderError::MissingAnchor)?;
						self.host.insert_before(container, anchor, reference.as_ref()).map_err(RenderError::Host)?;
						self.stats.nodes_moved += 1;
					} else {
						last_index = j;
					}
				}
				None => {
					let reference = self.reference_after(placed.last(), previous)?;
					self.mount(next_child, container, reference.as_ref(), depth)?;
				}
			}
		}

		for (child, _) in previous.iter_mut().zip(matched).filter(|(_, retained)| !retained) {
			self.remove(child, container)?;
		}
		Ok(())
	}

	/// The host node a child placed right after `placed` must be inserted before.
	///
	/// With no preceding sibling, that is the first previous child.
	fn reference_after(&self, placed: Option<&VNode<H::Node>>, previous: &[VNode<H::Node>]) -> RenderResult<Option<H::Node>, H::Error> {
		match placed {
			Some(sibling) => {
				let anchor = sibling.anchor().ok_or(RenderError::MissingAnchor)?;
				self.host.next_sibling(anchor).map_err(RenderError::Host)
			}
			None => Ok(previous.first().and_then(VNode::anchor).cloned()),
		}
	}
}
