use crate::{
	attr::patch_attribute,
	diff::Reconciler,
	error::{RenderError, RenderResult},
	host::HostRenderer,
	vnode::{ChildSet, VNode},
};
use tracing::{instrument, trace_span};

impl<'a, H: HostRenderer + ?Sized> Reconciler<'a, H> {
	/// Materializes `vnode` into `container`, immediately before `before` or at the end.
	///
	/// An element is built completely (attributes, then children) before it is inserted,
	/// so its whole subtree arrives in the visible tree with a single insertion.
	#[instrument(skip(self, vnode, container, before))]
	pub(crate) fn mount(&mut self, vnode: &mut VNode<H::Node>, container: &H::Node, before: Option<&H::Node>, depth: usize) -> RenderResult<(), H::Error> {
		self.check_depth(depth)?;

		match vnode {
			VNode::Text(text) => {
				let span = trace_span!("Mounting text", text = text.text.as_str());
				let _enter = span.enter();
				let node = self.host.create_text(&text.text).map_err(RenderError::Host)?;
				self.host.insert_before(container, &node, before).map_err(RenderError::Host)?;
				text.anchor = Some(node);
			}

			VNode::Element(element) => {
				let span = trace_span!("Mounting element", tag = element.tag.as_str(), key = ?element.key);
				let _enter = span.enter();
				if element.tag.is_empty() {
					return Err(RenderError::InvalidTag(element.tag.clone()));
				}

				let node = self.host.create_element(&element.tag).map_err(RenderError::Host)?;
				for (name, value) in &element.attrs {
					patch_attribute(&mut *self.host, &node, name, None, Some(value)).map_err(RenderError::Host)?;
					self.stats.attrs_patched += 1;
				}

				self.mount_children(&mut element.children, &node, depth + 1)?;

				self.host.insert_before(container, &node, before).map_err(RenderError::Host)?;
				element.anchor = Some(node);
			}
		}

		self.stats.nodes_mounted += 1;
		Ok(())
	}

	/// Appends every child in `children` to `container`, in order.
	pub(crate) fn mount_children(&mut self, children: &mut ChildSet<H::Node>, container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		if let ChildSet::Multiple(siblings) = children {
			self.check_keys(siblings.as_slice())?;
		}
		self.mount_each(children, container, depth)
	}

	/// [`mount_children`](`Reconciler::mount_children`) for a child list whose keys were already checked.
	pub(crate) fn mount_each(&mut self, children: &mut ChildSet<H::Node>, container: &H::Node, depth: usize) -> RenderResult<(), H::Error> {
		for child in children.iter_mut() {
			self.mount(child, container, None, depth)?;
		}
		Ok(())
	}
}
