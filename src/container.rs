use crate::{
	diff::{Reconciler, RenderConfig, RenderStats},
	error::{RenderError, RenderResult},
	host::HostRenderer,
	vnode::VNode,
};
use core::{fmt::Debug, hash::Hash};
use hashbrown::HashMap;
use tracing::{error, instrument, trace};

/// A render target and the tree last rendered into it.
///
/// # Correct Use
///
/// The stored tree must be the one whose anchors make up the container's live content.
/// Don't modify the container's host children behind its back.
///
/// If a render fails part-way, the live nodes may already be partially mutated while the stored tree is still the previous one.
/// The container is then poisoned and refuses further renders until [`reset`](`Container::reset`),
/// after which the caller is responsible for clearing out the live content (or [`hydrate`](`Container::hydrate`)-ing a tree that matches it).
#[derive(Debug)]
pub struct Container<N> {
	node: N,
	vnode: Option<VNode<N>>,
	poisoned: bool,
	config: RenderConfig,
}

impl<N: Clone + Debug> Container<N> {
	#[must_use]
	pub fn new(node: N) -> Self {
		Self::with_config(node, RenderConfig::default())
	}

	#[must_use]
	pub fn with_config(node: N, config: RenderConfig) -> Self {
		Self {
			node,
			vnode: None,
			poisoned: false,
			config,
		}
	}

	/// The host node children are rendered into.
	#[must_use]
	pub fn node(&self) -> &N {
		&self.node
	}

	/// The tree stored by the last successful render.
	#[must_use]
	pub fn vnode(&self) -> Option<&VNode<N>> {
		self.vnode.as_ref()
	}

	#[must_use]
	pub fn is_poisoned(&self) -> bool {
		self.poisoned
	}

	/// Mounts `vnode` on first use, and patches the stored tree towards it afterwards.
	///
	/// `vnode` replaces the stored tree only if this succeeds.
	///
	/// # Errors
	///
	/// Fails with [`RenderError::Poisoned`] if an earlier render failed, otherwise with whatever went wrong this time
	/// (which then poisons the container).
	#[instrument(skip(self, host, vnode), fields(container = ?self.node))]
	pub fn render<H>(&mut self, host: &mut H, mut vnode: VNode<N>) -> RenderResult<RenderStats, H::Error>
	where
		H: HostRenderer<Node = N> + ?Sized,
	{
		if self.poisoned {
			return Err(RenderError::Poisoned);
		}

		let mut reconciler = Reconciler::new(&mut *host, self.config);
		let result = match &mut self.vnode {
			None => {
				trace!("First render. Mounting.");
				reconciler.mount(&mut vnode, &self.node, None, 0)
			}
			Some(previous) => reconciler.patch(previous, &mut vnode, &self.node, 0),
		};
		let stats = reconciler.stats;
		host.flush();

		match result {
			Ok(()) => {
				self.vnode = Some(vnode);
				trace!(?stats, "Rendered.");
				Ok(stats)
			}
			Err(error) => {
				error!("Render failed; the container is poisoned until reset: {}", error);
				self.poisoned = true;
				Err(error)
			}
		}
	}

	/// Removes the stored tree's root from the container and forgets it.
	///
	/// # Errors
	///
	/// Fails with [`RenderError::Poisoned`] after a failed render, or if the host fails to remove the node.
	pub fn unmount<H>(&mut self, host: &mut H) -> RenderResult<(), H::Error>
	where
		H: HostRenderer<Node = N> + ?Sized,
	{
		if self.poisoned {
			return Err(RenderError::Poisoned);
		}
		if let Some(mut vnode) = self.vnode.take() {
			trace!("Unmounting.");
			let anchor = vnode.take_anchor().ok_or(RenderError::MissingAnchor)?;
			Reconciler::new(&mut *host, self.config).release_listeners(&vnode);
			let result = host.remove_child(&self.node, &anchor);
			host.flush();
			if let Err(error) = result {
				self.poisoned = true;
				return Err(RenderError::Host(error));
			}
		}
		Ok(())
	}

	/// Forgets the stored tree and clears poisoning. The live content is left as is.
	pub fn reset(&mut self) -> Option<VNode<N>> {
		self.poisoned = false;
		self.vnode.take()
	}

	/// Adopts an already-anchored tree that matches the container's live content (see [`load`](`crate::load`)),
	/// so the next render patches it instead of mounting from scratch.
	///
	/// Returns the previously stored tree.
	pub fn hydrate(&mut self, vnode: VNode<N>) -> Option<VNode<N>> {
		debug_assert!(vnode.anchor().is_some(), "Hydrated tree must be anchored");
		self.poisoned = false;
		self.vnode.replace(vnode)
	}
}

/// Owns a host renderer and the stored tree of each container rendered through it.
#[derive(Debug)]
pub struct RenderSession<H: HostRenderer>
where
	H::Node: Hash + Eq,
{
	host: H,
	containers: HashMap<H::Node, Container<H::Node>>,
	config: RenderConfig,
}

impl<H: HostRenderer> RenderSession<H>
where
	H::Node: Hash + Eq,
{
	pub fn new(host: H) -> Self {
		Self::with_config(host, RenderConfig::default())
	}

	pub fn with_config(host: H, config: RenderConfig) -> Self {
		Self {
			host,
			containers: HashMap::new(),
			config,
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn into_host(self) -> H {
		self.host
	}

	pub fn container(&self, node: &H::Node) -> Option<&Container<H::Node>> {
		self.containers.get(node)
	}

	/// Renders `vnode` into `node`, which is remembered as a container from now on.
	///
	/// # Errors
	///
	/// See [`Container::render`].
	pub fn render(&mut self, node: &H::Node, vnode: VNode<H::Node>) -> RenderResult<RenderStats, H::Error> {
		let config = self.config;
		let container = self.containers.entry(node.clone()).or_insert_with(|| Container::with_config(node.clone(), config));
		container.render(&mut self.host, vnode)
	}

	/// Unmounts the tree rendered into `node` and forgets the container.
	///
	/// # Errors
	///
	/// See [`Container::unmount`]. The container is kept if this fails.
	pub fn unmount(&mut self, node: &H::Node) -> RenderResult<(), H::Error> {
		if let Some(container) = self.containers.get_mut(node) {
			container.unmount(&mut self.host)?;
			self.containers.remove(node);
		}
		Ok(())
	}

	/// Forgets the container for `node` without touching its content, returning its stored tree.
	pub fn forget(&mut self, node: &H::Node) -> Option<VNode<H::Node>> {
		self.containers.remove(node).and_then(|mut container| container.reset())
	}
}
