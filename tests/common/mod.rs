#![allow(dead_code)]

use std::collections::BTreeMap;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use vnode_dom::{HostRenderer, Listener};

pub type NodeId = usize;

/// Every mutation [`MockHost`] was asked to perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
	CreateElement(String),
	CreateText(String),
	SetText(NodeId, String),
	SetStyle(NodeId, String, String),
	RemoveStyle(NodeId, String),
	SetClass(NodeId, String),
	SetAttribute(NodeId, String, String),
	RemoveAttribute(NodeId, String),
	AddListener(NodeId, String),
	RemoveListener(NodeId, String),
	ReleaseListener(String),
	InsertBefore { parent: NodeId, child: NodeId, before: Option<NodeId> },
	RemoveChild { parent: NodeId, child: NodeId },
}

impl Op {
	pub fn is_create(&self) -> bool {
		matches!(self, Op::CreateElement(_) | Op::CreateText(_))
	}
}

#[derive(Debug, Error)]
#[error("mock host refused {0:?}")]
pub struct MockError(pub Op);

#[derive(Debug)]
enum Kind {
	Root,
	Element(String),
	Text(String),
}

#[derive(Debug)]
struct MockNode {
	kind: Kind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	attributes: BTreeMap<String, String>,
	style: BTreeMap<String, String>,
	listeners: Vec<(String, Listener)>,
}

impl MockNode {
	fn new(kind: Kind) -> Self {
		Self {
			kind,
			parent: None,
			children: Vec::new(),
			attributes: BTreeMap::new(),
			style: BTreeMap::new(),
			listeners: Vec::new(),
		}
	}
}

/// An in-memory host tree that logs each call.
#[derive(Default)]
pub struct MockHost {
	nodes: Vec<MockNode>,
	pub ops: Vec<Op>,
	pub flushes: usize,
	fail_on: Option<Box<dyn Fn(&Op) -> bool>>,
}

impl MockHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a detached root to render into.
	pub fn create_root(&mut self) -> NodeId {
		self.nodes.push(MockNode::new(Kind::Root));
		self.nodes.len() - 1
	}

	/// Makes every later call for which `predicate` returns `true` fail without effect.
	pub fn fail_on(&mut self, predicate: impl Fn(&Op) -> bool + 'static) {
		self.fail_on = Some(Box::new(predicate));
	}

	pub fn take_ops(&mut self) -> Vec<Op> {
		std::mem::take(&mut self.ops)
	}

	pub fn children(&self, node: NodeId) -> &[NodeId] {
		&self.nodes[node].children
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.nodes[node].parent
	}

	pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
		self.nodes[node].attributes.get(name).map(String::as_str)
	}

	pub fn listener_count(&self, node: NodeId) -> usize {
		self.nodes[node].listeners.len()
	}

	/// Changes a text node's content without logging it, as a third party would.
	pub fn overwrite_text(&mut self, node: NodeId, text: &str) {
		self.nodes[node].kind = Kind::Text(text.to_owned());
	}

	/// Calls every listener bound for `event` on `node`.
	pub fn dispatch(&self, node: NodeId, event: &str) {
		for (_, listener) in self.nodes[node].listeners.iter().filter(|(e, _)| e == event) {
			listener.call(&event.to_owned());
		}
	}

	/// Serializes the content of `node` as compact markup.
	pub fn html(&self, node: NodeId) -> String {
		let mut html = String::new();
		for &child in &self.nodes[node].children {
			self.write_html(child, &mut html);
		}
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		let node = &self.nodes[node];
		match &node.kind {
			Kind::Root => unreachable!("roots are never inserted"),
			Kind::Text(text) => html.push_str(text),
			Kind::Element(tag) => {
				html.push('<');
				html.push_str(tag);
				for (name, value) in &node.attributes {
					html.push_str(&format!(" {}=\"{}\"", name, value));
				}
				if !node.style.is_empty() {
					let style = node.style.iter().map(|(property, value)| format!("{}: {};", property, value)).collect::<Vec<_>>().join(" ");
					html.push_str(&format!(" style=\"{}\"", style));
				}
				html.push('>');
				for &child in &node.children {
					self.write_html(child, html);
				}
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
		}
	}

	fn record(&mut self, op: Op) -> Result<(), MockError> {
		if self.fail_on.as_ref().map_or(false, |fail_on| fail_on(&op)) {
			return Err(MockError(op));
		}
		self.ops.push(op);
		Ok(())
	}

	fn detach(&mut self, child: NodeId) {
		if let Some(parent) = self.nodes[child].parent.take() {
			self.nodes[parent].children.retain(|&c| c != child);
		}
	}
}

impl HostRenderer for MockHost {
	type Node = NodeId;
	type Error = MockError;

	fn create_element(&mut self, tag: &str) -> Result<NodeId, MockError> {
		self.record(Op::CreateElement(tag.to_owned()))?;
		self.nodes.push(MockNode::new(Kind::Element(tag.to_owned())));
		Ok(self.nodes.len() - 1)
	}

	fn create_text(&mut self, text: &str) -> Result<NodeId, MockError> {
		self.record(Op::CreateText(text.to_owned()))?;
		self.nodes.push(MockNode::new(Kind::Text(text.to_owned())));
		Ok(self.nodes.len() - 1)
	}

	fn text(&self, node: &NodeId) -> Result<String, MockError> {
		match &self.nodes[*node].kind {
			Kind::Text(text) => Ok(text.clone()),
			_ => Err(MockError(Op::SetText(*node, String::new()))),
		}
	}

	fn set_text(&mut self, node: &NodeId, text: &str) -> Result<(), MockError> {
		self.record(Op::SetText(*node, text.to_owned()))?;
		self.nodes[*node].kind = Kind::Text(text.to_owned());
		Ok(())
	}

	fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), MockError> {
		self.record(Op::SetStyle(*node, property.to_owned(), value.to_owned()))?;
		self.nodes[*node].style.insert(property.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_style(&mut self, node: &NodeId, property: &str) -> Result<(), MockError> {
		self.record(Op::RemoveStyle(*node, property.to_owned()))?;
		self.nodes[*node].style.remove(property);
		Ok(())
	}

	fn set_class(&mut self, node: &NodeId, class: &str) -> Result<(), MockError> {
		self.record(Op::SetClass(*node, class.to_owned()))?;
		self.nodes[*node].attributes.insert("class".to_owned(), class.to_owned());
		Ok(())
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), MockError> {
		self.record(Op::SetAttribute(*node, name.to_owned(), value.to_owned()))?;
		self.nodes[*node].attributes.insert(name.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), MockError> {
		self.record(Op::RemoveAttribute(*node, name.to_owned()))?;
		self.nodes[*node].attributes.remove(name);
		if name == "style" {
			self.nodes[*node].style.clear();
		}
		Ok(())
	}

	fn add_event_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) -> Result<(), MockError> {
		self.record(Op::AddListener(*node, event.to_owned()))?;
		self.nodes[*node].listeners.push((event.to_owned(), listener.clone()));
		Ok(())
	}

	fn remove_event_listener(&mut self, node: &NodeId, event: &str, listener: &Listener) -> Result<(), MockError> {
		let op = Op::RemoveListener(*node, event.to_owned());
		match self.nodes[*node].listeners.iter().position(|(e, l)| e == event && l == listener) {
			Some(i) => {
				self.record(op)?;
				self.nodes[*node].listeners.remove(i);
				Ok(())
			}
			None => Err(MockError(op)),
		}
	}

	fn release_listener(&mut self, event: &str, _listener: &Listener) {
		self.ops.push(Op::ReleaseListener(event.to_owned()));
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, before: Option<&NodeId>) -> Result<(), MockError> {
		let (parent, child, before) = (*parent, *child, before.copied());
		let op = Op::InsertBefore { parent, child, before };
		if let Some(before) = before {
			if self.nodes[before].parent != Some(parent) {
				return Err(MockError(op));
			}
		}
		self.record(op)?;
		if before == Some(child) {
			return Ok(());
		}

		self.detach(child);
		let index = match before {
			Some(before) => self.nodes[parent].children.iter().position(|&c| c == before).expect("reference node is a child"),
			None => self.nodes[parent].children.len(),
		};
		self.nodes[parent].children.insert(index, child);
		self.nodes[child].parent = Some(parent);
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MockError> {
		let op = Op::RemoveChild { parent: *parent, child: *child };
		if self.nodes[*child].parent != Some(*parent) {
			return Err(MockError(op));
		}
		self.record(op)?;
		self.detach(*child);
		Ok(())
	}

	fn next_sibling(&self, node: &NodeId) -> Result<Option<NodeId>, MockError> {
		Ok(self.nodes[*node].parent.and_then(|parent| {
			let siblings = &self.nodes[parent].children;
			let index = siblings.iter().position(|c| c == node)?;
			siblings.get(index + 1).copied()
		}))
	}

	fn flush(&mut self) {
		self.flushes += 1;
	}
}

pub fn init_tracing() {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_test_writer().try_init().ok();
}
