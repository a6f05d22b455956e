//! Builds anchored [`VNode`] trees from existing DOM content, for [hydration](`crate::Container::hydrate`).
//!
//! Loaded trees have no keys and no listeners. Comments and other non-element, non-text nodes are skipped.

use crate::{
	attr::{AttrValue, Attrs, Style},
	vnode::{h, text, ChildSet, VNode},
};
use compact_str::CompactString;
use tracing::trace;
use wasm_bindgen::JsCast;
use web_sys::{Attr, Element, NamedNodeMap, Node, NodeList, Text};

/// Loads the first element or text child of `container`, which is what a [`Container`](`crate::Container`) renders as its root.
#[must_use]
pub fn load_root(container: &Node) -> Option<VNode<Node>> {
	let child_nodes = container.child_nodes();
	(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).find_map(|child| load_node(&child))
}

pub fn load_child_nodes(child_nodes: &NodeList) -> Vec<VNode<Node>> {
	(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).filter_map(|child| load_node(&child)).collect()
}

#[must_use]
pub fn load_node(node: &Node) -> Option<VNode<Node>> {
	let mut vnode = if let Some(element) = node.dyn_ref::<Element>() {
		load_element(element)
	} else if let Some(text_node) = node.dyn_ref::<Text>() {
		text(text_node.data())
	} else {
		trace!("Skipping unrecognised child node: {:?}", node);
		return None;
	};
	vnode.set_anchor(node.clone());
	Some(vnode)
}

/// A lone child is loaded as a single child, the way `h(tag, attrs, child)` builds it.
fn load_element(element: &Element) -> VNode<Node> {
	let node: &Node = element.as_ref();
	let mut children = load_child_nodes(&node.child_nodes());
	let children: ChildSet<Node> = if children.len() == 1 { children.pop().into() } else { children.into() };
	h(element.local_name(), Some(load_attributes(&element.attributes())), children)
}

pub fn load_attributes(attributes: &NamedNodeMap) -> Attrs {
	(0..attributes.length()).filter_map(|i| attributes.item(i)).map(|attribute| load_attribute(&attribute)).collect()
}

/// Loads one attribute. An inline `style` attribute is split into its declarations.
pub fn load_attribute(attribute: &Attr) -> (CompactString, AttrValue) {
	let name = attribute.local_name();
	let value = attribute.value();
	if name == "style" {
		(name.into(), AttrValue::Style(parse_style(&value)))
	} else {
		(name.into(), value.into())
	}
}

fn parse_style(css_text: &str) -> Style {
	css_text
		.split(';')
		.filter_map(|declaration| {
			let (property, value) = declaration.split_once(':')?;
			let property = property.trim();
			(!property.is_empty()).then(|| (property.into(), value.trim().into()))
		})
		.collect()
}
