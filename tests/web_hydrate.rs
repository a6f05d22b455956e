#![cfg(target_arch = "wasm32")]

use std::sync::Once;
use vnode_dom::{attrs, h, load::load_root, web::WebRenderer, Container};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Element, Node};

wasm_bindgen_test_configure!(run_in_browser);

fn init_tracing() {
	static INIT: Once = Once::new();
	INIT.call_once(tracing_wasm::set_as_global_default);
}

fn fresh_root(html: &str) -> Element {
	let document = window().unwrap().document().unwrap();
	let root = document.create_element("div").unwrap();
	root.set_inner_html(html);
	document.body().unwrap().append_child(&root).unwrap();
	root
}

#[wasm_bindgen_test]
fn hydrated_content_is_patched_in_place() {
	init_tracing();
	let root = fresh_root(r#"<p class="greeting" style="color: red;">Hello</p>"#);
	let paragraph = root.first_element_child().unwrap();

	let loaded = load_root(root.as_ref()).expect("root has content");
	let mut renderer = WebRenderer::new().unwrap();
	let mut container = Container::new(Node::from(root.clone()));
	assert!(container.hydrate(loaded).is_none());

	let stats = container
		.render(
			&mut renderer,
			h("p", Some(attrs([("class", "greeting".into()), ("style", vnode_dom::style([("color", "red")]))])), "Hello"),
		)
		.unwrap();
	assert!(!stats.has_changes(), "{:?}", stats);

	container
		.render(&mut renderer, h("p", Some(attrs([("class", "farewell".into())])), "Goodbye"))
		.unwrap();
	assert_eq!(paragraph.get_attribute("class").as_deref(), Some("farewell"));
	assert_eq!(paragraph.text_content().as_deref(), Some("Goodbye"));
	assert!(root.first_element_child().unwrap().is_same_node(Some(paragraph.as_ref())));
}

#[wasm_bindgen_test]
fn nothing_to_load() {
	let root = fresh_root("<!-- comment only -->");
	assert!(load_root(root.as_ref()).is_none());
}
