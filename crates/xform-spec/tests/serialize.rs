use serde_json::json;

use xform_spec::{
    CompileOptions, Control, Field, Form, LocalizedText, TextInput, XFormError, XmlContent,
    XmlNode, compile_to_string, serialize,
};

#[test]
fn empty_node_self_closes_at_its_depth() {
    assert_eq!(serialize(&XmlNode::empty("name")), "<name/>\n");

    let tree = XmlNode::parent(
        "a",
        vec![XmlNode::parent("b", vec![XmlNode::empty("c")])],
    );
    assert_eq!(serialize(&tree), "<a>\n  <b>\n    <c/>\n  </b>\n</a>\n");
}

#[test]
fn values_render_inline_and_attributes_keep_insertion_order() {
    let node = XmlNode::text("value", "yes")
        .attr("z", "1")
        .attr("a", "2");
    assert_eq!(serialize(&node), "<value z=\"1\" a=\"2\">yes</value>\n");
}

#[test]
fn empty_children_still_open_and_close() {
    let node = XmlNode::parent("group", Vec::new());
    assert_eq!(serialize(&node), "<group>\n</group>\n");
}

#[test]
fn serializer_does_not_escape() {
    let node = XmlNode::empty("bind").attr("constraint", "(. &gt; 1)");
    assert_eq!(serialize(&node), "<bind constraint=\"(. &gt; 1)\"/>\n");
}

#[test]
fn display_matches_serialize() {
    let node = XmlNode::parent("a", vec![XmlNode::text("b", "c")]);
    assert_eq!(node.to_string(), serialize(&node));
}

#[test]
fn small_form_renders_complete_document() {
    let form = Form::new(
        "Tiny",
        vec![Control::InputText(TextInput {
            field: Field {
                label: Some(LocalizedText::new().with("en", "Q")),
                required: true,
                ..Field::named("q")
            },
            length: None,
        })],
    );
    let xml = compile_to_string(&form, &CompileOptions::new(["en"])).expect("compile");
    let expected = concat!(
        "<h:html xmlns=\"http://www.w3.org/2002/xforms\" xmlns:h=\"http://www.w3.org/1999/xhtml\" ",
        "xmlns:ev=\"http://www.w3.org/2001/xml-events\" xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" ",
        "xmlns:jr=\"http://openrosa.org/javarosa\">\n",
        "  <h:head>\n",
        "    <h:title>Tiny</h:title>\n",
        "    <model>\n",
        "      <instance>\n",
        "        <data>\n",
        "          <q/>\n",
        "        </data>\n",
        "      </instance>\n",
        "      <itext>\n",
        "        <translation lang=\"en\">\n",
        "          <text id=\"/data/q:label\">\n",
        "            <value>Q</value>\n",
        "          </text>\n",
        "        </translation>\n",
        "      </itext>\n",
        "      <bind nodeset=\"/data/q\" type=\"string\" required=\"true()\"/>\n",
        "    </model>\n",
        "  </h:head>\n",
        "  <h:body>\n",
        "    <input ref=\"/data/q\">\n",
        "      <label ref=\"jr:itext('/data/q:label')\"/>\n",
        "    </input>\n",
        "  </h:body>\n",
        "</h:html>\n",
    );
    assert_eq!(xml, expected);
}

#[test]
fn json_tree_uses_name_attrs_val_children_shape() {
    let node = XmlNode::parent(
        "item",
        vec![
            XmlNode::empty("label").attr("ref", "jr:itext('/data/a:option0')"),
            XmlNode::text("value", "a"),
        ],
    );
    let value = serde_json::to_value(&node).expect("serialize");
    assert_eq!(
        value,
        json!({
            "name": "item",
            "children": [
                { "name": "label", "attrs": { "ref": "jr:itext('/data/a:option0')" } },
                { "name": "value", "val": "a" }
            ]
        })
    );

    let back: XmlNode = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, node);
}

#[test]
fn json_tree_keeps_attribute_order() {
    let node: XmlNode =
        serde_json::from_str(r#"{ "name": "bind", "attrs": { "type": "int", "nodeset": "/data/a" } }"#)
            .expect("deserialize");
    assert_eq!(node.content, XmlContent::Empty);
    assert_eq!(
        node.attrs.keys().collect::<Vec<_>>(),
        vec!["type", "nodeset"]
    );
}

#[test]
fn json_tree_rejects_value_with_children() {
    let error = serde_json::from_value::<XmlNode>(json!({
        "name": "broken",
        "val": "x",
        "children": []
    }))
    .expect_err("contract violation");
    assert!(
        error
            .to_string()
            .contains(&XFormError::Node("broken".into()).to_string())
    );
}
