//! Renders a finished [`Schema`] as TypeScript declarations.
//!
//! Grammar of the output (one block per object, blocks separated by a blank line):
//!
//! ```text
//! [export ]type Name = T;
//! [export ]interface Name {
//!   key[?]: T;
//! }
//! ```
use crate::naming::quote_key;
use crate::schema::{ArrayId, Object, Property, Schema};
use crate::walker::WRAPPER_KEY;

fn export_prefix(exported: bool) -> &'static str {
    if exported { "export " } else { "" }
}

/// Type expression of an array node: nested array first, then the direct
/// element types.
pub fn array_type(schema: &Schema, id: ArrayId) -> String {
    let array = schema.array(id);
    let mut types: Vec<String> = Vec::with_capacity(array.types.len() + 1);
    if let Some(nested) = array.array {
        types.push(array_type(schema, nested));
    }
    types.extend(array.types.iter().cloned());
    match types.len() {
        0 => "unknown[]".to_string(),
        1 => format!("{}[]", types[0]),
        _ => format!("Array<{}>", types.join(" | ")),
    }
}

/// Union of a property's own types and its array expression.
pub fn property_type(schema: &Schema, prop: &Property) -> String {
    let mut types: Vec<String> = prop.types.iter().cloned().collect();
    if let Some(id) = prop.array {
        types.push(array_type(schema, id));
    }
    if types.is_empty() {
        return "unknown".to_string();
    }
    types.join(" | ")
}

pub fn interface(schema: &Schema, object: &Object, exported: bool) -> String {
    let props: Vec<String> = object
        .props
        .values()
        .map(|prop| {
            let optional = if prop.optional { "?" } else { "" };
            format!("  {}{optional}: {};", quote_key(&prop.key), property_type(schema, prop))
        })
        .collect();
    format!(
        "{}interface {} {{\n{}\n}}",
        export_prefix(exported),
        object.name,
        props.join("\n")
    )
}

pub fn type_alias(name: &str, ty: &str, exported: bool) -> String {
    format!("{}type {name} = {ty};", export_prefix(exported))
}

/// Render every registered object in discovery order.
///
/// With `wrapper` set, the object carrying that name is the synthetic
/// `{"root": [...]}` wrapper: it is replaced by a type alias for its `root`
/// property and not emitted as an interface.
pub fn render(schema: &Schema, exported: bool, wrapper: Option<&str>) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(schema.len());
    if let Some(wrapper) = wrapper {
        let root = schema
            .objects()
            .map(|(_, object)| object)
            .find(|object| object.name == wrapper);
        if let Some(object) = root {
            let ty = object
                .props
                .get(WRAPPER_KEY)
                .map(|prop| property_type(schema, prop))
                .unwrap_or_else(|| "unknown".to_string());
            blocks.push(type_alias(&object.name, &ty, exported));
        }
    }
    blocks.extend(
        schema
            .objects()
            .filter(|(_, object)| Some(object.name.as_str()) != wrapper)
            .map(|(_, object)| interface(schema, object, exported)),
    );
    blocks.join("\n\n")
}
