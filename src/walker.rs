//! Depth-first traversal that drives a [`Generator`].
use serde_json::Value;

use crate::error::Result;
use crate::generator::{Generator, Primitive};

/// Key of the single property the synthetic wrapper object holds for a
/// top-level array.
pub const WRAPPER_KEY: &str = "root";

/// Walk `value` in key/index order, pairing every enter with its exit.
///
/// Recursion follows the input nesting; there is no depth limit.
pub fn walk(value: &Value, generator: &mut Generator) -> Result<()> {
    match value {
        Value::Array(items) => walk_array(items, generator),
        Value::Object(map) => {
            generator.enter_object()?;
            generator.list_properties(map.keys());
            for (key, child) in map {
                generator.enter_property(key)?;
                walk(child, generator)?;
                generator.exit();
            }
            generator.exit();
            Ok(())
        }
        primitive => {
            let ty = Primitive::of(primitive).unwrap_or(Primitive::Null);
            generator.add_type(ty)
        }
    }
}

fn walk_array<'a, I>(items: I, generator: &mut Generator) -> Result<()>
where
    I: IntoIterator<Item = &'a Value>,
{
    generator.enter_array();
    for item in items {
        walk(item, generator)?;
    }
    generator.exit();
    Ok(())
}

/// Walk `items` as if they were the array in `{"root": [items...]}`.
///
/// Produces the same events as wrapping the array and calling [`walk`], so
/// a bare top-level array goes through the object machinery.
pub fn walk_wrapped<'a, I>(items: I, generator: &mut Generator) -> Result<()>
where
    I: IntoIterator<Item = &'a Value>,
{
    generator.enter_object()?;
    generator.list_properties([WRAPPER_KEY]);
    generator.enter_property(WRAPPER_KEY)?;
    walk_array(items, generator)?;
    generator.exit();
    generator.exit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn walked(value: &Value) -> Generator {
        let mut generator = Generator::new("RootObject");
        walk(value, &mut generator).unwrap();
        assert_eq!(generator.depth(), 0, "enter/exit must balance");
        generator
    }

    #[test]
    fn objects_in_arrays_collapse_to_one_shape() {
        let generator = walked(&json!({"val": [{"str": "a"}, {"str": "b", "n": 1}]}));
        let names: Vec<_> = generator.schema().objects().map(|(_, o)| o.name.as_str()).collect();
        assert_eq!(names, ["RootObject", "Val"]);
    }

    #[test]
    fn property_order_is_key_order() {
        let generator = walked(&json!({"z": 1, "a": 2, "m": 3}));
        let schema = generator.schema();
        let root = schema.lookup(&[]).unwrap();
        let keys: Vec<_> = schema.object(root).props.keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn primitive_at_top_level_is_misuse() {
        let mut generator = Generator::new("RootType");
        let err = walk(&json!(1), &mut generator).unwrap_err();
        assert!(err.is_structural_misuse());
    }

    #[test]
    fn wrapped_walk_matches_literal_wrapper() {
        let items = json!([{"a": 1}, "x"]);
        let mut direct = Generator::new("RootObject");
        walk_wrapped(items.as_array().unwrap(), &mut direct).unwrap();
        let literal = walked(&json!({"root": items}));

        let describe = |g: &Generator| {
            g.schema()
                .objects()
                .map(|(path, o)| (path.clone(), o.name.clone(), o.props.keys().cloned().collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        };
        assert_eq!(describe(&direct), describe(&literal));
        assert_eq!(direct.root_name(), Some("RootObject"));
    }
}
