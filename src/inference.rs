//! Entry points: JSON sample(s) in, declaration text out.
//!
//! Each call owns a fresh [`Generator`]; nothing is shared between calls.
use serde_json::Value;
use tracing::debug;

use crate::config::Options;
use crate::error::Result;
use crate::generator::{Generator, Primitive};
use crate::schema::Schema;
use crate::stringify;
use crate::walker::{walk, walk_wrapped};

pub const DEFAULT_OBJECT_ROOT: &str = "RootObject";
pub const DEFAULT_PRIMITIVE_ROOT: &str = "RootType";

/// Result of walking the samples, before rendering.
#[derive(Debug)]
pub enum Inferred {
    /// Top level is a primitive; `None` when there was nothing to observe.
    Primitive { root: String, ty: Option<Primitive> },
    /// Top level is an object, or an array behind the synthetic wrapper
    /// named `wrapper`.
    Model { schema: Schema, wrapper: Option<String> },
}

impl Inferred {
    pub fn render(&self, options: &Options) -> String {
        match self {
            Self::Primitive { root, ty } => {
                let ty = ty.map(Primitive::as_str).unwrap_or("unknown");
                stringify::type_alias(root, ty, options.exported)
            }
            Self::Model { schema, wrapper } => stringify::render(schema, options.exported, wrapper.as_deref()),
        }
    }

    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Self::Model { schema, .. } => Some(schema),
            Self::Primitive { .. } => None,
        }
    }
}

/// Infer from a single JSON value.
pub fn infer_value(json: &Value, options: &Options) -> Result<Inferred> {
    match json {
        Value::Object(_) => {
            let mut generator = Generator::new(options.root_or(DEFAULT_OBJECT_ROOT));
            walk(json, &mut generator)?;
            Ok(Inferred::Model { schema: generator.into_schema(), wrapper: None })
        }
        Value::Array(items) => infer_wrapped(items, options),
        primitive => Ok(Inferred::Primitive {
            root: options.root_or(DEFAULT_PRIMITIVE_ROOT).to_string(),
            ty: Primitive::of(primitive),
        }),
    }
}

/// Infer from several samples of the same document.
///
/// Object samples all merge into the root interface; any other mix is
/// treated as the elements of one top-level array.
pub fn infer_samples(samples: &[Value], options: &Options) -> Result<Inferred> {
    match samples {
        [] => Ok(Inferred::Primitive {
            root: options.root_or(DEFAULT_PRIMITIVE_ROOT).to_string(),
            ty: None,
        }),
        [single] => infer_value(single, options),
        _ if samples.iter().all(Value::is_object) => {
            debug!(samples = samples.len(), "merging object samples at the root");
            let mut generator = Generator::new(options.root_or(DEFAULT_OBJECT_ROOT));
            for sample in samples {
                walk(sample, &mut generator)?;
            }
            Ok(Inferred::Model { schema: generator.into_schema(), wrapper: None })
        }
        _ => {
            debug!(samples = samples.len(), "treating samples as one top-level array");
            infer_wrapped(samples, options)
        }
    }
}

fn infer_wrapped(items: &[Value], options: &Options) -> Result<Inferred> {
    let mut generator = Generator::new(options.root_or(DEFAULT_OBJECT_ROOT));
    walk_wrapped(items, &mut generator)?;
    let wrapper = generator.root_name().map(str::to_string);
    Ok(Inferred::Model { schema: generator.into_schema(), wrapper })
}

/// Generate TypeScript declarations for `json`.
pub fn get_types(json: &Value, options: &Options) -> Result<String> {
    Ok(infer_value(json, options)?.render(options))
}

/// [`get_types`] over one or more samples; see [`infer_samples`].
pub fn get_types_from_samples(samples: &[Value], options: &Options) -> Result<String> {
    Ok(infer_samples(samples, options)?.render(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn types(value: Value) -> String {
        get_types(&value, &Options::default()).unwrap()
    }

    #[test]
    fn primitives() {
        assert_eq!(types(json!(1)), "type RootType = number;");
        assert_eq!(types(json!(1.5)), "type RootType = number;");
        assert_eq!(types(json!("")), "type RootType = string;");
        assert_eq!(types(json!(null)), "type RootType = null;");
        assert_eq!(types(json!(true)), "type RootType = boolean;");
    }

    #[test]
    fn primitive_with_options() {
        let opts = Options::new().with_exported(true).with_root("Flag");
        assert_eq!(get_types(&json!(false), &opts).unwrap(), "export type Flag = boolean;");
    }

    #[test]
    fn sanity_check() {
        assert_eq!(types(json!({"str": ""})), "interface RootObject {\n  str: string;\n}");
    }

    #[test]
    fn root_arrays() {
        assert_eq!(types(json!(["", ""])), "type RootObject = string[];");
        assert_eq!(types(json!(["", ["", ""]])), "type RootObject = Array<string[] | string>;");
        assert_eq!(types(json!(["x", 1])), "type RootObject = Array<string | number>;");
        assert_eq!(types(json!([])), "type RootObject = unknown[];");
        assert_eq!(
            types(json!([{"str": ""}])),
            "type RootObject = Root[];\n\ninterface Root {\n  str: string;\n}"
        );
    }

    #[test]
    fn root_array_with_custom_root_name() {
        let opts = Options::new().with_root("Root");
        assert_eq!(
            get_types(&json!([{"a": 1}]), &opts).unwrap(),
            "type Root = Root_1[];\n\ninterface Root_1 {\n  a: number;\n}"
        );
        let opts = Options::new().with_root("my root");
        assert_eq!(get_types(&json!([1]), &opts).unwrap(), "type Myroot = number[];");
    }

    #[test]
    fn merge_convergence() {
        assert_eq!(types(json!([{"a": 1}, {"a": 2}])), "type RootObject = Root[];\n\ninterface Root {\n  a: number;\n}");
    }

    #[test]
    fn missing_key_optionality() {
        assert_eq!(
            types(json!({"arr": [{"str": "x"}, {}]})),
            "interface RootObject {\n  arr: Arr[];\n}\n\ninterface Arr {\n  str?: string;\n}"
        );
    }

    #[test]
    fn key_only_in_later_sample_stays_required() {
        assert_eq!(
            types(json!({"arr": [{}, {"str": "x"}]})),
            "interface RootObject {\n  arr: Arr[];\n}\n\ninterface Arr {\n  str: string;\n}"
        );
    }

    #[test]
    fn discovery_order_of_interfaces() {
        let out = types(json!({"b": {"inner": {"x": 1}}, "a": {"y": true}}));
        let names: Vec<&str> = out
            .lines()
            .filter_map(|line| line.strip_prefix("interface "))
            .map(|rest| rest.trim_end_matches(" {"))
            .collect();
        assert_eq!(names, ["RootObject", "B", "Inner", "A"]);
    }

    #[test]
    fn reused_shape_stays_on_its_first_anchor() {
        let out = types(json!([{"a": {"x": 1}}, {"a": [{"x": 2}]}]));
        assert_eq!(
            out,
            "type RootObject = Root[];\n\ninterface Root {\n  a: A | unknown[];\n}\n\ninterface A {\n  x: number;\n}"
        );
        let out = types(json!({"a": [[{"x": 1}], {"x": 2}]}));
        assert_eq!(out, "interface RootObject {\n  a: A[][];\n}\n\ninterface A {\n  x: number;\n}");
    }

    #[test]
    fn samples_merge_at_root() {
        let samples = [json!({"id": 1, "name": "a"}), json!({"id": 2})];
        let out = get_types_from_samples(&samples, &Options::default()).unwrap();
        assert_eq!(out, "interface RootObject {\n  id: number;\n  name?: string;\n}");
    }

    #[test]
    fn mixed_samples_become_an_array() {
        let samples = [json!(1), json!({"a": "x"})];
        let out = get_types_from_samples(&samples, &Options::default()).unwrap();
        assert_eq!(out, "type RootObject = Array<number | Root>;\n\ninterface Root {\n  a: string;\n}");
    }

    #[test]
    fn no_samples() {
        assert_eq!(get_types_from_samples(&[], &Options::default()).unwrap(), "type RootType = unknown;");
    }

    #[test]
    fn single_sample_matches_get_types() {
        let value = json!([[1], {"k": null}]);
        let opts = Options::default();
        assert_eq!(
            get_types_from_samples(std::slice::from_ref(&value), &opts).unwrap(),
            get_types(&value, &opts).unwrap()
        );
    }
}
