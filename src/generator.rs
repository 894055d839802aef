//! Context stack + name registry.
//!
//! The walker drives a [`Generator`] with enter/exit calls; the generator keeps
//! an explicit stack of [`Frame`]s and mutates the [`Schema`] at the top of it.
//! Objects are keyed by their structural path, so every sample that lands on
//! the same path merges into one shape instead of creating a new one.
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{ArrayId, Frame, Object, ObjectId, Property, Schema, StructuralPath, TypeSet};

/// The JSON primitive type names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Number,
    Boolean,
    String,
    Null,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Null => "null",
        }
    }

    /// `None` for arrays and objects.
    pub fn of(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(_) => Some(Self::Number),
            Value::String(_) => Some(Self::String),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a new array node gets attached.
#[derive(Clone, Copy, Debug)]
enum Anchor {
    Array(ArrayId),
    Property(ObjectId, usize),
}

#[derive(Debug)]
pub struct Generator {
    default_root: String,
    schema: Schema,
    names: HashSet<String>,
    stack: Vec<Frame>,
}

impl Generator {
    /// `default_root` names the top-level object.
    pub fn new(default_root: impl Into<String>) -> Self {
        Self {
            default_root: default_root.into(),
            schema: Schema::new(),
            names: HashSet::new(),
            stack: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema { &self.schema }
    pub fn into_schema(self) -> Schema { self.schema }
    pub fn depth(&self) -> usize { self.stack.len() }

    /// Assigned name of the top-level object, once one has been entered.
    pub fn root_name(&self) -> Option<&str> {
        self.schema.lookup(&[]).map(|id| self.schema.object(id).name.as_str())
    }

    fn current(&self) -> Option<Frame> {
        self.stack.last().copied()
    }

    fn nearest_property(&self) -> Option<(ObjectId, usize)> {
        self.stack.iter().rev().find_map(|frame| match *frame {
            Frame::Property { object, index } => Some((object, index)),
            _ => None,
        })
    }

    fn property_key(&self, object: ObjectId, index: usize) -> Option<&str> {
        self.schema.property(object, index).map(|p| p.key.as_str())
    }

    fn path(&self) -> StructuralPath {
        self.stack
            .iter()
            .filter_map(|frame| match *frame {
                Frame::Property { object, index } => self.property_key(object, index).map(str::to_string),
                _ => None,
            })
            .collect()
    }

    fn types_mut(&mut self, frame: Frame) -> Option<&mut TypeSet> {
        match frame {
            Frame::Object(_) => None,
            Frame::Property { object, index } => self.schema.property_mut(object, index).map(|p| &mut p.types),
            Frame::Array(id) => Some(&mut self.schema.array_mut(id).types),
        }
    }

    // ----------------------------- Operations ---------------------------- //

    /// Enter an array anchored on the current array (arrays of arrays) or
    /// else on the nearest enclosing property. The anchor's existing array
    /// node is reused so repeated samples merge.
    pub fn enter_array(&mut self) {
        let anchor = match self.current() {
            Some(Frame::Array(id)) => Some(Anchor::Array(id)),
            _ => self.nearest_property().map(|(object, index)| Anchor::Property(object, index)),
        };
        let existing = match anchor {
            Some(Anchor::Array(id)) => self.schema.array(id).array,
            Some(Anchor::Property(object, index)) => self.schema.property(object, index).and_then(|p| p.array),
            None => None,
        };
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.schema.new_array();
                match anchor {
                    Some(Anchor::Array(parent)) => self.schema.array_mut(parent).array = Some(id),
                    Some(Anchor::Property(object, index)) => {
                        if let Some(prop) = self.schema.property_mut(object, index) {
                            prop.array = Some(id);
                        }
                    }
                    None => trace!("array entered without an anchor"),
                }
                id
            }
        };
        self.stack.push(Frame::Array(id));
    }

    /// Enter an object. Only valid from a property or array context, or on
    /// an empty stack for the top-level object.
    pub fn enter_object(&mut self) -> Result<()> {
        let current = self.current();
        if let Some(Frame::Object(_)) = current {
            return Err(Error::ObjectInObject);
        }

        let path = self.path();
        let id = match self.schema.lookup(&path) {
            Some(id) => {
                trace!(?path, name = %self.schema.object(id).name, "reusing object shape");
                id
            }
            None => {
                let base = match self.nearest_property() {
                    Some((object, index)) => self.property_key(object, index).unwrap_or_default().to_string(),
                    None => self.default_root.clone(),
                };
                let key = naming::sanitize(&base);
                let name = naming::uniq_key(&self.names, &naming::type_name(&key));
                self.names.insert(name.clone());
                debug!(?path, %name, "registered object shape");
                // only a new shape is announced to the enclosing context
                if let Some(types) = current.and_then(|frame| self.types_mut(frame)) {
                    types.insert(name.clone());
                }
                self.schema.register(path, Object { name, key, props: Default::default() })
            }
        };
        self.stack.push(Frame::Object(id));
        Ok(())
    }

    /// Enter (creating on first sight) the property `key` of the current object.
    pub fn enter_property(&mut self, key: &str) -> Result<()> {
        let Some(Frame::Object(object)) = self.current() else {
            return Err(Error::PropertyOutsideObject { key: key.to_string() });
        };
        let entry = self.schema.object_mut(object).props.entry(key.to_string());
        let index = entry.index();
        entry.or_insert_with(|| Property::new(key));
        self.stack.push(Frame::Property { object, index });
        Ok(())
    }

    pub fn add_type(&mut self, ty: Primitive) -> Result<()> {
        let frame = self.current().ok_or(Error::EmptyStack { op: "add_type" })?;
        let types = self.types_mut(frame).ok_or_else(|| Error::TypeOnObject { ty: ty.to_string() })?;
        types.insert(ty.to_string());
        Ok(())
    }

    /// Pop the current context. Pairing is the caller's responsibility.
    pub fn exit(&mut self) -> Option<Frame> {
        self.stack.pop()
    }

    /// Mark every known property of the current object that is missing from
    /// `present` as optional. Keys new to this object are left alone; they
    /// are added, required, when entered.
    pub fn list_properties<I, K>(&mut self, present: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let Some(Frame::Object(object)) = self.current() else {
            trace!("list_properties outside an object context");
            return;
        };
        let present: HashSet<String> = present.into_iter().map(|k| k.as_ref().to_string()).collect();
        let Object { name, props, .. } = self.schema.object_mut(object);
        for prop in props.values_mut() {
            if !prop.optional && !present.contains(&prop.key) {
                debug!(object = %name, key = %prop.key, "property marked optional");
                prop.optional = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop<'a>(schema: &'a Schema, path: &[&str], key: &str) -> &'a Property {
        let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        let id = schema.lookup(&path).expect("object at path");
        schema.object(id).props.get(key).expect("property")
    }

    #[test]
    fn object_cannot_be_entered_from_object() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        assert_eq!(g.enter_object(), Err(Error::ObjectInObject));
    }

    #[test]
    fn type_cannot_be_added_to_object() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        let err = g.add_type(Primitive::String).unwrap_err();
        assert_eq!(err, Error::TypeOnObject { ty: "string".into() });
        assert!(err.is_structural_misuse());
    }

    #[test]
    fn property_requires_object_context() {
        let mut g = Generator::new("RootObject");
        assert!(matches!(g.enter_property("a"), Err(Error::PropertyOutsideObject { .. })));
        g.enter_object().unwrap();
        g.enter_property("a").unwrap();
        assert_eq!(g.enter_property("b"), Err(Error::PropertyOutsideObject { key: "b".into() }));
    }

    #[test]
    fn add_type_on_empty_stack() {
        let mut g = Generator::new("RootObject");
        assert_eq!(g.add_type(Primitive::Null), Err(Error::EmptyStack { op: "add_type" }));
    }

    #[test]
    fn nested_object_name_lands_in_property_types() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        g.enter_property("my-val").unwrap();
        g.enter_object().unwrap();
        g.exit();
        g.exit();
        g.exit();
        assert_eq!(g.depth(), 0);
        let schema = g.schema();
        let p = prop(schema, &[], "my-val");
        assert_eq!(p.types.iter().collect::<Vec<_>>(), ["Myval"]);
        let nested = schema.lookup(&["my-val".to_string()]).unwrap();
        assert_eq!(schema.object(nested).key, "myval");
    }

    #[test]
    fn same_path_reuses_object_and_name() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        g.enter_property("val").unwrap();
        g.enter_array();
        for _ in 0..3 {
            g.enter_object().unwrap();
            g.exit();
        }
        g.exit();
        g.exit();
        g.exit();
        let schema = g.schema();
        assert_eq!(schema.len(), 2);
        let array = schema.array(prop(schema, &[], "val").array.unwrap());
        assert_eq!(array.types.iter().collect::<Vec<_>>(), ["Val"]);
    }

    #[test]
    fn reused_object_is_not_added_to_a_new_anchor() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        g.enter_property("a").unwrap();
        g.enter_array();
        g.enter_array();
        g.enter_object().unwrap();
        g.exit();
        g.exit();
        g.enter_object().unwrap();
        g.exit();
        g.exit();
        g.exit();
        g.exit();
        let schema = g.schema();
        let outer = schema.array(prop(schema, &[], "a").array.unwrap());
        assert!(outer.types.is_empty());
        let inner = schema.array(outer.array.unwrap());
        assert_eq!(inner.types.iter().collect::<Vec<_>>(), ["A"]);
    }

    #[test]
    fn object_key_is_sanitized_and_name_capitalized() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        g.enter_property("9 lives-x").unwrap();
        g.enter_object().unwrap();
        let (_, obj) = g.schema().objects().nth(1).unwrap();
        assert_eq!((obj.key.as_str(), obj.name.as_str()), ("livesx", "Livesx"));
    }

    #[test]
    fn colliding_names_get_suffixes() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        for outer in ["a", "b"] {
            g.enter_property(outer).unwrap();
            g.enter_object().unwrap();
            g.enter_property("item").unwrap();
            g.enter_object().unwrap();
            g.exit();
            g.exit();
            g.exit();
            g.exit();
        }
        g.exit();
        let names: Vec<_> = g.schema().objects().map(|(_, o)| o.name.clone()).collect();
        assert_eq!(names, ["RootObject", "A", "Item", "B", "Item_1"]);
    }

    #[test]
    fn nested_arrays_anchor_on_parent_array() {
        let mut g = Generator::new("RootObject");
        g.enter_object().unwrap();
        g.enter_property("grid").unwrap();
        g.enter_array();
        g.enter_array();
        g.add_type(Primitive::Number).unwrap();
        g.exit();
        g.exit();
        g.exit();
        g.exit();
        let schema = g.schema();
        let outer = schema.array(prop(schema, &[], "grid").array.unwrap());
        assert!(outer.types.is_empty());
        let inner = schema.array(outer.array.unwrap());
        assert!(inner.types.contains("number"));
    }

    #[test]
    fn optional_is_sticky_and_order_dependent() {
        let mut g = Generator::new("RootObject");
        let samples: [&[&str]; 3] = [&["a", "b"], &["a"], &["a", "b", "c"]];
        for keys in samples {
            g.enter_object().unwrap();
            g.list_properties(keys.iter());
            for key in keys {
                g.enter_property(key).unwrap();
                g.add_type(Primitive::Number).unwrap();
                g.exit();
            }
            g.exit();
        }
        let schema = g.schema();
        assert!(!prop(schema, &[], "a").optional);
        assert!(prop(schema, &[], "b").optional);
        // only ever missing from earlier samples
        assert!(!prop(schema, &[], "c").optional);
    }
}
