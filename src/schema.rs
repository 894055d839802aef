//! Schema model built up by the generator.
//!
//! Nodes live in two arenas owned by [`Schema`]; properties are owned by their
//! object. Cross references (a property's array node, an array's nested array,
//! a stack frame) are plain indices, so an object reached again through the
//! same structural path is the *same* entry, found by lookup rather than aliasing.
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};

/// Distinct type names seen at one position. Rendering follows first-seen order.
pub type TypeSet = IndexSet<String>;

/// Property keys from the root down to a position; array indices never appear.
pub type StructuralPath = Vec<String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArrayId(usize);

// ------------------------------- Nodes ----------------------------------- //

#[derive(Clone, Debug)]
pub struct Property {
    pub key: String,
    pub types: TypeSet,
    /// Raised once a later sample at the same path omits the key; never lowered.
    pub optional: bool,
    pub array: Option<ArrayId>,
}

impl Property {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), types: TypeSet::new(), optional: false, array: None }
    }
}

#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    /// Sanitized key the shape was first discovered under (debug only).
    pub key: String,
    pub props: IndexMap<String, Property>,
}

#[derive(Clone, Debug, Default)]
pub struct ArrayNode {
    pub types: TypeSet,
    pub array: Option<ArrayId>,
}

/// One entry of the generator's context stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    Object(ObjectId),
    /// `index` is the property's position in the object's `props`.
    Property { object: ObjectId, index: usize },
    Array(ArrayId),
}

// ------------------------------ Registry --------------------------------- //

#[derive(Clone, Debug, Default)]
pub struct Schema {
    objects: Vec<Object>,
    arrays: Vec<ArrayNode>,
    paths: IndexMap<StructuralPath, ObjectId>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    pub fn object(&self, id: ObjectId) -> &Object { &self.objects[id.0] }
    pub fn object_mut(&mut self, id: ObjectId) -> &mut Object { &mut self.objects[id.0] }

    pub fn array(&self, id: ArrayId) -> &ArrayNode { &self.arrays[id.0] }
    pub fn array_mut(&mut self, id: ArrayId) -> &mut ArrayNode { &mut self.arrays[id.0] }

    pub fn property(&self, object: ObjectId, index: usize) -> Option<&Property> {
        self.object(object).props.get_index(index).map(|(_, p)| p)
    }

    pub fn property_mut(&mut self, object: ObjectId, index: usize) -> Option<&mut Property> {
        self.object_mut(object).props.get_index_mut(index).map(|(_, p)| p)
    }

    pub fn new_array(&mut self) -> ArrayId {
        self.arrays.push(ArrayNode::default());
        ArrayId(self.arrays.len() - 1)
    }

    pub fn lookup(&self, path: &[String]) -> Option<ObjectId> {
        self.paths.get(path).copied()
    }

    /// Store a freshly discovered shape under its structural path.
    pub fn register(&mut self, path: StructuralPath, object: Object) -> ObjectId {
        self.objects.push(object);
        let id = ObjectId(self.objects.len() - 1);
        self.paths.insert(path, id);
        id
    }

    /// Registered objects in discovery order, with their paths.
    pub fn objects(&self) -> impl Iterator<Item = (&StructuralPath, &Object)> {
        self.paths.iter().map(|(path, id)| (path, self.object(*id)))
    }

    pub fn len(&self) -> usize { self.paths.len() }
    pub fn is_empty(&self) -> bool { self.paths.is_empty() }

    // ------------------------------ Debug view ---------------------------- //

    /// JSON view of the model, one entry per object in discovery order.
    pub fn describe(&self) -> Value {
        Value::Array(
            self.objects()
                .map(|(path, object)| json!({
                    "name": object.name,
                    "key": object.key,
                    "path": path,
                    "properties": object.props.values().map(|p| self.describe_property(p)).collect::<Vec<_>>(),
                }))
                .collect(),
        )
    }

    fn describe_property(&self, prop: &Property) -> Value {
        json!({
            "key": prop.key,
            "types": prop.types,
            "optional": prop.optional,
            "array": prop.array.map(|id| self.describe_array(id)),
        })
    }

    fn describe_array(&self, id: ArrayId) -> Value {
        let array = self.array(id);
        json!({
            "types": array.types,
            "array": array.array.map(|nested| self.describe_array(nested)),
        })
    }
}
