use serde::{Deserialize, Serialize};

/// Index of a [`CompositeType`] inside its [`Library`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeType {
    pub id: String,
    pub name: String,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub value: VariableValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    Text(String),
    /// Placeholder whose value is fetched later through a path resolve.
    Import,
    Type(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: String,
    pub name: String,
    pub types: Vec<CompositeType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub library: Library,
    pub variables: Vec<Variable>,
}

/// Where a freshly built type gets attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    Root,
    Type(TypeRef),
}

/// A named, unit-tagged series returned by a value resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesValue {
    pub name: String,
    pub unit: String,
    pub values: Vec<f64>,
}

/// Image frame handed back by the source reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub name: String,
    pub index: usize,
    pub location: String,
}

impl CompositeType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_abstract: false,
            variables: Vec::new(),
        }
    }

    pub fn push_text(&mut self, id: impl Into<String>, text: impl Into<String>) {
        let id = id.into();
        self.variables.push(Variable {
            name: id.clone(),
            id,
            value: VariableValue::Text(text.into()),
        });
    }

    pub fn push_import(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.variables.push(Variable {
            name: id.clone(),
            id,
            value: VariableValue::Import,
        });
    }

    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.id == id)
    }
}

impl Variable {
    pub fn type_ref(&self) -> Option<TypeRef> {
        match self.value {
            VariableValue::Type(type_ref) => Some(type_ref),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            VariableValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Library {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            types: Vec::new(),
        }
    }

    pub fn push(&mut self, composite: CompositeType) -> TypeRef {
        self.types.push(composite);
        TypeRef(self.types.len() - 1)
    }

    pub fn get(&self, type_ref: TypeRef) -> Option<&CompositeType> {
        self.types.get(type_ref.0)
    }

    pub fn get_mut(&mut self, type_ref: TypeRef) -> Option<&mut CompositeType> {
        self.types.get_mut(type_ref.0)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&CompositeType> {
        self.types.iter().find(|composite| composite.id == id)
    }

    pub fn ref_by_id(&self, id: &str) -> Option<TypeRef> {
        self.types.iter().position(|composite| composite.id == id).map(TypeRef)
    }
}

impl Model {
    pub fn new(name: impl Into<String>, library: Library) -> Self {
        Self {
            name: name.into(),
            library,
            variables: Vec::new(),
        }
    }

    /// Type referenced by the first root variable, if the model has been built.
    pub fn root_type(&self) -> Option<TypeRef> {
        self.variables.first().and_then(Variable::type_ref)
    }

    pub fn type_of(&self, variable: &Variable) -> Option<&CompositeType> {
        variable.type_ref().and_then(|type_ref| self.library.get(type_ref))
    }
}
