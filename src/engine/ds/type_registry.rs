//! Registry of host types exposed to expressions.
//!
//! A `TypeDescriptor` is the engine's view of a host type: named properties,
//! fields, overloaded methods, constructors and enum constants, each backed
//! by closures supplied at registration time. Descriptors are registered in a
//! process-wide table and resolved by name, which is what the constructor,
//! type and array-constructor nodes consult.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::engine::ds::error::{EvaluationError, ValueResult};
use crate::engine::ds::value::{EnumValue, Instance, Value};

pub type TypeHandle = Arc<TypeDescriptor>;

type Getter = Arc<dyn Fn(&Value) -> ValueResult + Send + Sync>;
type Setter = Arc<dyn Fn(&Value, Value) -> Result<(), EvaluationError> + Send + Sync>;
type MethodBody = Arc<dyn Fn(&Value, Vec<Value>) -> ValueResult + Send + Sync>;
type ConstructorBody = Arc<dyn Fn(Vec<Value>) -> ValueResult + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TypeKind {
    Class,
    Primitive,
    Enum,
}

/// Declared type of a parameter, property or field.
#[derive(Clone, PartialEq, Debug)]
pub enum ParamType {
    /// Accepts any non-null value ("object").
    Any,
    Bool,
    Int,
    Float,
    String,
    Date,
    Duration,
    /// A list, optionally with a declared element type name. `List(None)`
    /// accepts any list-like value.
    List(Option<std::string::String>),
    Map,
    /// An instance of the named registered type.
    Object(std::string::String),
    TypeValue,
    Lambda,
}

/// How well an argument value fits a declared parameter type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Debug)]
pub enum ParamMatch {
    None,
    Assignable,
    Exact,
}

impl ParamType {
    /// Primitive kinds reject null and empty-string assignment.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ParamType::Bool | ParamType::Int | ParamType::Float
        )
    }

    pub fn matches(&self, value: &Value) -> ParamMatch {
        match (self, value) {
            (_, Value::Null) => ParamMatch::None,
            (ParamType::Any, _) => ParamMatch::Assignable,
            (ParamType::Bool, Value::Bool(_)) => ParamMatch::Exact,
            (ParamType::Int, Value::Int(_)) => ParamMatch::Exact,
            (ParamType::Float, Value::Float(_)) => ParamMatch::Exact,
            // widening: an integer argument fits a float parameter
            (ParamType::Float, Value::Int(_)) => ParamMatch::Assignable,
            (ParamType::String, Value::String(_)) => ParamMatch::Exact,
            (ParamType::Date, Value::Date(_)) => ParamMatch::Exact,
            (ParamType::Duration, Value::Duration(_)) => ParamMatch::Exact,
            (ParamType::List(want), Value::List(l)) => {
                let have = l.lock().unwrap().element_type.clone();
                match (want, &have) {
                    (Some(w), Some(h)) if w.eq_ignore_ascii_case(h) => ParamMatch::Exact,
                    (None, None) => ParamMatch::Exact,
                    (Some(w), _) if w.eq_ignore_ascii_case("object") => ParamMatch::Assignable,
                    (None, _) | (_, None) => ParamMatch::Assignable,
                    _ => ParamMatch::None,
                }
            }
            (ParamType::Map, Value::Map(_)) => ParamMatch::Exact,
            (ParamType::Object(name), Value::Object(o)) => {
                let ty = o.lock().unwrap().ty.clone();
                if ty.name().eq_ignore_ascii_case(name) {
                    ParamMatch::Exact
                } else if ty.derives_from(name) {
                    ParamMatch::Assignable
                } else {
                    ParamMatch::None
                }
            }
            (ParamType::Object(name), Value::Enum(e)) => {
                if e.ty.name().eq_ignore_ascii_case(name) {
                    ParamMatch::Exact
                } else {
                    ParamMatch::None
                }
            }
            (ParamType::TypeValue, Value::Type(_)) => ParamMatch::Exact,
            (ParamType::Lambda, Value::Lambda(_)) => ParamMatch::Exact,
            _ => ParamMatch::None,
        }
    }
}

/// A method or constructor parameter.
#[derive(Clone)]
pub struct ParamSpec {
    pub ty: ParamType,
    pub nullable: bool,
}

impl ParamSpec {
    pub fn of(ty: ParamType) -> Self {
        let nullable = !ty.is_primitive();
        ParamSpec { ty, nullable }
    }

    pub fn non_null(ty: ParamType) -> Self {
        ParamSpec { ty, nullable: false }
    }
}

/// A property or field exposed by a registered type.
///
/// Slot-backed by default: reads and writes go to the instance's slot map
/// under the member's name. Custom accessor closures override that, which is
/// how computed and static members are expressed.
pub struct PropertyDef {
    pub name: String,
    pub readable: bool,
    pub writable: bool,
    pub is_static: bool,
    pub value_type: ParamType,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl PropertyDef {
    pub fn new(name: &str, value_type: ParamType) -> Self {
        PropertyDef {
            name: name.to_string(),
            readable: true,
            writable: true,
            is_static: false,
            value_type,
            getter: None,
            setter: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_getter(
        mut self,
        getter: impl Fn(&Value) -> ValueResult + Send + Sync + 'static,
    ) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn with_setter(
        mut self,
        setter: impl Fn(&Value, Value) -> Result<(), EvaluationError> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn get(&self, target: &Value) -> ValueResult {
        if let Some(getter) = &self.getter {
            return getter(target);
        }
        match target {
            Value::Object(o) => {
                let instance = o.lock().unwrap();
                Ok(instance.slots.get(&self.name).cloned().unwrap_or(Value::Null))
            }
            _ => Err(EvaluationError::PropertyNotFound(format!(
                "'{}' cannot be read from [{}]",
                self.name, target
            ))),
        }
    }

    pub fn set(&self, target: &Value, value: Value) -> Result<(), EvaluationError> {
        if let Some(setter) = &self.setter {
            return setter(target, value);
        }
        match target {
            Value::Object(o) => {
                let mut instance = o.lock().unwrap();
                instance.slots.insert(self.name.clone(), value);
                Ok(())
            }
            _ => Err(EvaluationError::NotWritable(format!(
                "'{}' cannot be written on [{}]",
                self.name, target
            ))),
        }
    }
}

/// An overloadable method exposed by a registered type.
pub struct MethodDef {
    pub name: String,
    pub params: Vec<ParamSpec>,
    /// The trailing parameter accepts the argument tail, packed into a list.
    pub variadic: bool,
    pub is_static: bool,
    body: MethodBody,
}

impl MethodDef {
    pub fn new(
        name: &str,
        params: Vec<ParamSpec>,
        body: impl Fn(&Value, Vec<Value>) -> ValueResult + Send + Sync + 'static,
    ) -> Self {
        MethodDef {
            name: name.to_string(),
            params,
            variadic: false,
            is_static: false,
            body: Arc::new(body),
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Number of parameters before the variadic tail.
    pub fn fixed_arg_count(&self) -> usize {
        if self.variadic {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    /// Element type of the variadic tail parameter, when declared.
    pub fn variadic_element_type(&self) -> Option<String> {
        if !self.variadic {
            return None;
        }
        match self.params.last() {
            Some(ParamSpec {
                ty: ParamType::List(elem),
                ..
            }) => elem.clone(),
            _ => None,
        }
    }

    pub fn invoke(&self, target: &Value, args: Vec<Value>) -> ValueResult {
        (self.body)(target, args)
    }
}

/// A constructor exposed by a registered type.
pub struct ConstructorDef {
    pub params: Vec<ParamSpec>,
    pub variadic: bool,
    body: ConstructorBody,
}

impl ConstructorDef {
    pub fn new(
        params: Vec<ParamSpec>,
        body: impl Fn(Vec<Value>) -> ValueResult + Send + Sync + 'static,
    ) -> Self {
        ConstructorDef {
            params,
            variadic: false,
            body: Arc::new(body),
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn fixed_arg_count(&self) -> usize {
        if self.variadic {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    pub fn variadic_element_type(&self) -> Option<String> {
        if !self.variadic {
            return None;
        }
        match self.params.last() {
            Some(ParamSpec {
                ty: ParamType::List(elem),
                ..
            }) => elem.clone(),
            _ => None,
        }
    }

    pub fn invoke(&self, args: Vec<Value>) -> ValueResult {
        (self.body)(args)
    }
}

/// The engine's view of a host type.
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    base: Option<String>,
    properties: Vec<Arc<PropertyDef>>,
    fields: Vec<Arc<PropertyDef>>,
    methods: Vec<Arc<MethodDef>>,
    constructors: Vec<Arc<ConstructorDef>>,
    enum_constants: Vec<(String, i64)>,
}

impl TypeDescriptor {
    pub fn new(name: &str) -> Self {
        TypeDescriptor {
            name: name.to_string(),
            kind: TypeKind::Class,
            base: None,
            properties: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    pub fn new_enum(name: &str, constants: &[(&str, i64)]) -> Self {
        let mut desc = TypeDescriptor::new(name);
        desc.kind = TypeKind::Enum;
        desc.enum_constants = constants
            .iter()
            .map(|(n, v)| (n.to_string(), *v))
            .collect();
        desc
    }

    fn new_primitive(name: &str) -> Self {
        let mut desc = TypeDescriptor::new(name);
        desc.kind = TypeKind::Primitive;
        desc
    }

    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Adds a read-write slot-backed property.
    pub fn property(self, name: &str, value_type: ParamType) -> Self {
        self.add_property(PropertyDef::new(name, value_type))
    }

    /// Adds a read-only slot-backed property.
    pub fn read_only_property(self, name: &str, value_type: ParamType) -> Self {
        self.add_property(PropertyDef::new(name, value_type).read_only())
    }

    pub fn add_property(mut self, def: PropertyDef) -> Self {
        self.properties.push(Arc::new(def));
        self
    }

    /// Adds a slot-backed field.
    pub fn field(mut self, name: &str, value_type: ParamType) -> Self {
        self.fields.push(Arc::new(PropertyDef::new(name, value_type)));
        self
    }

    pub fn add_field(mut self, def: PropertyDef) -> Self {
        self.fields.push(Arc::new(def));
        self
    }

    pub fn add_method(mut self, def: MethodDef) -> Self {
        self.methods.push(Arc::new(def));
        self
    }

    pub fn add_constructor(mut self, def: ConstructorDef) -> Self {
        self.constructors.push(Arc::new(def));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// Walks the declared base-name chain looking for `name`.
    pub fn derives_from(&self, name: &str) -> bool {
        let mut base = self.base.clone();
        while let Some(b) = base {
            if b.eq_ignore_ascii_case(name) {
                return true;
            }
            base = match lookup_type(&b) {
                Some(handle) => handle.base.clone(),
                None => None,
            };
        }
        false
    }

    /// Case-insensitive property lookup.
    pub fn find_property(&self, name: &str) -> Option<Arc<PropertyDef>> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Case-insensitive field lookup.
    pub fn find_field(&self, name: &str) -> Option<Arc<PropertyDef>> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// All methods sharing `name`, case-insensitively, in declaration order.
    pub fn methods_named(&self, name: &str) -> Vec<Arc<MethodDef>> {
        self.methods
            .iter()
            .filter(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
            .collect()
    }

    pub fn constructors(&self) -> &[Arc<ConstructorDef>] {
        &self.constructors
    }

    /// Case-insensitive enum-constant lookup, mirroring `Enum.Parse(.., true)`.
    pub fn find_enum_constant(self: &Arc<Self>, name: &str) -> Option<EnumValue> {
        self.enum_constants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, v)| EnumValue {
                ty: self.clone(),
                name: n.clone(),
                value: *v,
            })
    }

    /// Wraps an integral value back into this enum type, preserving a known
    /// constant's name when the value corresponds to one.
    pub fn enum_from_value(self: &Arc<Self>, value: i64) -> EnumValue {
        let name = self
            .enum_constants
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(n, _)| n.clone())
            .unwrap_or_else(|| value.to_string());
        EnumValue {
            ty: self.clone(),
            name,
            value,
        }
    }

    /// Creates a slot-backed instance with every writable slot unset.
    pub fn instantiate(self: &Arc<Self>) -> Value {
        Value::Object(Arc::new(std::sync::Mutex::new(Instance {
            ty: self.clone(),
            slots: HashMap::new(),
        })))
    }

    /// Registers this descriptor and returns its handle.
    pub fn register(self) -> TypeHandle {
        register_type(self)
    }
}

lazy_static! {
    static ref TYPE_REGISTRY: RwLock<HashMap<String, TypeHandle>> =
        RwLock::new(seed_registry());
}

fn seed_registry() -> HashMap<String, TypeHandle> {
    let mut map = HashMap::new();
    for name in &["int", "long", "double", "float", "string", "bool", "date", "duration", "object"] {
        let handle: TypeHandle = Arc::new(TypeDescriptor::new_primitive(name));
        map.insert(name.to_string(), handle);
    }

    // the meta-type: members available on any type value
    let meta = TypeDescriptor::new("Type")
        .add_property(
            PropertyDef::new("Name", ParamType::String)
                .read_only()
                .with_getter(|target| match target {
                    Value::Type(t) => Ok(Value::String(t.name().to_string())),
                    other => Ok(Value::String(other.type_name())),
                }),
        )
        .add_property(
            PropertyDef::new("FullName", ParamType::String)
                .read_only()
                .with_getter(|target| match target {
                    Value::Type(t) => Ok(Value::String(t.name().to_string())),
                    other => Ok(Value::String(other.type_name())),
                }),
        );
    map.insert("type".to_string(), Arc::new(meta));
    map
}

fn lookup_type(name: &str) -> Option<TypeHandle> {
    TYPE_REGISTRY
        .read()
        .unwrap()
        .get(&name.trim().to_ascii_lowercase())
        .cloned()
}

/// Registers a type descriptor under its name, replacing any previous
/// registration. Safe to call at any time; guarded by the registry lock.
pub fn register_type(desc: TypeDescriptor) -> TypeHandle {
    let key = desc.name.to_ascii_lowercase();
    let handle: TypeHandle = Arc::new(desc);
    TYPE_REGISTRY
        .write()
        .unwrap()
        .insert(key, handle.clone());
    handle
}

/// Resolves a type name to a registered descriptor.
pub fn resolve_type(name: &str) -> Result<TypeHandle, EvaluationError> {
    lookup_type(name).ok_or_else(|| {
        EvaluationError::TypeNotFound(format!("Could not resolve type [{}].", name.trim()))
    })
}

/// The meta-type consulted when the context is itself a type value.
pub fn meta_type() -> TypeHandle {
    lookup_type("type").expect("meta-type is seeded at startup")
}

/// Default value of an element type, used when allocating dimensioned arrays.
pub fn default_value_of(element_type: &str) -> Value {
    match element_type.to_ascii_lowercase().as_str() {
        "int" | "long" => Value::Int(0),
        "double" | "float" => Value::Float(0.0),
        "bool" => Value::Bool(false),
        _ => Value::Null,
    }
}

/// Maps a primitive type name to the parameter type used for conversions.
pub fn element_param_type(element_type: &str) -> ParamType {
    match element_type.to_ascii_lowercase().as_str() {
        "int" | "long" => ParamType::Int,
        "double" | "float" => ParamType::Float,
        "bool" => ParamType::Bool,
        "string" => ParamType::String,
        "date" => ParamType::Date,
        "duration" => ParamType::Duration,
        "object" => ParamType::Any,
        other => ParamType::Object(other.to_string()),
    }
}
