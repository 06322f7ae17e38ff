//! Shapes of candidate controllers and the parts that contain them.
//!
//! Controllers are described as data rather than discovered by reflection:
//! a [`ControllerType`] lists its methods, parameters, properties and
//! metadata. Types are grouped into [`ApplicationPart`]s, which can carry
//! part-wide metadata such as `ApiController`.

use crate::metadata::{Metadata, MetadataList};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a type participates in model binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Converted from a single string (`i32`, `String`, `Guid`, ...).
    Simple,
    /// Bound property by property.
    Complex,
    Collection(Box<TypeRef>),
    FormFile,
    FormFileCollection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeRef {
    /// Root of the type hierarchy; every type is assignable to it.
    pub const OBJECT: &'static str = "object";

    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Simple,
        }
    }

    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Complex,
        }
    }

    pub fn collection_of(element: TypeRef) -> Self {
        Self {
            name: format!("{}[]", element.name),
            kind: TypeKind::Collection(Box::new(element)),
        }
    }

    pub fn form_file() -> Self {
        Self {
            name: "IFormFile".to_string(),
            kind: TypeKind::FormFile,
        }
    }

    pub fn form_file_collection() -> Self {
        Self {
            name: "IFormFileCollection".to_string(),
            kind: TypeKind::FormFileCollection,
        }
    }

    pub fn object() -> Self {
        Self::complex(Self::OBJECT)
    }

    pub fn void() -> Self {
        Self::simple("void")
    }

    pub fn is_object(&self) -> bool {
        self.name == Self::OBJECT
    }

    /// A value of `other` can be stored in a slot of this type.
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        self.is_object() || self.name == other.name
    }
}

#[derive(Clone, Debug)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeRef,
    pub metadata: MetadataList,
    /// Trailing variadic parameter.
    pub is_params: bool,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            metadata: MetadataList::default(),
            is_params: false,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct PropertyInfo {
    pub name: String,
    pub ty: TypeRef,
    pub metadata: MetadataList,
    pub is_public: bool,
    pub has_public_setter: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            metadata: MetadataList::default(),
            is_public: true,
            has_public_setter: true,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: TypeRef,
    pub metadata: MetadataList,
    pub is_public: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_generic: bool,
    /// Compiler-generated accessors and operators.
    pub is_special_name: bool,
    /// Declared by the root object type (`ToString`, `Equals`, ...).
    pub declared_on_object: bool,
    /// The method this one overrides, if any.
    pub base_method: Option<Box<MethodInfo>>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeRef::void(),
            metadata: MetadataList::default(),
            is_public: true,
            is_static: false,
            is_abstract: false,
            is_generic: false,
            is_special_name: false,
            declared_on_object: false,
            base_method: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterInfo) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    pub fn overriding(mut self, base: MethodInfo) -> Self {
        self.base_method = Some(Box::new(base));
        self
    }
}

#[derive(Clone, Debug)]
pub struct ControllerType {
    pub name: String,
    pub namespace: Option<String>,
    pub metadata: MetadataList,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
    pub is_public: bool,
    pub is_abstract: bool,
    pub is_generic: bool,
    /// The controller itself implements action filter hooks.
    pub is_action_filter: bool,
    pub is_disposable: bool,
}

impl ControllerType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            metadata: MetadataList::default(),
            methods: Vec::new(),
            properties: Vec::new(),
            is_public: true,
            is_abstract: false,
            is_generic: false,
            is_action_filter: false,
            is_disposable: false,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.properties.push(property);
        self
    }

    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Public, concrete, non-generic, not opted out, and either named
    /// `*Controller` or explicitly marked as a controller.
    pub fn is_controller(&self) -> bool {
        if !self.is_public || self.is_abstract || self.is_generic {
            return false;
        }
        if self.metadata.is_non_controller() {
            return false;
        }
        ends_with_ignore_case(&self.name, "Controller") || self.metadata.is_controller()
    }
}

pub(crate) fn ends_with_ignore_case(value: &str, suffix: &str) -> bool {
    value.len() >= suffix.len()
        && value.is_char_boundary(value.len() - suffix.len())
        && value[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// A unit of discovery, e.g. one library of controllers.
#[derive(Clone, Debug)]
pub struct ApplicationPart {
    pub name: String,
    pub metadata: MetadataList,
    pub types: Vec<Arc<ControllerType>>,
}

impl ApplicationPart {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: MetadataList::default(),
            types: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = metadata.into();
        self
    }

    pub fn with_type(mut self, ty: ControllerType) -> Self {
        self.types.push(Arc::new(ty));
        self
    }
}

/// Something whose content can change and must trigger a rebuild.
pub trait ChangeSource: Send + Sync {
    fn version(&self) -> u64;
}

/// A controller type together with the part that declared it.
#[derive(Clone, Debug)]
pub struct DiscoveredController {
    pub part: Arc<ApplicationPart>,
    pub ty: Arc<ControllerType>,
}

/// Thread-safe list of application parts with a change counter.
#[derive(Debug, Default)]
pub struct ApplicationPartManager {
    parts: RwLock<Vec<Arc<ApplicationPart>>>,
    version: AtomicU64,
}

impl ApplicationPartManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(parts: impl IntoIterator<Item = ApplicationPart>) -> Self {
        let manager = Self::new();
        {
            let mut guard = manager.parts.write();
            guard.extend(parts.into_iter().map(Arc::new));
        }
        manager
    }

    pub fn add_part(&self, part: ApplicationPart) {
        waymark_log::debug!("Adding application part '{}' ({} types)", part.name, part.types.len());
        self.parts.write().push(Arc::new(part));
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns `true` if a part with that name was removed.
    pub fn remove_part(&self, name: &str) -> bool {
        let mut parts = self.parts.write();
        let before = parts.len();
        parts.retain(|p| p.name != name);
        let removed = parts.len() != before;
        if removed {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    pub fn parts(&self) -> Vec<Arc<ApplicationPart>> {
        self.parts.read().clone()
    }

    /// All types across all parts that qualify as controllers.
    pub fn controllers(&self) -> Vec<DiscoveredController> {
        let parts = self.parts.read();
        parts
            .iter()
            .flat_map(|part| {
                part.types
                    .iter()
                    .filter(|ty| ty.is_controller())
                    .map(|ty| DiscoveredController {
                        part: Arc::clone(part),
                        ty: Arc::clone(ty),
                    })
            })
            .collect()
    }
}

impl ChangeSource for ApplicationPartManager {
    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
