// Fluent builders for controller shapes

use waymark_core::{
    BindingSource, ControllerType, FilterKind, FilterMetadata, HttpMethod, HttpMethodAttribute,
    Metadata, MethodInfo, ParameterInfo, RouteAttribute, TypeRef,
};

/// Builds a [`ControllerType`]. The `Controller` suffix is appended to the
/// name unless it is already there.
#[derive(Clone)]
pub struct ControllerTypeBuilder {
    name: String,
    namespace: Option<String>,
    metadata: Vec<Metadata>,
    methods: Vec<MethodInfo>,
}

impl ControllerTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if !name.ends_with("Controller") {
            name.push_str("Controller");
        }
        Self {
            name,
            namespace: None,
            metadata: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Mark as an API controller.
    pub fn api(self) -> Self {
        self.metadata(Metadata::ApiController)
    }

    pub fn route(self, template: impl Into<String>) -> Self {
        self.metadata(Metadata::route(template))
    }

    pub fn named_route(self, template: impl Into<String>, name: impl Into<String>) -> Self {
        self.metadata(Metadata::Route(RouteAttribute::new(template).name(name)))
    }

    pub fn area(self, area: impl Into<String>) -> Self {
        self.metadata(Metadata::area(area))
    }

    pub fn filter(self, name: impl Into<String>, order: i32) -> Self {
        self.metadata(Metadata::Filter(
            FilterMetadata::new(name, FilterKind::Action).with_order(order),
        ))
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.push(metadata);
        self
    }

    pub fn action(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method.build());
        self
    }

    pub fn build(self) -> ControllerType {
        let mut ty = ControllerType::new(self.name).with_metadata(self.metadata);
        if let Some(namespace) = self.namespace {
            ty = ty.with_namespace(namespace);
        }
        self.methods
            .into_iter()
            .fold(ty, |ty, method| ty.with_method(method))
    }
}

/// Builds a [`MethodInfo`].
#[derive(Clone)]
pub struct MethodBuilder {
    name: String,
    metadata: Vec<Metadata>,
    parameters: Vec<ParameterInfo>,
    returns: Option<TypeRef>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Vec::new(),
            parameters: Vec::new(),
            returns: None,
        }
    }

    pub fn get(self, template: impl Into<String>) -> Self {
        self.verb(HttpMethod::Get, Some(template.into()))
    }

    pub fn post(self, template: impl Into<String>) -> Self {
        self.verb(HttpMethod::Post, Some(template.into()))
    }

    pub fn put(self, template: impl Into<String>) -> Self {
        self.verb(HttpMethod::Put, Some(template.into()))
    }

    pub fn delete(self, template: impl Into<String>) -> Self {
        self.verb(HttpMethod::Delete, Some(template.into()))
    }

    /// Constrain the method without contributing a route template.
    pub fn accepts(self, method: HttpMethod) -> Self {
        self.verb(method, None)
    }

    fn verb(self, method: HttpMethod, template: Option<String>) -> Self {
        let attribute = HttpMethodAttribute::new(method);
        let attribute = match template {
            Some(template) => attribute.template(template),
            None => attribute,
        };
        self.metadata(Metadata::HttpMethod(attribute))
    }

    pub fn route(self, template: impl Into<String>) -> Self {
        self.metadata(Metadata::route(template))
    }

    pub fn action_name(self, name: impl Into<String>) -> Self {
        self.metadata(Metadata::ActionName(name.into()))
    }

    pub fn non_action(self) -> Self {
        self.metadata(Metadata::NonAction)
    }

    pub fn consumes(self, content_types: &[&str]) -> Self {
        self.metadata(Metadata::Consumes(
            content_types.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn filter(self, name: impl Into<String>, order: i32) -> Self {
        self.metadata(Metadata::Filter(
            FilterMetadata::new(name, FilterKind::Action).with_order(order),
        ))
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata.push(metadata);
        self
    }

    pub fn param(mut self, parameter: ParameterBuilder) -> Self {
        self.parameters.push(parameter.build());
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn build(self) -> MethodInfo {
        let mut method = MethodInfo::new(self.name).with_metadata(self.metadata);
        if let Some(ty) = self.returns {
            method = method.returns(ty);
        }
        self.parameters
            .into_iter()
            .fold(method, |method, parameter| method.with_parameter(parameter))
    }
}

/// Builds a [`ParameterInfo`].
#[derive(Clone)]
pub struct ParameterBuilder {
    name: String,
    ty: TypeRef,
    metadata: Vec<Metadata>,
}

impl ParameterBuilder {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            metadata: Vec::new(),
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::simple("int"))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::simple("string"))
    }

    pub fn complex(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::complex(type_name))
    }

    pub fn from(mut self, source: BindingSource) -> Self {
        self.metadata.push(Metadata::from_source(source));
        self
    }

    pub fn from_named(mut self, source: BindingSource, name: impl Into<String>) -> Self {
        self.metadata.push(Metadata::BindingSource {
            source,
            name: Some(name.into()),
        });
        self
    }

    pub fn build(self) -> ParameterInfo {
        ParameterInfo::new(self.name, self.ty).with_metadata(self.metadata)
    }
}
