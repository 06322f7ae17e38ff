// Core library for the Waymark action model
// Controller discovery, the application model and its conventions,
// attribute route composition, action descriptors and action selection.

pub mod action_attribute_route;
pub mod action_selector;
pub mod application_model;
pub mod attribute_route;
pub mod collection;
pub mod controller_registry;
pub mod conventions;
pub mod descriptor;
pub mod descriptor_builder;
pub mod descriptor_provider;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod filters;
pub mod metadata;
pub mod model_factory;
pub mod model_metadata;
pub mod model_provider;
pub mod options;
pub mod route_template;

// Used by `register_controller!`
#[doc(hidden)]
pub use inventory;

// Re-export commonly used types
pub use action_attribute_route::flatten_selectors;
pub use action_selector::{ActionSelector, RequestContext};
pub use application_model::*;
pub use attribute_route::{
    AttributeRouteInfo, AttributeRouteModel, OutboundParameterTransformer,
    SlugifyParameterTransformer, TokenValues,
};
pub use collection::{ActionDescriptorCollection, ActionDescriptorCollectionProvider};
pub use conventions::{
    ActionModelConvention, ApplicationModelConvention, ControllerModelConvention,
    ConventionRegistry, ParameterModelConvention,
};
pub use descriptor::{ActionDescriptor, ParameterDescriptor, RouteValues};
pub use descriptor_provider::{
    ActionDescriptorProvider, ActionDescriptorProviderContext, ControllerActionDescriptorProvider,
};
pub use discovery::*;
pub use error::{Error, Result, TemplateSyntax};
pub use filters::{FilterDescriptor, FilterKind, FilterMetadata, FilterScope};
pub use metadata::{HttpMethod, HttpMethodAttribute, Metadata, MetadataList, RouteAttribute};
pub use model_factory::{
    ApplicationModelFactory, ApplicationModelProvider, ApplicationModelProviderContext,
};
pub use model_metadata::{DefaultModelMetadataProvider, ModelMetadataProvider};
pub use model_provider::DefaultApplicationModelProvider;
pub use options::{ApiBehaviorOptions, MvcOptions, MvcSettings};
