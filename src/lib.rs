// Waymark - controller discovery, application models and action selection
//
// Controllers are discovered from application parts, turned into a mutable
// application model, shaped by conventions, and flattened into immutable
// action descriptors that request routing selects from.

// Re-export core functionality
pub use waymark_core::*;

// Logging macros and switches
pub use waymark_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use waymark_config;

#[cfg(feature = "testing")]
pub use waymark_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ActionDescriptor, ActionDescriptorCollection, ActionDescriptorCollectionProvider,
        ActionDescriptorProvider, ActionModelConvention, ActionSelector, ApiBehaviorOptions,
        ApplicationModel, ApplicationModelFactory, ApplicationPart, ApplicationPartManager,
        BindingSource, ControllerActionDescriptorProvider, ControllerModelConvention,
        ControllerType, DefaultModelMetadataProvider, Error, HttpMethod, Metadata, MethodInfo,
        MvcOptions, ParameterInfo, RequestContext, Result, RouteValueList, TypeRef,
    };

    #[cfg(feature = "config")]
    pub use waymark_config::{OptionsLoader, WaymarkSettings};
}

use std::sync::Arc;

/// Wire the default pipeline: the controller descriptor provider over
/// `parts`, built with the default model providers and `options`.
pub fn descriptor_pipeline(
    parts: Arc<ApplicationPartManager>,
    options: &MvcOptions,
    api_options: &ApiBehaviorOptions,
) -> ActionDescriptorCollectionProvider {
    let factory = ApplicationModelFactory::with_defaults(
        options,
        api_options,
        Arc::new(DefaultModelMetadataProvider),
    );
    let providers: Vec<Arc<dyn ActionDescriptorProvider>> = vec![Arc::new(
        ControllerActionDescriptorProvider::new(Arc::clone(&parts), factory),
    )];
    ActionDescriptorCollectionProvider::new(providers, parts)
}

/// Like [`descriptor_pipeline`], taking options from configuration.
#[cfg(feature = "config")]
pub fn descriptor_pipeline_from_settings(
    parts: Arc<ApplicationPartManager>,
    settings: &waymark_config::WaymarkSettings,
) -> ActionDescriptorCollectionProvider {
    descriptor_pipeline(parts, &settings.mvc_options(), &settings.api)
}
