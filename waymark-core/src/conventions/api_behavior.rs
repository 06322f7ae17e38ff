//! Behaviours applied to controllers marked as API controllers.
//!
//! A controller is an API controller when it, or the application part that
//! contains it, carries `ApiController` metadata. Every action of such a
//! controller must be attribute routed.

use super::ActionModelConvention;
use super::api_convention::{ApiConventionApplicationModelConvention, ApiConventionCatalog};
use super::filter_conventions::{
    ClientErrorResultFilterConvention, ConsumesConstraintForFormFileParameterConvention,
    InvalidModelStateFilterConvention,
};
use super::infer_binding::InferParameterBindingInfoConvention;
use crate::application_model::{ActionId, ApplicationModel, ControllerModel, ErrorResponseType};
use crate::error::{Error, Result};
use crate::model_factory::{ApplicationModelProvider, ApplicationModelProviderContext};
use crate::model_metadata::ModelMetadataProvider;
use crate::model_provider::DefaultApplicationModelProvider;
use crate::options::ApiBehaviorOptions;
use std::sync::Arc;

/// Makes actions visible to API explorers unless configured otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApiVisibilityConvention;

impl ActionModelConvention for ApiVisibilityConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        let controller_visibility = app.controller_of(action).api_explorer.is_visible;
        let model = app.action_mut(action);
        if controller_visibility.is_none() && model.api_explorer.is_visible.is_none() {
            model.api_explorer.is_visible = Some(true);
        }
        Ok(())
    }
}

pub fn is_api_controller(controller: &ControllerModel) -> bool {
    controller.metadata.is_api_controller() || controller.part.metadata.is_api_controller()
}

pub struct ApiBehaviorApplicationModelProvider {
    action_conventions: Vec<Arc<dyn ActionModelConvention>>,
    infer_binding: Option<Arc<InferParameterBindingInfoConvention>>,
}

impl ApiBehaviorApplicationModelProvider {
    pub const ORDER: i32 = DefaultApplicationModelProvider::ORDER + 100;

    pub fn new(
        options: &ApiBehaviorOptions,
        catalog: ApiConventionCatalog,
        metadata: Arc<dyn ModelMetadataProvider>,
    ) -> Self {
        let mut action_conventions: Vec<Arc<dyn ActionModelConvention>> =
            vec![Arc::new(ApiVisibilityConvention)];

        if !options.suppress_map_client_errors {
            action_conventions.push(Arc::new(ClientErrorResultFilterConvention));
        }
        if !options.suppress_model_state_invalid_filter {
            action_conventions.push(Arc::new(InvalidModelStateFilterConvention));
        }
        if !options.suppress_consumes_constraint_for_form_file_parameters {
            action_conventions.push(Arc::new(ConsumesConstraintForFormFileParameterConvention));
        }

        let default_error_type = if options.suppress_map_client_errors {
            ErrorResponseType::VOID
        } else {
            ErrorResponseType::PROBLEM_DETAILS
        };
        action_conventions.push(Arc::new(ApiConventionApplicationModelConvention::new(
            catalog,
            ErrorResponseType::new(default_error_type),
        )));

        let infer_binding = (!options.suppress_infer_binding_sources_for_parameters).then(|| {
            Arc::new(
                InferParameterBindingInfoConvention::new(metadata).with_collections_from_query(
                    options.allow_inferring_binding_source_for_collection_types_as_from_query,
                ),
            )
        });
        if let Some(infer) = &infer_binding {
            action_conventions.push(Arc::clone(infer) as Arc<dyn ActionModelConvention>);
        }

        Self {
            action_conventions,
            infer_binding,
        }
    }

    fn ensure_attribute_routed(app: &ApplicationModel, action: ActionId) -> Result<()> {
        if app.controller_of(action).has_attribute_routes() || app.action(action).has_attribute_routes() {
            return Ok(());
        }
        Err(Error::AttributeRouteRequired {
            action: app.action_display_name(action),
        })
    }
}

impl ApplicationModelProvider for ApiBehaviorApplicationModelProvider {
    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn on_providers_executing(&self, context: &mut ApplicationModelProviderContext) -> Result<()> {
        let app = &mut context.result;

        for controller in app.controller_ids() {
            if !is_api_controller(app.controller(controller)) {
                continue;
            }

            if let Some(infer) = &self.infer_binding {
                infer.infer_property_prefixes(app, controller);
            }

            let actions = app.controller(controller).actions.clone();
            for action in actions {
                Self::ensure_attribute_routed(app, action)?;
                for convention in &self.action_conventions {
                    convention.apply(app, action)?;
                }
            }

            waymark_log::trace!(
                "Applied API behaviours to '{}'",
                app.controller(controller).controller_name
            );
        }

        Ok(())
    }
}
