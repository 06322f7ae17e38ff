//! Binding-source inference for API controller actions.

use super::ActionModelConvention;
use crate::action_attribute_route::attribute_routes;
use crate::application_model::{
    ActionId, ApplicationModel, BindingInfo, BindingSource, ControllerId,
};
use crate::discovery::{TypeKind, TypeRef};
use crate::error::{Error, Result};
use crate::model_metadata::ModelMetadataProvider;
use crate::route_template;
use std::sync::Arc;

/// Assigns a binding source to every parameter that has none:
/// `Path` if the name appears in one of the action's routes, else `Body`
/// for complex types, else `Query`.
///
/// More than one `Body` parameter on the same action is an error.
pub struct InferParameterBindingInfoConvention {
    metadata: Arc<dyn ModelMetadataProvider>,
    collections_from_query: bool,
}

impl InferParameterBindingInfoConvention {
    pub fn new(metadata: Arc<dyn ModelMetadataProvider>) -> Self {
        Self {
            metadata,
            collections_from_query: false,
        }
    }

    /// Treat collections of simple elements as query values.
    pub fn with_collections_from_query(mut self, enabled: bool) -> Self {
        self.collections_from_query = enabled;
        self
    }

    fn is_complex(&self, ty: &TypeRef) -> bool {
        if self.collections_from_query && self.metadata.is_collection_type(ty) {
            if let Some(element) = self.metadata.element_type(ty) {
                if !self.metadata.is_complex_type(element) {
                    return false;
                }
            }
        }
        self.metadata.is_complex_type(ty)
    }

    fn infer_sources(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        let routes: Vec<String> = {
            let model = app.action(action);
            attribute_routes(app.controller(model.controller), model)
                .into_iter()
                .flatten()
                .filter_map(|r| r.template)
                .collect()
        };

        let parameter_ids = app.action(action).parameters.clone();
        for id in &parameter_ids {
            if app.parameter(*id).binding_source().is_some() {
                continue;
            }

            let parameter = app.parameter(*id);
            let mut in_route = false;
            for template in &routes {
                if route_template::has_parameter(template, &parameter.parameter_name)? {
                    in_route = true;
                    break;
                }
            }

            let source = if in_route {
                BindingSource::Path
            } else if self.is_complex(&parameter.ty) {
                BindingSource::Body
            } else {
                BindingSource::Query
            };

            let parameter = app.parameter_mut(*id);
            parameter
                .binding_info
                .get_or_insert_with(BindingInfo::default)
                .binding_source = Some(source);
        }

        let body: Vec<String> = parameter_ids
            .iter()
            .map(|id| app.parameter(*id))
            .filter(|p| p.binding_source() == Some(BindingSource::Body))
            .map(|p| p.parameter_name.clone())
            .collect();

        if body.len() > 1 {
            return Err(Error::AmbiguousBodyBinding {
                action: app.action_display_name(action),
                parameters: body,
            });
        }

        Ok(())
    }

    fn wants_empty_prefix(&self, info: &BindingInfo, ty: &TypeRef) -> bool {
        let Some(source) = info.binding_source else {
            return false;
        };
        info.binder_model_name.is_none()
            && !source.is_greedy()
            && !is_form_file(ty)
            && self.metadata.is_complex_type(ty)
            && !self.metadata.is_collection_type(ty)
    }

    fn infer_prefixes(&self, app: &mut ApplicationModel, action: ActionId) {
        let parameter_ids = app.action(action).parameters.clone();
        for id in parameter_ids {
            let parameter = app.parameter(id);
            let apply = parameter
                .binding_info
                .as_ref()
                .is_some_and(|info| self.wants_empty_prefix(info, &parameter.ty));
            if apply {
                if let Some(info) = app.parameter_mut(id).binding_info.as_mut() {
                    info.binder_model_name = Some(String::new());
                }
            }
        }
    }

    /// Same prefix rule for bound controller properties.
    pub fn infer_property_prefixes(&self, app: &mut ApplicationModel, controller: ControllerId) {
        let decisions: Vec<bool> = app
            .controller(controller)
            .controller_properties
            .iter()
            .map(|p| {
                p.binding_info
                    .as_ref()
                    .is_some_and(|info| self.wants_empty_prefix(info, &p.ty))
            })
            .collect();

        let properties = &mut app.controller_mut(controller).controller_properties;
        for (property, apply) in properties.iter_mut().zip(decisions) {
            if let (true, Some(info)) = (apply, property.binding_info.as_mut()) {
                info.binder_model_name = Some(String::new());
            }
        }
    }
}

impl ActionModelConvention for InferParameterBindingInfoConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        self.infer_sources(app, action)?;
        self.infer_prefixes(app, action);
        Ok(())
    }
}

fn is_form_file(ty: &TypeRef) -> bool {
    match &ty.kind {
        TypeKind::FormFile | TypeKind::FormFileCollection => true,
        TypeKind::Collection(element) => matches!(element.kind, TypeKind::FormFile),
        _ => false,
    }
}
