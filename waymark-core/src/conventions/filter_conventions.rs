//! Conventions that attach filters to API actions.

use super::ActionModelConvention;
use crate::application_model::{ActionConstraint, ActionId, ApplicationModel, BindingSource};
use crate::error::Result;
use crate::filters::{FilterKind, FilterMetadata, names};

/// Runs before user filters with the default order.
pub const API_FILTER_ORDER: i32 = -2000;

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Maps client error status codes to problem responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientErrorResultFilterConvention;

impl ActionModelConvention for ClientErrorResultFilterConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        app.action_mut(action).filters.push(
            FilterMetadata::new(names::CLIENT_ERROR_RESULT, FilterKind::Result).with_order(API_FILTER_ORDER),
        );
        Ok(())
    }
}

/// Short-circuits requests whose model state is invalid.
#[derive(Clone, Copy, Debug, Default)]
pub struct InvalidModelStateFilterConvention;

impl ActionModelConvention for InvalidModelStateFilterConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        app.action_mut(action).filters.push(
            FilterMetadata::new(names::MODEL_STATE_INVALID, FilterKind::Action).with_order(API_FILTER_ORDER),
        );
        Ok(())
    }
}

/// Actions that receive uploaded files must accept `multipart/form-data`,
/// unless they already declare what they consume.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsumesConstraintForFormFileParameterConvention;

impl ActionModelConvention for ConsumesConstraintForFormFileParameterConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        if app.action(action).filters.iter().any(FilterMetadata::is_consumes) {
            return Ok(());
        }

        let has_form_file = app
            .parameters_of(action)
            .any(|p| p.binding_source() == Some(BindingSource::FormFile));
        if !has_form_file {
            return Ok(());
        }

        let model = app.action_mut(action);
        model
            .filters
            .push(FilterMetadata::consumes(vec![MULTIPART_FORM_DATA.to_string()]));
        for selector in &mut model.selectors {
            let constrained = selector
                .action_constraints
                .iter()
                .any(|c| matches!(c, ActionConstraint::Consumes(_)));
            if !constrained {
                selector
                    .action_constraints
                    .push(ActionConstraint::Consumes(vec![MULTIPART_FORM_DATA.to_string()]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_model::{
        ActionModel, BindingInfo, ControllerModel, ParameterModel, PropertyBag, SelectorModel,
    };
    use crate::discovery::{ApplicationPart, ControllerType, MethodInfo, TypeRef};
    use crate::metadata::MetadataList;
    use std::sync::Arc;

    fn app(sources: &[BindingSource]) -> (ApplicationModel, ActionId) {
        let mut app = ApplicationModel::new();
        let controller = app.add_controller(ControllerModel::new(
            Arc::new(ControllerType::new("UploadsController")),
            Arc::new(ApplicationPart::new("App")),
        ));
        let mut action = ActionModel::new(controller, Arc::new(MethodInfo::new("Upload")), "Upload".into());
        action.selectors.push(SelectorModel::new());
        let action = app.add_action(action);
        for (i, source) in sources.iter().enumerate() {
            app.add_parameter(ParameterModel {
                action,
                parameter_name: format!("p{i}"),
                ty: TypeRef::form_file(),
                metadata: MetadataList::default(),
                binding_info: Some(BindingInfo {
                    binding_source: Some(*source),
                    binder_model_name: None,
                }),
                is_params: false,
                properties: PropertyBag::new(),
            });
        }
        (app, action)
    }

    #[test]
    fn test_form_file_adds_consumes_once() {
        let (mut app, action) = app(&[BindingSource::FormFile, BindingSource::FormFile]);
        ConsumesConstraintForFormFileParameterConvention
            .apply(&mut app, action)
            .unwrap();
        ConsumesConstraintForFormFileParameterConvention
            .apply(&mut app, action)
            .unwrap();

        let model = app.action(action);
        assert_eq!(model.filters.iter().filter(|f| f.is_consumes()).count(), 1);
        assert_eq!(model.selectors[0].action_constraints.len(), 1);
    }

    #[test]
    fn test_no_form_file_no_consumes() {
        let (mut app, action) = app(&[BindingSource::Query]);
        ConsumesConstraintForFormFileParameterConvention
            .apply(&mut app, action)
            .unwrap();
        assert!(app.action(action).filters.is_empty());
    }

    #[test]
    fn test_api_filters_run_early() {
        let (mut app, action) = app(&[]);
        ClientErrorResultFilterConvention.apply(&mut app, action).unwrap();
        InvalidModelStateFilterConvention.apply(&mut app, action).unwrap();
        let filters = &app.action(action).filters;
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|f| f.order == API_FILTER_ORDER));
    }
}
