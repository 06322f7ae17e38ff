//! The default application model provider: turns discovered controller
//! types into controller, action and parameter models.

use crate::application_model::{
    ActionConstraint, ActionId, ActionModel, ApiExplorerModel, BindingInfo, ControllerId,
    ControllerModel, ParameterModel, PropertyBag, PropertyModel, SelectorModel,
    action_name_from_method,
};
use crate::attribute_route::AttributeRouteModel;
use crate::discovery::{ControllerType, DiscoveredController, MethodInfo, ParameterInfo, PropertyInfo};
use crate::error::Result;
use crate::filters::{FilterKind, FilterMetadata, names};
use crate::metadata::{Metadata, MetadataList};
use crate::model_factory::{ApplicationModelProvider, ApplicationModelProviderContext};
use crate::model_metadata::ModelMetadataProvider;
use crate::options::MvcOptions;
use std::sync::Arc;

pub struct DefaultApplicationModelProvider {
    global_filters: Vec<FilterMetadata>,
    suppress_async_suffix: bool,
    metadata: Arc<dyn ModelMetadataProvider>,
}

impl DefaultApplicationModelProvider {
    pub const ORDER: i32 = -1000;

    pub fn new(options: &MvcOptions, metadata: Arc<dyn ModelMetadataProvider>) -> Self {
        Self {
            global_filters: options.filters.clone(),
            suppress_async_suffix: options.settings.suppress_async_suffix_in_action_names,
            metadata,
        }
    }

    fn create_controller_model(&self, discovered: &DiscoveredController) -> ControllerModel {
        let ty = &discovered.ty;
        let mut controller = ControllerModel::new(Arc::clone(ty), Arc::clone(&discovered.part));

        controller.selectors = create_selectors(ty.metadata.as_slice());
        controller.filters = filters_from(&ty.metadata);
        for (key, value) in ty.metadata.route_values() {
            controller.route_values.set(key, value);
        }
        controller.api_explorer = api_explorer_from(&ty.metadata);

        if ty.is_action_filter {
            controller.filters.push(FilterMetadata::new(
                names::CONTROLLER_ACTION,
                FilterKind::ControllerDelegating,
            ));
        }

        controller
    }

    fn create_property_model(
        &self,
        controller: ControllerId,
        ty: &ControllerType,
        property: &PropertyInfo,
    ) -> Option<PropertyModel> {
        if !property.is_public {
            return None;
        }

        let mut binding_info = self.binding_info(&property.metadata, &property.ty);
        if binding_info.is_none() && property.metadata.iter().any(|m| matches!(m, Metadata::BindProperty)) {
            binding_info = Some(BindingInfo::default());
        }
        if binding_info.is_none() && ty.metadata.has_bind_properties() && property.has_public_setter {
            binding_info = Some(BindingInfo::default());
        }

        Some(PropertyModel {
            controller,
            property_name: property.name.clone(),
            ty: property.ty.clone(),
            metadata: property.metadata.clone(),
            binding_info,
            properties: PropertyBag::new(),
        })
    }

    fn create_action_model(&self, controller: ControllerId, method: &MethodInfo) -> Option<ActionModel> {
        if !is_action(method) {
            return None;
        }

        let mut action = ActionModel::new(controller, Arc::new(method.clone()), String::new());
        action.action_name = match method.metadata.action_name() {
            Some(name) => name.to_string(),
            None => action_name_from_method(&method.name, self.suppress_async_suffix).to_string(),
        };
        action.filters = filters_from(&method.metadata);
        action.api_explorer = api_explorer_from(&method.metadata);
        for (key, value) in method.metadata.route_values() {
            action.route_values.set(key, value);
        }

        // Routes come from the method itself or the closest overridden
        // method that declares any.
        let route_source = route_defining_method(method);
        let mut applicable: Vec<Metadata> = method
            .metadata
            .iter()
            .filter(|m| !m.is_route_template_provider())
            .cloned()
            .collect();
        applicable.extend(route_source.metadata.route_template_providers().cloned());

        action.selectors = create_selectors(&applicable);
        Some(action)
    }

    fn create_parameter_model(&self, action: ActionId, parameter: &ParameterInfo) -> ParameterModel {
        ParameterModel {
            action,
            parameter_name: parameter.name.clone(),
            ty: parameter.ty.clone(),
            metadata: parameter.metadata.clone(),
            binding_info: self.binding_info(&parameter.metadata, &parameter.ty),
            is_params: parameter.is_params,
            properties: PropertyBag::new(),
        }
    }

    /// Declared binding info, completed with what the type implies.
    fn binding_info(&self, metadata: &MetadataList, ty: &crate::discovery::TypeRef) -> Option<BindingInfo> {
        let declared = BindingInfo::from_metadata(metadata);
        let implied = self.metadata.binding_source(ty);
        match (declared, implied) {
            (Some(mut info), implied) => {
                if info.binding_source.is_none() {
                    info.binding_source = implied;
                }
                Some(info)
            }
            (None, Some(source)) => Some(BindingInfo {
                binding_source: Some(source),
                binder_model_name: None,
            }),
            (None, None) => None,
        }
    }
}

impl ApplicationModelProvider for DefaultApplicationModelProvider {
    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn on_providers_executing(&self, context: &mut ApplicationModelProviderContext) -> Result<()> {
        let app = &mut context.result;
        app.filters.extend(self.global_filters.iter().cloned());

        for discovered in &context.controllers {
            let controller = app.add_controller(self.create_controller_model(discovered));
            let ty = &discovered.ty;

            for property in &ty.properties {
                if let Some(model) = self.create_property_model(controller, ty, property) {
                    app.controller_mut(controller).controller_properties.push(model);
                }
            }

            for method in &ty.methods {
                let Some(action) = self.create_action_model(controller, method) else {
                    continue;
                };
                let action = app.add_action(action);
                for parameter in &method.parameters {
                    let model = self.create_parameter_model(action, parameter);
                    app.add_parameter(model);
                }
            }

            waymark_log::trace!(
                "Controller '{}' yielded {} actions",
                ty.name,
                app.controller(controller).actions.len()
            );
        }

        waymark_log::debug!(
            "Default model provider discovered {} controllers",
            context.controllers.len()
        );
        Ok(())
    }
}

/// Public instance methods that are not opted out, compiler generated,
/// inherited from the root object, or `Dispose`.
pub fn is_action(method: &MethodInfo) -> bool {
    if method.is_special_name {
        return false;
    }
    if base_chain(method).any(|m| m.metadata.is_non_action()) {
        return false;
    }
    if base_chain(method).any(|m| m.declared_on_object) {
        return false;
    }
    if method.name == "Dispose" && method.parameters.is_empty() {
        return false;
    }
    if method.is_static || method.is_abstract || method.is_generic {
        return false;
    }
    method.is_public
}

fn base_chain(method: &MethodInfo) -> impl Iterator<Item = &MethodInfo> {
    std::iter::successors(Some(method), |m| m.base_method.as_deref())
}

fn route_defining_method(method: &MethodInfo) -> &MethodInfo {
    base_chain(method)
        .find(|m| m.metadata.route_template_providers().next().is_some())
        .unwrap_or(method)
}

fn filters_from(metadata: &MetadataList) -> Vec<FilterMetadata> {
    metadata
        .iter()
        .filter_map(|m| match m {
            Metadata::Filter(filter) => Some(filter.clone()),
            Metadata::Consumes(types) => Some(FilterMetadata::consumes(types.clone())),
            _ => None,
        })
        .collect()
}

fn api_explorer_from(metadata: &MetadataList) -> ApiExplorerModel {
    let mut model = ApiExplorerModel::default();
    if let Some((ignore, group)) = metadata.api_explorer_settings() {
        model.is_visible = ignore.map(|ignore| !ignore);
        model.group_name = group.map(str::to_string);
    }
    model
}

/// One selector per route-defining attribute, plus one for the silent
/// ones (bare `HttpGet` and friends) unless a plain route absorbs them.
pub fn create_selectors(metadata: &[Metadata]) -> Vec<SelectorModel> {
    let mut route_providers: Vec<usize> = Vec::new();
    let mut has_silent = false;

    for (i, item) in metadata.iter().enumerate() {
        if let Some(provider) = item.route_template_provider() {
            if provider.is_silent() {
                has_silent = true;
            } else {
                route_providers.push(i);
            }
        }
    }

    // A plain `Route` absorbs the silent HTTP method attributes.
    if route_providers
        .iter()
        .any(|i| !matches!(metadata[*i], Metadata::HttpMethod(_)))
    {
        has_silent = false;
    }

    if route_providers.is_empty() && !has_silent {
        return vec![create_selector_model(None, metadata.iter())];
    }

    let mut selectors = Vec::new();
    for &route_index in &route_providers {
        let route = &metadata[route_index];
        let route_is_http = matches!(route, Metadata::HttpMethod(_));

        let filtered = metadata.iter().enumerate().filter_map(|(i, item)| {
            if i == route_index {
                Some(item)
            } else if route_providers.contains(&i) {
                None
            } else if route_is_http && matches!(item, Metadata::HttpMethod(_)) {
                None
            } else {
                Some(item)
            }
        });
        selectors.push(create_selector_model(Some(route), filtered));
    }

    if has_silent {
        let filtered = metadata
            .iter()
            .enumerate()
            .filter(|(i, _)| !route_providers.contains(i))
            .map(|(_, item)| item);
        selectors.push(create_selector_model(None, filtered));
    }

    selectors
}

fn create_selector_model<'a>(
    route: Option<&Metadata>,
    metadata: impl Iterator<Item = &'a Metadata>,
) -> SelectorModel {
    let mut selector = SelectorModel::new();
    selector.attribute_route_model = route
        .and_then(Metadata::route_template_provider)
        .map(|provider| AttributeRouteModel::from_provider(&provider));

    let mut methods: Vec<String> = Vec::new();
    for item in metadata {
        match item {
            Metadata::Consumes(types) => selector
                .action_constraints
                .push(ActionConstraint::Consumes(types.clone())),
            Metadata::Constraint(constraint) => selector.action_constraints.push(constraint.clone()),
            _ => {}
        }
        if let Some(item_methods) = item.http_methods() {
            for method in item_methods {
                if !methods.iter().any(|m| m.eq_ignore_ascii_case(method)) {
                    methods.push(method.clone());
                }
            }
        }
        selector.endpoint_metadata.push(item.clone());
    }

    if !methods.is_empty() {
        selector
            .action_constraints
            .push(ActionConstraint::HttpMethod(methods.clone()));
        selector.endpoint_metadata.push(Metadata::AllowedMethods(methods));
    }

    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{ApplicationPart, TypeRef};
    use crate::metadata::{HttpMethod, HttpMethodAttribute, RouteAttribute};
    use crate::model_metadata::DefaultModelMetadataProvider;
    use crate::application_model::{ApplicationModel, BindingSource};

    fn templates(selectors: &[SelectorModel]) -> Vec<Option<&str>> {
        selectors
            .iter()
            .map(|s| s.attribute_route_model.as_ref().and_then(|r| r.template.as_deref()))
            .collect()
    }

    #[test]
    fn test_selectors_without_routes() {
        let selectors = create_selectors(&[Metadata::Custom {
            kind: "authorize".into(),
            value: String::new(),
        }]);
        assert_eq!(templates(&selectors), vec![None]);
        assert_eq!(selectors[0].endpoint_metadata.len(), 1);
    }

    #[test]
    fn test_http_post_with_template_and_silent_verbs() {
        let metadata = vec![
            Metadata::http(HttpMethod::Get),
            Metadata::HttpMethod(HttpMethodAttribute::accept_verbs([HttpMethod::Post, HttpMethod::Put])),
            Metadata::http_with_template(HttpMethod::Post, "Api/Things"),
        ];
        let selectors = create_selectors(&metadata);
        assert_eq!(templates(&selectors), vec![Some("Api/Things"), None]);
        assert_eq!(selectors[0].http_methods(), vec!["POST"]);
        assert_eq!(selectors[1].http_methods(), vec!["GET", "POST", "PUT"]);
    }

    #[test]
    fn test_route_absorbs_silent_verbs() {
        let metadata = vec![
            Metadata::route("api/Products"),
            Metadata::HttpMethod(HttpMethodAttribute::accept_verbs([HttpMethod::Get, HttpMethod::Head])),
            Metadata::http_with_template(HttpMethod::Post, "api/Products/new"),
        ];
        let selectors = create_selectors(&metadata);
        assert_eq!(templates(&selectors), vec![Some("api/Products"), Some("api/Products/new")]);
        assert_eq!(selectors[0].http_methods(), vec!["GET", "HEAD"]);
        assert_eq!(selectors[1].http_methods(), vec!["POST"]);
    }

    #[test]
    fn test_selector_records_allowed_methods_and_consumes() {
        let metadata = vec![
            Metadata::Route(RouteAttribute::new("items").order(2).name("items")),
            Metadata::http(HttpMethod::Get),
            Metadata::http(HttpMethod::Get),
            Metadata::Consumes(vec!["application/json".into()]),
        ];
        let selectors = create_selectors(&metadata);
        assert_eq!(selectors.len(), 1);
        let selector = &selectors[0];
        let route = selector.attribute_route_model.as_ref().unwrap();
        assert_eq!(route.order, Some(2));
        assert_eq!(route.name.as_deref(), Some("items"));
        assert_eq!(selector.http_methods(), vec!["GET"]);
        assert!(
            selector
                .endpoint_metadata
                .iter()
                .any(|m| matches!(m, Metadata::AllowedMethods(methods) if methods == &["GET"]))
        );
        assert!(
            selector
                .action_constraints
                .iter()
                .any(|c| matches!(c, ActionConstraint::Consumes(_)))
        );
    }

    #[test]
    fn test_is_action_rules() {
        assert!(is_action(&MethodInfo::new("Index")));

        let mut m = MethodInfo::new("Helper");
        m.is_public = false;
        assert!(!is_action(&m));

        let mut m = MethodInfo::new("Create");
        m.is_static = true;
        assert!(!is_action(&m));

        let mut m = MethodInfo::new("get_Name");
        m.is_special_name = true;
        assert!(!is_action(&m));

        assert!(!is_action(&MethodInfo::new("Dispose")));
        assert!(!is_action(&MethodInfo::new("Skip").with_metadata(vec![Metadata::NonAction])));

        let mut object_method = MethodInfo::new("ToString");
        object_method.declared_on_object = true;
        assert!(!is_action(&MethodInfo::new("ToString").overriding(object_method)));

        let base = MethodInfo::new("Hidden").with_metadata(vec![Metadata::NonAction]);
        assert!(!is_action(&MethodInfo::new("Hidden").overriding(base)));
    }

    fn build(ty: ControllerType, options: &MvcOptions) -> ApplicationModel {
        let provider = DefaultApplicationModelProvider::new(options, Arc::new(DefaultModelMetadataProvider));
        let part = Arc::new(ApplicationPart::new("App"));
        let mut context = ApplicationModelProviderContext::new(vec![DiscoveredController {
            part,
            ty: Arc::new(ty),
        }]);
        provider.on_providers_executing(&mut context).unwrap();
        context.result
    }

    #[test]
    fn test_builds_controller_and_actions() {
        let ty = ControllerType::new("OrdersController")
            .with_metadata(vec![Metadata::route("api/[controller]"), Metadata::area("shop")])
            .with_method(
                MethodInfo::new("GetAsync")
                    .with_metadata(vec![Metadata::http_with_template(HttpMethod::Get, "{id}")])
                    .with_parameter(ParameterInfo::new("id", TypeRef::simple("int"))),
            )
            .with_method(
                MethodInfo::new("Upload").with_parameter(ParameterInfo::new("file", TypeRef::form_file())),
            )
            .with_method(MethodInfo::new("Renamed").with_metadata(vec![Metadata::ActionName("Other".into())]));

        let options = MvcOptions::new().with_filter(FilterMetadata::new("Global", FilterKind::Action));
        let app = build(ty, &options);

        assert_eq!(app.filters.len(), 1);
        let controller = &app.controllers[0];
        assert_eq!(controller.controller_name, "Orders");
        assert_eq!(controller.route_values.get("area"), Some("shop"));
        assert_eq!(templates(&controller.selectors), vec![Some("api/[controller]")]);

        let names: Vec<_> = app.actions.iter().map(|a| a.action_name.as_str()).collect();
        assert_eq!(names, ["Get", "Upload", "Other"]);

        let upload = &app.actions[1];
        let file = app.parameter(upload.parameters[0]);
        assert_eq!(file.binding_source(), Some(BindingSource::FormFile));

        let get = &app.actions[0];
        assert_eq!(app.parameter(get.parameters[0]).binding_info, None);
    }

    #[test]
    fn test_route_inherited_from_base_method() {
        let base = MethodInfo::new("List").with_metadata(vec![Metadata::route("base/list")]);
        let ty = ControllerType::new("ItemsController")
            .with_method(MethodInfo::new("List").overriding(base));
        let app = build(ty, &MvcOptions::new());
        assert_eq!(templates(&app.actions[0].selectors), vec![Some("base/list")]);
    }

    #[test]
    fn test_controller_action_filter_and_properties() {
        let mut ty = ControllerType::new("ProfileController")
            .with_metadata(vec![Metadata::BindProperties])
            .with_property(crate::discovery::PropertyInfo::new("Name", TypeRef::simple("string")))
            .with_property(
                crate::discovery::PropertyInfo::new("Trace", TypeRef::simple("string")).with_metadata(vec![
                    Metadata::BindingSource {
                        source: BindingSource::Header,
                        name: Some("X-Trace".into()),
                    },
                ]),
            );
        ty.is_action_filter = true;

        let app = build(ty, &MvcOptions::new());
        let controller = &app.controllers[0];
        assert!(controller.filters.iter().any(|f| f.kind == FilterKind::ControllerDelegating));
        assert_eq!(controller.controller_properties.len(), 2);
        assert_eq!(controller.controller_properties[0].binding_info, Some(BindingInfo::default()));
        assert_eq!(
            controller.controller_properties[1].binding_source(),
            Some(BindingSource::Header)
        );
    }
}
