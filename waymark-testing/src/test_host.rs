// Test host wiring discovery through descriptor publication

use std::sync::Arc;
use waymark_core::{
    ActionDescriptor, ActionDescriptorCollection, ActionDescriptorCollectionProvider,
    ActionDescriptorProvider, ActionSelector, ApiBehaviorOptions, ApplicationModelFactory,
    ApplicationPart, ApplicationPartManager, ControllerActionDescriptorProvider, ControllerType,
    DefaultModelMetadataProvider, MvcOptions, RequestContext, Result, RouteValueList,
};

/// Name of the part that [`TestHostBuilder::controller`] adds to.
pub const DEFAULT_PART: &str = "TestPart";

/// A fully wired descriptor pipeline over in-memory parts.
pub struct TestHost {
    manager: Arc<ApplicationPartManager>,
    provider: ActionDescriptorCollectionProvider,
}

impl TestHost {
    pub fn builder() -> TestHostBuilder {
        TestHostBuilder::new()
    }

    pub fn manager(&self) -> &Arc<ApplicationPartManager> {
        &self.manager
    }

    /// Current descriptor snapshot, rebuilt if parts changed.
    pub fn descriptors(&self) -> Result<Arc<ActionDescriptorCollection>> {
        self.provider.action_descriptors()
    }

    pub fn selector(&self) -> Result<ActionSelector> {
        Ok(ActionSelector::new(self.descriptors()?))
    }

    /// Run conventional selection for `route` and `method` end to end.
    pub fn select(&self, route: &[(&str, &str)], method: &str) -> Result<Option<ActionDescriptor>> {
        let selector = self.selector()?;
        let mut values = RouteValueList::default();
        for (key, value) in route {
            values.set(*key, *value);
        }

        let candidates = selector.select_candidates(&values);
        let best = selector.select_best_candidate(&RequestContext::new(method), &candidates)?;
        Ok(best.cloned())
    }
}

/// Builder for test hosts
pub struct TestHostBuilder {
    parts: Vec<ApplicationPart>,
    loose: Vec<ControllerType>,
    options: MvcOptions,
    api_options: ApiBehaviorOptions,
    providers: Vec<Arc<dyn ActionDescriptorProvider>>,
}

impl TestHostBuilder {
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            loose: Vec::new(),
            options: MvcOptions::new(),
            api_options: ApiBehaviorOptions::default(),
            providers: Vec::new(),
        }
    }

    pub fn part(mut self, part: ApplicationPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Add a controller to the [`DEFAULT_PART`].
    pub fn controller(mut self, controller: ControllerType) -> Self {
        self.loose.push(controller);
        self
    }

    pub fn options(mut self, options: MvcOptions) -> Self {
        self.options = options;
        self
    }

    pub fn api_options(mut self, api_options: ApiBehaviorOptions) -> Self {
        self.api_options = api_options;
        self
    }

    /// Run an extra descriptor provider next to the controller one.
    pub fn provider(mut self, provider: Arc<dyn ActionDescriptorProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> TestHost {
        let mut parts = self.parts;
        if !self.loose.is_empty() {
            let part = self
                .loose
                .into_iter()
                .fold(ApplicationPart::new(DEFAULT_PART), |part, ty| part.with_type(ty));
            parts.push(part);
        }

        let manager = Arc::new(ApplicationPartManager::with_parts(parts));
        let factory = ApplicationModelFactory::with_defaults(
            &self.options,
            &self.api_options,
            Arc::new(DefaultModelMetadataProvider),
        );

        let mut providers: Vec<Arc<dyn ActionDescriptorProvider>> = vec![Arc::new(
            ControllerActionDescriptorProvider::new(Arc::clone(&manager), factory),
        )];
        providers.extend(self.providers);

        let provider = ActionDescriptorCollectionProvider::new(providers, manager.clone());
        TestHost { manager, provider }
    }
}

impl Default for TestHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}
