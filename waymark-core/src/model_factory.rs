//! Builds the application model by running providers and conventions.

use crate::application_model::ApplicationModel;
use crate::conventions::ConventionRegistry;
use crate::conventions::api_behavior::ApiBehaviorApplicationModelProvider;
use crate::diagnostics;
use crate::discovery::DiscoveredController;
use crate::error::Result;
use crate::model_metadata::ModelMetadataProvider;
use crate::model_provider::DefaultApplicationModelProvider;
use crate::options::{ApiBehaviorOptions, MvcOptions};
use std::sync::Arc;

/// State shared by providers during one build.
#[derive(Debug)]
pub struct ApplicationModelProviderContext {
    pub controllers: Vec<DiscoveredController>,
    pub result: ApplicationModel,
}

impl ApplicationModelProviderContext {
    pub fn new(controllers: Vec<DiscoveredController>) -> Self {
        Self {
            controllers,
            result: ApplicationModel::new(),
        }
    }
}

/// A step contributing to the application model.
///
/// `on_providers_executing` runs in ascending `order`,
/// `on_providers_executed` in descending `order`.
pub trait ApplicationModelProvider: Send + Sync {
    fn order(&self) -> i32;

    fn on_providers_executing(&self, context: &mut ApplicationModelProviderContext) -> Result<()>;

    fn on_providers_executed(&self, _context: &mut ApplicationModelProviderContext) -> Result<()> {
        Ok(())
    }
}

pub struct ApplicationModelFactory {
    providers: Vec<Arc<dyn ApplicationModelProvider>>,
    conventions: ConventionRegistry,
}

impl ApplicationModelFactory {
    pub fn new(
        mut providers: Vec<Arc<dyn ApplicationModelProvider>>,
        conventions: ConventionRegistry,
    ) -> Self {
        providers.sort_by_key(|p| p.order());
        Self {
            providers,
            conventions,
        }
    }

    /// Default and API-behavior providers plus the conventions in `options`.
    pub fn with_defaults(
        options: &MvcOptions,
        api_options: &ApiBehaviorOptions,
        metadata: Arc<dyn ModelMetadataProvider>,
    ) -> Self {
        let providers: Vec<Arc<dyn ApplicationModelProvider>> = vec![
            Arc::new(DefaultApplicationModelProvider::new(options, Arc::clone(&metadata))),
            Arc::new(ApiBehaviorApplicationModelProvider::new(
                api_options,
                options.api_conventions.clone(),
                metadata,
            )),
        ];
        Self::new(providers, options.conventions.clone())
    }

    pub fn create_application_model(
        &self,
        controllers: Vec<DiscoveredController>,
    ) -> Result<ApplicationModel> {
        let mut context = ApplicationModelProviderContext::new(controllers);

        for provider in &self.providers {
            provider.on_providers_executing(&mut context)?;
        }
        for provider in self.providers.iter().rev() {
            provider.on_providers_executed(&mut context)?;
        }

        let mut model = context.result;
        self.conventions.apply(&mut model)?;

        waymark_log::debug!(
            "Built application model: {} controllers, {} actions",
            model.controller_ids().count(),
            model.action_ids().count()
        );
        diagnostics::log_application_model(&model);

        Ok(model)
    }
}
