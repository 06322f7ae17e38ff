use super::ActionModelConvention;
use crate::application_model::{ActionId, ApplicationModel};
use crate::attribute_route::{OutboundParameterTransformer, SharedTransformer};
use crate::error::Result;
use std::sync::Arc;

/// Sets the transformer applied to route values during `[token]` replacement.
#[derive(Clone, Debug)]
pub struct RouteTokenTransformerConvention {
    transformer: SharedTransformer,
}

impl RouteTokenTransformerConvention {
    pub fn new(transformer: impl OutboundParameterTransformer + 'static) -> Self {
        Self {
            transformer: Arc::new(transformer),
        }
    }
}

impl ActionModelConvention for RouteTokenTransformerConvention {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        app.action_mut(action).route_parameter_transformer = Some(Arc::clone(&self.transformer));
        Ok(())
    }
}
