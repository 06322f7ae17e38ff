//! Model conventions: ordered transformations of the application model.
//!
//! Conventions run in four phases: application, controller, action,
//! parameter. In each phase, conventions declared through node metadata run
//! first, then the registered ones sorted by ascending priority. Closures
//! with a matching signature are conventions too.
//!
//! ```rust,ignore
//! let mut registry = ConventionRegistry::new();
//! registry.add_action(0, |app: &mut ApplicationModel, id: ActionId| -> Result<()> {
//!     app.action_mut(id).action_name.make_ascii_lowercase();
//!     Ok(())
//! });
//! ```

pub mod api_behavior;
pub mod api_convention;
pub mod filter_conventions;
pub mod infer_binding;
pub mod route_token_transformer;

use crate::application_model::{ActionId, ApplicationModel, ControllerId, ParameterId};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

pub trait ApplicationModelConvention: Send + Sync {
    fn apply(&self, app: &mut ApplicationModel) -> Result<()>;
}

pub trait ControllerModelConvention: Send + Sync {
    fn apply(&self, app: &mut ApplicationModel, controller: ControllerId) -> Result<()>;
}

pub trait ActionModelConvention: Send + Sync {
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()>;
}

pub trait ParameterModelConvention: Send + Sync {
    fn apply(&self, app: &mut ApplicationModel, parameter: ParameterId) -> Result<()>;
}

impl<F> ApplicationModelConvention for F
where
    F: Fn(&mut ApplicationModel) -> Result<()> + Send + Sync,
{
    fn apply(&self, app: &mut ApplicationModel) -> Result<()> {
        self(app)
    }
}

impl<F> ControllerModelConvention for F
where
    F: Fn(&mut ApplicationModel, ControllerId) -> Result<()> + Send + Sync,
{
    fn apply(&self, app: &mut ApplicationModel, controller: ControllerId) -> Result<()> {
        self(app, controller)
    }
}

impl<F> ActionModelConvention for F
where
    F: Fn(&mut ApplicationModel, ActionId) -> Result<()> + Send + Sync,
{
    fn apply(&self, app: &mut ApplicationModel, action: ActionId) -> Result<()> {
        self(app, action)
    }
}

impl<F> ParameterModelConvention for F
where
    F: Fn(&mut ApplicationModel, ParameterId) -> Result<()> + Send + Sync,
{
    fn apply(&self, app: &mut ApplicationModel, parameter: ParameterId) -> Result<()> {
        self(app, parameter)
    }
}

#[derive(Clone)]
enum Convention {
    Application(Arc<dyn ApplicationModelConvention>),
    Controller(Arc<dyn ControllerModelConvention>),
    Action(Arc<dyn ActionModelConvention>),
    Parameter(Arc<dyn ParameterModelConvention>),
}

#[derive(Clone)]
struct Entry {
    priority: i32,
    convention: Convention,
}

/// Conventions registered by the host, each with a priority.
#[derive(Clone, Default)]
pub struct ConventionRegistry {
    entries: Vec<Entry>,
}

impl fmt::Debug for ConventionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionRegistry")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl ConventionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, priority: i32, convention: Convention) -> &mut Self {
        self.entries.push(Entry {
            priority,
            convention,
        });
        self
    }

    pub fn add_application(
        &mut self,
        priority: i32,
        convention: impl ApplicationModelConvention + 'static,
    ) -> &mut Self {
        self.push(priority, Convention::Application(Arc::new(convention)))
    }

    pub fn add_controller(
        &mut self,
        priority: i32,
        convention: impl ControllerModelConvention + 'static,
    ) -> &mut Self {
        self.push(priority, Convention::Controller(Arc::new(convention)))
    }

    pub fn add_action(
        &mut self,
        priority: i32,
        convention: impl ActionModelConvention + 'static,
    ) -> &mut Self {
        self.push(priority, Convention::Action(Arc::new(convention)))
    }

    pub fn add_parameter(
        &mut self,
        priority: i32,
        convention: impl ParameterModelConvention + 'static,
    ) -> &mut Self {
        self.push(priority, Convention::Parameter(Arc::new(convention)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted(&self) -> Vec<Entry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| e.priority);
        entries
    }

    /// Run every phase over `app`. The first error aborts the run.
    pub fn apply(&self, app: &mut ApplicationModel) -> Result<()> {
        let entries = self.sorted();

        for entry in &entries {
            if let Convention::Application(c) = &entry.convention {
                c.apply(app)?;
            }
        }

        // Each pass re-reads the tree, so nodes unlinked by an earlier
        // convention are not visited again.
        for id in app.controller_ids() {
            if !app.has_controller(id) {
                continue;
            }
            for c in app.controller(id).metadata.controller_conventions() {
                c.apply(app, id)?;
            }
        }
        for entry in &entries {
            if let Convention::Controller(c) = &entry.convention {
                for id in app.controller_ids() {
                    if app.has_controller(id) {
                        c.apply(app, id)?;
                    }
                }
            }
        }

        for id in app.action_ids() {
            if !app.has_action(id) {
                continue;
            }
            for c in app.action(id).metadata.action_conventions() {
                c.apply(app, id)?;
            }
        }
        for entry in &entries {
            if let Convention::Action(c) = &entry.convention {
                for id in app.action_ids() {
                    if app.has_action(id) {
                        c.apply(app, id)?;
                    }
                }
            }
        }

        for id in app.parameter_ids() {
            if !app.has_parameter(id) {
                continue;
            }
            for c in app.parameter(id).metadata.parameter_conventions() {
                c.apply(app, id)?;
            }
        }
        for entry in &entries {
            if let Convention::Parameter(c) = &entry.convention {
                for id in app.parameter_ids() {
                    if app.has_parameter(id) {
                        c.apply(app, id)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_model::{ActionModel, ControllerModel};
    use crate::discovery::{ApplicationPart, ControllerType, MethodInfo};
    use crate::error::Error;
    use crate::metadata::Metadata;
    use parking_lot::Mutex;

    fn app() -> ApplicationModel {
        let mut app = ApplicationModel::new();
        let controller = app.add_controller(ControllerModel::new(
            Arc::new(ControllerType::new("HomeController")),
            Arc::new(ApplicationPart::new("App")),
        ));
        app.add_action(ActionModel::new(
            controller,
            Arc::new(MethodInfo::new("Index")),
            "Index".into(),
        ));
        app
    }

    #[test]
    fn test_phases_and_priorities() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ConventionRegistry::new();

        let l = Arc::clone(&log);
        registry.add_action(5, move |_: &mut ApplicationModel, _: ActionId| -> Result<()> {
            l.lock().push("action-5");
            Ok(())
        });
        let l = Arc::clone(&log);
        registry.add_action(-5, move |_: &mut ApplicationModel, _: ActionId| -> Result<()> {
            l.lock().push("action-minus-5");
            Ok(())
        });
        let l = Arc::clone(&log);
        registry.add_controller(0, move |_: &mut ApplicationModel, _: ControllerId| -> Result<()> {
            l.lock().push("controller");
            Ok(())
        });
        let l = Arc::clone(&log);
        registry.add_application(100, move |_: &mut ApplicationModel| -> Result<()> {
            l.lock().push("application");
            Ok(())
        });

        registry.apply(&mut app()).unwrap();
        assert_eq!(
            *log.lock(),
            vec!["application", "controller", "action-minus-5", "action-5"]
        );
    }

    #[test]
    fn test_metadata_conventions_run_before_registered() {
        let mut app = app();
        let rename: Arc<dyn ActionModelConvention> =
            Arc::new(|app: &mut ApplicationModel, id: ActionId| -> Result<()> {
                app.action_mut(id).action_name = "Renamed".into();
                Ok(())
            });
        app.actions[0].metadata = vec![Metadata::ActionConvention(rename)].into();

        let mut registry = ConventionRegistry::new();
        registry.add_action(0, |app: &mut ApplicationModel, id: ActionId| -> Result<()> {
            let name = format!("{}!", app.action(id).action_name);
            app.action_mut(id).action_name = name;
            Ok(())
        });

        registry.apply(&mut app).unwrap();
        assert_eq!(app.actions[0].action_name, "Renamed!");
    }

    #[test]
    fn test_error_aborts() {
        let mut registry = ConventionRegistry::new();
        registry.add_action(0, |_: &mut ApplicationModel, _: ActionId| -> Result<()> {
            Err(Error::AttributeRouteRequired {
                action: "Index".into(),
            })
        });
        assert!(registry.apply(&mut app()).is_err());
    }

    #[test]
    fn test_unlinked_actions_skip_later_phases() {
        let mut app = app();
        let home = app.controller_ids().next().unwrap();
        app.add_action(ActionModel::new(
            home,
            Arc::new(MethodInfo::new("Secret")),
            "Secret".into(),
        ));

        let mut registry = ConventionRegistry::new();
        registry.add_controller(0, |app: &mut ApplicationModel, id: ControllerId| -> Result<()> {
            let secret: Vec<ActionId> = app
                .controller(id)
                .actions
                .iter()
                .copied()
                .filter(|&a| app.action(a).action_name == "Secret")
                .collect();
            for action in secret {
                app.remove_action(action);
            }
            Ok(())
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        registry.add_action(0, move |app: &mut ApplicationModel, id: ActionId| -> Result<()> {
            s.lock().push(app.action(id).action_name.clone());
            Ok(())
        });

        registry.apply(&mut app).unwrap();
        assert_eq!(*seen.lock(), vec!["Index".to_string()]);
        assert_eq!(app.action_ids().count(), 1);
    }
}
