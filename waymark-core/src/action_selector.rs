//! Selection of a conventionally routed action for a request.
//!
//! Attribute-routed descriptors are matched by their templates elsewhere
//! and never take part here.

use crate::application_model::{ActionConstraint, RouteValueList};
use crate::collection::ActionDescriptorCollection;
use crate::descriptor::ActionDescriptor;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// The parts of a request that action constraints look at.
#[derive(Clone, Copy, Debug)]
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub content_type: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a str) -> Self {
        Self {
            method,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// Lookup table from route values to conventionally routed descriptors.
pub struct ActionSelector {
    collection: Arc<ActionDescriptorCollection>,
    route_keys: Vec<String>,
    exact: HashMap<Vec<String>, Vec<usize>>,
    ignore_case: HashMap<Vec<String>, Vec<usize>>,
}

impl ActionSelector {
    pub fn new(collection: Arc<ActionDescriptorCollection>) -> Self {
        let conventional: Vec<usize> = collection
            .items
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_attribute_routed())
            .map(|(i, _)| i)
            .collect();

        let mut route_keys: Vec<String> = Vec::new();
        for &i in &conventional {
            for key in collection.items[i].route_values.keys() {
                if !route_keys.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                    route_keys.push(key.to_string());
                }
            }
        }
        route_keys.sort_by_key(|k| k.to_ascii_lowercase());

        let mut exact: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        let mut ignore_case: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for &i in &conventional {
            let descriptor = &collection.items[i];
            let values: Vec<String> = route_keys
                .iter()
                .map(|k| descriptor.route_values.get(k).unwrap_or_default().to_string())
                .collect();
            let lowered = values.iter().map(|v| v.to_lowercase()).collect();
            exact.entry(values).or_default().push(i);
            ignore_case.entry(lowered).or_default().push(i);
        }

        waymark_log::debug!(
            "Action selection table holds {} conventional descriptors over {} route keys",
            conventional.len(),
            route_keys.len()
        );

        Self {
            collection,
            route_keys,
            exact,
            ignore_case,
        }
    }

    pub fn route_keys(&self) -> &[String] {
        &self.route_keys
    }

    /// Descriptors whose route values equal the request's.
    ///
    /// A missing key and an empty value are the same thing. Values are
    /// first compared exactly, then without case.
    pub fn select_candidates(&self, route_values: &RouteValueList) -> Vec<&ActionDescriptor> {
        let values: Vec<String> = self
            .route_keys
            .iter()
            .map(|k| route_values.get(k).unwrap_or_default().to_string())
            .collect();

        let matches = match self.exact.get(&values) {
            Some(matches) => Some(matches),
            None => {
                let lowered: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
                self.ignore_case.get(&lowered)
            }
        };

        matches
            .map(|indices| indices.iter().map(|&i| &self.collection.items[i]).collect())
            .unwrap_or_default()
    }

    /// Narrow `candidates` down by their action constraints.
    ///
    /// Returns `Ok(None)` when nothing is left and
    /// [`Error::AmbiguousAction`] when more than one candidate remains.
    pub fn select_best_candidate<'d>(
        &self,
        request: &RequestContext<'_>,
        candidates: &[&'d ActionDescriptor],
    ) -> Result<Option<&'d ActionDescriptor>> {
        let survivors = evaluate_constraints(request, candidates.to_vec(), None);

        match survivors.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => Err(Error::AmbiguousAction {
                actions: many.iter().map(|d| d.display_name.clone()).collect(),
            }),
        }
    }
}

/// Evaluate constraints one order stage at a time.
///
/// At each stage, candidates that satisfy a constraint of that order are
/// preferred over candidates with no constraint of that order; candidates
/// that fail one are dropped. Later stages only see the preferred group,
/// falling back to the other group if the preferred one empties out.
fn evaluate_constraints<'d>(
    request: &RequestContext<'_>,
    candidates: Vec<&'d ActionDescriptor>,
    after_order: Option<i32>,
) -> Vec<&'d ActionDescriptor> {
    let stage = candidates
        .iter()
        .flat_map(|d| d.action_constraints.iter().map(ActionConstraint::order))
        .filter(|order| after_order.is_none_or(|after| *order > after))
        .min();

    let Some(stage) = stage else {
        return candidates;
    };

    let mut with_constraint = Vec::new();
    let mut without_constraint = Vec::new();
    for candidate in candidates {
        let mut accepted = true;
        let mut found = false;
        for constraint in candidate.action_constraints.iter().filter(|c| c.order() == stage) {
            if constraint.accept(request) {
                found = true;
            } else {
                accepted = false;
                break;
            }
        }

        if accepted && found {
            with_constraint.push(candidate);
        } else if accepted {
            without_constraint.push(candidate);
        }
    }

    for group in [with_constraint, without_constraint] {
        if group.is_empty() {
            continue;
        }
        let survivors = evaluate_constraints(request, group, Some(stage));
        if !survivors.is_empty() {
            return survivors;
        }
    }
    Vec::new()
}
