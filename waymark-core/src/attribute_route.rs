//! Attribute route templates: combination, cleaning and `[token]` replacement.
//!
//! A controller-level route (`api/[controller]`) is combined with an
//! action-level route (`{id}`) into a single template. Templates that start
//! with `/` or `~/` are absolute and replace the prefix instead of extending it.
//!
//! ```rust,ignore
//! use waymark_core::attribute_route::{AttributeRouteModel, TokenValues};
//!
//! let controller = AttributeRouteModel::new("api/[controller]");
//! let action = AttributeRouteModel::new("{id}");
//! let combined = AttributeRouteModel::combine(Some(&controller), Some(&action)).unwrap();
//! assert_eq!(combined.template.as_deref(), Some("api/[controller]/{id}"));
//!
//! let values = TokenValues::from_iter([("controller", "Widgets")]);
//! let route = AttributeRouteModel::replace_tokens("api/[controller]", &values, None).unwrap();
//! assert_eq!(route, "api/Widgets");
//! ```

use crate::error::{Error, Result, TemplateSyntax};
use crate::metadata::RouteTemplateProvider;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Route template, order and name declared on a controller or action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttributeRouteModel {
    pub template: Option<String>,
    pub order: Option<i32>,
    pub name: Option<String>,
    pub suppress_link_generation: bool,
    pub suppress_path_matching: bool,
}

impl AttributeRouteModel {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn from_provider(provider: &RouteTemplateProvider<'_>) -> Self {
        Self {
            template: provider.template.map(str::to_string),
            order: provider.order,
            name: provider.name.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `true` when the template starts with `/` or `~/`.
    pub fn is_absolute_template(&self) -> bool {
        self.template.as_deref().is_some_and(is_override_pattern)
    }

    /// Combine a prefix route with a suffix route.
    ///
    /// Returns `None` when neither side carries a template, meaning the
    /// pairing is not attribute routed.
    pub fn combine(left: Option<&Self>, right: Option<&Self>) -> Option<Self> {
        let empty = Self::default();
        let right = right.unwrap_or(&empty);

        let left = if right.is_absolute_template() {
            &empty
        } else {
            left.unwrap_or(&empty)
        };

        let template = combine_templates(left.template.as_deref(), right.template.as_deref())?;

        Some(Self {
            template: Some(template),
            order: right.order.or(left.order),
            name: choose_name(left, right),
            suppress_link_generation: left.suppress_link_generation
                || right.suppress_link_generation,
            suppress_path_matching: left.suppress_path_matching || right.suppress_path_matching,
        })
    }

    /// Replace `[token]` placeholders with values.
    ///
    /// `[[` and `]]` produce literal brackets. Token lookup ignores case.
    pub fn replace_tokens(
        template: &str,
        values: &TokenValues,
        transformer: Option<&dyn OutboundParameterTransformer>,
    ) -> Result<String> {
        replace_tokens(template, values, transformer)
    }
}

fn choose_name(left: &AttributeRouteModel, right: &AttributeRouteModel) -> Option<String> {
    let right_template_empty = right.template.as_deref().is_none_or(str::is_empty);
    if right.name.is_none() && right_template_empty {
        left.name.clone()
    } else {
        right.name.clone()
    }
}

/// `/...` and `~/...` templates ignore any prefix.
pub fn is_override_pattern(template: &str) -> bool {
    template.starts_with('/') || template.starts_with("~/")
}

fn is_empty_left_segment(template: Option<&str>) -> bool {
    matches!(template, None | Some("") | Some("/") | Some("~/"))
}

/// Join two templates and clean the result.
pub fn combine_templates(prefix: Option<&str>, template: Option<&str>) -> Option<String> {
    let joined = combine_core(prefix, template)?;
    Some(clean_template(&joined))
}

fn combine_core(left: Option<&str>, right: Option<&str>) -> Option<String> {
    match (left, right) {
        (None, None) => None,
        (Some(left), None) => Some(left.to_string()),
        (left, Some(right)) => {
            if is_empty_left_segment(left) || is_override_pattern(right) {
                return Some(right.to_string());
            }
            let left = left.unwrap_or_default();
            if left.ends_with('/') {
                Some(format!("{left}{right}"))
            } else {
                Some(format!("{left}/{right}"))
            }
        }
    }
}

/// Strip one leading `/` or `~/` and one trailing `/`.
///
/// `"//"` is returned unchanged so that it is never mistaken for a valid
/// route once cleaned.
pub fn clean_template(template: &str) -> String {
    if template == "//" {
        return template.to_string();
    }

    let start = if template.starts_with('/') {
        1
    } else if template.starts_with("~/") {
        2
    } else {
        0
    };

    if start == template.len() {
        return String::new();
    }

    let rest = &template[start..];
    rest.strip_suffix('/').unwrap_or(rest).to_string()
}

/// Route values available to `[token]` replacement.
///
/// Insertion keeps the first value for a key; lookups ignore ASCII case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenValues {
    entries: Vec<(String, String)>,
}

impl TokenValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.get(&key).is_some() {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Keys sorted case-insensitively, for diagnostics.
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|(k, _)| k.clone()).collect();
        keys.sort_by_key(|k| k.to_ascii_lowercase());
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParserState {
    Plaintext,
    SeenLeft,
    SeenRight,
    InsideToken,
    InsideTokenSeenLeft,
    InsideTokenSeenRight,
}

fn syntax_error(template: &str, reason: TemplateSyntax) -> Error {
    Error::InvalidRouteTemplate {
        template: template.to_string(),
        reason,
    }
}

fn replace_tokens(
    template: &str,
    values: &TokenValues,
    transformer: Option<&dyn OutboundParameterTransformer>,
) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut state = ParserState::Plaintext;
    let mut token_start = 0usize;
    let mut scope = 0i32;

    // One extra iteration with `None` marks the end of the template.
    let chars = template
        .char_indices()
        .map(|(i, c)| (i, Some(c)))
        .chain(std::iter::once((template.len(), None)));

    for (i, c) in chars {
        match state {
            ParserState::Plaintext => match c {
                Some('[') => {
                    scope += 1;
                    state = ParserState::SeenLeft;
                }
                Some(']') => state = ParserState::SeenRight,
                Some(c) => out.push(c),
                None => {}
            },
            ParserState::SeenLeft => match c {
                Some('[') => {
                    out.push('[');
                    state = ParserState::Plaintext;
                }
                Some(']') => return Err(syntax_error(template, TemplateSyntax::EmptyToken)),
                None => return Err(syntax_error(template, TemplateSyntax::UnclosedToken)),
                Some(_) => {
                    token_start = i;
                    state = ParserState::InsideToken;
                }
            },
            ParserState::SeenRight => match c {
                Some(']') => {
                    out.push(']');
                    state = ParserState::Plaintext;
                }
                _ => return Err(syntax_error(template, TemplateSyntax::ImbalancedBrackets)),
            },
            ParserState::InsideToken => match c {
                Some('[') => state = ParserState::InsideTokenSeenLeft,
                Some(']') => {
                    scope -= 1;
                    state = ParserState::InsideTokenSeenRight;
                }
                None => return Err(syntax_error(template, TemplateSyntax::UnclosedToken)),
                Some(_) => {}
            },
            ParserState::InsideTokenSeenLeft => match c {
                Some('[') => state = ParserState::InsideToken,
                _ => {
                    return Err(syntax_error(
                        template,
                        TemplateSyntax::UnescapedBracketInToken,
                    ));
                }
            },
            ParserState::InsideTokenSeenRight => {
                if c == Some(']') && scope == 0 {
                    state = ParserState::InsideToken;
                    continue;
                }

                // `i - 1` excludes the closing bracket.
                let token = template[token_start..i - 1]
                    .replace("[[", "[")
                    .replace("]]", "]");

                let Some(value) = values.get(&token) else {
                    return Err(Error::RouteTokenNotFound {
                        template: template.to_string(),
                        token,
                        available: values.sorted_keys(),
                    });
                };

                match transformer {
                    Some(t) => out.push_str(&t.transform_outbound(value)),
                    None => out.push_str(value),
                }

                state = match c {
                    Some('[') => ParserState::SeenLeft,
                    Some(']') => ParserState::SeenRight,
                    None => ParserState::Plaintext,
                    Some(c) => {
                        out.push(c);
                        ParserState::Plaintext
                    }
                };
                scope = 0;
            }
        }
    }

    Ok(out)
}

/// Rewrites a route value before it is written into a template.
pub trait OutboundParameterTransformer: Send + Sync + fmt::Debug {
    fn transform_outbound(&self, value: &str) -> String;
}

pub type SharedTransformer = Arc<dyn OutboundParameterTransformer>;

static SLUG_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new("([a-z])([A-Z])").expect("slug boundary pattern is valid"));

/// `ProductDetails` becomes `product-details`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlugifyParameterTransformer;

impl OutboundParameterTransformer for SlugifyParameterTransformer {
    fn transform_outbound(&self, value: &str) -> String {
        SLUG_BOUNDARY.replace_all(value, "$1-$2").to_lowercase()
    }
}

/// Final attribute route attached to an action descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeRouteInfo {
    pub template: String,
    pub order: i32,
    pub name: Option<String>,
    pub suppress_link_generation: bool,
    pub suppress_path_matching: bool,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9{}]{1,8}"
    }

    fn relative_template() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|parts| parts.join("/"))
    }

    proptest! {
        #[test]
        fn clean_strips_wrapping_slashes(t in relative_template()) {
            prop_assert_eq!(clean_template(&format!("/{t}/")), clean_template(&t));
        }

        #[test]
        fn override_ignores_any_left(left in prop::option::of(relative_template()), t in relative_template()) {
            let left = left.map(AttributeRouteModel::new);
            let right = AttributeRouteModel::new(format!("/{t}"));
            let result = AttributeRouteModel::combine(left.as_ref(), Some(&right)).unwrap();
            prop_assert_eq!(result.template, Some(t));
        }

        #[test]
        fn nesting_prefixes_joins_segments(a in relative_template(), b in relative_template(), c in relative_template()) {
            let ab = AttributeRouteModel::combine(
                Some(&AttributeRouteModel::new(a.clone())),
                Some(&AttributeRouteModel::new(b.clone())),
            ).unwrap();
            let abc = AttributeRouteModel::combine(Some(&ab), Some(&AttributeRouteModel::new(c.clone()))).unwrap();
            prop_assert_eq!(abc.template, Some(format!("{a}/{b}/{c}")));
        }

        #[test]
        fn plain_text_passes_through_token_replacement(t in "[a-z0-9/{}]{0,16}") {
            let replaced = AttributeRouteModel::replace_tokens(&t, &TokenValues::new(), None).unwrap();
            prop_assert_eq!(replaced, t);
        }
    }
}
