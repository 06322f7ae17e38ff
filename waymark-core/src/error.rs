// Error types for the Waymark action model

use thiserror::Error;

/// Why a route template could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSyntax {
    /// `[]` with nothing between the brackets.
    EmptyToken,
    /// A `[` that is never closed.
    UnclosedToken,
    /// A `]` with no opening `[`.
    ImbalancedBrackets,
    /// A bare `[` inside a `[token]`.
    UnescapedBracketInToken,
    /// A `{parameter}` segment that is empty or never closed.
    MalformedParameter,
}

impl std::fmt::Display for TemplateSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            TemplateSyntax::EmptyToken => "An empty replacement token ('[]') is not allowed.",
            TemplateSyntax::UnclosedToken => "A replacement token is not closed.",
            TemplateSyntax::ImbalancedBrackets => "Token delimiters ('[', ']') are imbalanced.",
            TemplateSyntax::UnescapedBracketInToken => {
                "An unescaped '[' token is not allowed inside of a replacement token. Use '[[' to escape."
            }
            TemplateSyntax::MalformedParameter => {
                "A route parameter ('{...}') is empty or not closed. Use '{{' or '}}' to escape."
            }
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("The route template '{template}' has invalid syntax. {reason}")]
    InvalidRouteTemplate {
        template: String,
        reason: TemplateSyntax,
    },

    #[error(
        "While processing template '{template}', a replacement value for the token '{token}' could not be found. \
         Available tokens: '{}'. To use a '[' or ']' as a literal string in a route or within a constraint, \
         use '[[' or ']]' instead.",
        .available.join(", ")
    )]
    RouteTokenNotFound {
        template: String,
        token: String,
        available: Vec<String>,
    },

    #[error(
        "Action '{action}' has more than one parameter that was specified or inferred as bound from request body. \
         Only one parameter per action may be bound from body. Inspect the following parameters, and use \
         binding metadata to specify bound from query, route or form: {}",
        .parameters.join(", ")
    )]
    AmbiguousBodyBinding {
        action: String,
        parameters: Vec<String>,
    },

    #[error(
        "Action '{action}' does not have an attribute route. Action methods on controllers annotated with \
         ApiController must be attribute routed."
    )]
    AttributeRouteRequired { action: String },

    #[error("The attribute route '{template}' on action '{action}' combines to an invalid template.")]
    InvalidCombinedTemplate { action: String, template: String },

    #[error(
        "The following errors occurred with attribute routing information:\n\n{}",
        .0.join("\n\n")
    )]
    AttributeRouting(Vec<String>),

    #[error(
        "The action '{action}' has ApiExplorer enabled, but is using conventional routing. \
         Only actions which use attribute routing support ApiExplorer."
    )]
    ApiExplorerUnsupportedAction { action: String },

    #[error(
        "Multiple actions matched. The following actions matched route data and had all constraints satisfied:\n\n{}",
        .actions.join("\n")
    )]
    AmbiguousAction { actions: Vec<String> },
}

impl Error {
    /// Startup-time errors: the route table cannot be built at all.
    ///
    /// Everything except [`Error::AmbiguousAction`], which is raised per
    /// request during selection.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Error::AmbiguousAction { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_message_embeds_template() {
        let err = Error::InvalidRouteTemplate {
            template: "api/[".to_string(),
            reason: TemplateSyntax::UnclosedToken,
        };
        let message = err.to_string();
        assert!(message.contains("'api/['"));
        assert!(message.contains("not closed"));
    }

    #[test]
    fn test_token_not_found_lists_keys() {
        let err = Error::RouteTokenNotFound {
            template: "[area]/[controller]".to_string(),
            token: "area".to_string(),
            available: vec!["action".to_string(), "controller".to_string()],
        };
        assert!(err.to_string().contains("Available tokens: 'action, controller'"));
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(Error::AttributeRouteRequired { action: "a".into() }.is_configuration_error());
        assert!(!Error::AmbiguousAction { actions: vec![] }.is_configuration_error());
    }
}
