//! Minimal `{parameter}` scanner for combined route templates.
//!
//! Only parameter names are extracted; constraints (`{id:int}`), defaults
//! (`{page=1}`), optional markers (`{id?}`) and catch-alls (`{*path}`) are
//! recognised and stripped. `{{` and `}}` are literal braces.

use crate::error::{Error, Result, TemplateSyntax};
use smallvec::SmallVec;

/// Parameter names in declaration order. Most templates have few.
pub type ParameterNames = SmallVec<[String; 4]>;

pub fn parameter_names(template: &str) -> Result<ParameterNames> {
    let mut names = ParameterNames::new();
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    continue;
                }

                let start = i + 1;
                let mut end = None;
                for (j, c) in chars.by_ref() {
                    if c == '}' {
                        end = Some(j);
                        break;
                    }
                }

                let Some(end) = end else {
                    return Err(malformed(template));
                };
                let name = parameter_name(&template[start..end]);
                if name.is_empty() {
                    return Err(malformed(template));
                }
                names.push(name.to_string());
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                } else {
                    return Err(malformed(template));
                }
            }
            _ => {}
        }
    }

    Ok(names)
}

/// `true` if the template declares `{name}` (ignoring case).
pub fn has_parameter(template: &str, name: &str) -> Result<bool> {
    Ok(parameter_names(template)?
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name)))
}

fn parameter_name(segment: &str) -> &str {
    let segment = segment.trim_start_matches('*');
    let end = segment
        .find([':', '=', '?'])
        .unwrap_or(segment.len());
    &segment[..end]
}

fn malformed(template: &str) -> Error {
    Error::InvalidRouteTemplate {
        template: template.to_string(),
        reason: TemplateSyntax::MalformedParameter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_parameters() {
        let names = parameter_names("api/users/{id}/posts/{postId}").unwrap();
        assert_eq!(names.as_slice(), ["id", "postId"]);
    }

    #[test]
    fn test_decorated_parameters() {
        let names = parameter_names("{id:int}/{page=1}/{slug?}/{*path}/{**rest}").unwrap();
        assert_eq!(names.as_slice(), ["id", "page", "slug", "path", "rest"]);
    }

    #[test]
    fn test_escaped_braces() {
        let names = parameter_names("literal/{{x}}/{y}").unwrap();
        assert_eq!(names.as_slice(), ["y"]);
    }

    #[test]
    fn test_malformed() {
        assert!(parameter_names("api/{id").is_err());
        assert!(parameter_names("api/{}").is_err());
        assert!(parameter_names("api/id}").is_err());
    }

    #[test]
    fn test_has_parameter_ignores_case() {
        assert!(has_parameter("orders/{OrderId}", "orderid").unwrap());
        assert!(!has_parameter("orders", "orderid").unwrap());
    }
}
