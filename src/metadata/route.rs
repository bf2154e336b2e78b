use crate::error::{NestrsError, Result};
use axum::http::Method;
use axum::routing::MethodFilter;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// HTTP methods accepted in route metadata
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_method(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    pub fn method_filter(self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Head => MethodFilter::HEAD,
            HttpMethod::Options => MethodFilter::OPTIONS,
        }
    }
}

/// Parse a `"<METHOD> <path>"` route descriptor
///
/// The descriptor must split into exactly two whitespace-separated tokens and
/// the method must be one of [`HttpMethod`].
pub fn parse_route_descriptor(descriptor: &str) -> Result<(HttpMethod, String)> {
    let invalid = || NestrsError::InvalidRoute {
        field: String::new(),
        descriptor: descriptor.to_string(),
    };

    let parts: Vec<&str> = descriptor.split_whitespace().collect();
    let [method, path] = parts.as_slice() else {
        return Err(invalid());
    };

    let method = HttpMethod::from_str(method).map_err(|_| invalid())?;
    validate_path(path).map_err(|_| invalid())?;

    Ok((method, (*path).to_string()))
}

/// Why a path template cannot be routed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path must start with '/'")]
    MissingLeadingSlash,
    #[error("parameter name {0:?} is not an identifier")]
    InvalidParameter(String),
    #[error("parameter {0:?} appears more than once")]
    DuplicateParameter(String),
    #[error("wildcard {0:?} must be the last segment")]
    WildcardNotLast(String),
    #[error("segment {0:?} contains a brace")]
    Brace(String),
}

/// Check a `:name` / `*name` template against what the router accepts
///
/// Parameter names are identifiers and unique within the path, a wildcard
/// only appears as the last segment, and literal segments carry no braces.
pub fn validate_path(path: &str) -> std::result::Result<(), PathError> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(PathError::MissingLeadingSlash);
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let mut names = HashSet::new();
    for (index, segment) in segments.iter().enumerate() {
        let (name, wildcard) = match (segment.strip_prefix(':'), segment.strip_prefix('*')) {
            (Some(name), _) => (name, false),
            (_, Some(name)) => (name, true),
            _ if segment.contains(['{', '}']) => return Err(PathError::Brace(segment.to_string())),
            _ => continue,
        };

        if !is_identifier(name) {
            return Err(PathError::InvalidParameter(name.to_string()));
        }
        if wildcard && index + 1 != segments.len() {
            return Err(PathError::WildcardNotLast(name.to_string()));
        }
        if !names.insert(name) {
            return Err(PathError::DuplicateParameter(name.to_string()));
        }
    }

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Join a controller base URL with a route sub-path
///
/// `"/users" + "/:id"` gives `"/users/:id"`; `"/users" + "/"` gives `"/users"`.
pub fn join_paths(base: &str, sub: &str) -> String {
    let base = base.trim_end_matches('/');
    let sub = sub.trim_start_matches('/');

    let joined = match (base.is_empty(), sub.is_empty()) {
        (true, true) => return "/".to_string(),
        (true, false) => format!("/{sub}"),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{sub}"),
    };

    if joined.len() > 1 {
        joined.trim_end_matches('/').to_string()
    } else {
        joined
    }
}

/// Whether a template contains a `:name` or `*name` segment
pub fn is_parameterized(path: &str) -> bool {
    path.split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

/// Translate `:name` segments to the router's `{name}` syntax
///
/// Wildcard segments `*rest` become `{*rest}`.
pub fn to_native_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_route_descriptor() {
        let (method, path) = parse_route_descriptor("GET /:id").unwrap();
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(path, "/:id");

        let (method, _) = parse_route_descriptor("  delete   /  ").unwrap();
        assert_eq!(method, HttpMethod::Delete);
    }

    #[test]
    fn test_parse_route_descriptor_rejects_wrong_token_count() {
        assert!(parse_route_descriptor("GET").is_err());
        assert!(parse_route_descriptor("GET /a /b").is_err());
        assert!(parse_route_descriptor("").is_err());
    }

    #[test]
    fn test_parse_route_descriptor_rejects_unroutable_paths() {
        assert!(parse_route_descriptor("GET /*rest/more").is_err());
        assert!(parse_route_descriptor("GET /:").is_err());
        assert!(parse_route_descriptor("GET /a{b").is_err());
        assert!(parse_route_descriptor("GET /:id/:id").is_err());
        assert!(parse_route_descriptor("GET /:1st").is_err());
        assert!(parse_route_descriptor("GET /files/*path").is_ok());
    }

    #[test]
    fn test_validate_path() {
        assert_eq!(validate_path("/users/:id"), Ok(()));
        assert_eq!(validate_path("/"), Ok(()));
        assert_eq!(validate_path("users"), Err(PathError::MissingLeadingSlash));
        assert_eq!(
            validate_path("/files/*rest/more"),
            Err(PathError::WildcardNotLast("rest".to_string()))
        );
        assert_eq!(
            validate_path("/files/:"),
            Err(PathError::InvalidParameter(String::new()))
        );
        assert_eq!(validate_path("/g/a{b"), Err(PathError::Brace("a{b".to_string())));
        assert_eq!(
            validate_path("/a/:id/b/:id"),
            Err(PathError::DuplicateParameter("id".to_string()))
        );
    }

    #[test]
    fn test_parse_route_descriptor_rejects_unknown_method() {
        assert!(parse_route_descriptor("FETCH /").is_err());
        assert!(parse_route_descriptor("GET users").is_err());
    }

    #[test]
    fn test_every_method_round_trips_through_display() {
        for method in HttpMethod::iter() {
            assert_eq!(HttpMethod::from_str(&method.to_string()).unwrap(), method);
            assert_eq!(method.as_method().as_str(), method.to_string());
        }
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/users", "/:id"), "/users/:id");
        assert_eq!(join_paths("/users/", "/:id"), "/users/:id");
        assert_eq!(join_paths("/users", "/"), "/users");
        assert_eq!(join_paths("/", "/"), "/");
        assert_eq!(join_paths("/", "/health"), "/health");
    }

    #[test]
    fn test_to_native_path() {
        assert_eq!(to_native_path("/users/:id"), "/users/{id}");
        assert_eq!(
            to_native_path("/users/:user_id/posts/:post_id"),
            "/users/{user_id}/posts/{post_id}"
        );
        assert_eq!(to_native_path("/files/*path"), "/files/{*path}");
        assert_eq!(to_native_path("/users"), "/users");
    }

    #[test]
    fn test_is_parameterized() {
        assert!(is_parameterized("/users/:id"));
        assert!(is_parameterized("/files/*path"));
        assert!(!is_parameterized("/users"));
        assert!(!is_parameterized("/"));
    }
}
