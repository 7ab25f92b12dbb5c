//! Endpoint registry: symbolic call name → HTTP verb and path template.
//!
//! Paths are relative to the OpenAPI base URL and may contain `{Name}`
//! placeholders filled from the call's parameters. The trailing slashes on
//! the order endpoints are kept exactly as the gateway lists them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use crate::types::{Result, SaxoError};

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether call parameters travel in the query string.
    pub fn carries_query(&self) -> bool {
        matches!(self, Verb::Get | Verb::Delete)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verb> for reqwest::Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An immutable `(verb, path template)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub verb: Verb,
    pub path: &'static str,
}

impl Endpoint {
    const fn new(verb: Verb, path: &'static str) -> Self {
        Self { verb, path }
    }

    /// Placeholder names in the path template, left to right.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.path;
        while let Some((name, _, tail)) = next_placeholder(rest) {
            names.push(name);
            rest = tail;
        }
        names
    }

    /// Substitute every placeholder from `params` in one left-to-right pass.
    ///
    /// Values are percent-encoded. A placeholder with no value is an error,
    /// as is `.` or `..`, which URL joining would collapse into a different
    /// path.
    pub fn resolve_path(&self, params: &BTreeMap<String, String>) -> Result<String> {
        let mut resolved = String::with_capacity(self.path.len());
        let mut rest = self.path;
        while let Some((name, head, tail)) = next_placeholder(rest) {
            let value = params
                .get(name)
                .ok_or_else(|| SaxoError::MissingParameter(name.to_string()))?;
            if value == "." || value == ".." {
                return Err(SaxoError::InvalidUrl(format!(
                    "{{{name}}} may not be a dot segment: {value:?}"
                )));
            }
            resolved.push_str(head);
            resolved.push_str(&urlencoding::encode(value));
            rest = tail;
        }
        resolved.push_str(rest);
        Ok(resolved)
    }
}

/// Find the next `{Name}` in `s`.
///
/// Returns the name, the text before the placeholder, and the text after it.
/// Braces around anything but ASCII letters and digits are literal text.
fn next_placeholder(s: &str) -> Option<(&str, &str, &str)> {
    let mut offset = 0;
    while let Some(open) = s[offset..].find('{').map(|i| i + offset) {
        let after = &s[open + 1..];
        if let Some(close) = after.find('}') {
            let name = &after[..close];
            if !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Some((name, &s[..open], &after[close + 1..]));
            }
        }
        offset = open + 1;
    }
    None
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const CATALOG: &[(&str, Endpoint)] = &[
    ("user", Endpoint::new(Verb::Get, "port/v1/users/me")),
    ("balance", Endpoint::new(Verb::Get, "port/v1/balances")),
    ("client", Endpoint::new(Verb::Get, "port/v1/clients/me")),
    ("account", Endpoint::new(Verb::Get, "port/v1/accounts/me")),
    ("instruments", Endpoint::new(Verb::Get, "ref/v1/instruments")),
    ("instrument_details", Endpoint::new(Verb::Get, "ref/v1/instruments/details")),
    ("prices", Endpoint::new(Verb::Get, "trade/v1/infoprices/list")),
    ("make_order", Endpoint::new(Verb::Post, "trade/v2/orders")),
    ("order_list", Endpoint::new(Verb::Get, "port/v1/orders/me")),
    ("order_details", Endpoint::new(Verb::Get, "port/v1/orders/{ClientKey}/{OrderId}/")),
    ("positions", Endpoint::new(Verb::Get, "port/v1/positions/me")),
    ("net_positions", Endpoint::new(Verb::Get, "port/v1/netpositions/me")),
    ("order", Endpoint::new(Verb::Get, "trade/v2/orders/")),
    ("cancel_order", Endpoint::new(Verb::Delete, "trade/v2/orders/")),
    ("replace_order", Endpoint::new(Verb::Put, "trade/v2/orders/")),
    ("quotes", Endpoint::new(Verb::Get, "trade/v1/infoprices/snapshot")),
    ("chart", Endpoint::new(Verb::Get, "chart/v1/charts")),
    ("chart_data", Endpoint::new(Verb::Get, "chart/v1/charts/")),
    ("chart_list", Endpoint::new(Verb::Get, "chart/v1/charts/me")),
    ("chart_config", Endpoint::new(Verb::Get, "chart/v1/configurations")),
];

static REGISTRY: LazyLock<HashMap<&'static str, Endpoint>> =
    LazyLock::new(|| CATALOG.iter().copied().collect());

/// Look up a symbolic call name.
pub fn resolve(name: &str) -> Result<Endpoint> {
    REGISTRY
        .get(name)
        .copied()
        .ok_or_else(|| SaxoError::NotFound(name.to_string()))
}

/// Every registered call name, in catalog order.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_known_endpoints() {
        assert_eq!(
            resolve("instruments").unwrap(),
            Endpoint { verb: Verb::Get, path: "ref/v1/instruments" }
        );
        assert_eq!(resolve("make_order").unwrap().verb, Verb::Post);
        assert_eq!(resolve("replace_order").unwrap().verb, Verb::Put);
        let cancel = resolve("cancel_order").unwrap();
        assert_eq!(cancel.verb, Verb::Delete);
        assert_eq!(cancel.path, "trade/v2/orders/");
    }

    #[test]
    fn test_resolve_unknown_is_not_found() {
        match resolve("withdraw_everything") {
            Err(SaxoError::NotFound(name)) => assert_eq!(name, "withdraw_everything"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let all: Vec<_> = names().collect();
        assert_eq!(all.len(), REGISTRY.len());
        assert!(all.contains(&"net_positions"));
    }

    #[test]
    fn test_query_verbs() {
        assert!(Verb::Get.carries_query());
        assert!(Verb::Delete.carries_query());
        assert!(!Verb::Post.carries_query());
        assert!(!Verb::Put.carries_query());
        assert_eq!(reqwest::Method::from(Verb::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_placeholders_listed_in_order() {
        let ep = resolve("order_details").unwrap();
        assert_eq!(ep.placeholders(), vec!["ClientKey", "OrderId"]);
        assert!(resolve("user").unwrap().placeholders().is_empty());
    }

    #[test]
    fn test_resolve_path_substitutes_all() {
        let ep = resolve("order_details").unwrap();
        let path = ep
            .resolve_path(&params(&[("ClientKey", "C1"), ("OrderId", "O9")]))
            .unwrap();
        assert_eq!(path, "port/v1/orders/C1/O9/");
    }

    #[test]
    fn test_resolve_path_missing_value() {
        let ep = resolve("order_details").unwrap();
        let err = ep.resolve_path(&params(&[("ClientKey", "C1")])).unwrap_err();
        assert!(matches!(err, SaxoError::MissingParameter(name) if name == "OrderId"));
    }

    #[test]
    fn test_resolve_path_encodes_values() {
        let ep = Endpoint::new(Verb::Get, "x/{Id}/y");
        let path = ep.resolve_path(&params(&[("Id", "a b/c")])).unwrap();
        assert_eq!(path, "x/a%20b%2Fc/y");
    }

    #[test]
    fn test_resolve_path_rejects_dot_segments() {
        let ep = resolve("order_details").unwrap();
        for dots in [".", ".."] {
            let err = ep
                .resolve_path(&params(&[("ClientKey", "C1"), ("OrderId", dots)]))
                .unwrap_err();
            assert!(matches!(err, SaxoError::InvalidUrl(_)));
        }
        let path = ep
            .resolve_path(&params(&[("ClientKey", "C1"), ("OrderId", "...")]))
            .unwrap();
        assert_eq!(path, "port/v1/orders/C1/.../");
    }

    #[test]
    fn test_repeated_placeholder_each_substituted() {
        let ep = Endpoint::new(Verb::Get, "{A}/{A}");
        assert_eq!(ep.resolve_path(&params(&[("A", "1")])).unwrap(), "1/1");
    }

    #[test]
    fn test_non_identifier_braces_are_literal() {
        let ep = Endpoint::new(Verb::Get, "x/{not-a-name}/{Id}");
        assert_eq!(ep.placeholders(), vec!["Id"]);
        assert_eq!(
            ep.resolve_path(&params(&[("Id", "7")])).unwrap(),
            "x/{not-a-name}/7"
        );
    }

    #[test]
    fn test_path_without_placeholders_unchanged() {
        let ep = resolve("order").unwrap();
        assert_eq!(ep.resolve_path(&BTreeMap::new()).unwrap(), "trade/v2/orders/");
    }
}
