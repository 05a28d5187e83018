// ── Query keys ──
//
// Hierarchical cache keys: `[resource, kind, params?]`. Invalidation works
// on prefixes, so `["providers"]` covers every provider query and
// `["providers", "list"]` covers every provider list regardless of params.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Extend with one more segment.
    #[must_use]
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Extend with a canonical JSON rendering of `params`.
    #[must_use]
    pub fn with_params<P: Serialize>(self, params: &P) -> Self {
        let rendered = serde_json::to_string(params).unwrap_or_default();
        self.child(rendered)
    }

    /// Whether `prefix` is a leading run of this key's segments.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Key factories, one module per resource.
pub mod keys {
    pub mod providers {
        use crate::query::QueryKey;

        pub fn all() -> QueryKey {
            QueryKey::new(["providers"])
        }

        pub fn lists() -> QueryKey {
            all().child("list")
        }

        pub fn details() -> QueryKey {
            all().child("detail")
        }

        pub fn detail(name: &str) -> QueryKey {
            details().child(name)
        }

        pub fn stats(name: &str) -> QueryKey {
            all().child("stats").child(name)
        }
    }

    pub mod webhooks {
        use hookgate_api::WebhookQuery;

        use crate::query::QueryKey;

        pub fn all() -> QueryKey {
            QueryKey::new(["webhooks"])
        }

        pub fn lists() -> QueryKey {
            all().child("list")
        }

        pub fn list(query: &WebhookQuery) -> QueryKey {
            lists().with_params(query)
        }

        pub fn detail(id: &str) -> QueryKey {
            all().child("detail").child(id)
        }

        pub fn all_stats() -> QueryKey {
            all().child("stats")
        }

        pub fn stats(provider_name: Option<&str>) -> QueryKey {
            all_stats().with_params(&provider_name)
        }
    }

    pub mod security_logs {
        use hookgate_api::SecurityLogQuery;

        use crate::query::QueryKey;

        pub fn all() -> QueryKey {
            QueryKey::new(["security-logs"])
        }

        pub fn lists() -> QueryKey {
            all().child("list")
        }

        pub fn list(query: &SecurityLogQuery) -> QueryKey {
            lists().with_params(query)
        }

        pub fn detail(id: &str) -> QueryKey {
            all().child("detail").child(id)
        }

        pub fn stats() -> QueryKey {
            all().child("stats")
        }
    }

    pub mod health {
        use crate::query::QueryKey;

        pub fn all() -> QueryKey {
            QueryKey::new(["health"])
        }

        pub fn status() -> QueryKey {
            all().child("status")
        }

        pub fn metrics() -> QueryKey {
            all().child("metrics")
        }
    }
}

#[cfg(test)]
mod tests {
    use hookgate_api::{Pagination, WebhookQuery};

    use super::keys;

    #[test]
    fn prefixes_cover_children() {
        let detail = keys::providers::detail("stripe");
        assert!(detail.starts_with(&keys::providers::all()));
        assert!(detail.starts_with(&keys::providers::details()));
        assert!(!detail.starts_with(&keys::providers::lists()));
        assert!(!keys::providers::all().starts_with(&detail));
    }

    #[test]
    fn params_distinguish_lists() {
        let first = keys::webhooks::list(&WebhookQuery::default());
        let second = keys::webhooks::list(&WebhookQuery {
            page: Pagination::new(50, 50),
            ..WebhookQuery::default()
        });
        assert_ne!(first, second);
        assert!(first.starts_with(&keys::webhooks::lists()));
        assert_eq!(first.to_string(), r#"webhooks/list/{"limit":50,"offset":0}"#);
    }

    #[test]
    fn detail_names_do_not_collide_across_resources() {
        assert_ne!(keys::webhooks::detail("x"), keys::security_logs::detail("x"));
    }
}
