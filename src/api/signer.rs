//! Project-specific query parameter injection
//!
//! Every GET gets the project's mandatory params, then the params of the first
//! optional rule whose path substrings match the request path.

use crate::models::{normalize_path, HttpMethod, Project, QueryParams};

/// Params added when one of `path_substrings` occurs in the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRule {
    pub path_substrings: &'static [&'static str],
    pub params: &'static [(&'static str, &'static str)],
}

impl ParamRule {
    fn matches(&self, path: &str) -> bool {
        self.path_substrings.iter().any(|s| path.contains(s))
    }
}

/// Parameter policy of one project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectParamPolicy {
    pub mandatory: &'static [(&'static str, &'static str)],
    /// Ordered; first match wins
    pub optional_rules: &'static [ParamRule],
}

const EMPTY_POLICY: ProjectParamPolicy = ProjectParamPolicy {
    mandatory: &[],
    optional_rules: &[],
};

const OPERATOR_POLICY: ProjectParamPolicy = ProjectParamPolicy {
    mandatory: &[("tenant", "operator")],
    optional_rules: &[
        ParamRule {
            path_substrings: &["content/items", "content/filters"],
            params: &[("catalog", "operator")],
        },
        ParamRule {
            path_substrings: &["search"],
            params: &[("scope", "operator")],
        },
    ],
};

const PARTNER_POLICY: ProjectParamPolicy = ProjectParamPolicy {
    mandatory: &[("distributor", "partner")],
    optional_rules: &[ParamRule {
        path_substrings: &["content"],
        params: &[("region", "intl")],
    }],
};

impl Project {
    pub fn param_policy(&self) -> ProjectParamPolicy {
        match self {
            Project::Standard => EMPTY_POLICY,
            Project::Operator => OPERATOR_POLICY,
            Project::Partner => PARTNER_POLICY,
        }
    }
}

/// Merges project params into outgoing GET queries
#[derive(Debug, Clone, Copy)]
pub struct RequestSigner {
    policy: ProjectParamPolicy,
}

impl RequestSigner {
    pub fn new(project: Project) -> Self {
        Self::with_policy(project.param_policy())
    }

    pub fn with_policy(policy: ProjectParamPolicy) -> Self {
        Self { policy }
    }

    pub fn augment(&self, path: &str, method: HttpMethod, base: &QueryParams) -> QueryParams {
        let mut params = base.clone();
        if method != HttpMethod::Get {
            return params;
        }

        for (k, v) in self.policy.mandatory {
            params.insert(*k, *v);
        }

        let path = normalize_path(path);
        if let Some(rule) = self.policy.optional_rules.iter().find(|r| r.matches(path)) {
            for (k, v) in rule.params {
                params.insert(*k, *v);
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_identity() {
        let signer = RequestSigner::new(Project::Standard);
        let base = QueryParams::new().with("page", "0");
        assert_eq!(signer.augment("content/items", HttpMethod::Get, &base), base);
    }

    #[test]
    fn test_mandatory_then_first_rule() {
        let signer = RequestSigner::new(Project::Operator);
        let base = QueryParams::new().with("genre", "action");
        let params = signer.augment("/content/items", HttpMethod::Get, &base);

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![("genre", "action"), ("tenant", "operator"), ("catalog", "operator")]
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let policy = ProjectParamPolicy {
            mandatory: &[],
            optional_rules: &[
                ParamRule {
                    path_substrings: &["content"],
                    params: &[("rule", "first")],
                },
                ParamRule {
                    path_substrings: &["content/items"],
                    params: &[("rule", "second")],
                },
            ],
        };
        let signer = RequestSigner::with_policy(policy);
        let params = signer.augment("content/items", HttpMethod::Get, &QueryParams::new());
        assert_eq!(params.get("rule"), Some("first"));
    }

    #[test]
    fn test_no_rule_match_only_mandatory() {
        let signer = RequestSigner::new(Project::Operator);
        let params = signer.augment("profiles", HttpMethod::Get, &QueryParams::new());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("tenant"), Some("operator"));
    }

    #[test]
    fn test_non_get_untouched() {
        let signer = RequestSigner::new(Project::Partner);
        let base = QueryParams::new().with("x", "1");
        assert_eq!(signer.augment("content/items", HttpMethod::Put, &base), base);
        assert_eq!(signer.augment("favourites/1", HttpMethod::Delete, &base), base);
    }
}
