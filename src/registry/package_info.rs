//! Registry metadata

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the registry knows about a package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `dist-tags.latest`
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    /// Browsable repository URL
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
}

impl PackageInfo {
    /// Build from an npm registry document. Unknown or malformed fields are
    /// left empty.
    #[must_use]
    pub fn from_registry_document(name: &str, doc: &Value) -> Self {
        let text = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let repository = match doc.get("repository") {
            Some(Value::String(url)) => normalize_repository_url(url),
            Some(Value::Object(repo)) => repo
                .get("url")
                .and_then(Value::as_str)
                .and_then(normalize_repository_url),
            _ => None,
        };

        Self {
            name: text("name").unwrap_or_else(|| name.to_string()),
            description: text("description"),
            version: doc
                .pointer("/dist-tags/latest")
                .and_then(Value::as_str)
                .map(str::to_string),
            homepage: text("homepage"),
            repository,
            readme: text("readme"),
        }
    }
}

/// Turn `git+https://…/x.git`, `git://…`, `git@github.com:o/r.git` or
/// `github:o/r` into a browsable https URL
#[must_use]
pub fn normalize_repository_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let url = if let Some(rest) = raw.strip_prefix("github:") {
        format!("https://github.com/{rest}")
    } else if let Some(rest) = raw.strip_prefix("git@") {
        format!("https://{}", rest.replacen(':', "/", 1))
    } else if !raw.contains("://") && raw.matches('/').count() == 1 {
        // npm shorthand "owner/repo"
        format!("https://github.com/{raw}")
    } else {
        raw.strip_prefix("git+")
            .unwrap_or(raw)
            .replace("git://", "https://")
            .replace("ssh://git@", "https://")
    };

    let url = url.strip_suffix(".git").unwrap_or(&url).to_string();
    url::Url::parse(&url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|_| url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repository_forms() {
        for raw in [
            "git+https://github.com/facebook/react.git",
            "git://github.com/facebook/react.git",
            "git@github.com:facebook/react.git",
            "github:facebook/react",
            "facebook/react",
        ] {
            assert_eq!(
                normalize_repository_url(raw).as_deref(),
                Some("https://github.com/facebook/react"),
                "{raw}"
            );
        }
        assert_eq!(normalize_repository_url(""), None);
    }

    #[test]
    fn registry_document_mapping() {
        let doc = json!({
            "name": "left-pad",
            "description": "String left pad",
            "dist-tags": { "latest": "1.3.0" },
            "homepage": "https://github.com/stevemao/left-pad#readme",
            "repository": { "type": "git", "url": "git+https://github.com/stevemao/left-pad.git" },
            "readme": ""
        });

        let info = PackageInfo::from_registry_document("left-pad", &doc);
        assert_eq!(info.version.as_deref(), Some("1.3.0"));
        assert_eq!(info.repository.as_deref(), Some("https://github.com/stevemao/left-pad"));
        assert_eq!(info.readme, None);
    }
}
