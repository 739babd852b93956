//! Page wrapper document, a minijinja template. The rendered body is passed
//! as `content`; `title` and `skin` are available as well.

use crate::domain::DomainError;
use minijinja::Environment;
use std::path::Path;
use tracing::info;

/// Variable the wrapper must reference to place the page body.
pub const CONTENT_VAR: &str = "content";

const DEFAULT_TEMPLATE: &str = include_str!("templates/page.html");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    source: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PageTemplate {
    /// Fails when the wrapper does not compile or never uses `content`.
    pub fn parse(source: impl Into<String>) -> Result<Self, DomainError> {
        let source = source.into();
        let env = Environment::new();
        let template = env
            .template_from_str(&source)
            .map_err(|e| DomainError::Template(e.to_string()))?;
        if !template.undeclared_variables(false).contains(CONTENT_VAR) {
            return Err(DomainError::Template(format!(
                "template never uses {{{{ {} }}}}",
                CONTENT_VAR
            )));
        }
        Ok(Self { source })
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Template(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "loaded page template");
        Self::parse(text)
    }

    /// Download the wrapper, e.g. a page exported from the hosted site.
    pub async fn from_url(url: &str) -> Result<Self, DomainError> {
        let res = reqwest::get(url)
            .await
            .map_err(|e| DomainError::Template(format!("Request failed: {}", e)))?;
        if !res.status().is_success() {
            return Err(DomainError::Template(format!(
                "GET {} returned {}",
                url,
                res.status()
            )));
        }
        let text = res
            .text()
            .await
            .map_err(|e| DomainError::Template(format!("Reading {} failed: {}", url, e)))?;
        info!(url, "downloaded page template");
        Self::parse(text)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_content_variable() {
        assert!(matches!(
            PageTemplate::parse("<html>{{ title }}</html>"),
            Err(DomainError::Template(_))
        ));
        assert!(PageTemplate::parse("<main>{{content}}</main>").is_ok());
        assert!(PageTemplate::parse("<main>{{ content }}</main>").is_ok());
    }

    #[test]
    fn test_rejects_broken_syntax() {
        let err = PageTemplate::parse("<main>{{ content </main>").unwrap_err();
        assert!(matches!(err, DomainError::Template(_)));
    }

    #[test]
    fn test_default_wrapper_uses_title_and_skin() {
        let template = PageTemplate::default();
        assert!(template.source().contains("{{ title }}"));
        assert!(template.source().contains("{{ skin }}"));
        assert!(PageTemplate::parse(template.source()).is_ok());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapper.html");
        std::fs::write(&path, "<div>{{ content }}</div>").unwrap();
        let template = PageTemplate::from_file(&path).await.unwrap();
        assert_eq!(template.source(), "<div>{{ content }}</div>");
    }
}
