use super::Article;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ArticleError {
    #[error("article {0} not found")]
    NotFound(i64),

    #[error("failed to fetch article: {0}")]
    Fetch(String),

    #[error("failed to parse article page: {0}")]
    Parse(String),
}

/// The blog the audiobooks are produced from.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn exists(&self, id: i64) -> Result<bool, ArticleError>;
    async fn read(&self, id: i64) -> Result<Article, ArticleError>;
}

/// Scrapes blog.weirdx.io post pages. Extraction leans on the OpenGraph meta
/// tags the blog emits and falls back to whole-page content; it is a thin
/// helper, not a general HTML parser.
pub struct HttpArticleSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpArticleSource {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn post_url(&self, id: i64) -> String {
        format!("{}/post/{}", self.base_url.trim_end_matches('/'), id)
    }
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    async fn exists(&self, id: i64) -> Result<bool, ArticleError> {
        let response = self
            .http
            .head(self.post_url(id))
            .send()
            .await
            .map_err(|e| ArticleError::Fetch(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(ArticleError::Fetch(format!(
                "unexpected status {status} checking post {id}"
            ))),
        }
    }

    async fn read(&self, id: i64) -> Result<Article, ArticleError> {
        let response = self
            .http
            .get(self.post_url(id))
            .send()
            .await
            .map_err(|e| ArticleError::Fetch(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ArticleError::NotFound(id));
        }
        if !response.status().is_success() {
            return Err(ArticleError::Fetch(format!(
                "unexpected status {} reading post {id}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| ArticleError::Fetch(e.to_string()))?;

        parse_article(id, &html)
    }
}

pub(crate) fn parse_article(id: i64, html: &str) -> Result<Article, ArticleError> {
    let title = capture(html, r"<title>([^<]*)</title>")
        .map(|t| t.trim().to_string())
        .ok_or_else(|| ArticleError::Parse(format!("post {id} has no title")))?;

    let category = meta_content(html, "article:section").unwrap_or_default();
    let tags = meta_contents(html, "article:tag");
    let author = capture(html, r#"rel="author"[^>]*>([^<]+)<"#)
        .map(|a| a.trim().to_string())
        .unwrap_or_default();

    let published_at = meta_content(html, "article:published_time")
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let content = capture(html, r"(?s)<article[^>]*>(.*?)</article>")
        .or_else(|| capture(html, r"(?s)<body[^>]*>(.*?)</body>"))
        .ok_or_else(|| ArticleError::Parse(format!("post {id} has no article body")))?;

    Ok(Article {
        id,
        title,
        category,
        tags,
        published_at,
        author,
        content,
    })
}

fn capture(html: &str, pattern: &str) -> Option<String> {
    let re = regex::Regex::new(pattern).unwrap();
    re.captures(html).map(|c| c[1].to_string())
}

fn meta_content(html: &str, property: &str) -> Option<String> {
    let pattern = format!(r#"<meta[^>]*property="{property}"[^>]*content="([^"]*)""#);
    capture(html, &pattern).map(|c| c.trim().to_string())
}

fn meta_contents(html: &str, property: &str) -> Vec<String> {
    let pattern = format!(r#"<meta[^>]*property="{property}"[^>]*content="([^"]*)""#);
    let re = regex::Regex::new(&pattern).unwrap();
    re.captures_iter(html)
        .map(|c| c[1].trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
        <html>
        <head>
            <title>A Post About Rust</title>
            <meta property="article:section" content="Programming" />
            <meta property="article:tag" content="rust" />
            <meta property="article:tag" content="async" />
            <meta property="article:published_time" content="2019-03-01T09:30:00+09:00" />
        </head>
        <body>
            <span class="author"><a rel="author" href="/u/1">sokra</a></span>
            <article class="post">
                <h2>Heading</h2>
                <p>Body text.</p>
            </article>
        </body>
        </html>
    "#;

    #[test]
    fn it_extracts_article_fields_from_meta_tags() {
        let article = parse_article(42, PAGE).unwrap();
        assert_eq!(article.id, 42);
        assert_eq!(article.title, "A Post About Rust");
        assert_eq!(article.category, "Programming");
        assert_eq!(article.tags, vec!["rust".to_string(), "async".to_string()]);
        assert_eq!(article.author, "sokra");
        assert!(article.published_at.is_some());
        assert!(article.content.contains("<p>Body text.</p>"));
    }

    #[test]
    fn it_falls_back_to_the_body_when_there_is_no_article_element() {
        let page = "<html><head><title>t</title></head><body><p>hi</p></body></html>";
        let article = parse_article(1, page).unwrap();
        assert!(article.content.contains("<p>hi</p>"));
        assert_eq!(article.category, "");
        assert!(article.tags.is_empty());
    }

    #[test]
    fn a_page_without_a_title_is_a_parse_error() {
        let err = parse_article(1, "<html><body>x</body></html>").unwrap_err();
        assert!(matches!(err, ArticleError::Parse(_)));
    }
}
