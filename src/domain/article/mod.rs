pub mod model;
pub mod source;

pub use model::Article;
pub use source::{ArticleError, ArticleSource, HttpArticleSource};
