//! Categories command handler.

use crate::commands::Out;
use crate::model::Categories;
use crate::{Config, Result};

/// Returns the reference list of categories: the configured categories file if it exists,
/// otherwise the built-in defaults.
pub async fn categories(config: Config) -> Result<Out<Categories>> {
    let categories = config.categories().await?;
    let message = format!("{} categories available", categories.len());
    Ok(Out::new(message, categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::DEFAULT_CATEGORIES;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_categories_defaults() {
        let env = TestEnv::new().await;
        let out = categories(env.config()).await.unwrap();
        assert_eq!(out.message(), "10 categories available");
        assert_eq!(out.structure().unwrap().names(), DEFAULT_CATEGORIES);
    }

    #[tokio::test]
    async fn test_categories_from_file() {
        let env = TestEnv::new().await;
        env.write_categories(r#"{"categories": ["Rent", "Coffee", "Books"]}"#);
        let out = categories(env.config()).await.unwrap();
        assert_eq!(out.message(), "3 categories available");
    }

    #[tokio::test]
    async fn test_categories_malformed_file() {
        let env = TestEnv::new().await;
        env.write_categories("{");
        let err = categories(env.config()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Categories);
    }
}
