//! Generated movie descriptions, cached in Redis.

use std::sync::Arc;

use crate::{
    db::{Cache, CacheKey},
    error::AppResult,
    services::textgen::TextGenerator,
};

/// 1 week in seconds; descriptions for a fixed title rarely change.
const DESCRIPTION_CACHE_TTL: u64 = 604_800;

pub struct DescribeService {
    textgen: Arc<dyn TextGenerator>,
    cache: Cache,
}

impl DescribeService {
    pub fn new(textgen: Arc<dyn TextGenerator>, cache: Cache) -> Self {
        Self { textgen, cache }
    }

    pub async fn describe(&self, movie_name: &str, release_date: &str) -> AppResult<String> {
        let key = CacheKey::Description(movie_name.to_string(), release_date.to_string());

        if let Some(cached) = self.cache.get::<String>(&key).await {
            tracing::debug!(movie_name = %movie_name, "description cache hit");
            return Ok(cached);
        }

        tracing::info!(movie_name = %movie_name, "generating movie description");

        let prompt = build_description_prompt(movie_name, release_date);
        let description = self.textgen.generate(&prompt).await?;

        self.cache
            .put(&key, &description, DESCRIPTION_CACHE_TTL)
            .await;

        Ok(description)
    }
}

fn build_description_prompt(movie_name: &str, release_date: &str) -> String {
    format!(
        "You are a movie expert.\n\
         \n\
         Movie Name: {}\n\
         Release Date: {}\n\
         \n\
         Write a concise and engaging movie description including:\n\
         - Genre\n\
         - Plot summary (no spoilers)\n\
         - Mood and themes\n",
        movie_name, release_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::textgen::MockTextGenerator;

    fn unreachable_cache() -> Cache {
        // Nothing listens here; every cache operation degrades to a miss.
        Cache::new(redis::Client::open("redis://127.0.0.1:1").unwrap())
    }

    #[test]
    fn test_build_description_prompt_includes_movie_details() {
        let prompt = build_description_prompt("Inception", "2010-07-16");
        assert!(prompt.contains("Movie Name: Inception"));
        assert!(prompt.contains("Release Date: 2010-07-16"));
        assert!(prompt.contains("no spoilers"));
    }

    #[tokio::test]
    async fn test_describe_returns_generated_text() {
        let mut textgen = MockTextGenerator::new();
        textgen
            .expect_generate()
            .returning(|_| Ok("A heist inside dreams.".to_string()));

        let service = DescribeService::new(Arc::new(textgen), unreachable_cache());
        let description = service.describe("Inception", "2010-07-16").await.unwrap();
        assert_eq!(description, "A heist inside dreams.");
    }

    #[tokio::test]
    async fn test_describe_propagates_generation_failure() {
        use crate::error::AppError;

        let mut textgen = MockTextGenerator::new();
        textgen
            .expect_generate()
            .returning(|_| Err(AppError::Dependency("text generation unavailable".to_string())));

        let service = DescribeService::new(Arc::new(textgen), unreachable_cache());
        let result = service.describe("Inception", "2010-07-16").await;
        assert!(matches!(result, Err(AppError::Dependency(_))));
    }
}
