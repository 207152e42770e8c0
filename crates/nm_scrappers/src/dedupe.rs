use std::collections::HashSet;
use nm_core::Article;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    pub articles: Vec<Article>,
    pub removed: usize,
}

/// Keep the first article for each title, compared trimmed and
/// case-insensitively. Order of the survivors is preserved.
pub fn deduplicate(articles: Vec<Article>) -> Deduplicated {
    let mut seen = HashSet::new();
    let before = articles.len();
    let articles: Vec<Article> = articles
        .into_iter()
        .filter(|article| seen.insert(article.dedupe_key()))
        .collect();
    let removed = before - articles.len();
    if removed > 0 {
        info!(removed, remaining = articles.len(), "Removed duplicate articles");
    }
    Deduplicated { articles, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, source: &str) -> Article {
        Article::new(title, format!("https://{}.mx/{}", source, title.len()), source)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let result = deduplicate(vec![
            article("Oro sube", "uno"),
            article("ORO SUBE ", "dos"),
            article("Plata baja", "dos"),
        ]);
        let got: Vec<(&str, &str)> = result
            .articles
            .iter()
            .map(|a| (a.title.as_str(), a.source.as_str()))
            .collect();
        assert_eq!(got, vec![("Oro sube", "uno"), ("Plata baja", "dos")]);
        assert_eq!(result.removed, 1);
    }

    #[test]
    fn test_idempotent() {
        let once = deduplicate(vec![
            article("a", "x"),
            article("A", "y"),
            article("b", "x"),
            article(" b", "z"),
        ]);
        let twice = deduplicate(once.articles.clone());
        assert_eq!(twice.articles, once.articles);
        assert_eq!(twice.removed, 0);
    }

    #[test]
    fn test_empty() {
        assert_eq!(deduplicate(Vec::new()), Deduplicated::default());
    }
}
