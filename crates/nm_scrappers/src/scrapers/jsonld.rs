use scraper::{Html, Selector};
use serde_json::Value;

/// Every JSON-LD object on the page. `@graph` containers and top-level
/// arrays are flattened.
pub fn objects(document: &Html) -> Vec<Value> {
    let mut objects = Vec::new();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            if let Ok(json) = serde_json::from_str::<Value>(script.text().collect::<String>().trim()) {
                flatten(json, &mut objects);
            }
        }
    }

    objects
}

fn flatten(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten(item, out)),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

/// First string value stored under `key` in any JSON-LD object.
///
/// Besides plain strings, `{"url": ..}` objects and arrays of either are
/// accepted, which covers how sites publish `image`.
pub fn find_string(document: &Html, key: &str) -> Option<String> {
    objects(document)
        .iter()
        .filter_map(|obj| obj.get(key))
        .find_map(as_string)
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj.get("url").and_then(as_string),
        Value::Array(items) => items.iter().find_map(as_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_in_graph() {
        let html = r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
                {"@type":"WebPage","name":"Portada"},
                {"@type":"NewsArticle","datePublished":"2024-03-01T09:00:00+00:00",
                 "image":{"@type":"ImageObject","url":"https://x.mx/mina.jpg"}}
            ]}</script>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            find_string(&document, "datePublished").as_deref(),
            Some("2024-03-01T09:00:00+00:00")
        );
        assert_eq!(find_string(&document, "image").as_deref(), Some("https://x.mx/mina.jpg"));
        assert_eq!(find_string(&document, "author"), None);
    }

    #[test]
    fn test_invalid_json_is_ignored() {
        let html = r#"<script type="application/ld+json">{not json</script>
            <script type="application/ld+json">[{"image":["", "https://x.mx/a.jpg"]}]</script>"#;
        let document = Html::parse_document(html);
        assert_eq!(find_string(&document, "image").as_deref(), Some("https://x.mx/a.jpg"));
    }
}
