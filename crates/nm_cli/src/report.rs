use std::fmt::Write;
use nm_core::Result;
use nm_scrappers::{Collection, SearchReport, SummarizedArticle};

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Search suggestions shown when nothing matched.
pub const NO_RESULTS_TIPS: &[&str] = &[
    "Utilice términos más generales del sector minero",
    "Reduzca el número de palabras clave (pruebe con 1 o 2)",
    "Verifique que las palabras estén escritas correctamente",
    "Pruebe con términos como: minería, exploración, proyecto, inversión",
];

/// Per-source status lines printed once collection finishes.
pub fn render_collection_status(collection: &Collection) -> String {
    let mut out = String::new();
    for (source, count) in &collection.source_counts {
        match collection.failures.iter().find(|f| &f.source == source) {
            Some(failure) => {
                let _ = writeln!(out, "⚠️  Error al procesar {}: {}", source, failure.message);
            }
            None => {
                let _ = writeln!(out, "✅ {}: {} artículos encontrados", source, count);
            }
        }
    }
    if collection.duplicates_removed > 0 {
        let _ = writeln!(out, "🔁 Duplicados eliminados: {}", collection.duplicates_removed);
    }
    out
}

fn render_article(out: &mut String, index: usize, item: &SummarizedArticle) {
    let article = &item.article;
    let _ = writeln!(out, "{}. {}", index, article.title);

    let mut meta = vec![format!(
        "Fuente: {}",
        article.host().unwrap_or_else(|| article.source.clone())
    )];
    if let Some(published) = &article.published {
        meta.push(format!("Fecha: {}", published.formatted()));
    }
    let _ = writeln!(out, "   {}", meta.join(" | "));

    if let Some(url) = article.image.as_ref().and_then(|i| i.url.as_deref()) {
        let _ = writeln!(out, "   Imagen: {}", url);
    }
    let _ = writeln!(out, "   Enlace original: {}", article.link);
    let _ = writeln!(out);
    for line in item.summary.lines() {
        let _ = writeln!(out, "   {}", line.trim_end());
    }
    let _ = writeln!(out);
}

/// Plain-text report for the terminal.
pub fn render_text(report: &SearchReport) -> String {
    let mut out = String::new();

    let keywords = if report.keywords.is_empty() {
        "(todas las noticias)".to_string()
    } else {
        report.keywords.join(", ")
    };
    let _ = writeln!(out, "Noticias mineras: {}", keywords);
    let _ = writeln!(out, "{}", RULE);

    for failure in &report.failures {
        let _ = writeln!(out, "⚠️  {} no disponible: {}", failure.source, failure.message);
    }

    if report.articles.is_empty() {
        let _ = writeln!(
            out,
            "📊 No se encontraron artículos que coincidan con los términos especificados."
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Recomendaciones para mejorar su búsqueda:");
        for tip in NO_RESULTS_TIPS {
            let _ = writeln!(out, "  • {}", tip);
        }
        return out;
    }

    let _ = writeln!(
        out,
        "📊 Se encontraron {} artículos relacionados con sus términos de búsqueda.",
        report.articles.len()
    );
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);

    for (i, item) in report.articles.iter().enumerate() {
        render_article(&mut out, i + 1, item);
    }
    out
}

/// Text rendering of a single scraped article.
pub fn render_single(item: &SummarizedArticle) -> String {
    let mut out = String::new();
    render_article(&mut out, 1, item);
    out
}

pub fn render_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
