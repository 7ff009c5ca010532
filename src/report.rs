//! Plain-text rendering of a topic analysis.
//!
//! Presentation only: every number shown here comes straight from
//! [`TopicAnalysis`](crate::aggregate::TopicAnalysis). ASCII layout for
//! stable console output.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::aggregate::TopicAnalysis;

const RULE: &str = "==================================================";
/// Hashtags shown in the report (the artifact keeps up to 20).
const REPORT_HASHTAGS: usize = 10;

pub fn render(analysis: &TopicAnalysis) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "REPORTE COMPLETO: {}", analysis.topic.to_uppercase());
    let _ = writeln!(out, "{RULE}\n");
    let _ = writeln!(
        out,
        "Rango temporal: {} a {}",
        analysis.first_post_at, analysis.last_post_at
    );
    let _ = writeln!(out, "Publicaciones analizadas: {}", analysis.total_posts);
    let _ = writeln!(out, "Idiomas presentes: {}\n", analysis.languages.join(", "));

    let _ = writeln!(out, "SENTIMIENTOS:");
    for (category, count) in analysis.breakdown.shares() {
        let _ = writeln!(out, "  {}: {:.1}%", category, analysis.breakdown.pct(count));
    }

    let _ = writeln!(out, "\nPALABRAS POSITIVAS RELEVANTES:");
    for (word, count) in &analysis.positive_words {
        let _ = writeln!(out, "  {word}: {count}");
    }

    let _ = writeln!(out, "\nPALABRAS NEGATIVAS RELEVANTES:");
    for (word, count) in &analysis.negative_words {
        let _ = writeln!(out, "  {word}: {count}");
    }

    let _ = writeln!(out, "\nTENDENCIA DOMINANTE:");
    if analysis.trend.marked {
        let _ = writeln!(
            out,
            "  Existe una tendencia marcada hacia el sentimiento **{}** ({:.1}%)",
            analysis.trend.category.to_string().to_uppercase(),
            analysis.trend.pct
        );
    } else {
        let _ = writeln!(
            out,
            "  No se detecta una tendencia clara dominante en los sentimientos expresados."
        );
    }

    let _ = writeln!(out, "\nTOP HASHTAGS:");
    for (tag, count) in analysis.hashtags.iter().take(REPORT_HASHTAGS) {
        let _ = writeln!(out, "  #{tag}: {count}");
    }

    let _ = writeln!(out, "\nUSUARIOS MENCIONADOS:");
    for (user, count) in &analysis.mentions {
        let _ = writeln!(out, "  @{user}: {count}");
    }

    let _ = writeln!(out, "\nTENDENCIA MENSUAL:");
    for (month, count) in &analysis.monthly_trend {
        let _ = writeln!(out, "  {month}: {count}");
    }

    let s = &analysis.stats;
    let _ = writeln!(out, "\nESTADISTICAS DE SENTIMIENTO:");
    let _ = writeln!(out, "  media: {:.4}", s.mean);
    let _ = writeln!(out, "  mediana: {:.4}", s.median);
    let _ = writeln!(out, "  desviacion estandar: {:.4}", s.std_dev);
    let _ = writeln!(out, "  rango intercuartil: {:.4}", s.iqr);

    let _ = writeln!(out, "\nPUBLICACIONES DESTACADAS:");
    for top in &analysis.top_posts {
        let p = &top.post;
        let _ = writeln!(out, "\n{} | @{}", p.timestamp.format("%Y-%m-%d %H:%M"), p.author);
        let _ = writeln!(
            out,
            "Likes {} | Retweets {} | Respuestas {}",
            p.likes, p.retweets, p.replies
        );
        let _ = writeln!(out, "{}", p.text);
    }

    out
}

/// Write the rendered report as `reporte_<topic>.txt` inside `dir`,
/// returning the full path.
pub fn save(analysis: &TopicAnalysis, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("reporte_{}.txt", analysis.topic));
    fs::write(&path, render(analysis))
        .with_context(|| format!("writing report to {}", path.display()))?;
    Ok(path)
}
