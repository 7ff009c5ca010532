//! Templated idea generation from a knowledge base.
//!
//! Randomness is injected (`rand::Rng`) so suites can seed it; every loop is
//! bounded, so exhausted vocabularies produce a partial or empty set instead
//! of spinning.

use rand::Rng;
use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;

/// Sentence skeletons; `{concepto}` and `{contexto}` are filled per attempt.
const TEMPLATES: [&str; 8] = [
    "El impacto de {concepto} en {contexto}",
    "Cómo {concepto} está cambiando {contexto}",
    "La relación entre {concepto} y {contexto}",
    "Tendencias emergentes en {concepto} para {contexto}",
    "Por qué {concepto} es importante para {contexto}",
    "El futuro de {concepto} en el ámbito de {contexto}",
    "{concepto}: una nueva perspectiva sobre {contexto}",
    "Desafíos y oportunidades de {concepto} en {contexto}",
];

const CONTEXTS: [&str; 11] = [
    "la sociedad actual",
    "las redes sociales",
    "la política moderna",
    "la economía digital",
    "la cultura juvenil",
    "la tecnología emergente",
    "las discusiones públicas",
    "el ámbito empresarial",
    "la educación",
    "las relaciones internacionales",
    "el medio ambiente",
];

/// How many ranked keywords of each polarity feed the concept pool.
const KEYWORDS_PER_POLARITY: usize = 7;

/// Crude morphological bucketing by suffix (language-specific).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConceptClass {
    Concept,
    Action,
    Noun,
}

fn classify(word: &str) -> ConceptClass {
    if ["ción", "sión", "miento", "anza"].iter().any(|s| word.ends_with(s)) {
        ConceptClass::Concept
    } else if ["ar", "er", "ir"].iter().any(|s| word.ends_with(s)) {
        ConceptClass::Action
    } else {
        ConceptClass::Noun
    }
}

fn usable(word: &str) -> bool {
    word.chars().count() > 3 && word.chars().all(|c| c.is_alphabetic())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct IdeaGenerator {
    /// Templated generation attempts per run.
    pub attempts: usize,
    /// Target number of distinct ideas before padding stops.
    pub min_ideas: usize,
    /// Hard bound on the padding loop.
    pub max_pad_attempts: usize,
}

impl Default for IdeaGenerator {
    fn default() -> Self {
        Self {
            attempts: 8,
            min_ideas: 5,
            max_pad_attempts: 16,
        }
    }
}

impl IdeaGenerator {
    /// Produce a deduplicated list of candidate discussion topics, ordered by
    /// ascending length (ties lexicographic) for stable presentation.
    pub fn generate<R: Rng + ?Sized>(&self, kb: &KnowledgeBase, rng: &mut R) -> Vec<String> {
        let keywords: Vec<String> = kb
            .positive_words
            .iter()
            .take(KEYWORDS_PER_POLARITY)
            .chain(kb.negative_words.iter().take(KEYWORDS_PER_POLARITY))
            .map(|(w, _)| w.to_lowercase())
            .filter(|w| usable(w))
            .collect();
        let hashtags: Vec<String> = kb
            .hashtags
            .iter()
            .map(|(h, _)| h.to_lowercase())
            .filter(|h| usable(h))
            .collect();
        let concepts: Vec<String> = keywords
            .iter()
            .filter(|w| classify(w) == ConceptClass::Concept)
            .cloned()
            .collect();

        let mut ideas: HashSet<String> = HashSet::new();

        for _ in 0..self.attempts {
            let template = TEMPLATES[rng.random_range(0..TEMPLATES.len())];
            let context = CONTEXTS[rng.random_range(0..CONTEXTS.len())];

            let concept = if rng.random_bool(0.5) && !concepts.is_empty() {
                &concepts[rng.random_range(0..concepts.len())]
            } else if !hashtags.is_empty() {
                &hashtags[rng.random_range(0..hashtags.len())]
            } else if !keywords.is_empty() {
                &keywords[rng.random_range(0..keywords.len())]
            } else {
                continue;
            };

            let idea = template
                .replace("{concepto}", &capitalize(concept))
                .replace("{contexto}", context);
            ideas.insert(idea);
        }

        // Best-effort padding with simple keyword/hashtag pairings; bounded
        // so tiny pools cannot loop forever.
        let mut pad_attempts = 0;
        while ideas.len() < self.min_ideas
            && !keywords.is_empty()
            && !hashtags.is_empty()
            && pad_attempts < self.max_pad_attempts
        {
            pad_attempts += 1;
            let k = &keywords[rng.random_range(0..keywords.len())];
            let h = &hashtags[rng.random_range(0..hashtags.len())];
            ideas.insert(format!("¿Cómo afectará {k} a {h} en el futuro cercano?"));
        }

        let mut out: Vec<String> = ideas.into_iter().collect();
        out.sort_by(|a, b| {
            a.chars()
                .count()
                .cmp(&b.chars().count())
                .then_with(|| a.cmp(b))
        });
        out
    }
}
