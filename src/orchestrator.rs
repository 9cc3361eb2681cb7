use anyhow::{Context, Result};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzer::Analyzer;
use crate::budget::cap_candidates;
use crate::cluster::ClusterStore;
use crate::config::Config;
use crate::expand::expand_ambiguity;
use crate::fetch::RelationLookup;
use crate::models::{Morpheme, Relation};
use crate::normalize::{bare_query, canonicalize};
use crate::numeral;
use crate::render::render_clusters_tsv;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub numeral_tag: String,
    pub max_expansions: usize,
}

impl From<&Config> for PipelineSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            numeral_tag: cfg.numeral_tag.clone(),
            max_expansions: cfg.max_expansions,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// One word per line; a trailing newline does not add an empty word.
pub fn load_words(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading input {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

pub fn save_clusters(path: &Path, pairs: &[(String, usize)]) -> Result<()> {
    std::fs::write(path, render_clusters_tsv(pairs))
        .with_context(|| format!("Writing output {}", path.display()))?;
    Ok(())
}

fn log_progress(phase: &str, done: usize, total: usize) {
    if done % PROGRESS_EVERY == 0 && done > 0 {
        let pct = (done as f32 / total as f32 * 100.0) as u32;
        info!("{} progress - processed={}/{} ({}%)", phase, done, total, pct);
    }
}

/// Candidate list per morpheme: the digit string for numerals, else the analyzer's
/// readings, else the morpheme text itself. Never yields an empty list.
pub fn morpheme_candidates(morphemes: &[Morpheme], numeral_tag: &str) -> Vec<Vec<String>> {
    morphemes
        .iter()
        .map(|m| {
            if m.part_of_speech == numeral_tag {
                vec![numeral::parse(&m.surface)]
            } else if !m.candidates.is_empty() {
                m.candidates.iter().cloned().unique().collect()
            } else {
                vec![m.surface.clone()]
            }
        })
        .collect()
}

/// Adds the expanded analyzer readings of every representative's canonical form.
/// Returns the number of new aliases.
fn enrich_morphology<A: Analyzer>(
    store: &mut ClusterStore,
    analyzer: &A,
    settings: &PipelineSettings,
) -> Result<usize> {
    let reps = store.representatives();
    let total = reps.len();
    let mut added = 0usize;
    let mut failed = 0usize;

    for (n, i) in reps.into_iter().enumerate() {
        log_progress("Morphological enrichment", n, total);

        let canonical = store.entity(i).canonical.clone();
        if canonical.is_empty() {
            continue;
        }
        let morphemes = match analyzer.analyze(&canonical) {
            Ok(m) => m,
            Err(e) => {
                warn!("Analyzer failed - word={}, error={:#}", canonical, e);
                failed += 1;
                continue;
            }
        };

        let mut candidates = morpheme_candidates(&morphemes, &settings.numeral_tag);
        cap_candidates(&mut candidates, settings.max_expansions);
        let aliases = expand_ambiguity(&candidates)
            .with_context(|| format!("Expanding readings of {}", canonical))?;
        debug!(
            "Readings - word={}, morphemes={}, aliases={}",
            canonical,
            morphemes.len(),
            aliases.len()
        );
        added += store.extend_aliases(i, aliases.into_iter().filter(|a| !a.is_empty()));
    }

    if failed > 0 {
        warn!("Morphological enrichment skipped {} of {} representatives", failed, total);
    }
    Ok(added)
}

/// Adds synonyms and derivations of every alias of every representative.
/// Returns the number of new aliases.
async fn enrich_relations<L: RelationLookup>(store: &mut ClusterStore, lookup: &L) -> usize {
    let reps = store.representatives();
    let total = reps.len();
    let mut added = 0usize;
    let mut failed = 0usize;

    for (n, i) in reps.into_iter().enumerate() {
        log_progress("Relational enrichment", n, total);

        let queries: BTreeSet<String> = store
            .aliases(i)
            .iter()
            .map(|a| bare_query(a))
            .filter(|q| !q.is_empty())
            .collect();

        let mut found = Vec::new();
        for q in &queries {
            match lookup.lookup(q, &Relation::ALL).await {
                Ok(terms) => found.extend(terms),
                Err(e) => {
                    warn!("Relation lookup failed - query={}, error={:#}", q, e);
                    failed += 1;
                }
            }
        }
        let terms = found
            .iter()
            .map(|t| canonicalize(t))
            .filter(|t| !t.is_empty());
        added += store.extend_aliases(i, terms);
    }

    if failed > 0 {
        warn!("Relational enrichment had {} failed lookups", failed);
    }
    added
}

/// Clusters `words` and returns `(surface, dense cluster id)` in input order.
///
/// Rounds: canonical forms → merge; analyzer readings → merge; related terms → merge.
/// `lookup = None` skips the relational round.
pub async fn run_aggregation<A, L>(
    words: Vec<String>,
    analyzer: &A,
    lookup: Option<&L>,
    settings: &PipelineSettings,
) -> Result<Vec<(String, usize)>>
where
    A: Analyzer,
    L: RelationLookup,
{
    let pipeline_start = std::time::Instant::now();
    info!("Pipeline started - words={}", words.len());

    // 1) canonical forms
    let phase_start = std::time::Instant::now();
    let mut store = ClusterStore::from_words(words);
    if store.is_empty() {
        info!("Pipeline completed - no words to cluster");
        return Ok(Vec::new());
    }
    let unions = store.merge();
    info!(
        "Canonicalization completed - duration={:.2}s, unions={}, clusters={}",
        phase_start.elapsed().as_secs_f32(),
        unions,
        store.cluster_count()
    );

    // 2) morphological readings
    let phase_start = std::time::Instant::now();
    let added = enrich_morphology(&mut store, analyzer, settings)?;
    let unions = store.merge();
    info!(
        "Morphological enrichment completed - duration={:.2}s, new_aliases={}, unions={}, clusters={}",
        phase_start.elapsed().as_secs_f32(),
        added,
        unions,
        store.cluster_count()
    );

    // 3) synonyms / derivations
    match lookup {
        Some(lookup) => {
            let phase_start = std::time::Instant::now();
            let added = enrich_relations(&mut store, lookup).await;
            let unions = store.merge();
            info!(
                "Relational enrichment completed - duration={:.2}s, new_aliases={}, unions={}, clusters={}",
                phase_start.elapsed().as_secs_f32(),
                added,
                unions,
                store.cluster_count()
            );
        }
        None => info!("Relational enrichment skipped - lookup disabled"),
    }

    // 4) dense ids
    let clusters = store.cluster_count();
    let out = store.finalize();
    info!(
        "Pipeline completed - total_duration={:.2}s, words={}, clusters={}",
        pipeline_start.elapsed().as_secs_f32(),
        out.len(),
        clusters
    );
    Ok(out)
}
