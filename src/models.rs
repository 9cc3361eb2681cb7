use std::collections::BTreeSet;

use crate::normalize::canonicalize;

/// One input line and, while it is a representative, the aliases of its cluster.
#[derive(Debug, Clone)]
pub struct WordEntity {
    pub index: usize,     // creation order, position in the store
    pub surface: String,  // as read from the input
    pub canonical: String,
    pub aliases: BTreeSet<String>, // empty once absorbed
    pub cluster_id: usize,         // index of the current representative
    pub members: Vec<usize>,       // only on the representative
}

impl WordEntity {
    pub fn new(index: usize, surface: String) -> Self {
        let canonical = canonicalize(&surface);
        Self {
            index,
            aliases: BTreeSet::from([canonical.clone()]),
            surface,
            canonical,
            cluster_id: index,
            members: vec![index],
        }
    }

    pub fn is_representative(&self) -> bool {
        self.cluster_id == self.index
    }
}

/// One analyzer unit, in left-to-right order within the analyzed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    pub surface: String,
    pub candidates: Vec<String>, // canonical readings, possibly ambiguous, may be empty
    pub part_of_speech: String,
}

impl Morpheme {
    #[cfg(test)]
    pub fn new(surface: &str, candidates: &[&str], part_of_speech: &str) -> Self {
        Self {
            surface: surface.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            part_of_speech: part_of_speech.to_string(),
        }
    }
}

/// Relation kinds requested from the relational lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Synonym,
    FormOf,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::Synonym, Relation::FormOf];

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Synonym => "Synonym",
            Relation::FormOf => "FormOf",
        }
    }
}
