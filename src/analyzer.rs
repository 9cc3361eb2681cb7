use anyhow::{anyhow, Context, Result};
use csv_core::ReadFieldResult;
use std::fs::File;
use std::path::Path;
use tracing::info;
use vibrato::{Dictionary, Tokenizer};

use crate::config::FeatureFields;
use crate::models::Morpheme;

/// Splits `text` into morphemes, left to right.
pub trait Analyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>>;
}

/// Analyzer backed by a vibrato tokenizer over a MeCab-format system dictionary.
pub struct VibratoAnalyzer {
    tokenizer: Tokenizer,
    fields: FeatureFields,
    numeral_tag: String,
}

impl VibratoAnalyzer {
    pub fn new(tokenizer: Tokenizer, fields: FeatureFields, numeral_tag: &str) -> Self {
        Self {
            tokenizer,
            fields,
            numeral_tag: numeral_tag.to_string(),
        }
    }

    /// Loads a zstd-compressed system dictionary.
    pub fn from_path(path: &Path, fields: FeatureFields, numeral_tag: &str) -> Result<Self> {
        let start = std::time::Instant::now();
        let file = File::open(path)
            .with_context(|| format!("Opening dictionary {}", path.display()))?;
        let reader = zstd::Decoder::new(file)
            .with_context(|| format!("Decompressing dictionary {}", path.display()))?;
        let dict = Dictionary::read(reader).map_err(|e| anyhow!(e.to_string()))?;
        info!(
            "Dictionary loaded - path={}, duration={:.2}s",
            path.display(),
            start.elapsed().as_secs_f32()
        );
        Ok(Self::new(Tokenizer::new(dict), fields, numeral_tag))
    }
}

impl Analyzer for VibratoAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let morphemes = (0..worker.num_tokens())
            .map(|i| {
                let t = worker.token(i);
                morpheme_from_feature(t.surface(), t.feature(), &self.fields)
            })
            .collect();
        Ok(join_numerals(morphemes, &self.numeral_tag))
    }
}

/// Splits a feature string into its CSV fields, honoring quoted cells.
pub fn parse_feature(feature: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = feature.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::OutputFull => true,
        };
        fields.push(String::from_utf8_lossy(&output[..nout]).into_owned());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    fields
}

fn feature_field(fields: &[String], idx: usize) -> Option<&str> {
    fields
        .get(idx)
        .map(String::as_str)
        .filter(|f| !f.is_empty() && *f != "*")
}

/// Builds a morpheme from one token. The candidate reading is `lemma/reading`,
/// or just `lemma` when the dictionary has no reading for it.
pub fn morpheme_from_feature(surface: &str, feature: &str, layout: &FeatureFields) -> Morpheme {
    let fields = parse_feature(feature);
    let candidates = match (
        feature_field(&fields, layout.lemma_field),
        feature_field(&fields, layout.reading_field),
    ) {
        (Some(lemma), Some(reading)) => vec![format!("{}/{}", lemma, reading)],
        (Some(lemma), None) => vec![lemma.to_string()],
        _ => vec![],
    };
    Morpheme {
        surface: surface.to_string(),
        candidates,
        part_of_speech: feature_field(&fields, layout.pos_field)
            .unwrap_or_default()
            .to_string(),
    }
}

/// IPADIC-style dictionaries emit one token per numeral character (`二`,`百`,`十`).
/// Adjacent numeral tokens are joined back into one morpheme so the numeral parser
/// sees the whole expression.
fn join_numerals(morphemes: Vec<Morpheme>, numeral_tag: &str) -> Vec<Morpheme> {
    let mut out: Vec<Morpheme> = Vec::with_capacity(morphemes.len());
    for m in morphemes {
        match out.last_mut() {
            Some(prev) if prev.part_of_speech == numeral_tag && m.part_of_speech == numeral_tag => {
                prev.surface.push_str(&m.surface);
                prev.candidates.clear();
            }
            _ => out.push(m),
        }
    }
    out
}
