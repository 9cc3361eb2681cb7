mod analyzer;
mod api_types;
mod budget;
mod cluster;
mod config;
mod expand;
mod fetch;
mod models;
mod normalize;
mod numeral;
mod orchestrator;
mod render;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use analyzer::VibratoAnalyzer;
use config::Config;
use fetch::ConceptNetClient;
use orchestrator::{load_words, run_aggregation, save_clusters, PipelineSettings};

/// wordagg - group a word list into concept clusters
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file, one word per line
    input: PathBuf,

    /// Output file, `word<TAB>cluster_id` per input line
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    let cfg = config::resolve_config()?;
    debug!("Resolved config: {:?}", cfg);
    run(args, cfg).await
}

/// Reads the input, aggregates it and writes the output. Empty input never needs
/// a dictionary.
async fn run(args: Args, cfg: Config) -> Result<()> {
    info!("Loading words - input={}", args.input.display());
    let words = load_words(&args.input)?;
    if words.is_empty() {
        info!("Input is empty - writing empty output to {}", args.output.display());
        return save_clusters(&args.output, &[]);
    }

    // Friendlier error if missing
    let Some(dict_path) = cfg.dictionary.clone() else {
        return Err(anyhow::anyhow!(
            "no vibrato system dictionary configured\n\
             Set WORDAGG_DICTIONARY, or point WORDAGG_CONFIG at a file like:\n\
             dictionary: /path/to/ipadic-mecab-2_7_0/system.dic.zst\n\
             numeral_tag: 数\n\
             conceptnet:\n  enabled: true\n  language: ja\n"
        ));
    };
    let analyzer = VibratoAnalyzer::from_path(&dict_path, cfg.features.clone(), &cfg.numeral_tag)?;
    let settings = PipelineSettings::from(&cfg);

    let out = if cfg.conceptnet.enabled {
        debug!("Using ConceptNet at {}", cfg.conceptnet.base_url);
        let client = ConceptNetClient::new(&cfg.conceptnet)?;
        run_aggregation(words, &analyzer, Some(&client), &settings).await?
    } else {
        run_aggregation(words, &analyzer, None::<&ConceptNetClient>, &settings).await?
    };

    save_clusters(&args.output, &out)?;
    info!("Output written - path={}, lines={}", args.output.display(), out.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args_in(dir: &std::path::Path, input: &str) -> Args {
        let input_path = dir.join("words.txt");
        std::fs::write(&input_path, input).unwrap();
        Args {
            input: input_path,
            output: dir.join("clusters.tsv"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_needs_no_dictionary() {
        let dir = tempdir().unwrap();
        let args = args_in(dir.path(), "");
        let output = args.output.clone();
        let cfg = Config {
            dictionary: None,
            ..Config::default()
        };

        run(args, cfg).await.unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_dictionary_is_fatal_for_words() {
        let dir = tempdir().unwrap();
        let args = args_in(dir.path(), "走る\n猫\n");
        let output = args.output.clone();
        let cfg = Config {
            dictionary: None,
            ..Config::default()
        };

        let err = run(args, cfg).await.unwrap_err();
        assert!(err.to_string().contains("no vibrato system dictionary configured"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let dir = tempdir().unwrap();
        let args = Args {
            input: dir.path().join("absent.txt"),
            output: dir.path().join("clusters.tsv"),
        };
        assert!(run(args, Config::default()).await.is_err());
    }
}
