use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_chain_core::ChainError;
use rs_chain_core::model::chain_model::ChainModel;
use rs_chain_core::model::generation_input::GenerationInput;
use rs_chain_core::model::generator::Generator;

/// Exit code used when the model offers no prefix to start from
const NO_SEED_EXIT: u8 = 2;

#[derive(Parser)]
#[command(
    name = "rs-chain",
    about = "Build word-level Markov chains from text and generate sentences from them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a chain from corpus files and save it
    Build {
        /// Corpus files, concatenated in the given order
        #[arg(required = true)]
        corpus: Vec<PathBuf>,

        /// Words per prefix
        #[arg(long, short = 'p', env = "CHAIN_PREFIX_LENGTH", default_value_t = 2)]
        prefix_length: usize,

        /// Where to write the model (default: first corpus with a .bin extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Generate text from a saved model or from corpus files
    Generate {
        #[command(flatten)]
        source: Source,

        /// Maximum number of words generated after the seed
        #[arg(long, short = 'w', default_value_t = 50)]
        words: usize,

        /// Random seed for reproducible output
        #[arg(long, short = 's')]
        seed: Option<u64>,

        /// Start from these words instead of a random prefix
        #[arg(long)]
        start: Option<String>,

        /// Maximum random draws when looking for a starting prefix
        #[arg(long)]
        attempts: Option<usize>,

        /// Number of texts to generate
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,
    },

    /// Print statistics and the first prefixes of a chain
    Inspect {
        #[command(flatten)]
        source: Source,

        /// Number of prefixes to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

/// Where a chain comes from: a saved model or corpus files.
#[derive(Args)]
struct Source {
    /// Saved model written by `build`
    #[arg(long, short = 'm', conflicts_with = "corpus")]
    model: Option<PathBuf>,

    /// Corpus files, concatenated in the given order
    corpus: Vec<PathBuf>,

    /// Corpus directory; every .txt file in it is used when no model or corpus file is given
    #[arg(long, env = "CHAIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Words per prefix when building from corpus files
    #[arg(long, short = 'p', env = "CHAIN_PREFIX_LENGTH", default_value_t = 2)]
    prefix_length: usize,
}

impl Source {
    fn load(&self) -> anyhow::Result<Generator> {
        if let Some(path) = &self.model {
            let model = ChainModel::load(path).with_context(|| format!("failed to load model {}", path.display()))?;
            let name = rs_chain_core::io::get_filename(path)?;
            return Ok(Generator::from_model(model, vec![name]));
        }
        if !self.corpus.is_empty() {
            return Generator::from_files(&self.corpus, self.prefix_length).context("failed to build chain");
        }
        if let Some(dir) = &self.data_dir {
            return Generator::from_folder(dir, "txt", self.prefix_length)
                .with_context(|| format!("failed to build chain from {}", dir.display()));
        }
        bail!("give a --model, corpus files or a --data-dir")
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Build { corpus, prefix_length, output } => {
            let generator = Generator::from_files(&corpus, prefix_length).context("failed to build chain")?;
            let output = match output {
                Some(path) => path,
                None => rs_chain_core::io::build_output_path(&corpus[0], "bin")?,
            };
            generator
                .model()
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("saved {} prefixes to {}", generator.model().len(), output.display());
            println!("{}", output.display());
        }
        Commands::Generate { source, words, seed, start, attempts, count } => {
            let generator = source.load()?;

            let mut input = GenerationInput::new(words);
            if let Some(start) = &start {
                input.set_custom_seed(start)?;
            }
            if let Some(attempts) = attempts {
                input.set_seed_attempts(attempts)?;
            }

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            for _ in 0..count {
                match generator.generate(&mut rng, &input) {
                    Ok(text) => println!("{text}"),
                    Err(e @ ChainError::NoSeed { .. }) => {
                        eprintln!("{e}");
                        return Ok(ExitCode::from(NO_SEED_EXIT));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Commands::Inspect { source, limit } => {
            let generator = source.load()?;
            let model = generator.model();
            println!("corpora:         {}", generator.corpus_names().join(", "));
            println!("prefix length:   {}", model.prefix_length());
            println!("prefixes:        {}", model.len());
            println!("seed candidates: {}", model.seed_candidates());
            for key in model.keys().take(limit) {
                let suffixes = model.suffixes(key).unwrap_or_default();
                println!("{key:?} -> {suffixes:?}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
