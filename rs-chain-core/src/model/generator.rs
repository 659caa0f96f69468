use crate::error::{ChainError, Result};
use crate::io;
use crate::model::chain_model::ChainModel;
use crate::model::generation_input::GenerationInput;
use log::info;
use rand::Rng;
use std::path::Path;

/// Builds a `ChainModel` out of corpus files and generates from it.
///
/// The model itself never touches the filesystem: `Generator` reads the
/// files, concatenates them and hands one string to [`ChainModel::new`].
///
/// # Responsibilities
/// - Load one or more corpus files, or every corpus of a directory
/// - Remember which corpora the model was built from
/// - Forward generation requests to the model
#[derive(Debug, Clone)]
pub struct Generator {
	model: ChainModel,
	corpus_names: Vec<String>,
}

impl Generator {
	/// Wraps an already built model, e.g. one restored with [`ChainModel::load`].
	pub fn from_model(model: ChainModel, corpus_names: Vec<String>) -> Self {
		Self { model, corpus_names }
	}

	/// Builds a model from corpus files, concatenated in the given order.
	///
	/// Files are joined with a line break so the last word of one file and
	/// the first word of the next stay separate words.
	///
	/// # Errors
	/// - `ChainError::NoCorpus` if `paths` is empty
	/// - `ChainError::Io` if a file cannot be read
	/// - `ChainError::InvalidPrefixLength` if `prefix_length` is 0
	pub fn from_files<P: AsRef<Path>>(paths: &[P], prefix_length: usize) -> Result<Self> {
		if paths.is_empty() {
			return Err(ChainError::NoCorpus("no corpus file given".to_owned()));
		}

		let mut corpus = String::new();
		let mut corpus_names = Vec::with_capacity(paths.len());
		for path in paths {
			let text = io::read_file(path)?;
			if !corpus.is_empty() {
				corpus.push('\n');
			}
			corpus.push_str(&text);
			corpus_names.push(io::get_filename(path)?);
		}

		let model = ChainModel::new(&corpus, prefix_length)?;
		info!(
			"loaded corpora [{}]: {} keys, {} seed candidates",
			corpus_names.join(", "),
			model.len(),
			model.seed_candidates()
		);

		Ok(Self { model, corpus_names })
	}

	/// Builds a model from every `extension` file directly inside `folder`.
	///
	/// Both `"folder"` and `"folder/"` are accepted, `"."` means the current
	/// directory. Files are concatenated in name order.
	///
	/// # Errors
	/// - `ChainError::NoCorpus` if the path is not a directory or holds no
	///   matching file
	/// - `ChainError::Io` if the directory or a file cannot be read
	pub fn from_folder<P: AsRef<Path>>(folder: P, extension: &str, prefix_length: usize) -> Result<Self> {
		let string_path = folder
			.as_ref()
			.to_str()
			.ok_or_else(|| ChainError::NoCorpus("invalid folder path".to_owned()))?;
		let folder = io::normalize_folder(string_path);

		if !folder.is_dir() {
			return Err(ChainError::NoCorpus(format!("expected a directory, got: {}", folder.display())));
		}

		let paths: Vec<_> = io::list_files(&folder, extension)?
			.into_iter()
			.map(|file| folder.join(file))
			.collect();
		if paths.is_empty() {
			return Err(ChainError::NoCorpus(format!("no .{extension} file in {}", folder.display())));
		}

		Self::from_files(&paths, prefix_length)
	}

	pub fn model(&self) -> &ChainModel {
		&self.model
	}

	/// Names (file stems) of the corpora behind the model, in load order.
	pub fn corpus_names(&self) -> &[String] {
		&self.corpus_names
	}

	/// Generates text from the model. See [`ChainModel::generate_with`].
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, input: &GenerationInput) -> Result<String> {
		self.model.generate_with(rng, input)
	}
}
