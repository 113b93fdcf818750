use log::info;
use rand::Rng;
use std::path::Path;
use training_game::{read_record, RecordError, RecordReader};

use super::{extract_sample, Batch, DatasetError, SampleError};

/// Reads every record of the corpus, starting at index 0 and stopping at the first missing index,
/// and extracts one sample per game. Rows are in index order.
///
/// A record that fails to decode, or that has no snapshots, aborts the whole assembly.
pub fn assemble_corpus<R>(reader: &RecordReader, rng: &mut R) -> Result<Batch, DatasetError>
where
    R: Rng + ?Sized,
{
    info!("Loading data from {:?}...", reader.games_dir());

    let mut batch = Batch::new();

    for index in 0.. {
        let path = reader.path_for_index(index);

        let record = match reader.read(index) {
            Ok(record) => record,
            Err(RecordError::NotFound(_)) => break,
            Err(source) => return Err(DatasetError::CorpusReadFailure { path, source }),
        };

        let sample = extract_sample(&record, rng).map_err(|e| match e {
            SampleError::EmptyRecord => DatasetError::EmptyRecord(path),
        })?;

        batch.push(sample);

        info!("{} games loaded", index + 1);
    }

    info!("...done");

    Ok(batch)
}

/// Reads one fixed record and extracts a single sample from it. A missing file is an error here.
pub fn assemble_single<R>(path: impl AsRef<Path>, rng: &mut R) -> Result<Batch, DatasetError>
where
    R: Rng + ?Sized,
{
    let path = path.as_ref();

    info!("Loading data from {:?}...", path);

    let record = read_record(path).map_err(|source| match source {
        RecordError::NotFound(path) => DatasetError::RecordNotFound(path),
        source => DatasetError::CorpusReadFailure {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let sample = extract_sample(&record, rng).map_err(|e| match e {
        SampleError::EmptyRecord => DatasetError::EmptyRecord(path.to_path_buf()),
    })?;

    info!("...done");

    Ok(Batch::from_samples([sample]))
}
