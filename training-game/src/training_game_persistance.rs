use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{GameRecord, RecordError};

/// Reads game records from a corpus directory whose files are named by index: `0`, `1`, `2`, ...
///
/// Each file holds one gzip compressed JSON `GameRecord`. Reading does not cache, so reading the
/// same index twice yields the same record as long as the file is unchanged.
pub struct RecordReader {
    games_dir: PathBuf,
}

impl RecordReader {
    pub fn new(games_dir: impl Into<PathBuf>) -> Self {
        Self {
            games_dir: games_dir.into(),
        }
    }

    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }

    pub fn path_for_index(&self, index: usize) -> PathBuf {
        self.games_dir.join(index.to_string())
    }

    pub fn read(&self, index: usize) -> Result<GameRecord, RecordError> {
        read_record(self.path_for_index(index))
    }

    /// Number of contiguous records starting at index 0.
    pub fn count(&self) -> usize {
        (0..)
            .take_while(|&i| self.path_for_index(i).is_file())
            .count()
    }
}

/// Reads a single game record from a fixed path.
pub fn read_record(path: impl AsRef<Path>) -> Result<GameRecord, RecordError> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => RecordError::NotFound(path.to_path_buf()),
        _ => RecordError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if !file
        .metadata()
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        return Err(RecordError::NotFound(path.to_path_buf()));
    }

    let content = GzDecoder::new(BufReader::new(file));
    let record: GameRecord =
        serde_json::from_reader(content).map_err(|e| RecordError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    record
        .validate()
        .map_err(|(i, e)| RecordError::Malformed {
            path: path.to_path_buf(),
            reason: format!("move snapshot {}: {}", i, e),
        })?;

    debug!(
        "Read {:?} with {} move snapshots",
        path,
        record.move_snapshots().len()
    );

    Ok(record)
}

pub struct RecordWriter {
    games_dir: PathBuf,
}

impl RecordWriter {
    pub fn new(games_dir: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let games_dir = games_dir.into();

        fs::create_dir_all(&games_dir).map_err(|source| RecordError::Io {
            path: games_dir.clone(),
            source,
        })?;

        Ok(Self { games_dir })
    }

    pub fn write(&self, index: usize, record: &GameRecord) -> Result<PathBuf, RecordError> {
        let path = self.games_dir.join(index.to_string());
        write_record(&path, record)?;
        Ok(path)
    }
}

pub fn write_record(path: impl AsRef<Path>, record: &GameRecord) -> Result<(), RecordError> {
    let path = path.as_ref();
    let io_err = |source: std::io::Error| RecordError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut compressor = GzEncoder::new(BufWriter::new(file), Compression::default());
    serde_json::to_writer(&mut compressor, record).map_err(|e| io_err(e.into()))?;
    compressor.finish().map_err(io_err)?.flush().map_err(io_err)?;

    Ok(())
}
