//! Corpus record stream over Wiktionary-style XML dumps.
//!
//! A [`Corpus`] is a handle on a dump file; [`Corpus::pages`] opens it afresh
//! and yields one [`Page`] at a time, so memory stays bounded no matter how
//! large the dump is. Plain, bzip2 (`.bz2`, multistream) and gzip (`.gz`)
//! files are supported.

mod reader;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use wordroots_shared::{Result, WordrootsError};

pub use reader::{Page, PageStream};

/// Read buffer for the decompressed stream.
const READ_BUFFER_BYTES: usize = 1 << 16;

/// Compression format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Bzip2,
    Gzip,
}

impl Compression {
    /// Detect compression from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());

        match extension.as_deref() {
            Some("bz2") => Self::Bzip2,
            Some("gz") => Self::Gzip,
            _ => Self::Plain,
        }
    }
}

/// A dump file on disk.
#[derive(Debug, Clone)]
pub struct Corpus {
    path: PathBuf,
    compression: Compression,
}

impl Corpus {
    /// Check the dump exists and pick a decoder for it.
    ///
    /// A missing file is reported here, before any processing starts.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(WordrootsError::missing_input(path));
        }

        let compression = Compression::from_path(&path);
        info!(path = %path.display(), ?compression, "opened corpus");

        Ok(Self { path, compression })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Stream pages from the start of the dump.
    ///
    /// Each call reopens the file, so a corpus can be scanned any number of
    /// times.
    pub fn pages(&self) -> Result<PageStream<Box<dyn BufRead>>> {
        debug!(path = %self.path.display(), "starting corpus scan");
        Ok(PageStream::new(self.open_reader()?, self.path.clone()))
    }

    fn open_reader(&self) -> Result<Box<dyn BufRead>> {
        let file = File::open(&self.path).map_err(|e| WordrootsError::io(&self.path, e))?;

        let reader: Box<dyn BufRead> = match self.compression {
            Compression::Bzip2 => Box::new(BufReader::with_capacity(
                READ_BUFFER_BYTES,
                bzip2::read::MultiBzDecoder::new(file),
            )),
            Compression::Gzip => Box::new(BufReader::with_capacity(
                READ_BUFFER_BYTES,
                flate2::read::MultiGzDecoder::new(file),
            )),
            Compression::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)),
        };

        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wordroots-corpus-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn titles(corpus: &Corpus) -> Vec<String> {
        corpus
            .pages()
            .unwrap()
            .map(|page| page.unwrap().title)
            .collect()
    }

    #[test]
    fn detects_compression_from_extension() {
        assert_eq!(
            Compression::from_path(Path::new("enwiktionary.xml.bz2")),
            Compression::Bzip2
        );
        assert_eq!(Compression::from_path(Path::new("dump.XML.GZ")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("dump.xml")), Compression::Plain);
        assert_eq!(Compression::from_path(Path::new("dump")), Compression::Plain);
    }

    #[test]
    fn missing_file_is_reported_up_front() {
        let err = Corpus::open("/definitely/not/here.xml.bz2").unwrap_err();
        assert!(matches!(err, WordrootsError::MissingInput { .. }));
    }

    #[test]
    fn plain_fixture_yields_main_namespace_pages() {
        let corpus = Corpus::open(fixture_path("dump/sample-pages.xml")).unwrap();
        assert_eq!(corpus.compression(), Compression::Plain);
        assert_eq!(
            titles(&corpus),
            vec!["nation", "Nacht", "run", "make", "colony", "fix"]
        );
    }

    #[test]
    fn corpus_is_restartable() {
        let corpus = Corpus::open(fixture_path("dump/sample-pages.xml")).unwrap();
        let first = titles(&corpus);
        let second = titles(&corpus);
        assert_eq!(first, second);
    }

    #[test]
    fn bzip2_dump_matches_plain() {
        let plain = std::fs::read(fixture_path("dump/sample-pages.xml")).unwrap();
        let dir = temp_dir();
        let path = dir.join("sample-pages.xml.bz2");

        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
        encoder.write_all(&plain).unwrap();
        encoder.finish().unwrap();

        let corpus = Corpus::open(&path).unwrap();
        assert_eq!(corpus.compression(), Compression::Bzip2);
        assert_eq!(titles(&corpus).len(), 6);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn gzip_dump_matches_plain() {
        let plain = std::fs::read(fixture_path("dump/sample-pages.xml")).unwrap();
        let dir = temp_dir();
        let path = dir.join("sample-pages.xml.gz");

        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&plain).unwrap();
        encoder.finish().unwrap();

        let corpus = Corpus::open(&path).unwrap();
        let pages: Vec<Page> = corpus.pages().unwrap().map(|p| p.unwrap()).collect();
        assert_eq!(pages.len(), 6);
        assert!(pages[0].text.contains("==English=="));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
