//! Cutting input files into shards.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;

use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(pub usize);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

/// Half-open byte range `[start, end)` of one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shard {
    pub id: ShardId,
    pub source: PathBuf,
    pub start: u64,
    pub end: u64,
}

impl Shard {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Reads the shard's bytes from its source file.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.source)?;
        file.seek(SeekFrom::Start(self.start))?;
        let mut buf = Vec::with_capacity(self.len() as usize);
        file.take(self.len()).read_to_end(&mut buf)?;
        if buf.len() as u64 != self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} is shorter than when it was split", self.source.display()),
            ));
        }
        Ok(buf)
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}[{}..{}]",
            self.id,
            self.source.display(),
            self.start,
            self.end
        )
    }
}

/// Splits `inputs` into roughly `target` shards.
///
/// Every file is cut into ranges of `ceil(total / target)` bytes, then each
/// interior cut is pushed forward past the next line break so that no line
/// is split between two shards. Shards of one file cover it exactly, in
/// order. Empty files produce no shards.
pub fn split(inputs: &[PathBuf], target: usize) -> io::Result<Vec<Shard>> {
    let sizes = inputs
        .iter()
        .map(|path| fs::metadata(path).map(|m| m.len()))
        .collect::<io::Result<Vec<_>>>()?;
    let total: u64 = sizes.iter().sum();
    let split_size = total.div_ceil(target.max(1) as u64).max(1);

    let mut shards = Vec::new();
    for (path, len) in inputs.iter().zip(sizes) {
        if len == 0 {
            continue;
        }
        let mut reader = BufReader::new(File::open(path)?);
        let mut start = 0;
        while start < len {
            let nominal = start + split_size;
            let end = if nominal >= len {
                len
            } else {
                line_boundary(&mut reader, nominal, len)?
            };
            shards.push(Shard {
                id: ShardId(shards.len()),
                source: path.clone(),
                start,
                end,
            });
            start = end;
        }
    }
    debug!(
        total_bytes = total,
        split_size,
        shards = shards.len(),
        "split input"
    );
    Ok(shards)
}

/// First offset at or after `nominal` that starts a line, or `len`.
fn line_boundary<R: BufRead + Seek>(reader: &mut R, nominal: u64, len: u64) -> io::Result<u64> {
    let from = nominal - 1;
    reader.seek(SeekFrom::Start(from))?;
    let read = reader.skip_until(b'\n')? as u64;
    Ok((from + read).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn assert_partitions(shards: &[Shard], path: &Path, len: u64) {
        let ranges: Vec<_> = shards
            .iter()
            .filter(|s| s.source == path)
            .map(|s| (s.start, s.end))
            .collect();
        assert!(!ranges.is_empty());
        assert_eq!(ranges.first().unwrap().0, 0);
        assert_eq!(ranges.last().unwrap().1, len);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "gap or overlap in {ranges:?}");
        }
        assert!(ranges.iter().all(|(s, e)| s < e));
    }

    #[test]
    fn single_shard_covers_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.txt", "the cat sat on the mat");
        let shards = split(&[path.clone()], 1).unwrap();
        assert_eq!(shards.len(), 1);
        assert_eq!(shards[0].start, 0);
        assert_eq!(shards[0].end, 22);
        assert_eq!(shards[0].read().unwrap(), b"the cat sat on the mat");
    }

    #[test]
    fn cuts_land_after_line_breaks() {
        let dir = TempDir::new().unwrap();
        let text = "alpha beta\ngamma\ndelta epsilon zeta\neta\n";
        let path = write_file(&dir, "a.txt", text);
        let shards = split(&[path.clone()], 4).unwrap();

        assert_partitions(&shards, &path, text.len() as u64);
        for shard in &shards {
            if shard.start > 0 {
                assert_eq!(text.as_bytes()[shard.start as usize - 1], b'\n');
            }
        }
        let rejoined: Vec<u8> = shards.iter().flat_map(|s| s.read().unwrap()).collect();
        assert_eq!(rejoined, text.as_bytes());
    }

    #[test]
    fn long_line_stays_in_one_shard() {
        let dir = TempDir::new().unwrap();
        let text = "one very long line without any break at all";
        let path = write_file(&dir, "a.txt", text);
        let shards = split(&[path], 8).unwrap();
        assert_eq!(shards.len(), 1);
    }

    #[test]
    fn multiple_files_and_empty_file() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", "a\nb\nc\nd\n");
        let empty = write_file(&dir, "b.txt", "");
        let c = write_file(&dir, "c.txt", "x y\nz\n");
        let shards = split(&[a.clone(), empty.clone(), c.clone()], 3).unwrap();

        assert_partitions(&shards, &a, 8);
        assert_partitions(&shards, &c, 6);
        assert!(shards.iter().all(|s| s.source != empty));
        let ids: Vec<_> = shards.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, (0..shards.len()).collect::<Vec<_>>());
    }

    #[test]
    fn boundary_skips_to_next_line() {
        let text = format!("{}\nshort\n", "x".repeat(10_000));
        let mut reader = BufReader::new(io::Cursor::new(text.as_bytes()));
        let len = text.len() as u64;
        assert_eq!(line_boundary(&mut reader, 5, len).unwrap(), 10_001);
        assert_eq!(line_boundary(&mut reader, 10_001, len).unwrap(), 10_001);
        assert_eq!(line_boundary(&mut reader, 10_003, len).unwrap(), len);
    }

    #[test]
    fn no_inputs_no_shards() {
        assert!(split(&[], 4).unwrap().is_empty());
    }
}
