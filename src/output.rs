//! Committing the final count to disk.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::Builder;
use tracing::debug;

use crate::error::{JobError, JobResult};
use crate::merge::FinalCount;

/// Writes `counts` to `destination` as `<word>\t<count>` lines sorted by
/// word. The file is staged next to the destination and only appears under
/// its final name once complete; an existing destination is never replaced.
pub fn write(counts: &FinalCount, destination: &Path) -> JobResult<()> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        // tempfile defaults to 0600; let the umask decide like any other file
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let staged = builder.tempfile_in(parent)?;
    {
        let mut out = BufWriter::new(staged.as_file());
        for (word, count) in counts.iter() {
            writeln!(out, "{word}\t{count}")?;
        }
        out.flush()?;
    }
    staged.as_file().sync_all()?;

    staged.persist_noclobber(destination).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            JobError::OutputExists {
                path: destination.to_path_buf(),
            }
        } else {
            JobError::Io(e.error)
        }
    })?;
    debug!(path = %destination.display(), words = counts.len(), "output committed");
    Ok(())
}

/// Fails if anything already exists at `destination`.
pub fn check_destination(destination: &Path) -> JobResult<()> {
    if destination.exists() || destination.is_symlink() {
        return Err(JobError::OutputExists {
            path: destination.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::merge::merge;
    use crate::shard::ShardId;
    use crate::tokenizer::Tokenizer;
    use tempfile::TempDir;

    fn counts(text: &str) -> FinalCount {
        merge([aggregate(&Tokenizer::default(), ShardId(0), text.as_bytes()).unwrap()])
    }

    #[test]
    fn writes_sorted_tab_separated_lines() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");
        write(&counts("the cat sat on the mat"), &dest).unwrap();
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "cat\t1\nmat\t1\non\t1\nsat\t1\nthe\t2\n"
        );
    }

    #[test]
    fn empty_count_empty_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested/out.txt");
        write(&FinalCount::default(), &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"");
    }

    #[test]
    fn never_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");
        fs::write(&dest, "keep me").unwrap();

        assert!(matches!(
            check_destination(&dest),
            Err(JobError::OutputExists { .. })
        ));
        let err = write(&counts("a b"), &dest).unwrap_err();
        assert!(matches!(err, JobError::OutputExists { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn output_mode_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");
        let plain = dir.path().join("plain.txt");
        write(&counts("a b"), &dest).unwrap();
        fs::write(&plain, "a\t1\n").unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&dest), mode(&plain));
    }
}
