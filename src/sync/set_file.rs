//! Set file parser - one identifier per line, `#` comments, blank lines.

use std::io;
use std::path::{Path, PathBuf};

/// A parsed set file: a normalized name plus its member identifiers in
/// file order. Duplicate identifiers are preserved; the remote add is
/// idempotent so submitting one twice is harmless.
#[derive(Debug)]
pub struct SetFile {
    pub name: String,
    pub members: Vec<String>,
    pub source: PathBuf,
}

/// Read one set file. An unreadable file is an error scoped to that file;
/// the engine catches it and continues with the remaining sets.
pub fn parse(path: &Path) -> io::Result<SetFile> {
    let text = std::fs::read_to_string(path)?;
    let members = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect();

    Ok(SetFile {
        name: set_name_from_path(path),
        members,
        source: path.to_path_buf(),
    })
}

/// Derive the set name from the file name alone: strip a leading `set.`
/// and a trailing `.txt` (both case-insensitive), lowercase the rest.
/// No further validation; the result goes to the server verbatim.
pub fn set_name_from_path(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = base.trim();
    name = strip_prefix_ignore_case(name, "set.");
    name = strip_suffix_ignore_case(name, ".txt");
    name.to_lowercase()
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> &'a str {
    if name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    {
        &name[prefix.len()..]
    } else {
        name
    }
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> &'a str {
    if name.len() >= suffix.len()
        && name.as_bytes()[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
    {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn name_derivation_is_pure() {
        assert_eq!(set_name_from_path(Path::new("set.Engineering.txt")), "engineering");
        assert_eq!(set_name_from_path(Path::new("/a/b/set.Lab.TXT")), "lab");
        assert_eq!(set_name_from_path(Path::new("SET.Ops.txt")), "ops");
        // No `set.` prefix to strip, suffix still goes
        assert_eq!(set_name_from_path(Path::new("setEngineering.txt")), "setengineering");
    }

    #[test]
    fn parse_trims_and_skips_comments() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("set.team.txt");
        fs::write(&path, "# comment\n\n  alice  \nbob\n").expect("write");

        let set = parse(&path).expect("parse");
        assert_eq!(set.name, "team");
        assert_eq!(set.members, vec!["alice", "bob"]);
    }

    #[test]
    fn duplicates_are_preserved_in_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("set.dup.txt");
        fs::write(&path, "one\ntwo\none\n").expect("write");

        let set = parse(&path).expect("parse");
        assert_eq!(set.members, vec!["one", "two", "one"]);
    }

    #[test]
    fn all_comment_file_parses_empty() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("set.empty.txt");
        fs::write(&path, "# a\n   \n# b\n").expect("write");

        let set = parse(&path).expect("parse");
        assert!(set.members.is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let missing = tmp.path().join("set.gone.txt");

        assert!(parse(&missing).is_err());
    }
}
