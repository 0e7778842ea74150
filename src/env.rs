use std::env as stdenv;
use std::ffi::{OsStr, OsString};

/// Read-only snapshot of the process environment used by the interpreter.
///
/// Entries keep the order in which the operating system handed them to the
/// process, and are stored as raw OS strings so that values which are not
/// valid UTF-8 reach child processes and the `env` built-in unchanged.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Capture the inherited environment of the current process.
    pub fn capture() -> Self {
        Self {
            vars: stdenv::vars_os().collect(),
        }
    }

    /// Build an environment from explicit name/value pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the value of a variable by exact, case-sensitive name.
    ///
    /// When a name occurs more than once the first entry wins.
    pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
        let name = name.as_ref();
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_os_str())
    }

    /// The current `PATH` value, if set.
    pub fn search_path(&self) -> Option<&OsStr> {
        self.get("PATH")
    }

    /// All entries in their original order.
    pub fn entries(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let env = Environment::from_pairs([("PATH", "/bin"), ("path", "/nope"), ("PATHX", "/x")]);

        assert_eq!(env.get("PATH"), Some(OsStr::new("/bin")));
        assert_eq!(env.get("path"), Some(OsStr::new("/nope")));
        assert_eq!(env.get("PAT"), None);
        assert_eq!(env.search_path(), Some(OsStr::new("/bin")));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let env = Environment::from_pairs([("A", "1"), ("A", "2")]);
        assert_eq!(env.get("A"), Some(OsStr::new("1")));
    }

    #[test]
    fn test_entries_keep_order() {
        let env = Environment::from_pairs([("Z", "1"), ("A", "2"), ("M", "3")]);
        let names: Vec<&OsStr> = env.entries().map(|(k, _)| k).collect();
        assert_eq!(names, [OsStr::new("Z"), OsStr::new("A"), OsStr::new("M")]);
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_capture_reads_process_env() {
        let env = Environment::capture();
        assert_eq!(env.len(), stdenv::vars_os().count());
        assert_eq!(
            env.search_path().map(OsStr::to_owned),
            stdenv::var_os("PATH")
        );
    }
}
