use crate::error::{MergeError, Result};

/// Field separator emitted by `git log` through `%x1f`
pub const FIELD_SEPARATOR: char = '\x1f';

/// Pretty format producing one five-field record per commit
pub const LOG_FORMAT: &str = "--pretty=format:%h%x1f%cn%x1f%ce%x1f%s%x1f%D";

const SUBJECT_DISPLAY_WIDTH: usize = 80;

/// One commit of the repository history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLogEntry {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub subject: String,
    pub ref_names: String,
}

impl CommitLogEntry {
    /// Parse one record of [`LOG_FORMAT`] output.
    ///
    /// Extra separators are kept as part of the subject so its text survives
    /// intact. Fewer than five fields, or an empty hash, is a parse error.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() < 5 {
            return Err(MergeError::parse(format!(
                "expected 5 log fields, found {} in {:?}",
                fields.len(),
                line
            )));
        }

        let hash = fields[0].trim();
        if hash.is_empty() {
            return Err(MergeError::parse(format!("log line without hash: {:?}", line)));
        }

        let last = fields.len() - 1;
        let sep = FIELD_SEPARATOR.to_string();

        Ok(CommitLogEntry {
            hash: hash.to_string(),
            author_name: fields[1].to_string(),
            author_email: fields[2].to_string(),
            subject: fields[3..last].join(&sep),
            ref_names: fields[last].to_string(),
        })
    }

    /// Match `needle` against this entry. The hash is compared verbatim,
    /// every other field case-insensitively.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }

        if self.hash.contains(needle) {
            return true;
        }

        let needle = needle.to_lowercase();
        [
            &self.author_name,
            &self.author_email,
            &self.subject,
            &self.ref_names,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Single-line rendering used by the commit picker and `--logs`
    pub fn display_line(&self) -> String {
        let subject: String = self.subject.chars().take(SUBJECT_DISPLAY_WIDTH).collect();
        if self.ref_names.is_empty() {
            format!("{} {}, {}", self.hash, self.author_name, subject)
        } else {
            format!(
                "{} [{}] {}, {}",
                self.hash, self.ref_names, self.author_name, subject
            )
        }
    }

    /// Recover the hash from a line produced by [`CommitLogEntry::display_line`]
    pub fn hash_from_display_line(line: &str) -> &str {
        line.split_whitespace().next().unwrap_or_default()
    }
}

/// Snapshot of the commit history, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitLog {
    entries: Vec<CommitLogEntry>,
}

impl CommitLog {
    /// Build the index from raw `git log` output.
    ///
    /// Malformed lines are skipped with a warning; they never fail the whole log.
    pub fn parse(output: &str) -> Self {
        let entries = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match CommitLogEntry::parse(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("skipping log entry: {}", e);
                    None
                }
            })
            .collect();

        CommitLog { entries }
    }

    pub fn entries(&self) -> &[CommitLogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_by_hash(&self, hash: &str) -> Result<&CommitLogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.hash == hash)
            .ok_or_else(|| MergeError::not_found(format!("commit '{}' is not in the log", hash)))
    }

    pub fn filter_by_text(&self, needle: &str) -> Vec<&CommitLogEntry> {
        self.entries.iter().filter(|entry| entry.matches(needle)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: [&str; 5]) -> String {
        fields.join(&FIELD_SEPARATOR.to_string())
    }

    fn sample_log() -> CommitLog {
        let output = [
            record(["a1b2c3d", "Ada Lovelace", "ada@example.com", "Add engine", "HEAD -> develop, origin/develop"]),
            record(["e4f5a6b", "Grace Hopper", "grace@NAVY.mil", "Fix compiler bug", ""]),
            record(["c7d8e9f", "Alan Turing", "alan@example.com", "Initial commit", "tag: v0.1.0, master"]),
        ]
        .join("\n");
        CommitLog::parse(&output)
    }

    #[test]
    fn test_parse_preserves_subject_whitespace() {
        let line = record(["abc1234", "Jo  Doe", "jo@x.io", "  spaced   subject\twith tab ", "master"]);
        let entry = CommitLogEntry::parse(&line).unwrap();
        assert_eq!(entry.hash, "abc1234");
        assert_eq!(entry.author_name, "Jo  Doe");
        assert_eq!(entry.author_email, "jo@x.io");
        assert_eq!(entry.subject, "  spaced   subject\twith tab ");
        assert_eq!(entry.ref_names, "master");
    }

    #[test]
    fn test_parse_keeps_extra_separators_in_subject() {
        let line = "abc1234\x1fJo\x1fjo@x.io\x1fodd\x1fsubject\x1frefs";
        let entry = CommitLogEntry::parse(line).unwrap();
        assert_eq!(entry.subject, "odd\x1fsubject");
        assert_eq!(entry.ref_names, "refs");
    }

    #[test]
    fn test_parse_rejects_short_record() {
        let result = CommitLogEntry::parse("abc1234\x1fJo\x1fjo@x.io");
        assert!(matches!(result, Err(MergeError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_empty_hash() {
        let line = record(["", "Jo", "jo@x.io", "s", ""]);
        assert!(CommitLogEntry::parse(&line).is_err());
    }

    #[test]
    fn test_log_skips_malformed_trailing_line() {
        let output = format!(
            "{}\n{}\ngarbage without separators",
            record(["a1", "A", "a@x", "one", ""]),
            record(["b2", "B", "b@x", "two", ""])
        );
        let log = CommitLog::parse(&output);
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[1].hash, "b2");
    }

    #[test]
    fn test_log_empty_output() {
        assert!(CommitLog::parse("").is_empty());
        assert!(CommitLog::parse("\n\n").is_empty());
    }

    #[test]
    fn test_find_by_hash() {
        let log = sample_log();
        assert_eq!(log.find_by_hash("e4f5a6b").unwrap().author_name, "Grace Hopper");
        assert!(matches!(log.find_by_hash("e4f5"), Err(MergeError::NotFound(_))));
    }

    #[test]
    fn test_filter_empty_needle_returns_all_in_order() {
        let log = sample_log();
        let hashes: Vec<&str> = log.filter_by_text("").iter().map(|e| e.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a1b2c3d", "e4f5a6b", "c7d8e9f"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_on_text_fields() {
        let log = sample_log();
        assert_eq!(log.filter_by_text("GRACE").len(), 1);
        assert_eq!(log.filter_by_text("navy.MIL").len(), 1);
        assert_eq!(log.filter_by_text("compiler").len(), 1);
        assert_eq!(log.filter_by_text("V0.1.0")[0].hash, "c7d8e9f");
    }

    #[test]
    fn test_filter_hash_is_verbatim() {
        let log = sample_log();
        assert_eq!(log.filter_by_text("a1b2")[0].hash, "a1b2c3d");
        // Only text fields are lowercased; "A1B2" appears nowhere else.
        assert!(log.filter_by_text("A1B2").is_empty());
    }

    #[test]
    fn test_display_line_with_and_without_refs() {
        let log = sample_log();
        assert_eq!(
            log.entries()[0].display_line(),
            "a1b2c3d [HEAD -> develop, origin/develop] Ada Lovelace, Add engine"
        );
        assert_eq!(
            log.entries()[1].display_line(),
            "e4f5a6b Grace Hopper, Fix compiler bug"
        );
    }

    #[test]
    fn test_display_line_truncates_subject() {
        let long = "x".repeat(200);
        let entry = CommitLogEntry::parse(&record(["abc", "A", "a@x", &long, ""])).unwrap();
        let line = entry.display_line();
        assert!(line.ends_with(&"x".repeat(80)));
        assert!(!line.contains(&"x".repeat(81)));
    }

    #[test]
    fn test_hash_from_display_line() {
        let log = sample_log();
        let line = log.entries()[0].display_line();
        assert_eq!(CommitLogEntry::hash_from_display_line(&line), "a1b2c3d");
        assert_eq!(CommitLogEntry::hash_from_display_line(""), "");
    }
}
