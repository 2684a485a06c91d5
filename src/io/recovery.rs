use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::model::mode::Mode;
use crate::ops::conflict::SlugRename;

/// Maximum size of the recovery log before inline trimming (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Separator between the timestamp and the rest of an entry header.
const HEADER_SEP: &str = " - ";

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- modekit recovery log: append-only
     Holds store writes that failed, deleted modes and modes
     dropped or renamed by an import.
     View with: mk recovery
     Prune old entries: mk recovery prune
     Safe to delete if empty or stale. -->

---
";

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    Write,
    Delete,
    Import,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
            RecoveryCategory::Import => write!(f, "import"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            "import" => Some(RecoveryCategory::Import),
            _ => None,
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(store_dir: &Path) -> PathBuf {
    store_dir.join(".recovery.log")
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {}{}{}: {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            HEADER_SEP,
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push_str("\n---\n");
        out
    }

    /// Serialize to JSON value for `mk recovery --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    /// Format as human-readable raw markdown for display.
    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }
}

/// Append a recovery entry to the log. Errors are swallowed and printed to stderr.
pub fn log_recovery(store_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(store_dir, entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn log_recovery_inner(store_dir: &Path, entry: RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(store_dir);

    if let Ok(meta) = std::fs::metadata(&path)
        && meta.len() > MAX_LOG_SIZE
    {
        try_inline_trim(&path);
    }

    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Drop entries older than PRUNE_AGE_DAYS once the log grows past
/// MAX_LOG_SIZE. Skipped if another process holds the log.
fn try_inline_trim(path: &Path) {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(_) => return,
    };
    if try_flock(&file).is_err() {
        return;
    }

    let mut content = String::new();
    let mut reader = io::BufReader::new(&file);
    if reader.read_to_string(&mut content).is_err() {
        return;
    }

    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);
    if trimmed.len() < content.len()
        && let Ok(mut f) = File::create(path)
    {
        let _ = f.write_all(trimmed.as_bytes());
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Log a deleted mode, keeping the full record as JSON.
pub fn log_mode_deletion(store_dir: &Path, mode: &Mode) {
    log_recovery(
        store_dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Delete,
            description: format!("mode {} deleted", mode.slug),
            fields: vec![
                ("Mode".to_string(), mode.slug.clone()),
                ("Family".to_string(), mode.family_id().to_string()),
            ],
            body: serde_json::to_string_pretty(mode).unwrap_or_default(),
        },
    );
}

/// Log modes discarded by a replace import or a reset.
pub fn log_replaced_modes(store_dir: &Path, reason: &str, modes: &[Mode]) {
    if modes.is_empty() {
        return;
    }
    log_recovery(
        store_dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Import,
            description: format!("{} modes replaced by {}", modes.len(), reason),
            fields: vec![("Count".to_string(), modes.len().to_string())],
            body: serde_json::to_string_pretty(modes).unwrap_or_default(),
        },
    );
}

/// Log slugs renamed while importing, so a user can find the originals.
pub fn log_import_renames(store_dir: &Path, source: &str, renames: &[SlugRename]) {
    if renames.is_empty() {
        return;
    }
    log_recovery(
        store_dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Import,
            description: format!("{} slugs renamed", renames.len()),
            fields: vec![("Source".to_string(), source.to_string())],
            body: renames
                .iter()
                .map(|r| format!("{} -> {}", r.original, r.renamed))
                .collect::<Vec<_>>()
                .join("\n"),
        },
    );
}

/// Read recovery entries from the log file, most recent first.
pub fn read_recovery_entries(
    store_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let path = recovery_log_path(store_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);

    if let Some(since_dt) = since {
        entries.retain(|e| e.timestamp >= since_dt);
    }

    // Entries are parsed oldest-first
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }

    entries.reverse();
    entries
}

/// Parse all entries from the log content string.
fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line == "---" || line.starts_with("## ") {
                break;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }

            let trimmed = line.trim();
            if let Some((key, value)) = trimmed.split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> - <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(HEADER_SEP)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

/// Prune entries from the recovery log.
/// Returns the number of entries removed.
pub fn prune_recovery(
    store_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(store_dir);
    if !path.exists() {
        return Ok(0);
    }

    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    let mut locked = false;
    for _ in 0..10 {
        if try_flock(&file).is_ok() {
            locked = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    if !locked {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "recovery log is in use, try again later",
        ));
    }

    let content = std::fs::read_to_string(&path)?;
    let original_count = parse_entries(&content).len();

    if all {
        std::fs::write(&path, FILE_HEADER)?;
        return Ok(original_count);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let new_count = parse_entries(&trimmed).len();
    std::fs::write(&path, &trimmed)?;
    Ok(original_count - new_count)
}

/// Remove entries with timestamps before `cutoff` from the raw content.
/// Preserves the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current_entry = String::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            if let Some(ts) = current_timestamp
                && ts >= *cutoff
            {
                result.push_str(&current_entry);
            }
            current_entry.clear();
            current_timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current_entry.push_str(line);
        current_entry.push('\n');
    }

    if let Some(ts) = current_timestamp
        && ts >= *cutoff
    {
        result.push_str(&current_entry);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::mode_ops::tests::make_mode;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn make_entry(category: RecoveryCategory, desc: &str, body: &str) -> RecoveryEntry {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: desc.to_string(),
            fields: vec![("Mode".to_string(), "code".to_string())],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_entry_formatting() {
        let entry = RecoveryEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            ..make_entry(RecoveryCategory::Write, "store write failed", "{}")
        };
        let md = entry.to_markdown();
        assert!(md.starts_with("## 2026-03-01T12:00:00Z - write: store write failed\n"));
        assert!(md.contains("Mode: code\n"));
        assert!(md.contains("```text\n{}\n```\n"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_log_and_read() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Delete, "first", "a"));
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Import, "second", "b\nc"));

        let content = std::fs::read_to_string(recovery_log_path(tmp.path())).unwrap();
        assert!(content.starts_with("<!-- modekit recovery log"));

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "second");
        assert_eq!(entries[0].category, RecoveryCategory::Import);
        assert_eq!(entries[0].body, "b\nc");
        assert_eq!(entries[1].fields[0], ("Mode".to_string(), "code".to_string()));
    }

    #[test]
    fn test_read_with_limit() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            log_recovery(
                tmp.path(),
                make_entry(RecoveryCategory::Write, &format!("entry {}", i), ""),
            );
        }
        let entries = read_recovery_entries(tmp.path(), Some(2), None);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "entry 4");
        assert_eq!(entries[1].description, "entry 3");
    }

    #[test]
    fn test_read_nonexistent_returns_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_recovery_entries(tmp.path(), None, None).is_empty());
    }

    #[test]
    fn test_log_mode_deletion_keeps_record() {
        let tmp = TempDir::new().unwrap();
        let mode = make_mode("architect", Some("team"));
        log_mode_deletion(tmp.path(), &mode);

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries[0].category, RecoveryCategory::Delete);
        let restored: Mode = serde_json::from_str(&entries[0].body).unwrap();
        assert_eq!(restored, mode);
    }

    #[test]
    fn test_log_helpers_skip_empty() {
        let tmp = TempDir::new().unwrap();
        log_replaced_modes(tmp.path(), "import", &[]);
        log_import_renames(tmp.path(), "file.json", &[]);
        assert!(!recovery_log_path(tmp.path()).exists());

        log_import_renames(
            tmp.path(),
            "file.json",
            &[SlugRename {
                original: "code".to_string(),
                renamed: "code-2".to_string(),
            }],
        );
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries[0].body, "code -> code-2");
    }

    #[test]
    fn test_prune_all() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Write, "a", ""));
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Write, "b", ""));
        assert_eq!(prune_recovery(tmp.path(), None, true).unwrap(), 2);
        assert!(read_recovery_entries(tmp.path(), None, None).is_empty());
    }

    #[test]
    fn test_prune_before_cutoff() {
        let tmp = TempDir::new().unwrap();
        let old = RecoveryEntry {
            timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ..make_entry(RecoveryCategory::Delete, "old", "x")
        };
        log_recovery(tmp.path(), old);
        log_recovery(tmp.path(), make_entry(RecoveryCategory::Delete, "new", "y"));

        let removed = prune_recovery(tmp.path(), None, false).unwrap();
        assert_eq!(removed, 1);
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "new");
    }

    #[test]
    fn test_prune_no_log_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(prune_recovery(tmp.path(), None, false).unwrap(), 0);
    }

    #[test]
    fn test_entry_to_json() {
        let entry = make_entry(RecoveryCategory::Import, "renamed", "a -> b");
        let json = entry.to_json();
        assert_eq!(json["category"], "import");
        assert_eq!(json["fields"]["Mode"], "code");
        assert_eq!(json["body"], "a -> b");
    }

    #[test]
    fn test_parse_entry_header_invalid() {
        assert!(parse_entry_header("not a header").is_none());
        assert!(parse_entry_header("2026-03-01T12:00:00Z - parser: x").is_none());
    }

    #[test]
    fn test_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
