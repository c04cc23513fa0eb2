use std::ffi::OsStr;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Local;
use chrono::Timelike;

use super::sink::FileSink;
use crate::config::LoggingConfig;
use crate::environment::Environment;
use crate::error::LogError;

const LOG_EXTENSION: &str = "txt";
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Outcome of start-up rotation. Every variant is final for the run.
#[derive(Debug)]
pub enum LogStatus {
    /// The environment is outside the configured level.
    Disabled,
    Active(PathBuf),
    /// Rotation hit an I/O error; logging stays off for this run.
    Failed(LogError),
}

impl LogStatus {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Active(path) => Some(path),
            Self::Disabled | Self::Failed(_) => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Active(_) => "active",
            Self::Failed(_) => "failed",
        }
    }
}

/// Establishes the log destination for this process, once.
#[derive(Debug)]
pub struct LogRotator {
    config: LoggingConfig,
    status: OnceLock<LogStatus>,
}

impl LogRotator {
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            status: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Rotates on the first call and returns the stored status on every later
    /// call. Concurrent callers block until the first rotation completes.
    pub fn initialize(&self, environment: Environment) -> &LogStatus {
        self.status.get_or_init(|| {
            if !environment.is_in(self.config.level) {
                return LogStatus::Disabled;
            }
            match rotate(&self.config, Local::now()) {
                Ok(path) => LogStatus::Active(path),
                Err(err) => LogStatus::Failed(err),
            }
        })
    }

    /// `None` until `initialize` has run.
    pub fn status(&self) -> Option<&LogStatus> {
        self.status.get()
    }

    /// Opens the file sink for the active destination. `None` when logging is
    /// not active or the file can no longer be opened.
    pub fn open_sink(&self) -> Option<FileSink> {
        let path = self.status()?.path()?;
        FileSink::open(path).ok()
    }
}

/// Moves every file in the log directory into the archive and creates a fresh,
/// empty log file named after `now`. Returns the new file's path.
///
/// An archive name that is not a single directory name is rejected before
/// anything on disk is touched.
pub fn rotate(config: &LoggingConfig, now: DateTime<Local>) -> Result<PathBuf, LogError> {
    if !config.has_valid_archive_name() {
        return Err(LogError::InvalidArchiveDirectory {
            name: config.archive_directory.clone(),
        });
    }
    let directory = config.directory.as_path();
    let archive = config.archive_path();
    create_directory(directory)?;
    create_directory(&archive)?;
    archive_existing(directory, &archive)?;
    create_log_file(directory, &log_file_stem(now))
}

/// `{year}-{month}-{day}-{hour}-{minute}-{second}`, unpadded.
pub fn log_file_stem(now: DateTime<Local>) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn create_directory(path: &Path) -> Result<(), LogError> {
    fs::create_dir_all(path).map_err(|source| LogError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn archive_existing(directory: &Path, archive: &Path) -> Result<usize, LogError> {
    let archive_error = |path: &Path, source| LogError::ArchiveFile {
        path: path.to_path_buf(),
        source,
    };

    let mut moved = 0;
    let entries = fs::read_dir(directory).map_err(|source| archive_error(directory, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| archive_error(directory, source))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|source| archive_error(&path, source))?;
        if !file_type.is_file() {
            continue;
        }
        let target = vacant_path(archive, &entry.file_name());
        fs::rename(&path, &target).map_err(|source| archive_error(&path, source))?;
        moved += 1;
    }
    Ok(moved)
}

/// First of `name`, `{stem}-1{.ext}`, `{stem}-2{.ext}`, ... that does not exist
/// in `directory`.
fn vacant_path(directory: &Path, name: &OsStr) -> PathBuf {
    let candidate = directory.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(name);
    let stem = name.file_stem().unwrap_or(name.as_os_str()).to_string_lossy();
    let extension = name
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| directory.join(format!("{stem}-{n}{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

fn create_log_file(directory: &Path, stem: &str) -> Result<PathBuf, LogError> {
    let mut last_path = directory.join(format!("{stem}.{LOG_EXTENSION}"));
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = if attempt == 0 {
            directory.join(format!("{stem}.{LOG_EXTENSION}"))
        } else {
            directory.join(format!("{stem}-{attempt}.{LOG_EXTENSION}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => last_path = path,
            Err(source) => return Err(LogError::CreateLogFile { path, source }),
        }
    }
    Err(LogError::CreateLogFile {
        path: last_path,
        source: std::io::Error::new(ErrorKind::AlreadyExists, "no free log file name"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::environment::Mode;
    use crate::logging::DiagnosticMessage;
    use crate::logging::MessageSink;
    use crate::logging::Severity;

    fn settings(root: &Path) -> LoggingConfig {
        LoggingConfig {
            level: Mode::BUILD,
            directory: root.join("logs"),
            archive_directory: "logs.old".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("timestamp")
    }

    fn file_names(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry"))
            .filter(|entry| entry.file_type().expect("file type").is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn file_stem_is_unpadded() {
        assert_eq!(log_file_stem(fixed_now()), "2024-3-9-7-5-1");
    }

    #[test]
    fn rotation_archives_previous_files_byte_for_byte() {
        let dir = tempdir().expect("tmpdir");
        let settings = settings(dir.path());
        fs::create_dir_all(&settings.directory).expect("mkdir");
        fs::write(settings.directory.join("a.txt"), b"alpha\nfirst run\n").expect("a");
        fs::write(settings.directory.join("b.txt"), [0_u8, 159, 146, 150]).expect("b");

        let path = rotate(&settings, fixed_now()).expect("rotate");

        assert_eq!(path, settings.directory.join("2024-3-9-7-5-1.txt"));
        assert_eq!(
            file_names(&settings.directory),
            BTreeSet::from(["2024-3-9-7-5-1.txt".to_string()])
        );
        let archive = settings.archive_path();
        assert_eq!(
            file_names(&archive),
            BTreeSet::from(["a.txt".to_string(), "b.txt".to_string()])
        );
        assert_eq!(
            fs::read(archive.join("a.txt")).expect("read a"),
            b"alpha\nfirst run\n"
        );
        assert_eq!(
            fs::read(archive.join("b.txt")).expect("read b"),
            vec![0_u8, 159, 146, 150]
        );
        assert_eq!(fs::read(&path).expect("new log").len(), 0);
    }

    #[test]
    fn rotation_creates_missing_directories() {
        let dir = tempdir().expect("tmpdir");
        let settings = settings(dir.path());

        rotate(&settings, fixed_now()).expect("rotate");

        assert!(settings.directory.is_dir());
        assert!(settings.archive_path().is_dir());
    }

    #[test]
    fn existing_archive_entries_are_untouched() {
        let dir = tempdir().expect("tmpdir");
        let settings = settings(dir.path());
        let archive = settings.archive_path();
        fs::create_dir_all(&archive).expect("mkdir");
        fs::write(archive.join("old.txt"), b"older run").expect("old");
        fs::write(settings.directory.join("old.txt"), b"newer run").expect("newer");

        rotate(&settings, fixed_now()).expect("rotate");

        assert_eq!(fs::read(archive.join("old.txt")).expect("old"), b"older run");
        assert_eq!(fs::read(archive.join("old-1.txt")).expect("renamed"), b"newer run");
    }

    #[test]
    fn same_second_rotations_never_overwrite() {
        let dir = tempdir().expect("tmpdir");
        let settings = settings(dir.path());

        let mut written = Vec::new();
        for run in 0..3 {
            let path = rotate(&settings, fixed_now()).expect("rotate");
            let content = format!("run {run}\n");
            fs::write(&path, &content).expect("write");
            written.push(content);
        }

        let mut preserved: Vec<String> = file_names(&settings.archive_path())
            .into_iter()
            .map(|name| fs::read_to_string(settings.archive_path().join(name)).expect("read"))
            .collect();
        preserved.extend(
            file_names(&settings.directory)
                .into_iter()
                .map(|name| fs::read_to_string(settings.directory.join(name)).expect("read")),
        );
        preserved.sort();
        assert_eq!(preserved, written);
        assert_eq!(file_names(&settings.directory).len(), 1);
    }

    #[test]
    fn taken_log_name_gets_a_suffix() {
        let dir = tempdir().expect("tmpdir");
        let directory = dir.path();
        fs::write(directory.join("2024-3-9-7-5-1.txt"), b"x").expect("seed");

        let path = create_log_file(directory, "2024-3-9-7-5-1").expect("create");

        assert_eq!(path, directory.join("2024-3-9-7-5-1-1.txt"));
    }

    #[test]
    fn disabled_environment_touches_nothing() {
        let dir = tempdir().expect("tmpdir");
        let rotator = LogRotator::new(settings(dir.path()));

        let status = rotator.initialize(Environment::from_signals(true, false));

        assert!(matches!(status, LogStatus::Disabled));
        assert!(!dir.path().join("logs").exists());
        assert!(rotator.open_sink().is_none());
    }

    #[test]
    fn initialize_rotates_only_once() {
        let dir = tempdir().expect("tmpdir");
        let rotator = LogRotator::new(settings(dir.path()));
        assert!(rotator.status().is_none());

        let first = rotator
            .initialize(Environment::from_signals(false, false))
            .path()
            .map(Path::to_path_buf)
            .expect("active");
        let second = rotator
            .initialize(Environment::from_signals(false, true))
            .path()
            .map(Path::to_path_buf)
            .expect("active");

        assert_eq!(first, second);
        assert!(file_names(&rotator.config().archive_path()).is_empty());
    }

    #[test]
    fn directory_failure_disables_logging() {
        let dir = tempdir().expect("tmpdir");
        let blocker = dir.path().join("logs");
        fs::write(&blocker, b"not a directory").expect("blocker");
        let rotator = LogRotator::new(settings(dir.path()));

        let status = rotator.initialize(Environment::from_signals(false, false));

        assert!(matches!(
            status,
            LogStatus::Failed(LogError::CreateDirectory { .. })
        ));
        assert!(rotator.open_sink().is_none());
        assert_eq!(fs::read(&blocker).expect("blocker"), b"not a directory");
    }

    #[test]
    fn archive_name_resolving_to_the_log_directory_is_rejected() {
        for name in ["", ".", "..", "old/.."] {
            let dir = tempdir().expect("tmpdir");
            let settings = LoggingConfig {
                archive_directory: name.to_string(),
                ..settings(dir.path())
            };
            fs::create_dir_all(&settings.directory).expect("mkdir");
            fs::write(settings.directory.join("a.txt"), b"previous run").expect("a");

            let err = rotate(&settings, fixed_now()).expect_err(name);

            assert!(
                matches!(err, LogError::InvalidArchiveDirectory { .. }),
                "{name:?}: {err}"
            );
            assert_eq!(
                file_names(&settings.directory),
                BTreeSet::from(["a.txt".to_string()])
            );
            assert_eq!(
                fs::read(settings.directory.join("a.txt")).expect("a"),
                b"previous run"
            );
        }
    }

    #[test]
    fn absolute_archive_name_disables_logging() {
        let dir = tempdir().expect("tmpdir");
        let outside = dir.path().join("elsewhere");
        let rotator = LogRotator::new(LoggingConfig {
            archive_directory: outside.to_string_lossy().into_owned(),
            ..settings(dir.path())
        });

        let status = rotator.initialize(Environment::from_signals(false, false));

        assert!(matches!(
            status,
            LogStatus::Failed(LogError::InvalidArchiveDirectory { .. })
        ));
        assert!(!outside.exists());
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn messages_round_trip_through_the_active_file() {
        let dir = tempdir().expect("tmpdir");
        let rotator = LogRotator::new(settings(dir.path()));
        rotator.initialize(Environment::from_signals(false, true));
        let sink = rotator.open_sink().expect("sink");

        for text in ["boot", "teleport", "shutdown"] {
            sink.on_message(&DiagnosticMessage::new(text, "test", Severity::Log));
        }

        let path = rotator.status().and_then(LogStatus::path).expect("path");
        let contents = fs::read_to_string(path).expect("read");
        let texts: Vec<&str> = contents
            .lines()
            .filter_map(|line| line.split(' ').nth(1))
            .collect();
        assert_eq!(texts, vec!["boot", "teleport", "shutdown"]);
    }
}
