//! Format constants and reader/writer options.

/// Fixed first word of every `.lic` and `.lit` stream.
pub const MAGIC_NUMBER: i32 = 0x1476_8126;

/// Newest format version this crate reads and writes.
pub const CURRENT_VERSION: i16 = 23;

/// Oldest format version.
pub const FIRST_VERSION: i16 = 1;

/// Progress total assumed for files that do not store one.
pub const ADVISORY_PROGRESS_TOTAL: usize = 500;

/// Which of the two file kinds a stream holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Instruction book (`.lic`).
    Document,
    /// Template (`.lit`).
    Template,
}

impl FileKind {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Document => "lic",
            Self::Template => "lit",
        }
    }
}

/// Options for reading streams.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Fail on the first recoverable problem instead of logging it.
    pub strict: bool,
    /// Newest version accepted (default: [`CURRENT_VERSION`]).
    pub max_version: i16,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_version: CURRENT_VERSION,
        }
    }
}

impl ReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict mode.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Refuse versions newer than `version`.
    #[must_use]
    pub fn with_max_version(mut self, version: i16) -> Self {
        self.max_version = version.min(CURRENT_VERSION);
        self
    }
}

/// Options for writing streams.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Format version to produce (default: [`CURRENT_VERSION`]).
    pub version: i16,
    /// Silently drop data the target version cannot hold.
    pub allow_lossy: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            allow_lossy: true,
        }
    }
}

impl WriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target an older format version.
    #[must_use]
    pub fn with_version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    /// Fail instead of dropping data the target version cannot hold.
    #[must_use]
    pub fn lossless(mut self) -> Self {
        self.allow_lossy = false;
        self
    }
}
