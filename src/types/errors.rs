use std::fmt;

// === ProviderError ===

/// Errors returned by a bookmark storage provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Node with the given ID was not found.
    NotFound(String),
    /// The node is a link where a folder was required.
    NotAFolder(String),
    /// The root and its top-level folders cannot be moved or removed.
    RootModification(String),
    /// `remove` was called on a folder that still has children.
    FolderNotEmpty(String),
    /// The move would place a folder inside its own subtree.
    InvalidMove(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotFound(id) => write!(f, "Bookmark node not found: {}", id),
            ProviderError::NotAFolder(id) => write!(f, "Bookmark node is not a folder: {}", id),
            ProviderError::RootModification(id) => {
                write!(f, "Cannot modify root bookmark node: {}", id)
            }
            ProviderError::FolderNotEmpty(id) => write!(f, "Bookmark folder not empty: {}", id),
            ProviderError::InvalidMove(msg) => write!(f, "Invalid bookmark move: {}", msg),
            ProviderError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

// === ProbeError ===

/// Failures of a single liveness probe. None of these mark a link invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// The probe did not finish within its timeout.
    Timeout(String),
    /// The probe was aborted by scan cancellation.
    Aborted,
    /// Connection, DNS, TLS or protocol failure.
    Network(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Timeout(url) => write!(f, "Probe timed out: {}", url),
            ProbeError::Aborted => write!(f, "Probe aborted"),
            ProbeError::Network(msg) => write!(f, "Probe network error: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

// === ScanError ===

/// Errors that prevent a scan from starting.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanError {
    /// No top-level folder was selected.
    EmptyScope,
    /// Reading the bookmark tree failed.
    Provider(ProviderError),
    /// Reading settings failed.
    Settings(String),
    /// Recording the run in history failed.
    History(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::EmptyScope => write!(f, "Select at least one folder to scan"),
            ScanError::Provider(err) => write!(f, "Scan provider error: {}", err),
            ScanError::Settings(msg) => write!(f, "Scan settings error: {}", msg),
            ScanError::History(msg) => write!(f, "Scan history error: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<ProviderError> for ScanError {
    fn from(err: ProviderError) -> Self {
        ScanError::Provider(err)
    }
}

impl From<SettingsError> for ScanError {
    fn from(err: SettingsError) -> Self {
        ScanError::Settings(err.to_string())
    }
}

impl From<HistoryError> for ScanError {
    fn from(err: HistoryError) -> Self {
        ScanError::History(err.to_string())
    }
}

// === StoreError ===

/// Errors from the key-value persistence layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Database operation failed.
    DatabaseError(String),
    /// Failed to serialize or deserialize a stored value.
    SerializationError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
            StoreError::SerializationError(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for StoreError {}

// === RecycleError ===

/// Errors from the soft-delete manager.
#[derive(Debug, Clone, PartialEq)]
pub enum RecycleError {
    /// Emptying the recycle bin needs an explicit confirmation.
    ConfirmationRequired,
    /// The provider rejected an operation.
    Provider(ProviderError),
    /// Persisting the restore map failed.
    Store(StoreError),
    /// Reading the language setting failed.
    Settings(String),
}

impl fmt::Display for RecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecycleError::ConfirmationRequired => {
                write!(f, "Emptying the recycle bin requires confirmation")
            }
            RecycleError::Provider(err) => write!(f, "Recycle provider error: {}", err),
            RecycleError::Store(err) => write!(f, "Recycle store error: {}", err),
            RecycleError::Settings(msg) => write!(f, "Recycle settings error: {}", msg),
        }
    }
}

impl std::error::Error for RecycleError {}

impl From<ProviderError> for RecycleError {
    fn from(err: ProviderError) -> Self {
        RecycleError::Provider(err)
    }
}

impl From<StoreError> for RecycleError {
    fn from(err: StoreError) -> Self {
        RecycleError::Store(err)
    }
}

impl From<SettingsError> for RecycleError {
    fn from(err: SettingsError) -> Self {
        RecycleError::Settings(err.to_string())
    }
}

// === HistoryError ===

/// Errors related to scan history, trend log and visit feed.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// Scan run with the given ID was not found.
    NotFound(String),
    /// Persisting the log failed.
    Store(StoreError),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::NotFound(id) => write!(f, "Scan run not found: {}", id),
            HistoryError::Store(err) => write!(f, "History store error: {}", err),
            HistoryError::DatabaseError(msg) => write!(f, "History database error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<StoreError> for HistoryError {
    fn from(err: StoreError) -> Self {
        HistoryError::Store(err)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Reading or writing the underlying store failed.
    StoreError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::StoreError(msg) => write!(f, "Settings store error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<StoreError> for SettingsError {
    fn from(err: StoreError) -> Self {
        SettingsError::StoreError(err.to_string())
    }
}

// === AnalyticsError ===

/// Errors that stop an analytics run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Reading the bookmark tree failed.
    Provider(ProviderError),
    /// Reading scan history, the trend log or visits failed.
    History(HistoryError),
    /// Reading settings failed.
    Settings(SettingsError),
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::Provider(err) => write!(f, "Analytics provider error: {}", err),
            AnalyticsError::History(err) => write!(f, "Analytics history error: {}", err),
            AnalyticsError::Settings(err) => write!(f, "Analytics settings error: {}", err),
        }
    }
}

impl std::error::Error for AnalyticsError {}

impl From<ProviderError> for AnalyticsError {
    fn from(err: ProviderError) -> Self {
        AnalyticsError::Provider(err)
    }
}

impl From<HistoryError> for AnalyticsError {
    fn from(err: HistoryError) -> Self {
        AnalyticsError::History(err)
    }
}

impl From<SettingsError> for AnalyticsError {
    fn from(err: SettingsError) -> Self {
        AnalyticsError::Settings(err)
    }
}
