//! Process-wide evaluator configuration.
//!
//! The configuration is read once, either from the environment on first use
//! or from an explicit [`EvalConfig::install`] call made before any evaluator
//! is built. Evaluators copy it at construction, so a builder override only
//! affects that evaluator.
//!
//! # Environment Variables
//!
//! - `MOC_EVAL_RECURSION_LIMIT`: maximum evaluation depth (default 256)
//! - `MOC_EVAL_FLAGS`: comma-separated flags:
//!   - `metamodelica` - enable the MetaModelica builtin table
//!   - `trace` - log rejected relation pairings and abandoned alternatives
//!   - `defer-unbound` - read unbound typed variables as `Empty` placeholders
//!
//! Example: `MOC_EVAL_FLAGS=metamodelica,trace`

use std::sync::OnceLock;

use bitflags::bitflags;

/// Default maximum evaluation depth.
pub const DEFAULT_RECURSION_LIMIT: usize = 256;

bitflags! {
    /// Feature switches for the evaluator.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct EvalFlags: u8 {
        /// Enable the MetaModelica builtin group.
        const METAMODELICA = 1 << 0;
        /// Verbose evaluation logging.
        const TRACE = 1 << 1;
        /// Synthesize `Empty` placeholders for unbound variables whose
        /// declared type is known.
        const DEFER_UNBOUND = 1 << 2;
    }
}

impl EvalFlags {
    /// Parse a comma-separated flag list. Unknown names are ignored with a
    /// warning.
    pub fn parse(s: &str) -> Self {
        let mut flags = EvalFlags::empty();
        for part in s.split(',') {
            match part.trim().to_ascii_lowercase().as_str() {
                "" => {}
                "metamodelica" => flags |= EvalFlags::METAMODELICA,
                "trace" => flags |= EvalFlags::TRACE,
                "defer-unbound" | "defer_unbound" => flags |= EvalFlags::DEFER_UNBOUND,
                "all" => flags = EvalFlags::all(),
                other => tracing::warn!(flag = other, "unknown evaluator flag ignored"),
            }
        }
        flags
    }
}

/// Evaluator configuration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EvalConfig {
    /// Depth at which evaluation fails with `RecursionLimitExceeded`.
    pub recursion_limit: usize,
    pub flags: EvalFlags,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            flags: EvalFlags::empty(),
        }
    }
}

static GLOBAL_CONFIG: OnceLock<EvalConfig> = OnceLock::new();

impl EvalConfig {
    /// The process-wide configuration, read from the environment on first use.
    pub fn global() -> EvalConfig {
        *GLOBAL_CONFIG.get_or_init(EvalConfig::from_env)
    }

    /// Set the process-wide configuration.
    ///
    /// Fails with the rejected config when the global configuration was
    /// already initialized (explicitly or by a first `global()` call).
    pub fn install(config: EvalConfig) -> Result<(), EvalConfig> {
        GLOBAL_CONFIG.set(config)
    }

    /// Read `MOC_EVAL_RECURSION_LIMIT` and `MOC_EVAL_FLAGS`.
    pub fn from_env() -> EvalConfig {
        let limit = std::env::var("MOC_EVAL_RECURSION_LIMIT").ok();
        let flags = std::env::var("MOC_EVAL_FLAGS").ok();
        EvalConfig::from_vars(limit.as_deref(), flags.as_deref())
    }

    /// Build a configuration from raw variable values.
    pub fn from_vars(recursion_limit: Option<&str>, flags: Option<&str>) -> EvalConfig {
        let recursion_limit = match recursion_limit.map(|s| s.trim().parse::<usize>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                tracing::warn!(
                    default = DEFAULT_RECURSION_LIMIT,
                    "invalid MOC_EVAL_RECURSION_LIMIT, using default"
                );
                DEFAULT_RECURSION_LIMIT
            }
            None => DEFAULT_RECURSION_LIMIT,
        };
        EvalConfig {
            recursion_limit,
            flags: flags.map(EvalFlags::parse).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: EvalFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn metamodelica(&self) -> bool {
        self.flags.contains(EvalFlags::METAMODELICA)
    }

    #[inline]
    pub fn trace(&self) -> bool {
        self.flags.contains(EvalFlags::TRACE)
    }

    #[inline]
    pub fn defer_unbound(&self) -> bool {
        self.flags.contains(EvalFlags::DEFER_UNBOUND)
    }
}
