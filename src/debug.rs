// src/debug.rs
//! Debug tracing sink.
//!
//! Constructed once at driver startup from the `DBG` environment variable
//! and handed to the components that trace; there is no global flag.

#[derive(Debug, Clone, Default)]
pub struct DebugSink {
    enabled: bool,
}

impl DebugSink {
    /// Read `DBG` from the environment; `DBG=1` enables tracing.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("DBG").map(|v| v == "1").unwrap_or(false),
        }
    }

    /// A sink that swallows everything.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit one trace line with the `DEBUG:` prefix on stderr.
    ///
    /// The message is built lazily so disabled sinks cost nothing.
    pub fn log(&self, msg: impl FnOnce() -> String) {
        if self.enabled {
            eprintln!("DEBUG: {}", msg());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sink_skips_message_construction() {
        let sink = DebugSink::disabled();
        let mut built = false;
        sink.log(|| {
            built = true;
            String::new()
        });
        assert!(!built);
    }
}
