//! Configuration resolution: listen address and engine dispatch mode.

use std::path::PathBuf;

use partiql_bridge::{DispatchMode, EngineCommand, OneShotExecutor};

/// Environment variable consulted for the listen port when `--addr` is unset.
pub const PORT_ENV_VAR: &str = "PORT";

/// Port used when neither `--addr` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 8080;

/// Resolve the HTTP listen address from the explicit flag, then `PORT`.
pub fn resolve_listen_addr(explicit: Option<&str>) -> String {
    let port = std::env::var(PORT_ENV_VAR).ok();
    resolve_listen_addr_from(explicit, port.as_deref())
}

/// Same as [`resolve_listen_addr`] with the port variable passed in.
///
/// Empty values count as unset. A bare `:port` binds on all interfaces.
pub fn resolve_listen_addr_from(explicit: Option<&str>, port: Option<&str>) -> String {
    let explicit = explicit.filter(|addr| !addr.is_empty());
    let port = port.filter(|port| !port.is_empty());

    let addr = match (explicit, port) {
        (Some(addr), _) => addr.to_string(),
        (None, Some(port)) => format!(":{port}"),
        (None, None) => format!(":{DEFAULT_PORT}"),
    };

    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr,
    }
}

/// Engine launch settings, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Packaged engine jar, launched as `<java> -jar <jar>`.
    pub jar: Option<PathBuf>,
    /// Engine executable launched directly; takes precedence over `jar`.
    pub engine: Option<PathBuf>,
    /// Java launcher.
    pub java: String,
    /// `-classpath` for the upstream CLI main class.
    pub classpath: Option<String>,
    /// Run the packaged engine once per request instead of as a worker.
    pub no_server: bool,
}

impl EngineSettings {
    /// The packaged engine command, if one is configured.
    pub fn packaged_engine(&self) -> Option<EngineCommand> {
        match (&self.engine, &self.jar) {
            (Some(engine), _) => Some(EngineCommand::new(engine)),
            (None, Some(jar)) => Some(EngineCommand::java_jar(&self.java, jar)),
            (None, None) => None,
        }
    }

    /// Pick how requests reach the engine.
    ///
    /// A packaged engine runs as a persistent worker unless `no_server` is
    /// set, in which case it runs once per request. Without one, every
    /// request goes through the upstream CLI main class.
    pub fn dispatch_mode(&self) -> DispatchMode {
        match self.packaged_engine() {
            Some(command) if !self.no_server => DispatchMode::Worker(command),
            Some(command) => DispatchMode::OneShot(OneShotExecutor::new_cli(command)),
            None => DispatchMode::OneShot(OneShotExecutor::original(
                EngineCommand::new(&self.java),
                self.classpath.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partiql_bridge::CliVariant;

    fn settings() -> EngineSettings {
        EngineSettings {
            jar: None,
            engine: None,
            java: "java".to_string(),
            classpath: None,
            no_server: false,
        }
    }

    #[test]
    fn test_listen_addr_explicit_wins() {
        assert_eq!(
            resolve_listen_addr_from(Some("127.0.0.1:3000"), Some("9000")),
            "127.0.0.1:3000"
        );
    }

    #[test]
    fn test_listen_addr_bare_port_binds_all_interfaces() {
        assert_eq!(resolve_listen_addr_from(Some(":3000"), None), "0.0.0.0:3000");
    }

    #[test]
    fn test_listen_addr_from_port_variable() {
        assert_eq!(resolve_listen_addr_from(None, Some("9000")), "0.0.0.0:9000");
    }

    #[test]
    fn test_listen_addr_default() {
        assert_eq!(resolve_listen_addr_from(None, None), "0.0.0.0:8080");
        assert_eq!(resolve_listen_addr_from(Some(""), Some("")), "0.0.0.0:8080");
    }

    #[test]
    fn test_jar_selects_worker() {
        let settings = EngineSettings {
            jar: Some(PathBuf::from("/opt/partiql/query.jar")),
            ..settings()
        };
        match settings.dispatch_mode() {
            DispatchMode::Worker(command) => {
                assert_eq!(command.to_string(), "java -jar /opt/partiql/query.jar")
            }
            other => panic!("expected worker mode, got {other:?}"),
        }
    }

    #[test]
    fn test_jar_with_no_server_selects_new_cli() {
        let settings = EngineSettings {
            jar: Some(PathBuf::from("query.jar")),
            no_server: true,
            ..settings()
        };
        let mode = settings.dispatch_mode();
        assert_eq!(mode.name(), "one-shot (new)");
    }

    #[test]
    fn test_engine_overrides_jar() {
        let settings = EngineSettings {
            jar: Some(PathBuf::from("query.jar")),
            engine: Some(PathBuf::from("/usr/local/bin/partiql-engine")),
            ..settings()
        };
        assert_eq!(
            settings.dispatch_mode(),
            DispatchMode::Worker(EngineCommand::new("/usr/local/bin/partiql-engine"))
        );
    }

    #[test]
    fn test_no_engine_selects_original_cli_with_classpath() {
        let settings = EngineSettings {
            java: "/usr/bin/java".to_string(),
            classpath: Some("lib/*".to_string()),
            ..settings()
        };
        let DispatchMode::OneShot(executor) = settings.dispatch_mode() else {
            panic!("expected one-shot mode");
        };
        match executor.variant() {
            CliVariant::Original { java, classpath } => {
                assert_eq!(java.to_string(), "/usr/bin/java");
                assert_eq!(classpath.as_deref(), Some("lib/*"));
            }
            other => panic!("expected original CLI, got {other:?}"),
        }
    }
}
