use std::{env, path::PathBuf};

use clap::Parser;

pub struct Args {
    pub config: PathBuf,
    pub quiet: bool,
}

impl Args {
    pub fn parse() -> Self {
        let ArgsCli { config, quiet } = ArgsCli::parse();

        Self {
            config: config.unwrap_or_else(default_config_path),
            quiet,
        }
    }
}

#[derive(Parser)]
#[clap(author, version, about = DESCRIPTION)]
struct ArgsCli {
    #[clap(short, long, value_name = "PATH")]
    /// TOML configuration file [default: cfg/cfg.toml next to the executable]
    config: Option<PathBuf>,
    #[clap(short, long, action)]
    /// Set this if no logs should be displayed
    quiet: bool,
}

/// `cfg/cfg.toml` in the directory of the executable.
fn default_config_path() -> PathBuf {
    let dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_default();

    dir.join("cfg").join("cfg.toml")
}

static DESCRIPTION: &str = r#"
Request the trophy history of friends on trackmania.io
and compare their progress through three charts:

  - cumulative: Trophy points of every player over time.
  - john_v_marc: Running difference between two players.
  - categorized: Trophy points per achievement category
      since a configured start date.

Requested trophies are cached in a YAML file; while that
file exists, no requests are made."#;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_valid() {
        ArgsCli::command().debug_assert();
    }

    #[test]
    fn parse_flags() {
        let args = ArgsCli::try_parse_from(["trophy-race", "-c", "my.toml", "--quiet"]).unwrap();

        assert_eq!(args.config.as_deref(), Some(Path::new("my.toml")));
        assert!(args.quiet);
    }

    #[test]
    fn default_config() {
        let args = ArgsCli::try_parse_from(["trophy-race"]).unwrap();

        assert!(args.config.is_none());
        assert!(!args.quiet);
        assert!(default_config_path().ends_with("cfg/cfg.toml"));
    }
}
