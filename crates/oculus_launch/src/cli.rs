//! Command-line interface for oculus-launch

use crate::registry::PrefixPathLocator;
use argh::FromArgs;

/// Launch the Oculus sonar driver with its default configuration and the
/// rqt GUI tools
#[derive(FromArgs, Debug)]
pub struct LaunchArgs {
    /// show the resolved launch plan without spawning anything
    #[argh(switch)]
    pub dry_run: bool,

    /// print the launch description as YAML and exit
    #[argh(switch)]
    pub export_yaml: bool,

    /// colon-separated install prefixes (default: $AMENT_PREFIX_PATH)
    #[argh(option, short = 'p')]
    pub prefix_path: Option<String>,

    /// graceful shutdown timeout in seconds
    #[argh(option, default = "5")]
    pub shutdown_timeout: u64,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,
}

impl LaunchArgs {
    /// Build the package locator from the CLI override or the environment
    pub fn locator(&self) -> PrefixPathLocator {
        match &self.prefix_path {
            Some(list) => PrefixPathLocator::from_path_list(list),
            None => PrefixPathLocator::from_env(),
        }
    }
}
