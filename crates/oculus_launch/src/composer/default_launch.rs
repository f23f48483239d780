//! Default launch description for the sonar stack

use crate::composer::description::{LaunchDescription, OutputSink, ProcessDirective};
use crate::registry::{LocateError, PackageLocator};

/// Package providing the sonar driver and its default configuration
pub const SONAR_PACKAGE: &str = "oculus_ros2";

/// Build the default launch description: the sonar driver under the `sonar`
/// namespace with its shipped configuration, plus the rqt GUI tools for
/// visualization and parameter tuning.
///
/// The configuration path is resolved through the locator but never read
/// here; a missing or malformed file surfaces later, when the driver process
/// loads its parameters.
pub fn default_description(
    locator: &dyn PackageLocator,
) -> Result<LaunchDescription, ComposeError> {
    let share_dir = locator.resolve_share_dir(SONAR_PACKAGE).map_err(|source| {
        ComposeError::ConfigResolution {
            package: SONAR_PACKAGE.to_string(),
            source,
        }
    })?;
    let config = share_dir.join("cfg").join("default.yaml");

    // The four remappings keep their names; they exist to pin the driver's
    // topics under the "sonar" namespace.
    let sonar = ProcessDirective::new(SONAR_PACKAGE, "oculus_sonar_node")
        .name("oculus_sonar")
        .namespace("sonar")
        .parameters_file(config)
        .remap("status", "status")
        .remap("ping", "ping")
        .remap("temperature", "temperature")
        .remap("pressure", "pressure")
        .output(OutputSink::Screen);

    let rqt_gui = ProcessDirective::new("rqt_gui", "rqt_gui").output(OutputSink::Screen);
    let rqt_reconfigure =
        ProcessDirective::new("rqt_reconfigure", "rqt_reconfigure").output(OutputSink::Screen);

    let mut description = LaunchDescription::new();
    description.add(sonar);
    description.add(rqt_gui);
    description.add(rqt_reconfigure);
    Ok(description)
}

/// Errors that can occur while building a launch description
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Failed to resolve configuration for package '{package}': {source}")]
    ConfigResolution {
        package: String,
        #[source]
        source: LocateError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::description::Remapping;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Fake locator backed by a fixed package map
    struct FakeLocator {
        share_dirs: HashMap<String, PathBuf>,
    }

    impl FakeLocator {
        fn with_sonar_installed() -> Self {
            let mut share_dirs = HashMap::new();
            share_dirs.insert(
                "oculus_ros2".to_string(),
                PathBuf::from("/opt/install/share/oculus_ros2"),
            );
            Self { share_dirs }
        }

        fn empty() -> Self {
            Self {
                share_dirs: HashMap::new(),
            }
        }
    }

    impl PackageLocator for FakeLocator {
        fn resolve_share_dir(&self, package: &str) -> Result<PathBuf, LocateError> {
            self.share_dirs
                .get(package)
                .cloned()
                .ok_or_else(|| LocateError::PackageNotFound {
                    package: package.to_string(),
                    searched: Vec::new(),
                })
        }

        fn resolve_executable(
            &self,
            package: &str,
            executable: &str,
        ) -> Result<PathBuf, LocateError> {
            self.resolve_share_dir(package)
                .map(|dir| dir.join(executable))
        }
    }

    #[test]
    fn test_three_directives_in_fixed_order() {
        let locator = FakeLocator::with_sonar_installed();
        let description = default_description(&locator).unwrap();

        let names: Vec<_> = description.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["oculus_sonar", "rqt_gui", "rqt_reconfigure"]);
    }

    #[test]
    fn test_sonar_directive_namespace_and_remappings() {
        let locator = FakeLocator::with_sonar_installed();
        let description = default_description(&locator).unwrap();
        let sonar = &description.directives()[0];

        assert_eq!(sonar.namespace.as_deref(), Some("sonar"));
        assert_eq!(
            sonar.remappings,
            vec![
                Remapping::new("status", "status"),
                Remapping::new("ping", "ping"),
                Remapping::new("temperature", "temperature"),
                Remapping::new("pressure", "pressure"),
            ]
        );
    }

    #[test]
    fn test_sonar_directive_single_config_path() {
        let locator = FakeLocator::with_sonar_installed();
        let description = default_description(&locator).unwrap();
        let sonar = &description.directives()[0];

        assert_eq!(
            sonar.parameters,
            vec![PathBuf::from(
                "/opt/install/share/oculus_ros2/cfg/default.yaml"
            )]
        );
    }

    #[test]
    fn test_gui_directives_carry_no_bindings() {
        let locator = FakeLocator::with_sonar_installed();
        let description = default_description(&locator).unwrap();

        for directive in &description.directives()[1..] {
            assert!(directive.namespace.is_none());
            assert!(directive.parameters.is_empty());
            assert!(directive.remappings.is_empty());
            assert_eq!(directive.output, OutputSink::Screen);
        }
    }

    #[test]
    fn test_missing_package_aborts_construction() {
        let locator = FakeLocator::empty();
        let err = default_description(&locator).unwrap_err();

        let ComposeError::ConfigResolution { package, .. } = err;
        assert_eq!(package, "oculus_ros2");
    }

    #[test]
    fn test_idempotent_under_unchanged_state() {
        let locator = FakeLocator::with_sonar_installed();
        let first = default_description(&locator).unwrap();
        let second = default_description(&locator).unwrap();

        assert_eq!(first, second);
    }
}
