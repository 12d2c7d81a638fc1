//! Build tool detection from a repository file listing
//!
//! Works on the flat, slash-separated path list a git tree listing returns.
//! A Gradle wrapper wins outright; a Gradle build file is next; SBT, Bazel
//! and Ant only count while nothing stronger has been seen; Maven is decided
//! last, preferring the wrapper directory when `mvnw` is present.

use crate::types::{BuildLayout, BuildTool};

const ROOT_DIR: &str = ".";

/// Detect the build tool and its directory from repository `paths`.
#[must_use]
pub fn detect_build_layout<I, S>(paths: I) -> BuildLayout
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tool = BuildTool::Unknown;
    let mut directory = ROOT_DIR.to_string();
    let mut pom_dir: Option<String> = None;
    let mut wrapper_dir: Option<String> = None;

    for path in paths {
        let path = path.as_ref();
        let file = file_name(path);

        match file {
            "gradlew" | "gradlew.bat" => {
                return BuildLayout { tool: BuildTool::Gradle, directory: parent_dir(path) };
            }
            "build.gradle" | "build.gradle.kts" if tool != BuildTool::Gradle => {
                tool = BuildTool::Gradle;
                directory = parent_dir(path);
            }
            "pom.xml" => pom_dir = Some(parent_dir(path)),
            "mvnw" | "mvnw.cmd" => wrapper_dir = Some(parent_dir(path)),
            "build.sbt" if tool == BuildTool::Unknown => {
                tool = BuildTool::Sbt;
                directory = parent_dir(path);
            }
            "WORKSPACE" | "BUILD" | "BUILD.bazel" if tool == BuildTool::Unknown && path == file => {
                tool = BuildTool::Bazel;
                directory = ROOT_DIR.to_string();
            }
            "build.xml" if tool == BuildTool::Unknown => {
                tool = BuildTool::Ant;
                directory = parent_dir(path);
            }
            _ => {}
        }
    }

    if tool == BuildTool::Unknown {
        if let Some(pom_dir) = pom_dir {
            return match wrapper_dir {
                Some(wrapper_dir) => BuildLayout { tool: BuildTool::MavenWrapper, directory: wrapper_dir },
                None => BuildLayout { tool: BuildTool::Maven, directory: pom_dir },
            };
        }
    }

    BuildLayout { tool, directory }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) if idx > 0 => path[..idx].to_string(),
        _ => ROOT_DIR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradle_wrapper_wins_over_everything() {
        let layout = detect_build_layout(["pom.xml", "service/gradlew", "service/build.gradle"]);
        assert_eq!(layout, BuildLayout { tool: BuildTool::Gradle, directory: "service".into() });
    }

    #[test]
    fn root_level_wrapper_uses_root_directory() {
        let layout = detect_build_layout(["README.md", "gradlew", "build.gradle.kts"]);
        assert_eq!(layout, BuildLayout { tool: BuildTool::Gradle, directory: ".".into() });
    }

    #[test]
    fn maven_wrapper_prefers_wrapper_directory() {
        let layout = detect_build_layout(["backend/pom.xml", "backend/mvnw", "backend/src/Main.java"]);
        assert_eq!(layout, BuildLayout { tool: BuildTool::MavenWrapper, directory: "backend".into() });
    }

    #[test]
    fn plain_pom_is_maven() {
        let layout = detect_build_layout(["pom.xml", "src/main/java/App.java"]);
        assert_eq!(layout, BuildLayout { tool: BuildTool::Maven, directory: ".".into() });
    }

    #[test]
    fn gradle_build_file_beats_maven() {
        let layout = detect_build_layout(["pom.xml", "app/build.gradle"]);
        assert_eq!(layout.tool, BuildTool::Gradle);
        assert_eq!(layout.directory, "app");
    }

    #[test]
    fn first_weak_marker_sticks() {
        assert_eq!(detect_build_layout(["build.sbt", "build.xml"]).tool, BuildTool::Sbt);
        assert_eq!(detect_build_layout(["tools/build.xml"]).directory, "tools");
    }

    #[test]
    fn bazel_markers_only_count_at_the_root() {
        assert_eq!(detect_build_layout(["WORKSPACE"]).tool, BuildTool::Bazel);
        assert_eq!(detect_build_layout(["third_party/BUILD"]).tool, BuildTool::Unknown);
    }

    #[test]
    fn empty_listing_is_unknown_at_root() {
        assert_eq!(detect_build_layout(Vec::<String>::new()), BuildLayout::default());
    }
}
