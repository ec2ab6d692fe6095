use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use log::{debug, info};
use thiserror::Error;
use tokio::{process::Command, runtime::Runtime, task::JoinHandle};

use crate::pom::{Pom, PomError};

const DEFAULT_GOAL: &str = "package";

#[derive(Error, Debug)]
pub enum EmbeddedBuildError {
    #[error("{0} is not a project directory, pom.xml is missing")]
    InvalidProject(PathBuf),
    #[error(transparent)]
    Pom(#[from] PomError),
    #[error("Unable to start {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Build failed with exit code {exit_code:?}\n{log}")]
    Failed { exit_code: Option<i32>, log: String },
    #[error("Build did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Build was interrupted: {0}")]
    Interrupted(String),
    #[error("Build result was already collected")]
    Collected,
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltProject {
    pub exit_code: Option<i32>,
    pub log: String,
    /// `target/<artifactId>-<version>.<extension>`, when the build produced it.
    pub default_archive: Option<PathBuf>,
}

/// Builds a project with an external `mvn`.
#[derive(Debug, Clone)]
pub struct EmbeddedBuild {
    project: PathBuf,
    goals: Vec<String>,
    properties: BTreeMap<String, String>,
    profiles: Vec<String>,
    user_settings: Option<PathBuf>,
    global_settings: Option<PathBuf>,
    offline: bool,
    ignore_failure: bool,
    executable: Option<PathBuf>,
}

impl EmbeddedBuild {
    pub fn for_project(project: impl Into<PathBuf>) -> Result<Self, EmbeddedBuildError> {
        let project = project.into();
        if !project.join("pom.xml").is_file() {
            return Err(EmbeddedBuildError::InvalidProject(project));
        }
        Ok(EmbeddedBuild {
            project,
            goals: Vec::new(),
            properties: BTreeMap::new(),
            profiles: Vec::new(),
            user_settings: None,
            global_settings: None,
            offline: false,
            ignore_failure: false,
            executable: None,
        })
    }

    pub fn project(&self) -> &Path {
        &self.project
    }

    /// Runs `package` when no goal is given.
    pub fn goals<S: Into<String>>(mut self, goals: impl IntoIterator<Item = S>) -> Self {
        self.goals.extend(goals.into_iter().map(Into::into));
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn profiles<S: Into<String>>(mut self, profiles: impl IntoIterator<Item = S>) -> Self {
        self.profiles.extend(profiles.into_iter().map(Into::into));
        self
    }

    pub fn user_settings(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_settings = Some(path.into());
        self
    }

    pub fn global_settings(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_settings = Some(path.into());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// A failed build is reported through [`BuiltProject::exit_code`] instead of an error.
    pub fn ignore_failure(mut self, ignore_failure: bool) -> Self {
        self.ignore_failure = ignore_failure;
        self
    }

    /// Defaults to `$MAVEN_HOME/bin/mvn`, then `mvn` from `PATH`.
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    fn resolve_executable(&self) -> PathBuf {
        if let Some(executable) = &self.executable {
            return executable.clone();
        }
        match std::env::var_os("MAVEN_HOME") {
            Some(home) if !home.is_empty() => PathBuf::from(home).join("bin").join("mvn"),
            _ => PathBuf::from("mvn"),
        }
    }

    fn arguments(&self) -> Vec<String> {
        let mut arguments = vec![
            "--batch-mode".to_owned(),
            "-f".to_owned(),
            self.project.join("pom.xml").display().to_string(),
        ];
        if let Some(settings) = &self.user_settings {
            arguments.push("-s".to_owned());
            arguments.push(settings.display().to_string());
        }
        if let Some(settings) = &self.global_settings {
            arguments.push("-gs".to_owned());
            arguments.push(settings.display().to_string());
        }
        if self.offline {
            arguments.push("--offline".to_owned());
        }
        if !self.profiles.is_empty() {
            arguments.push("-P".to_owned());
            arguments.push(self.profiles.join(","));
        }
        for (key, value) in &self.properties {
            arguments.push(format!("-D{}={}", key, value));
        }
        if self.goals.is_empty() {
            arguments.push(DEFAULT_GOAL.to_owned());
        } else {
            arguments.extend(self.goals.iter().cloned());
        }
        arguments
    }

    pub async fn run(&self) -> Result<BuiltProject, EmbeddedBuildError> {
        let executable = self.resolve_executable();
        let arguments = self.arguments();
        info!("Building {} with {}", self.project.display(), arguments.join(" "));

        let output = Command::new(&executable)
            .args(&arguments)
            .current_dir(&self.project)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EmbeddedBuildError::Spawn {
                executable: executable.display().to_string(),
                source,
            })?;

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        let exit_code = output.status.code();
        if !output.status.success() {
            debug!("Build failed with status {}", output.status);
            if !self.ignore_failure {
                return Err(EmbeddedBuildError::Failed { exit_code, log });
            }
        }

        Ok(BuiltProject {
            exit_code,
            log,
            default_archive: self.default_archive()?,
        })
    }

    fn default_archive(&self) -> Result<Option<PathBuf>, EmbeddedBuildError> {
        let pom = Pom::from_file(&self.project.join("pom.xml"), &self.profiles)?;
        let archive = self.project.join("target").join(pom.archive_file_name());
        Ok(archive.is_file().then_some(archive))
    }

    /// Runs the build to completion on the calling thread, which must not be running a tokio
    /// runtime already. Async callers use [`run`](Self::run).
    pub fn build(&self) -> Result<BuiltProject, EmbeddedBuildError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run())
    }

    /// Starts the build on a background thread.
    pub fn build_in_daemon(self) -> Result<DaemonBuild, EmbeddedBuildError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("shrinkwrap-build")
            .enable_all()
            .build()?;
        let handle = runtime.spawn(async move { self.run().await });
        Ok(DaemonBuild {
            runtime,
            handle: Some(handle),
        })
    }
}

/// A build running in the background. Dropping it kills the build.
pub struct DaemonBuild {
    runtime: Runtime,
    handle: Option<JoinHandle<Result<BuiltProject, EmbeddedBuildError>>>,
}

impl DaemonBuild {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Blocks until the build finishes or `timeout` expires. A timed out build keeps running and
    /// can be waited for again.
    pub fn wait(&mut self, timeout: Duration) -> Result<BuiltProject, EmbeddedBuildError> {
        let handle = self.handle.as_mut().ok_or(EmbeddedBuildError::Collected)?;
        let joined = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, handle).await })
            .map_err(|_| EmbeddedBuildError::Timeout(timeout))?;
        self.handle = None;
        joined.map_err(|error| EmbeddedBuildError::Interrupted(error.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    const POM: &str = r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
</project>"#;

    fn project() -> tempfile::TempDir {
        let directory = tempfile::tempdir().unwrap();
        std::fs::write(directory.path().join("pom.xml"), POM).unwrap();
        directory
    }

    #[cfg(unix)]
    fn fake_maven(directory: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let executable = directory.join("fake-mvn");
        std::fs::write(&executable, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755)).unwrap();
        executable
    }

    #[test]
    fn missing_pom_is_not_a_project() {
        let directory = tempfile::tempdir().unwrap();
        assert!(matches!(
            EmbeddedBuild::for_project(directory.path()),
            Err(EmbeddedBuildError::InvalidProject(_))
        ));
    }

    #[test]
    fn arguments() {
        let project = project();
        let build = EmbeddedBuild::for_project(project.path())
            .unwrap()
            .goals(["clean", "install"])
            .property("skipTests", "true")
            .profiles(["ci", "release"])
            .offline(true);
        let pom = project.path().join("pom.xml").display().to_string();
        assert_eq!(
            build.arguments(),
            vec![
                "--batch-mode",
                "-f",
                pom.as_str(),
                "--offline",
                "-P",
                "ci,release",
                "-DskipTests=true",
                "clean",
                "install"
            ]
        );
    }

    #[test]
    fn default_goal() {
        let project = project();
        let build = EmbeddedBuild::for_project(project.path()).unwrap();
        assert_eq!(build.arguments().last().map(String::as_str), Some("package"));
    }

    #[cfg(unix)]
    #[test]
    fn build_finds_default_archive() {
        let project = project();
        let executable = fake_maven(
            project.path(),
            "mkdir -p target && touch target/app-1.0.jar && echo \"built $*\"",
        );
        let built = EmbeddedBuild::for_project(project.path())
            .unwrap()
            .executable(executable)
            .build()
            .unwrap();
        assert_eq!(built.exit_code, Some(0));
        assert!(built.log.contains("package"));
        assert_eq!(
            built.default_archive,
            Some(project.path().join("target").join("app-1.0.jar"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_build() {
        let project = project();
        let executable = fake_maven(project.path(), "echo broken; exit 3");
        let build = EmbeddedBuild::for_project(project.path())
            .unwrap()
            .executable(executable);
        match build.build() {
            Err(EmbeddedBuildError::Failed { exit_code, log }) => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(log, "broken\n");
            }
            other => panic!("unexpected result {:?}", other),
        }
        let built = build.ignore_failure(true).build().unwrap();
        assert_eq!(built.exit_code, Some(3));
        assert_eq!(built.default_archive, None);
    }

    #[cfg(unix)]
    #[test]
    fn daemon_build_times_out() {
        let project = project();
        let executable = fake_maven(project.path(), "sleep 1; echo done");
        let mut daemon = EmbeddedBuild::for_project(project.path())
            .unwrap()
            .executable(executable)
            .build_in_daemon()
            .unwrap();
        assert!(matches!(
            daemon.wait(Duration::from_millis(10)),
            Err(EmbeddedBuildError::Timeout(_))
        ));
        let built = daemon.wait(Duration::from_secs(30)).unwrap();
        assert_eq!(built.log, "done\n");
        assert!(daemon.is_finished());
        assert!(matches!(
            daemon.wait(Duration::from_secs(1)),
            Err(EmbeddedBuildError::Collected)
        ));
    }
}
