#![allow(dead_code)]

use std::path::{Path, PathBuf};

use shrinkwrap_resolver::{api::ResolveStage, Resolvers};
use tempfile::TempDir;

/// A throw-away directory laid out like a Maven repository.
pub struct Repository {
    directory: TempDir,
}

impl Repository {
    pub fn new() -> Self {
        Repository {
            directory: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.directory.path()
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path().display())
    }

    /// Deploys the `g:a:v` jar, with a POM declaring `dependencies`.
    pub fn deploy(&self, coordinate: &str, dependencies: &[String]) -> PathBuf {
        let [group_id, artifact_id, version] = split(coordinate);
        let directory = self.version_directory(group_id, artifact_id, version);
        std::fs::create_dir_all(&directory).unwrap();
        std::fs::write(
            directory.join(format!("{}-{}.pom", artifact_id, version)),
            format!(
                "<project>\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>{}</version>\n  <dependencies>\n{}\n  </dependencies>\n</project>\n",
                group_id,
                artifact_id,
                version,
                dependencies.join("\n")
            ),
        )
        .unwrap();
        let jar = directory.join(format!("{}-{}.jar", artifact_id, version));
        std::fs::write(&jar, coordinate).unwrap();
        jar
    }

    /// Deploys a jar without any POM.
    pub fn deploy_jar_only(&self, coordinate: &str) -> PathBuf {
        let [group_id, artifact_id, version] = split(coordinate);
        let directory = self.version_directory(group_id, artifact_id, version);
        std::fs::create_dir_all(&directory).unwrap();
        let jar = directory.join(format!("{}-{}.jar", artifact_id, version));
        std::fs::write(&jar, coordinate).unwrap();
        jar
    }

    fn version_directory(&self, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
        let mut directory = self.path().to_path_buf();
        directory.extend(group_id.split('.'));
        directory.join(artifact_id).join(version)
    }

    /// A resolver over this repository, ignoring the environment's settings.
    pub fn resolver(&self) -> ResolveStage {
        self.configuration().into_resolve_stage().unwrap()
    }

    pub fn configuration(&self) -> shrinkwrap_resolver::ConfigurationStage {
        Resolvers::configure_with(Default::default())
            .from_file(self.settings())
            .local_repository(self.path())
            .with_maven_central_repo(false)
    }

    pub fn settings(&self) -> PathBuf {
        let settings = self.path().join("settings.xml");
        std::fs::write(&settings, "<settings><offline>false</offline></settings>").unwrap();
        settings
    }
}

fn split(coordinate: &str) -> [&str; 3] {
    let parts: Vec<&str> = coordinate.split(':').collect();
    [parts[0], parts[1], parts[2]]
}

/// `<dependency>` element for `g:a:v`, followed by raw `extra` elements.
pub fn dependency(coordinate: &str, extra: &str) -> String {
    let [group_id, artifact_id, version] = split(coordinate);
    let version = if version.is_empty() {
        String::new()
    } else {
        format!("<version>{}</version>", version)
    };
    format!(
        "    <dependency><groupId>{}</groupId><artifactId>{}</artifactId>{}{}</dependency>",
        group_id, artifact_id, version, extra
    )
}

pub fn file_names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|file| file.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
