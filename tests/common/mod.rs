//! Common test utilities for pinpack integration tests
//!
//! [`TestProject`] lays out a throwaway project next to fake `fpm` and `dpkg`
//! scripts. The fake fpm records every invocation, writes an empty `.deb` whose
//! content is the `Depends` field the test configured for that package, and
//! reports the file the way fpm does. The fake dpkg prints that content back.

// Not every test file uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use pinpack_cli::test_utils::write_fake_tool;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAKE_FPM: &str = r#"echo "$@" >> "@LOG@"
for last; do :; done
name=$(basename "$last")
[ "$name" = "setup.py" ] && name=project
if [ -f "@GRAPH@/$name.fail" ]; then
    echo "Failed to fetch $name from the package index" >&2
    exit 1
fi
out="python-$name.deb"
if [ -f "@GRAPH@/$name" ]; then cat "@GRAPH@/$name" > "$out"; else : > "$out"; fi
echo "{:timestamp=>\"now\", :message=>\"Created package\", :path=>\"$out\"}""#;

const FAKE_DPKG: &str = r#"cat "$2""#;

/// A project directory plus fake packaging tools, all inside one temp dir.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        for dir in ["app", "bin", "graph"] {
            fs::create_dir(temp.path().join(dir))?;
        }
        Ok(Self {
            temp,
        })
    }

    /// A project whose `setup.py` declares `requires`, with fake tools configured.
    pub fn with_requires(requires: &[&str]) -> Result<Self> {
        let project = Self::new()?;
        let list = requires.iter().map(|r| format!("'{r}'")).collect::<Vec<_>>().join(", ");
        project.write(
            "setup.py",
            &format!(
                "from setuptools import setup\n\nsetup(\n    name='app',\n    install_requires=[{list}],\n)\n"
            ),
        )?;
        project.install_fake_tools()?;
        Ok(project)
    }

    pub fn project_dir(&self) -> PathBuf {
        self.temp.path().join("app")
    }

    fn bin_dir(&self) -> PathBuf {
        self.temp.path().join("bin")
    }

    fn graph_dir(&self) -> PathBuf {
        self.temp.path().join("graph")
    }

    fn log_path(&self) -> PathBuf {
        self.temp.path().join("fpm.log")
    }

    /// Write a file relative to the project directory.
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.project_dir().join(relative);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.project_dir().join(relative).exists()
    }

    /// Write `versions.cfg` with the given pins.
    pub fn pin(&self, pins: &[(&str, &str)]) -> Result<()> {
        let mut content = String::from("[buildout]\nversions = versions\n\n[versions]\n");
        for (name, version) in pins {
            content.push_str(&format!("{name} = {version}\n"));
        }
        self.write("versions.cfg", &content)
    }

    /// `Depends` field of the package the fake fpm builds for `name`.
    pub fn depends(&self, name: &str, field: &str) -> Result<()> {
        fs::write(self.graph_dir().join(name), field)?;
        Ok(())
    }

    /// Make the fake fpm fail for `name` (`project` for the project itself).
    pub fn fail(&self, name: &str) -> Result<()> {
        fs::write(self.graph_dir().join(format!("{name}.fail")), "")?;
        Ok(())
    }

    /// Write the fake tools and point `pinpack.toml` at them.
    pub fn install_fake_tools(&self) -> Result<()> {
        let fpm = FAKE_FPM
            .replace("@LOG@", &self.log_path().display().to_string())
            .replace("@GRAPH@", &self.graph_dir().display().to_string());
        let fpm = write_fake_tool(&self.bin_dir().join("fpm"), &fpm)?;
        let dpkg = write_fake_tool(&self.bin_dir().join("dpkg"), FAKE_DPKG)?;
        self.write_config(&fpm, &dpkg)
    }

    pub fn write_config(&self, fpm: &Path, dpkg: &Path) -> Result<()> {
        self.write(
            "pinpack.toml",
            &format!(
                "[packaging]\nmaintainer = \"Release Team\"\n\n[tools]\nfpm = \"{}\"\ndpkg = \"{}\"\npython = \"pinpack-test-no-python\"\n",
                fpm.display(),
                dpkg.display()
            ),
        )
    }

    /// Every fake fpm invocation, one line each.
    pub fn fpm_calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// fpm invocations whose positional argument is `name`.
    pub fn calls_for(&self, name: &str) -> Vec<String> {
        self.fpm_calls()
            .into_iter()
            .filter(|line| line.rsplit(' ').next() == Some(name))
            .collect()
    }

    /// The invocation that packaged the project itself.
    pub fn project_call(&self) -> Option<String> {
        self.fpm_calls().into_iter().find(|line| line.ends_with("setup.py"))
    }

    /// `pinpack` running inside the project directory, isolated from user config.
    pub fn pinpack(&self) -> Command {
        let mut cmd = Command::cargo_bin("pinpack").unwrap();
        cmd.current_dir(self.project_dir())
            .env("PINPACK_NO_PROGRESS", "1")
            .env("XDG_CONFIG_HOME", self.temp.path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// `pinpack build --package-version <version> -- <args>`.
    pub fn build(&self, version: &str, args: &[&str]) -> Command {
        let mut cmd = self.pinpack();
        cmd.args(["build", "--package-version", version, "--"]).args(args);
        cmd
    }
}
