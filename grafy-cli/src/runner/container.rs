//! A long-lived container the comparison program is executed in.
//!
//! The container idles on `tail -f /dev/null` with the corpus mounted
//! read-only at `/app/input` and the output root at `/app/output`; every test
//! case then runs through `docker exec`.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use tracing::{info, instrument, warn};

use super::RunnerError;

/// Mount point of the corpus root inside the container.
pub const CONTAINER_INPUT: &str = "/app/input";
/// Mount point of the output root inside the container.
pub const CONTAINER_OUTPUT: &str = "/app/output";

/// How to start the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container runtime executable, normally `docker`.
    pub runtime: PathBuf,
    /// Arguments placed before every runtime subcommand, e.g. `docker` when
    /// the runtime is `sudo`.
    pub runtime_args: Vec<String>,
    /// Container name; a stale container of this name is removed first.
    pub name: String,
    /// Image providing the comparison program.
    pub image: String,
    /// Host corpus root, mounted read-only.
    pub input_root: PathBuf,
    /// Host output root, mounted read-write.
    pub output_root: PathBuf,
}

/// Handle to a running container.
///
/// [`ContainerSession::stop`] removes the container and reports failures;
/// dropping a session that was not stopped removes it on a best-effort basis.
#[derive(Debug)]
pub struct ContainerSession {
    runtime: Runtime,
    name: String,
    running: bool,
}

impl ContainerSession {
    /// Removes any stale container called `spec.name` and starts a fresh
    /// detached one.
    ///
    /// # Errors
    /// Returns [`RunnerError::RuntimeLaunch`] when the runtime cannot be
    /// executed and [`RunnerError::Container`] when it rejects the request.
    #[instrument(
        name = "runner.container_start",
        err,
        skip(spec),
        fields(name = %spec.name, image = %spec.image),
    )]
    pub fn start(spec: &ContainerSpec) -> Result<Self, RunnerError> {
        let runtime = Runtime {
            program: spec.runtime.clone(),
            args: spec.runtime_args.clone(),
        };
        // A missing stale container makes `rm` fail, which is expected.
        let stale = runtime.remove(&spec.name)?;
        if stale.status.success() {
            info!(name = %spec.name, "removed stale container");
        }

        let mut command = runtime.command();
        command
            .args(["run", "-d", "--name", &spec.name, "-v"])
            .arg(mount(&spec.input_root, CONTAINER_INPUT, true))
            .arg("-v")
            .arg(mount(&spec.output_root, CONTAINER_OUTPUT, false))
            .args(["--entrypoint", "tail", &spec.image, "-f", "/dev/null"]);
        let output = runtime.capture(&mut command)?;
        if !output.status.success() {
            return Err(RunnerError::Container {
                action: "start",
                name: spec.name.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        info!(name = %spec.name, "container started");
        Ok(Self {
            runtime,
            name: spec.name.clone(),
            running: true,
        })
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A `docker exec` command running `program` inside the container.
    pub fn exec<I, S>(&self, program: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut command = self.runtime.command();
        command.arg("exec").arg(&self.name);
        command.args(program.into_iter().map(Into::into));
        command
    }

    /// Removes the container.
    ///
    /// # Errors
    /// Returns [`RunnerError::RuntimeLaunch`] or [`RunnerError::Container`]
    /// when removal fails.
    #[instrument(name = "runner.container_stop", err, skip(self), fields(name = %self.name))]
    pub fn stop(mut self) -> Result<(), RunnerError> {
        self.running = false;
        let output = self.runtime.remove(&self.name)?;
        if !output.status.success() {
            return Err(RunnerError::Container {
                action: "stop",
                name: self.name.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        info!(name = %self.name, "container stopped");
        Ok(())
    }
}

impl Drop for ContainerSession {
    fn drop(&mut self) {
        if !self.running {
            return;
        }
        match self.runtime.remove(&self.name) {
            Ok(output) if output.status.success() => {
                info!(name = %self.name, "container removed on drop");
            }
            Ok(output) => warn!(
                name = %self.name,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "failed to remove container on drop"
            ),
            Err(err) => warn!(name = %self.name, error = %err, "failed to remove container on drop"),
        }
    }
}

fn mount(host: &Path, target: &str, read_only: bool) -> OsString {
    let mut spec = OsString::from(host.as_os_str());
    spec.push(":");
    spec.push(target);
    if read_only {
        spec.push(":ro");
    }
    spec
}

#[derive(Debug)]
struct Runtime {
    program: PathBuf,
    args: Vec<String>,
}

impl Runtime {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    fn remove(&self, name: &str) -> Result<Output, RunnerError> {
        self.capture(self.command().args(["rm", "-f", name]))
    }

    fn capture(&self, command: &mut Command) -> Result<Output, RunnerError> {
        command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::RuntimeLaunch {
                runtime: self.program.clone(),
                source,
            })
    }
}
