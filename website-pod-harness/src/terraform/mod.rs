//! Terraform invocation: running the provisioning engine against a module
//! directory and retrieving its JSON outputs.
//!
//! The engine owns all mutation and rollback behavior; this layer only
//! shells out, checks exit status, and parses `terraform output -json`.

pub mod tfvars;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{HarnessError, HarnessResult};

pub use tfvars::{TfValue, TfVars};

/// Runs terraform commands inside one module directory.
pub struct TerraformRunner {
    module_dir: PathBuf,
    trace: bool,
}

impl TerraformRunner {
    pub fn new(module_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            trace: false,
        }
    }

    /// Forward `TF_LOG=TRACE` to the engine.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Write a parameter file into the module directory. Terraform picks
    /// `terraform.tfvars` up automatically on the next apply.
    pub fn write_tfvars(&self, vars: &TfVars) -> HarnessResult<PathBuf> {
        let path = self.module_dir.join("terraform.tfvars");
        std::fs::write(&path, vars.render())?;
        Ok(path)
    }

    pub async fn init(&self) -> HarnessResult<()> {
        self.run(&["init", "-no-color", "-input=false"]).await?;
        Ok(())
    }

    /// `terraform init` followed by a non-interactive apply. A non-zero
    /// exit from the engine is fatal to the caller.
    pub async fn apply(&self) -> HarnessResult<()> {
        self.init().await?;
        info!("Applying terraform module in {}", self.module_dir.display());
        self.run(&["apply", "-auto-approve", "-no-color", "-input=false"])
            .await?;
        Ok(())
    }

    pub async fn destroy(&self) -> HarnessResult<()> {
        info!(
            "Destroying terraform module in {}",
            self.module_dir.display()
        );
        self.run(&["destroy", "-auto-approve", "-no-color", "-input=false"])
            .await?;
        Ok(())
    }

    /// Fetch and parse the module's outputs.
    pub async fn output(&self) -> HarnessResult<TerraformOutputs> {
        let output = self.run(&["output", "-no-color", "-json"]).await?;
        TerraformOutputs::from_json(&output.stdout)
    }

    async fn run(&self, args: &[&str]) -> HarnessResult<std::process::Output> {
        debug!(
            "Running terraform {} in {}",
            args.join(" "),
            self.module_dir.display()
        );
        let mut command = Command::new("terraform");
        command
            .args(args)
            .current_dir(&self.module_dir)
            .stdin(Stdio::null());
        if self.trace {
            command.env("TF_LOG", "TRACE");
        }

        let output = command.output().await?;
        if !output.status.success() {
            return Err(HarnessError::Terraform {
                command: format!("terraform {}", args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

/// One named value from `terraform output -json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputValue {
    pub value: serde_json::Value,
    #[serde(default)]
    pub sensitive: bool,
}

/// Parsed outputs of an applied module, keyed by output name.
#[derive(Debug, Clone, Default)]
pub struct TerraformOutputs(BTreeMap<String, OutputValue>);

impl TerraformOutputs {
    pub fn from_json(bytes: &[u8]) -> HarnessResult<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn as_map(&self) -> &BTreeMap<String, OutputValue> {
        &self.0
    }

    fn get(&self, name: &str) -> HarnessResult<&OutputValue> {
        self.0
            .get(name)
            .ok_or_else(|| HarnessError::MissingOutput(name.to_string()))
    }

    /// A string-typed output. Missing or differently-typed outputs are
    /// explicit errors.
    pub fn str(&self, name: &str) -> HarnessResult<&str> {
        self.get(name)?
            .value
            .as_str()
            .ok_or_else(|| HarnessError::OutputType {
                name: name.to_string(),
                expected: "string",
            })
    }

    /// A list-of-strings output.
    pub fn str_list(&self, name: &str) -> HarnessResult<Vec<String>> {
        self.get(name)?
            .value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect()
            })
            .ok_or_else(|| HarnessError::OutputType {
                name: name.to_string(),
                expected: "list of strings",
            })
    }
}

/// An applied module plus its outputs, with optional teardown, mirroring
/// the apply/yield/destroy flow the test scenarios follow.
pub struct Deployment {
    runner: TerraformRunner,
    outputs: TerraformOutputs,
    destroy_after: bool,
}

impl Deployment {
    /// Apply the module and capture its outputs.
    pub async fn apply(runner: TerraformRunner, destroy_after: bool) -> HarnessResult<Self> {
        runner.apply().await?;
        let outputs = runner.output().await?;
        Ok(Self {
            runner,
            outputs,
            destroy_after,
        })
    }

    pub fn outputs(&self) -> &TerraformOutputs {
        &self.outputs
    }

    pub fn runner(&self) -> &TerraformRunner {
        &self.runner
    }

    /// Tear the deployment down if it was applied with `destroy_after`.
    pub async fn finish(self) -> HarnessResult<()> {
        if self.destroy_after {
            self.runner.destroy().await?;
        }
        Ok(())
    }
}
