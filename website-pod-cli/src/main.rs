//! `website-pod` command-line interface.
//!
//! Wraps the harness library for use from shells and CI: apply/destroy
//! the Terraform module with an assembled parameter file, read outputs,
//! wait for instance-refresh convergence, and run the verification
//! checks against the live account.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use log::info;

use website_pod_harness::{
    wait_for_instance_refresh, LoadBalancerExpectations, TerraformRunner, TfValue, TfVars,
    WebsitePod,
};

#[derive(Parser)]
#[command(name = "website-pod", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a tfvars file and apply the module, printing outputs as JSON
    Apply {
        /// Terraform module directory
        #[arg(long)]
        module_dir: PathBuf,
        /// Parameter as key=value; a value starting with '[' is parsed as
        /// a JSON list of strings
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, TfValue)>,
        /// Forward TF_LOG=TRACE to terraform
        #[arg(long)]
        trace: bool,
    },
    /// Destroy the module
    Destroy {
        #[arg(long)]
        module_dir: PathBuf,
        #[arg(long)]
        trace: bool,
    },
    /// Print the module outputs as JSON
    Output {
        #[arg(long)]
        module_dir: PathBuf,
        /// Print a single string output instead of the whole map
        #[arg(long)]
        name: Option<String>,
    },
    /// Wait until no instance refresh against the group is in flight
    WaitRefresh {
        /// Auto-scaling group name
        #[arg(long, env = "WEBSITE_POD_ASG_NAME")]
        group: String,
        /// Seconds between status polls
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        /// Overall deadline in seconds; without it the wait is unbounded
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Verify the zone's A/CNAME records
    VerifyDns {
        #[arg(long, env = "WEBSITE_POD_TEST_ZONE")]
        zone: String,
        /// Record labels expected besides the zone apex
        #[arg(long = "record")]
        records: Vec<String>,
    },
    /// Verify the pod's CloudWatch alarms exist
    VerifyAlarms {
        /// Alarm names, typically taken from the module outputs
        #[arg(long = "alarm", required = true)]
        alarms: Vec<String>,
    },
    /// Verify the pod's load balancer
    VerifyLb {
        #[arg(long, default_value = "internet-facing")]
        scheme: String,
        #[arg(long, default_value_t = 3)]
        availability_zones: usize,
        #[arg(long, default_value_t = 2)]
        listeners: usize,
        #[arg(long, default_value_t = 3)]
        healthy_targets: usize,
    },
}

fn parse_var(s: &str) -> Result<(String, TfValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in {s:?}"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in {s:?}"));
    }
    let value = if value.starts_with('[') {
        let items: Vec<String> =
            serde_json::from_str(value).map_err(|e| format!("invalid list value {value:?}: {e}"))?;
        TfValue::List(items)
    } else {
        TfValue::Str(value.to_string())
    };
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply {
            module_dir,
            vars,
            trace,
        } => {
            let runner = TerraformRunner::new(module_dir).with_trace(trace);
            let mut tfvars = TfVars::new();
            for (key, value) in vars {
                tfvars = tfvars.set(key, value);
            }
            if !tfvars.is_empty() {
                runner.write_tfvars(&tfvars)?;
            }
            runner.apply().await?;
            let outputs = runner.output().await?;
            println!("{}", serde_json::to_string_pretty(outputs.as_map())?);
        }
        Command::Destroy { module_dir, trace } => {
            TerraformRunner::new(module_dir)
                .with_trace(trace)
                .destroy()
                .await?;
        }
        Command::Output { module_dir, name } => {
            let outputs = TerraformRunner::new(module_dir).output().await?;
            match name {
                Some(name) => println!("{}", outputs.str(&name)?),
                None => println!("{}", serde_json::to_string_pretty(outputs.as_map())?),
            }
        }
        Command::WaitRefresh {
            group,
            interval_secs,
            timeout_secs,
        } => {
            let pod = WebsitePod::new()
                .await
                .context("Failed to initialize AWS clients")?;
            let wait = wait_for_instance_refresh(
                pod.scaling(),
                &group,
                Duration::from_secs(interval_secs),
            );
            match timeout_secs {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), wait)
                    .await
                    .map_err(|_| {
                        anyhow!("instance refresh in {group:?} did not settle within {secs}s")
                    })??,
                None => wait.await?,
            }
            info!("{group} has no instance refresh in flight");
        }
        Command::VerifyDns { zone, records } => {
            let pod = WebsitePod::new()
                .await
                .context("Failed to initialize AWS clients")?;
            pod.verify_dns_records(&zone, &records).await?;
            info!("all expected records present in {zone}");
        }
        Command::VerifyAlarms { alarms } => {
            let pod = WebsitePod::new()
                .await
                .context("Failed to initialize AWS clients")?;
            pod.verify_alarms(&alarms).await?;
            info!("all {} alarm(s) exist", alarms.len());
        }
        Command::VerifyLb {
            scheme,
            availability_zones,
            listeners,
            healthy_targets,
        } => {
            let pod = WebsitePod::new()
                .await
                .context("Failed to initialize AWS clients")?;
            pod.verify_load_balancer(&LoadBalancerExpectations {
                scheme,
                availability_zones,
                listeners,
                healthy_targets,
            })
            .await?;
            info!("load balancer matches expectations");
        }
    }
    Ok(())
}
