//! Live integration suite for the website pod Terraform module.
//!
//! Applies the real modules under `test_data/` against the AWS account
//! selected by the default credential chain, then verifies the
//! provisioned resources. Enabled with the `live-tests` feature:
//!
//! ```bash
//! cargo test -p website-pod-harness --features live-tests --test live_pod -- --nocapture
//! ```
//!
//! Environment knobs: `WEBSITE_POD_TEST_ZONE`, `WEBSITE_POD_REGION`,
//! `WEBSITE_POD_ROLE_ARN`, `WEBSITE_POD_KEEP_AFTER`,
//! `WEBSITE_POD_TRACE_TERRAFORM`.

#![cfg(feature = "live-tests")]

use std::env;
use std::time::Duration;

use serial_test::serial;

use website_pod_harness::{
    Deployment, HarnessResult, LoadBalancerExpectations, TerraformRunner, TfValue, TfVars,
    WebsitePod,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(3600);
const UBUNTU_CODENAME: &str = "jammy";
const TERRAFORM_ROOT_DIR: &str = "test_data";

fn test_zone() -> String {
    env::var("WEBSITE_POD_TEST_ZONE").unwrap_or_else(|_| "ci-cd.infrahouse.com".to_string())
}

fn aws_region() -> String {
    env::var("WEBSITE_POD_REGION").unwrap_or_else(|_| "us-west-1".to_string())
}

fn test_role_arn() -> Option<String> {
    env::var("WEBSITE_POD_ROLE_ARN").ok()
}

fn keep_after() -> bool {
    env::var("WEBSITE_POD_KEEP_AFTER").is_ok()
}

fn trace_terraform() -> bool {
    env::var("WEBSITE_POD_TRACE_TERRAFORM").is_ok()
}

fn runner(module: &str) -> TerraformRunner {
    TerraformRunner::new(format!("{TERRAFORM_ROOT_DIR}/{module}")).with_trace(trace_terraform())
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn base_vars() -> TfVars {
    let mut vars = TfVars::new()
        .set("region", aws_region())
        .set("dns_zone", test_zone())
        .set("ubuntu_codename", UBUNTU_CODENAME)
        .set(
            "tags",
            TfValue::Map(vec![("Name".to_string(), "foo-app".to_string())]),
        );
    if let Some(role_arn) = test_role_arn() {
        vars = vars.set("role_arn", role_arn);
    }
    vars
}

/// Shared network the pod modules attach to.
async fn service_network() -> HarnessResult<Deployment> {
    let network = runner("service_network");
    network.write_tfvars(&TfVars::new().set("region", aws_region()))?;
    Deployment::apply(network, false).await
}

async fn run_create_lb(lb_subnets_output: &str, expected_scheme: &str) -> HarnessResult<()> {
    let network = service_network().await?;
    let subnet_private_ids = network.outputs().str_list("subnet_private_ids")?;
    let lb_subnet_ids = network.outputs().str_list(lb_subnets_output)?;
    let internet_gateway_id = network.outputs().str("internet_gateway_id")?.to_string();

    let module = runner("test_create_lb");
    module.write_tfvars(
        &base_vars()
            .set("lb_subnet_ids", lb_subnet_ids)
            .set("backend_subnet_ids", subnet_private_ids)
            .set("internet_gateway_id", internet_gateway_id),
    )?;

    let deployment = Deployment::apply(module, !keep_after()).await?;
    let outputs = deployment.outputs();
    assert_eq!(outputs.str_list("network_subnet_private_ids")?.len(), 3);
    assert_eq!(outputs.str_list("network_subnet_public_ids")?.len(), 3);

    let pod = WebsitePod::new().await?;
    let zone = test_zone();

    pod.verify_dns_records(&zone, &["bogus-test-stuff".to_string(), "www".to_string()])
        .await?;

    let vpc_count = pod.compute().vpc_count_with_cidr("10.1.0.0/16").await?;
    assert_eq!(vpc_count, 1, "unexpected number of VPCs: {vpc_count}");

    pod.verify_load_balancer(&LoadBalancerExpectations {
        scheme: expected_scheme.to_string(),
        ..LoadBalancerExpectations::default()
    })
    .await?;

    if expected_scheme == "internet-facing" {
        for label in ["bogus-test-stuff", "www"] {
            let response = website_pod_harness::fetch(&format!("{label}.{zone}"), false).await?;
            assert!(
                response.is_ok() && response.body == "Success Message\r\n",
                "unsuccessful HTTP response from {label}.{zone}: {} {:?}",
                response.status,
                response.body
            );
        }
        // The raw LB name is not covered by the certificate and the
        // default listener rule answers 400.
        let lb_dns_name = outputs.str("load_balancer_dns_name")?;
        let response = website_pod_harness::fetch(lb_dns_name, true).await?;
        assert_eq!(response.status, 400);
    }

    let asg_name = outputs.str("asg_name")?.to_string();
    pod.wait_until_stable(&asg_name).await?;

    let tags = pod.healthy_instance_tags(&asg_name).await?;
    assert_eq!(
        tags.get("Name").map(String::as_str),
        Some("foo-app"),
        "instance's Name tag should be set to foo-app: {tags:?}"
    );

    deployment.finish().await?;

    if !keep_after() {
        pod.verify_no_leaked_volumes().await?;
    }
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_lb_public_subnets() {
    init_logging();
    tokio::time::timeout(TEST_TIMEOUT, run_create_lb("subnet_public_ids", "internet-facing"))
        .await
        .expect("test timed out")
        .expect("create-lb scenario failed");
}

#[tokio::test]
#[serial]
async fn test_lb_private_subnets() {
    init_logging();
    tokio::time::timeout(TEST_TIMEOUT, run_create_lb("subnet_private_ids", "internal"))
        .await
        .expect("test timed out")
        .expect("create-lb scenario failed");
}

#[tokio::test]
#[serial]
async fn test_asg_name() {
    init_logging();
    let scenario = async {
        let module = runner("test_create_lb");
        module.write_tfvars(&base_vars().set("asg_name", "foo-asg"))?;
        let deployment = Deployment::apply(module, !keep_after()).await?;
        assert_eq!(deployment.outputs().str("asg_name")?, "foo-asg");
        deployment.finish().await
    };
    tokio::time::timeout(TEST_TIMEOUT, scenario)
        .await
        .expect("test timed out")
        .expect("asg-name scenario failed");
}

#[tokio::test]
#[serial]
async fn test_spot() {
    init_logging();
    let scenario = async {
        let network = service_network().await?;
        let module = runner("test_spot");
        module.write_tfvars(
            &TfVars::new()
                .set("region", aws_region())
                .set("dns_zone", test_zone())
                .set("ubuntu_codename", UBUNTU_CODENAME)
                .set(
                    "lb_subnet_ids",
                    network.outputs().str_list("subnet_public_ids")?,
                )
                .set(
                    "backend_subnet_ids",
                    network.outputs().str_list("subnet_private_ids")?,
                )
                .set(
                    "internet_gateway_id",
                    network.outputs().str("internet_gateway_id")?.to_string(),
                ),
        )?;
        let deployment = Deployment::apply(module, !keep_after()).await?;

        let pod = WebsitePod::new().await?;
        let asg_name = deployment.outputs().str("asg_name")?.to_string();
        pod.wait_until_stable(&asg_name).await?;
        // Spot pool converges to two healthy members.
        pod.verify_in_service_count(&asg_name, 2).await?;

        deployment.finish().await
    };
    tokio::time::timeout(TEST_TIMEOUT, scenario)
        .await
        .expect("test timed out")
        .expect("spot scenario failed");
}

#[tokio::test]
#[serial]
async fn test_mtls() {
    init_logging();
    let scenario = async {
        let network = service_network().await?;
        let module = runner("test_mtls");
        let mut vars = TfVars::new()
            .set("region", aws_region())
            .set("dns_zone", test_zone())
            .set("ubuntu_codename", UBUNTU_CODENAME)
            .set(
                "lb_subnet_ids",
                network.outputs().str_list("subnet_public_ids")?,
            )
            .set(
                "backend_subnet_ids",
                network.outputs().str_list("subnet_private_ids")?,
            )
            .set(
                "internet_gateway_id",
                network.outputs().str("internet_gateway_id")?.to_string(),
            );
        if let Some(role_arn) = test_role_arn() {
            vars = vars.set("role_arn", role_arn);
        }
        module.write_tfvars(&vars)?;
        let deployment = Deployment::apply(module, !keep_after()).await?;

        // The module must surface the client certificate material.
        assert!(!deployment.outputs().str("private_key_pem")?.is_empty());
        assert!(!deployment.outputs().str("tls_self_signed_cert")?.is_empty());

        deployment.finish().await
    };
    tokio::time::timeout(TEST_TIMEOUT, scenario)
        .await
        .expect("test timed out")
        .expect("mtls scenario failed");
}

#[tokio::test]
#[serial]
async fn test_instance_profile() {
    init_logging();
    let scenario = async {
        let profile_module = runner("instance_profile");
        let mut profile_vars = TfVars::new().set("region", aws_region());
        if let Some(role_arn) = test_role_arn() {
            profile_vars = profile_vars.set("role_arn", role_arn);
        }
        profile_module.write_tfvars(&profile_vars)?;
        let profile = Deployment::apply(profile_module, !keep_after()).await?;
        let profile_name = profile.outputs().str("instance_profile_name")?.to_string();
        let profile_arn = profile.outputs().str("instance_profile_arn")?.to_string();

        let network = service_network().await?;
        let module = runner("test_create_lb");
        module.write_tfvars(
            &base_vars()
                .set("instance_profile_name", profile_name)
                .set(
                    "lb_subnet_ids",
                    network.outputs().str_list("subnet_public_ids")?,
                )
                .set(
                    "backend_subnet_ids",
                    network.outputs().str_list("subnet_private_ids")?,
                )
                .set(
                    "internet_gateway_id",
                    network.outputs().str("internet_gateway_id")?.to_string(),
                ),
        )?;
        let deployment = Deployment::apply(module, !keep_after()).await?;

        let pod = WebsitePod::new().await?;
        let asg_name = deployment.outputs().str("asg_name")?.to_string();
        pod.wait_until_stable(&asg_name).await?;
        pod.verify_instance_profile(&asg_name, &profile_arn).await?;

        deployment.finish().await?;
        profile.finish().await
    };
    tokio::time::timeout(TEST_TIMEOUT, scenario)
        .await
        .expect("test timed out")
        .expect("instance-profile scenario failed");
}

#[tokio::test]
#[serial]
async fn test_update_dns() {
    init_logging();
    let scenario = async {
        let module = runner("test_create_lb");
        module.write_tfvars(&base_vars())?;
        let deployment = Deployment::apply(module, false).await?;
        assert_eq!(
            deployment
                .outputs()
                .str_list("network_subnet_private_ids")?
                .len(),
            3
        );

        // Second apply with changed records must succeed on the same state.
        deployment.runner().write_tfvars(
            &base_vars().set(
                "dns_a_records",
                vec![String::new(), "www".to_string()],
            ),
        )?;
        deployment.runner().apply().await?;

        if !keep_after() {
            deployment.runner().destroy().await?;
        }
        Ok::<_, website_pod_harness::HarnessError>(())
    };
    tokio::time::timeout(TEST_TIMEOUT, scenario)
        .await
        .expect("test timed out")
        .expect("update-dns scenario failed");
}
