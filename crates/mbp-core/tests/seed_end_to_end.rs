// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use mbp_core::{GitHostSettings, SeedError, SeedPlan, TemplateSet, seed};
use mbp_credentials::{Credential, StaticCredentialStore};
use mbp_domain_types::{JobOutcome, TeamProject};
use mbp_jenkins::{JenkinsClient, JenkinsFolder};
use mbp_rest_client::{AuthConfig, RestClient};
use mbp_test_utils::{FakeJenkins, FakeRepo, FakeTfs};

const PROJECT_PATH: &str = "/tfs/Coll/Payments";

fn store() -> StaticCredentialStore {
    StaticCredentialStore::new(vec![Credential::new("tfs-reader", "svc-seeder", "pat-123")])
}

fn settings() -> GitHostSettings {
    GitHostSettings {
        credentials_id: "tfs-reader".into(),
        ..GitHostSettings::default()
    }
}

fn folder(jenkins_url: &str, path: &str) -> JenkinsFolder {
    JenkinsClient::new(jenkins_url, RestClient::new(AuthConfig::None).expect("client"))
        .expect("jenkins url")
        .folder(path)
}

fn plan(project_url: &str) -> SeedPlan {
    SeedPlan::new(TeamProject::parse(project_url).expect("project url"), "tfs-cred")
}

fn svc_a_project() -> FakeTfs {
    FakeTfs::new(PROJECT_PATH)
        .require_basic_auth("svc-seeder", "pat-123")
        .repo(
            FakeRepo::new("1", "svc-a")
                .branch("main", &["/Jenkinsfile"])
                .branch("dev", &[]),
        )
}

#[tokio::test]
async fn seeds_svc_a_once_and_schedules_it() {
    let (tfs, project_url) = svc_a_project().spawn().await;
    let jenkins = FakeJenkins::new().folder("Payments");
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");

    let mut plan = plan(&project_url);
    plan.materialize.run_pipelines = true;
    let report = seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan)
        .await
        .expect("seed");

    assert_eq!(report.jobs.len(), 1);
    assert_eq!(report.jobs[0].job_name, "svc-a");
    assert!(matches!(
        report.jobs[0].outcome,
        JobOutcome::Created { scheduled: true, .. }
    ));

    let config = jenkins.job_config("Payments", "svc-a").expect("job created");
    assert!(config.contains(&format!("<remote>{}/_git/svc-a</remote>", project_url)));
    assert!(config.contains("<credentialsId>tfs-cred</credentialsId>"));
    let guid = report.jobs[0].unique_id.expect("guid recorded").to_string();
    assert!(config.contains(&format!("<id>{}</id>", guid)));
    assert_eq!(jenkins.builds(), ["Payments/svc-a"]);

    // main matched, so dev is never probed
    let probes = tfs.requests().matching("GET", "/items");
    assert!(probes.iter().all(|r| r.query_param("version").as_deref() != Some("dev")));
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let (_tfs, project_url) = svc_a_project().spawn().await;
    let jenkins = FakeJenkins::new().folder("Payments");
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");
    let plan = plan(&project_url);

    seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan)
        .await
        .expect("first run");
    let before = jenkins.jobs();

    let report = seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan)
        .await
        .expect("second run");

    assert_eq!(report.jobs[0].outcome, JobOutcome::Exists);
    assert_eq!(report.created(), 0);
    assert_eq!(jenkins.jobs(), before);
    assert_eq!(jenkins_server.requests().count("POST", "/createItem"), 1);
}

#[tokio::test]
async fn missing_folder_stops_before_touching_the_git_host() {
    let (tfs, project_url) = svc_a_project().spawn().await;
    let jenkins = FakeJenkins::new();
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");

    let err = seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan(&project_url))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::TargetContainerMissing { ref container } if container == "Payments"));
    assert!(err.to_string().contains("Please make a folder for the Payments team project"));
    assert!(tfs.requests().all().is_empty());
    assert!(jenkins.jobs().is_empty());
}

#[tokio::test]
async fn ad_hoc_files_on_the_default_branch_become_pipeline_jobs() {
    let (_tfs, project_url) = FakeTfs::new(PROJECT_PATH)
        .repo(FakeRepo::new("1", "svc-a").branch(
            "master",
            &["/Jenkinsfile", "/deploy.Jenkinsfile", "/README.md"],
        ))
        .spawn()
        .await;
    let jenkins = FakeJenkins::new().folder("Payments");
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");

    let mut plan = plan(&project_url);
    plan.materialize.run_pipelines = true;
    let report = seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan)
        .await
        .expect("seed");

    let names: Vec<_> = report.jobs.iter().map(|j| j.job_name.as_str()).collect();
    assert_eq!(names, ["svc-a", "svc-a deploy"]);

    let config = jenkins.job_config("Payments", "svc-a deploy").expect("ad hoc job");
    assert!(config.contains("<scriptPath>deploy.Jenkinsfile</scriptPath>"));
    assert!(config.contains("<name>*/master</name>"));
    // only the multibranch job is scheduled
    assert_eq!(jenkins.builds(), ["Payments/svc-a"]);
}

#[tokio::test]
async fn wrong_git_host_credentials_abort_the_run() {
    let (_tfs, project_url) = svc_a_project().spawn().await;
    let jenkins = FakeJenkins::new().folder("Payments");
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");
    let wrong = StaticCredentialStore::new(vec![Credential::new("tfs-reader", "svc-seeder", "stale")]);

    let err = seed(&wrong, &settings(), &target, &TemplateSet::builtin(), &plan(&project_url))
        .await
        .unwrap_err();

    assert!(matches!(err, SeedError::Discovery(_)));
    assert!(jenkins.jobs().is_empty());
}

#[tokio::test]
async fn rejected_job_does_not_stop_the_others() {
    let (_tfs, project_url) = FakeTfs::new(PROJECT_PATH)
        .repo(FakeRepo::new("1", "svc-a").branch("main", &["/Jenkinsfile"]))
        .repo(FakeRepo::new("2", "svc-b").branch("main", &["/Jenkinsfile"]))
        .spawn()
        .await;
    let jenkins = FakeJenkins::new().folder("Payments").reject_create("svc-a");
    let jenkins_server = jenkins.spawn().await;
    let target = folder(jenkins_server.base_url(), "Payments");

    let report = seed(&store(), &settings(), &target, &TemplateSet::builtin(), &plan(&project_url))
        .await
        .expect("seed");

    let svc_a = report.jobs.iter().find(|j| j.job_name == "svc-a").expect("svc-a");
    assert!(matches!(svc_a.outcome, JobOutcome::CreateFailed { .. }));
    let svc_b = report.jobs.iter().find(|j| j.job_name == "svc-b").expect("svc-b");
    assert!(matches!(svc_b.outcome, JobOutcome::Created { .. }));
    assert!(report.has_failures());
    assert_eq!(report.created(), 1);
    assert!(jenkins.job_config("Payments", "svc-b").is_some());
}
