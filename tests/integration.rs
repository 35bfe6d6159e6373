mod common;

use anyhow::Result;
use common::{Recorder, config, layout};
use extra_aliases::{AliasError, ExtraAliases, Ingress, Mode, Shell};
use std::fs;

#[test]
fn create_with_defaults() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::Live);

    ExtraAliases::run(&config(&["test", "", "", "", ""])?, &layout, &shell)?;

    let calls = recorder.calls();
    assert!(!calls.iter().any(|c| c.contains("netplan apply")));
    assert!(!calls.iter().any(|c| c.contains("systemctl")));
    assert_eq!(calls.iter().filter(|c| c.starts_with("kubectl apply")).count(), 3);
    assert_eq!(fs::read_dir(&layout.netplan_dir)?.count(), 0);
    assert_eq!(fs::read_dir(layout.nginx_dir.join("sites-available"))?.count(), 0);
    Ok(())
}

#[test]
fn create_with_port() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::Live);

    ExtraAliases::run(&config(&["test", "", "8080"])?, &layout, &shell)?;

    let site = layout.nginx_dir.join("sites-available").join("10.0.0.5-8080");
    let content = fs::read_to_string(site)?;
    assert!(content.contains("listen 8080;"));
    assert!(content.contains("proxy_pass http://127.0.0.1:80;"));
    assert!(content.contains("proxy_set_header Host http://test.miniops.me;"));
    assert_eq!(fs::read_dir(&layout.netplan_dir)?.count(), 0);
    Ok(())
}

#[test]
fn create_with_new_ip() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::Live);

    ExtraAliases::run(&config(&["test", "", "", "10.0.0.99"])?, &layout, &shell)?;

    let content = fs::read_to_string(layout.netplan_dir.join("50-10.0.0.99.yaml"))?;
    assert!(content.contains("ens3:"));
    assert!(content.contains("- 10.0.0.99/24"));
    assert!(recorder.calls().iter().any(|c| c == "sudo netplan apply"));
    Ok(())
}

#[test]
fn create_then_delete_addresses_same_artifacts() -> Result<()> {
    let (_d, layout) = layout()?;
    let args = ["devel", "devel.example.com", "8080", "10.0.0.99"];

    let create = Recorder::default();
    ExtraAliases::run(&config(&args)?, &layout, &create.shell(Mode::Live))?;

    let mut delete_args = args.to_vec();
    delete_args.push("yes");
    let delete = Recorder::default();
    ExtraAliases::run(&config(&delete_args)?, &layout, &delete.shell(Mode::Live))?;

    let calls = delete.calls();
    let site = layout
        .nginx_dir
        .join("sites-available")
        .join("devel.example.com-8080");
    assert!(calls.contains(&format!("sudo rm {}", site.display())));
    let alias = layout.netplan_dir.join("50-10.0.0.99.yaml");
    assert!(calls.contains(&format!("sudo rm {}", alias.display())));
    for suffix in ["apihost-api-ingress", "apihost-my-api-ingress", "static-ingress"] {
        let name = format!("alias-devel-example-com-8080-devel-{}", suffix);
        assert!(calls.contains(&format!("kubectl delete ingress {} -n nuvolaris", name)));
    }
    // Deletion never runs the preflight checks
    assert!(!calls.iter().any(|c| c.starts_with("which")));
    Ok(())
}

#[test]
fn preflight_failure_prevents_mutation() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::failing("which netplan");
    let shell = recorder.shell(Mode::Live);

    let err = ExtraAliases::run(&config(&["test", "", "8080", "10.0.0.99"])?, &layout, &shell)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AliasError>(),
        Some(AliasError::Preflight(_))
    ));
    assert!(!recorder.calls().iter().any(|c| !Shell::is_read_only(c)));
    assert_eq!(fs::read_dir(&layout.netplan_dir)?.count(), 0);
    Ok(())
}

#[test]
fn dry_run_never_mutates() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::DryRun);

    ExtraAliases::run(
        &config(&["devel", "devel.example.com", "8080", "10.0.0.99"])?,
        &layout,
        &shell,
    )?;

    assert!(recorder.calls().iter().all(|c| Shell::is_read_only(c)));
    assert_eq!(fs::read_dir(&layout.netplan_dir)?.count(), 0);
    assert_eq!(fs::read_dir(layout.nginx_dir.join("sites-available"))?.count(), 0);
    assert_eq!(fs::read_dir(layout.nginx_dir.join("sites-enabled"))?.count(), 0);

    // Only the scratch manifests are written
    let manifest = layout
        .scratch_dir
        .join("alias-devel-example-com-8080-devel-static-ingress.yaml");
    let ingress = Ingress::from_yaml(&fs::read_to_string(manifest)?)?;
    assert_eq!(
        ingress.metadata.name,
        "alias-devel-example-com-8080-devel-static-ingress"
    );
    assert_eq!(
        ingress.spec.rules[0].host.as_deref(),
        Some("devel.example.com")
    );
    assert!(ingress.status.is_none());
    assert!(ingress.metadata.uid.is_none());
    assert!(ingress.metadata.resource_version.is_none());
    assert!(ingress.metadata.generation.is_none());
    assert!(ingress.metadata.creation_timestamp.is_none());
    assert!(ingress.metadata.annotations.is_none());
    Ok(())
}

#[test]
fn dry_run_aborts_on_failed_read() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::failing("kubectl get cm");
    let shell = recorder.shell(Mode::DryRun);

    let err = ExtraAliases::run(&config(&["devel"])?, &layout, &shell).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AliasError>(),
        Some(AliasError::DryRunRead { .. })
    ));
    assert!(!recorder.calls().iter().any(|c| c.starts_with("kubectl get ingress")));
    Ok(())
}

#[test]
fn padded_user_matches_ingress_names() -> Result<()> {
    let (_d, layout) = layout()?;
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::Live);

    ExtraAliases::run(&config(&[" devel ", "", "8080"])?, &layout, &shell)?;

    let site = layout.nginx_dir.join("sites-available").join("10.0.0.5-8080");
    assert!(fs::read_to_string(site)?.contains("proxy_set_header Host http://devel.miniops.me;"));
    assert!(
        recorder
            .calls()
            .contains(&"kubectl get ingress devel-static-ingress -n nuvolaris -o yaml".to_string())
    );
    Ok(())
}

#[test]
fn injected_user_is_rejected_before_any_command() -> Result<()> {
    let (d, layout) = layout()?;
    let marker = d.path().join("marker");
    let user = format!("x; touch {} #", marker.display());
    let recorder = Recorder::default();
    let shell = recorder.shell(Mode::DryRun);

    let err = ExtraAliases::run(&config(&[&user])?, &layout, &shell).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AliasError>(),
        Some(AliasError::Input(_))
    ));
    assert!(!recorder.calls().iter().any(|c| c.contains("touch")));
    assert!(!marker.exists());
    Ok(())
}
