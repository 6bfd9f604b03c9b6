use nix::errno::Errno;
use parentns_core::*;

#[test]
fn test_process_id_parsing() {
    // Valid PIDs
    assert!("1".parse::<ProcessId>().is_ok());
    assert!("4242".parse::<ProcessId>().is_ok());
    assert!(" 4242 ".parse::<ProcessId>().is_ok());
    assert!("2147483647".parse::<ProcessId>().is_ok());

    // Invalid PIDs
    assert!("0".parse::<ProcessId>().is_err());
    assert!("-1".parse::<ProcessId>().is_err());
    assert!("2147483648".parse::<ProcessId>().is_err());
    assert!("12abc".parse::<ProcessId>().is_err());
}

#[test]
fn test_current_process_id() {
    let pid = ProcessId::current();
    assert!(pid.as_raw() > 0);
    assert_eq!(pid.user_ns_path(), format!("/proc/{}/ns/user", pid.as_raw()));
}

#[test]
fn test_default_handoff_is_slirp4netns() {
    let pid = ProcessId::new(4242).unwrap();
    let cmd = HandoffConfig::default().resolve_command(pid, &[]).unwrap();

    assert_eq!(cmd.program(), "/usr/bin/slirp4netns");
    assert!(cmd.args().contains(&"4242".to_string()));
    assert_eq!(cmd.args().last().map(String::as_str), Some("tap0"));
}

#[test]
fn test_config_json_round_trip() {
    let config = HandoffConfig::new().with_default_command(["/usr/local/bin/netsetup", "{pid}"]);

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("default_command"));

    let parsed: HandoffConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_error_messages_name_stage() {
    let err = Error::PermissionDenied {
        stage: Stage::Locate,
        source: Errno::EACCES,
    };
    assert_eq!(err.stage(), Stage::Locate);
    assert!(err.to_string().contains("locate"));

    let err = Error::Unexpected {
        stage: Stage::Handoff,
        source: Errno::ENOEXEC,
    };
    assert_eq!(err.stage(), Stage::Handoff);
    assert_eq!(err.errno(), Some(Errno::ENOEXEC));
}

#[test]
fn test_setup_errors() {
    let err = TargetCommand::new(Vec::<String>::new()).unwrap_err();
    assert_eq!(err.stage(), Stage::Setup);

    let err = Error::UnsupportedPlatform { target: "macos" };
    assert_eq!(err.stage(), Stage::Setup);
    assert!(err.to_string().contains("macos"));
}
