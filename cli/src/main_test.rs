use super::*;
use clap::CommandFactory;
use school_portal::net::types::Role;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn records_command_parses_collection() {
    let cli = Cli::try_parse_from(["portal", "records", "exams", "get", "e-1"]).unwrap();
    match cli.command {
        Command::Records(records) => {
            assert_eq!(records.collection, Collection::Exams);
            assert!(matches!(records.command, RecordsSubcommand::Get { ref id } if id == "e-1"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn records_command_rejects_unknown_collection() {
    assert!(Cli::try_parse_from(["portal", "records", "lockers", "list"]).is_err());
}

#[test]
fn users_subcommands_use_kebab_case() {
    let cli = Cli::try_parse_from(["portal", "users", "toggle-status", "42"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Users(UsersCommand { command: UsersSubcommand::ToggleStatus { ref id } }) if id == "42"
    ));
}

#[test]
fn parse_data_requires_object() {
    assert!(parse_data(r#"{"name":"Algebra"}"#).is_ok());
    assert!(matches!(parse_data("[1,2]"), Err(CliError::NotAnObject)));
    assert!(matches!(parse_data("{oops"), Err(CliError::InvalidJson(_))));
}

#[test]
fn explicit_state_dir_wins() {
    let ctx = build_context(Some("https://portal.example/api/"), Some(PathBuf::from("/tmp/portal-x"))).unwrap();
    assert_eq!(ctx.state_dir, PathBuf::from("/tmp/portal-x"));
    assert_eq!(ctx.config.base_url, "https://portal.example/api");
}

#[test]
fn summary_includes_dashboard_for_user() {
    let user = User {
        id: "u-1".into(),
        user_id: "STU-1".into(),
        email: "s@school.test".into(),
        first_name: "Kim".into(),
        last_name: "Park".into(),
        role: Role::Student,
        address: None,
        access_token: "t".into(),
    };
    let summary = session_summary(&AuthState::authenticated(user, "t".into()));
    assert_eq!(summary["authenticated"], true);
    assert_eq!(summary["dashboard"], "/portal/student/u-1/dashboard");
    assert_eq!(summary["user"]["userID"], "STU-1");
    assert_eq!(summary["displayName"], "Kim Park");
}

#[test]
fn summary_for_anonymous_has_no_dashboard() {
    let summary = session_summary(&AuthState::anonymous());
    assert_eq!(summary["authenticated"], false);
    assert!(summary["user"].is_null());
    assert!(summary["dashboard"].is_null());
    assert!(summary["displayName"].is_null());
}
