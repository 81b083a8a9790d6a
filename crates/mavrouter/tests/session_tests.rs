use mavrouter::{Action, Reply, RouteArgs, RouterSession, run_console, run_until};
use mavrouter_core::mock::{MockEvent, MockProcessManager};
use mavrouter_core::{
    ExitPolicy, Platform, PlatformProfile, PortEnumerator, RouterError, RouterLifecycle,
    RouterState, SourceKind,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::BufReader;

const POLL: Duration = Duration::from_millis(10);

/// Port list the test can change underneath the session
#[derive(Clone, Default)]
struct Ports(Arc<Mutex<Vec<String>>>);

impl Ports {
    fn with(names: &[&str]) -> Self {
        let ports = Self::default();
        ports.set(names);
        ports
    }

    fn set(&self, names: &[&str]) {
        *self.0.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }
}

impl PortEnumerator for Ports {
    fn available_ports(&self) -> Result<Vec<String>, RouterError> {
        Ok(self.0.lock().unwrap().clone())
    }
}

fn session_with(
    ports: Ports,
    policy: ExitPolicy,
) -> (RouterSession<MockProcessManager, Ports>, MockProcessManager) {
    let manager = MockProcessManager::default();
    let lifecycle = RouterLifecycle::new(manager.clone()).with_exit_policy(policy);
    let profile = PlatformProfile::for_platform(Platform::Posix);
    (RouterSession::new(profile, lifecycle, ports), manager)
}

fn session() -> (RouterSession<MockProcessManager, Ports>, MockProcessManager) {
    session_with(Ports::with(&["/dev/ttyUSB0"]), ExitPolicy::StopChild)
}

async fn console(session: &mut RouterSession<MockProcessManager, Ports>, script: &str) -> (String, RouterState) {
    let mut output = Vec::new();
    let state = run_console(session, BufReader::new(script.as_bytes()), &mut output, POLL)
        .await
        .unwrap();
    (String::from_utf8(output).unwrap(), state)
}

#[tokio::test]
async fn test_start_without_port_spawns_nothing() {
    let (mut session, probe) = session();

    let result = session.start().await;
    assert!(matches!(result, Err(RouterError::MissingSource)));
    assert!(probe.events().is_empty());
    assert_eq!(session.lifecycle().state(), RouterState::NotStarted);
}

#[tokio::test]
async fn test_only_enumerated_ports_can_be_selected() {
    let (mut session, probe) = session();

    assert!(matches!(
        session.select_port("/dev/ttyS9"),
        Err(RouterError::UnknownPort(_))
    ));
    session.select_port("/dev/ttyUSB0").unwrap();
    session.start().await.unwrap();

    assert_eq!(
        probe.spawned_commands(),
        vec![
            "mavproxy.py --master=/dev/ttyUSB0 --baudrate 57600 --out 127.0.0.1:14540 --out 127.0.0.1:14550 --non-interactive"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_port_plugged_in_later_is_found_by_rescan() {
    let ports = Ports::with(&[]);
    let (mut session, _probe) = session_with(ports.clone(), ExitPolicy::StopChild);
    assert_eq!(session.port_choices(), vec!["Select Port".to_string()]);

    ports.set(&["COM4"]);
    session.select_port("COM4").unwrap();
    assert_eq!(session.port_choices(), vec!["COM4".to_string()]);
}

#[tokio::test]
async fn test_unplugged_port_blocks_start() {
    let ports = Ports::with(&["/dev/ttyACM0"]);
    let (mut session, probe) = session_with(ports.clone(), ExitPolicy::StopChild);
    session.select_port("/dev/ttyACM0").unwrap();

    ports.set(&[]);
    session.refresh_ports().unwrap();
    assert!(matches!(
        session.start().await,
        Err(RouterError::UnknownPort(_))
    ));
    assert!(probe.events().is_empty());
}

#[tokio::test]
async fn test_second_start_replaces_running_router() {
    let (mut session, probe) = session();
    session.set_source_kind(SourceKind::Udp);
    session.set_udp_address("10.0.0.5:14550");

    session.start().await.unwrap();
    session.set_show_map(true);
    session.start().await.unwrap();

    assert_eq!(probe.live_pids(), vec![1002]);
    assert!(matches!(
        probe.events()[1],
        MockEvent::Terminate { pid: 1001 }
    ));
    assert!(probe.spawned_commands()[1].ends_with("--non-interactive --map"));
}

#[tokio::test]
async fn test_stop_replies() {
    let (mut session, _probe) = session();

    let reply = session.handle(Action::Stop).await;
    assert_eq!(reply.message, "MAVProxy has not been started yet");

    session.set_source_kind(SourceKind::Udp);
    session.start().await.unwrap();
    assert_eq!(session.handle(Action::Stop).await.message, "MAVProxy stopped");
    assert_eq!(session.handle(Action::Stop).await.message, "MAVProxy is not running");
}

#[tokio::test]
async fn test_errors_become_replies() {
    let (mut session, probe) = session();
    session.handle(Action::Source { kind: SourceKind::Udp }).await;
    session
        .handle(Action::Udp {
            address: "localhost:14550".to_string(),
        })
        .await;

    let reply = session.handle(Action::Start).await;
    assert!(reply.message.starts_with("Error: Invalid UDP address"));
    assert!(!reply.quit);

    let show = session.handle(Action::Show).await;
    assert!(show.message.contains("unavailable"));
    assert!(probe.events().is_empty());
}

#[tokio::test]
async fn test_spawn_failure_is_reported() {
    let (mut session, probe) = session();
    session.set_source_kind(SourceKind::Udp);
    probe.fail_next_spawn();

    let reply = session.handle(Action::Start).await;
    assert!(reply.message.starts_with("Error: Failed to start `mavproxy.py"));
    assert_eq!(session.lifecycle().state(), RouterState::NotStarted);
}

#[tokio::test]
async fn test_quit_reply() {
    let (mut session, _probe) = session();
    assert_eq!(
        session.handle(Action::Quit).await,
        Reply {
            message: String::new(),
            quit: true
        }
    );
}

#[tokio::test]
async fn test_route_args_fill_the_form() {
    let (mut session, _probe) = session();
    let route = RouteArgs {
        udp: Some("192.168.1.20:14550".to_string()),
        console: true,
        ..RouteArgs::default()
    };
    route.apply(&mut session).unwrap();

    let command = session.command().unwrap();
    assert_eq!(command.get_args()[0], "--master=udp:192.168.1.20:14550");
    assert_eq!(command.get_args().last().map(String::as_str), Some("--console"));
}

#[tokio::test]
async fn test_route_args_reject_unknown_serial_port() {
    let (mut session, _probe) = session();
    let route = RouteArgs {
        serial: Some("COM7".to_string()),
        ..RouteArgs::default()
    };
    assert!(matches!(
        route.apply(&mut session),
        Err(RouterError::UnknownPort(_))
    ));
}

#[tokio::test]
async fn test_console_script() {
    let (mut session, probe) = session();
    let script = "source udp\nudp 10.0.0.5:14550\n\nstart\nstatus\nstop\nquit\nstart\n";

    let (output, state) = console(&mut session, script).await;

    assert!(output.contains("Source type: udp"));
    assert!(output.contains("MAVProxy running (pid 1001, process group 1001)"));
    assert!(output.contains("MAVProxy stopped"));
    assert_eq!(state, RouterState::Stopped);
    // Nothing after `quit` runs
    assert_eq!(probe.spawned_commands().len(), 1);
}

#[tokio::test]
async fn test_console_reports_parse_errors_and_continues() {
    let (mut session, _probe) = session();

    let (output, _) = console(&mut session, "launch\nbaud 115200\n").await;

    assert!(output.contains("launch"));
    assert!(output.contains("Baud rate: 115200"));
    assert_eq!(session.form().baud_rate, 115200);
}

#[tokio::test]
async fn test_console_eof_stops_router() {
    let (mut session, probe) = session();

    let (_, state) = console(&mut session, "source udp\nstart\n").await;

    assert_eq!(state, RouterState::Stopped);
    assert!(probe.live_pids().is_empty());
    assert!(probe.events().contains(&MockEvent::Terminate { pid: 1001 }));
}

#[tokio::test]
async fn test_console_eof_can_leave_router_running() {
    let (mut session, probe) = session_with(Ports::default(), ExitPolicy::LeaveRunning);

    let (_, state) = console(&mut session, "source udp\nstart\n").await;

    assert!(state.is_running());
    assert_eq!(probe.live_pids(), vec![1001]);
}

#[tokio::test]
async fn test_run_until_interrupt_stops_router() {
    let (mut session, probe) = session();
    session.set_source_kind(SourceKind::Udp);

    let state = run_until(&mut session, std::future::ready(()), POLL)
        .await
        .unwrap();

    assert_eq!(state, RouterState::Stopped);
    assert_eq!(
        probe.events().last(),
        Some(&MockEvent::Terminate { pid: 1001 })
    );
}

#[tokio::test]
async fn test_run_until_notices_router_exit() {
    let (mut session, probe) = session();
    session.set_source_kind(SourceKind::Udp);
    // The first spawned router dies straight away
    probe.mark_exited(1001);

    let state = run_until(&mut session, std::future::pending::<()>(), POLL)
        .await
        .unwrap();

    assert_eq!(state, RouterState::Stopped);
    assert!(
        probe
            .events()
            .iter()
            .all(|event| matches!(event, MockEvent::Spawn { .. }))
    );
}

#[tokio::test]
async fn test_run_until_requires_valid_route() {
    let (mut session, probe) = session();

    let result = run_until(&mut session, std::future::ready(()), POLL).await;
    assert!(matches!(result, Err(RouterError::MissingSource)));
    assert!(probe.events().is_empty());
}

#[tokio::test]
async fn test_profile_termination_checked_against_manager() {
    let (session, _probe) = session();
    assert!(session.termination_matches_profile());
    assert_eq!(session.profile().platform(), Platform::Posix);

    // The recording manager signals process groups, which a Windows profile
    // does not expect
    let lifecycle = RouterLifecycle::new(MockProcessManager::default());
    let windows = RouterSession::new(
        PlatformProfile::for_platform(Platform::Windows),
        lifecycle,
        Ports::default(),
    );
    assert!(!windows.termination_matches_profile());
}
