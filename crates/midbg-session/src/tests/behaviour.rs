//! Behavioural tests for the session lifecycle using `rstest-bdd`.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::backend::DebuggerBackend;
use crate::errors::SessionError;
use crate::tests::support::SessionWorld;

#[fixture]
fn world() -> RefCell<SessionWorld> {
    RefCell::new(SessionWorld::new())
}

#[given("a session with a resolvable debugger")]
fn given_resolvable(world: &RefCell<SessionWorld>) {
    *world.borrow_mut() = SessionWorld::new();
}

#[given("a session without a debugger")]
fn given_missing(world: &RefCell<SessionWorld>) {
    *world.borrow_mut() = SessionWorld::without_debugger();
}

#[given("an initialised session")]
fn given_initialised(world: &RefCell<SessionWorld>) {
    let mut world = world.borrow_mut();
    *world = SessionWorld::new();
    world.start_and_initialise();
    world.mark();
}

#[when("the session starts")]
fn when_session_starts(world: &RefCell<SessionWorld>) {
    world.borrow_mut().start();
}

#[when("the debugger prints its banner")]
fn when_banner(world: &RefCell<SessionWorld>) {
    world
        .borrow_mut()
        .feed("=thread-group-added,id=\"i1\"\n~\"GNU gdb\\n\"\n(gdb)\n");
}

#[when("the debugger reports a stop in \"{function}\" at \"{file}\" line {line}")]
fn when_stop(world: &RefCell<SessionWorld>, function: String, file: String, line: u32) {
    world.borrow_mut().feed(&format!(
        "*stopped,reason=\"breakpoint-hit\",thread-id=\"1\",\
         frame={{addr=\"0x1\",func=\"{function}\",file=\"{file}\",line=\"{line}\"}}\n(gdb)\n"
    ));
}

#[when("the debugger answers with locals \"{name}\" of type \"{type_name}\" holding \"{value}\"")]
fn when_locals(world: &RefCell<SessionWorld>, name: String, type_name: String, value: String) {
    world.borrow_mut().feed(&format!(
        "^done,locals=[{{name=\"{name}\",type=\"{type_name}\",value=\"{value}\"}}]\n(gdb)\n"
    ));
}

#[when("the debugger reports that the program exited normally")]
fn when_program_exits(world: &RefCell<SessionWorld>) {
    world
        .borrow_mut()
        .feed("*stopped,reason=\"exited-normally\"\n(gdb)\n");
}

#[when("the debugger process exits with code {code}")]
fn when_process_exits(world: &RefCell<SessionWorld>, code: i32) {
    world.borrow_mut().exit(Some(code));
}

#[when("the user steps over")]
fn when_step_over(world: &RefCell<SessionWorld>) {
    let mut world = world.borrow_mut();
    world.last_error = world.session.step_over().err();
}

#[when("the debugger rejects the command with \"{message}\"")]
fn when_rejected(world: &RefCell<SessionWorld>, message: String) {
    world
        .borrow_mut()
        .feed(&format!("^error,msg=\"{message}\"\n(gdb)\n"));
}

#[then("the session state is \"{state}\"")]
fn then_state(world: &RefCell<SessionWorld>, state: String) {
    assert_eq!(world.borrow().session.state().to_string(), state);
}

#[then("exactly one command has been written")]
fn then_one_write(world: &RefCell<SessionWorld>) {
    assert_eq!(world.borrow().launch().writes().len(), 1);
}

#[then("the first command written is \"{command}\"")]
fn then_first_write(world: &RefCell<SessionWorld>, command: String) {
    let writes = world.borrow().launch().writes();
    assert_eq!(
        writes.first().map(String::as_str),
        Some(format!("00000000{command}\r\n").as_str())
    );
}

#[then("the setup sequence ends with \"{command}\"")]
fn then_setup_ends_with(world: &RefCell<SessionWorld>, command: String) {
    let world = world.borrow();
    let last = world.session.queue().pending().last().map(|queued| queued.text().to_owned());
    assert_eq!(last, Some(command));
}

#[then("the start fails because the debugger was not found")]
fn then_not_found(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.last_error,
            Some(SessionError::ExecutableNotFound { ref tool }) if tool == "gdb"
        ),
        "unexpected start result: {:?}",
        world.last_error
    );
}

#[then("no process was spawned")]
fn then_no_spawn(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    assert!(world.launch().requests().is_empty());
    assert!(!world.session.is_debugging());
}

#[then("the execution view shows \"{function}\" at \"{file}\" line {line} on thread \"{thread}\"")]
fn then_execution(
    world: &RefCell<SessionWorld>,
    function: String,
    file: String,
    line: u32,
    thread: String,
) {
    let world = world.borrow();
    let frame = world
        .session
        .views()
        .execution
        .clone()
        .expect("execution view should be populated");
    assert_eq!(frame.address, "0x1");
    assert_eq!(frame.function, function);
    assert_eq!(frame.file, file);
    assert_eq!(frame.line_number(), Some(line));
    assert_eq!(frame.thread_id, thread);
    assert_eq!(frame.full_path, "");
    assert_eq!(world.observed().executions, vec![frame]);
}

#[then("the follow-up commands are \"{commands}\"")]
fn then_follow_ups(world: &RefCell<SessionWorld>, commands: String) {
    let expected: Vec<String> = commands.split(", ").map(str::to_owned).collect();
    assert_eq!(world.borrow().commands_after_mark(), expected);
}

#[then("the locals view holds \"{name}\" of type \"{type_name}\" holding \"{value}\"")]
fn then_locals(world: &RefCell<SessionWorld>, name: String, type_name: String, value: String) {
    let world = world.borrow();
    let locals = &world.session.views().locals;
    assert_eq!(locals.len(), 1);
    let local = locals.first().expect("one local");
    assert_eq!(
        (local.name.as_str(), local.type_name.as_str(), local.value.as_str()),
        (name.as_str(), type_name.as_str(), value.as_str())
    );
    assert_eq!(world.observed().locals_updates, 1);
}

#[then("the cycle message \"{message}\" was reported")]
fn then_cycle_message(world: &RefCell<SessionWorld>, message: String) {
    assert_eq!(world.borrow().observed().messages, vec![message]);
}

#[then("the failure reports an unexpected exit")]
fn then_unexpected_exit(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.session.failure(),
            Some(SessionError::ProcessExitedUnexpectedly { code: Some(1) })
        ),
        "unexpected failure: {:?}",
        world.session.failure()
    );
    assert!(!world.session.is_debugging());
}

#[then("the command is rejected because the debugger terminated")]
fn then_rejected_after_exit(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    assert!(
        matches!(
            world.last_error,
            Some(SessionError::WriteAfterTerminated { ref command }) if command == "-exec-next"
        ),
        "unexpected step result: {:?}",
        world.last_error
    );
}

#[then("the observer saw \"{command}\" fail with \"{message}\"")]
fn then_observer_failure(world: &RefCell<SessionWorld>, command: String, message: String) {
    assert_eq!(
        world.borrow().observed().failures,
        vec![(Some(command), message)]
    );
}

#[scenario(path = "tests/features/session.feature")]
fn session_lifecycle(#[from(world)] _: RefCell<SessionWorld>) {}
