use super::*;
use crate::errors::RuntimeErrorKind;
use crate::print_handler::{buffer_handler, silent_handler};
use pretty_assertions::assert_eq;

const DEFS: &str = "
def main () () ()
def pair (a b) () ()
def one () (r) ()
";

fn machine() -> Machine {
    let mut vm = Machine::builder().print_handler(silent_handler()).build();
    vm.load_source("test", DEFS).unwrap();
    vm
}

fn enter(vm: &mut Machine, name: &str) -> RunResult {
    let name = vm.pool_mut().intern(name);
    vm.push_frame(Sym::EMPTY, name)
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

#[test]
fn push_frame_moves_top_args_in_order() {
    let mut vm = machine();
    enter(&mut vm, "main").unwrap();
    for i in 1..=3 {
        vm.push_value(Value::Int(i)).unwrap();
    }
    enter(&mut vm, "pair").unwrap();

    assert_eq!(vm.frames().len(), 2);
    assert_eq!(vm.frames()[0].stack(), ints(&[1]).as_slice());
    assert_eq!(vm.frames()[1].stack(), ints(&[2, 3]).as_slice());
    assert_eq!(vm.frames()[1].blocks().len(), 1);
    assert_eq!(vm.frames()[1].blocks()[0].kind, BlockKind::Basic);
}

#[test]
fn push_frame_checks_caller_depth() {
    let mut vm = machine();
    enter(&mut vm, "main").unwrap();
    vm.push_value(Value::Int(1)).unwrap();
    let err = enter(&mut vm, "pair").unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::ArityMismatch {
            def: "pair".into(),
            expected: 2,
            got: 1
        }
    );
    assert_eq!(vm.frames().len(), 1);
    assert_eq!(vm.frames()[0].stack(), ints(&[1]).as_slice());
}

#[test]
fn args_need_a_caller() {
    let mut vm = machine();
    let err = enter(&mut vm, "pair").unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::NoCaller {
            def: "pair".into(),
            count: 2
        }
    );
}

#[test]
fn unknown_targets() {
    let mut vm = machine();
    assert!(matches!(
        enter(&mut vm, "nope").unwrap_err().kind,
        RuntimeErrorKind::UndefinedDef { .. }
    ));
    let (m, f) = (vm.pool_mut().intern("m"), vm.pool_mut().intern("f"));
    assert!(matches!(
        vm.push_frame(m, f).unwrap_err().kind,
        RuntimeErrorKind::UndefinedModule { .. }
    ));
}

#[test]
fn pop_frame_requires_exact_return_count() {
    let mut vm = machine();
    enter(&mut vm, "main").unwrap();
    vm.push_value(Value::Int(5)).unwrap();
    enter(&mut vm, "one").unwrap();

    let err = vm.pop_frame().unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::ReturnMismatch {
            def: "one".into(),
            expected: 1,
            got: 0
        }
    );

    vm.push_value(Value::Int(7)).unwrap();
    vm.pop_frame().unwrap();
    assert_eq!(vm.frames().len(), 1);
    assert_eq!(vm.frames()[0].stack(), ints(&[5, 7]).as_slice());
}

#[test]
fn returning_values_needs_a_caller() {
    let mut vm = machine();
    enter(&mut vm, "one").unwrap();
    vm.push_value(Value::Int(7)).unwrap();
    assert!(matches!(
        vm.pop_frame().unwrap_err().kind,
        RuntimeErrorKind::NoCaller { count: 1, .. }
    ));
}

#[test]
fn popped_frames_are_reused() {
    let mut vm = machine();
    enter(&mut vm, "main").unwrap();
    vm.push_value(Value::Int(1)).unwrap();
    vm.pop_frame().unwrap_err();
    vm.reset();
    assert_eq!(vm.free_frames.len(), 1);

    enter(&mut vm, "main").unwrap();
    assert!(vm.free_frames.is_empty());
    assert!(vm.frames()[0].stack().is_empty());
    assert!(vm.frames()[0].vars().is_empty());
}

#[test]
fn step_on_empty_machine_is_done() {
    let mut vm = machine();
    assert_eq!(vm.step().unwrap(), Step::Done);
    assert_eq!(vm.steps(), 1);
}

#[test]
fn empty_def_returns_in_one_step() {
    let mut vm = machine();
    enter(&mut vm, "main").unwrap();
    assert_eq!(vm.step().unwrap(), Step::Done);
    assert!(vm.frames().is_empty());
}

#[test]
fn step_limit_aborts_runaway_loops() {
    let mut vm = Machine::builder()
        .print_handler(silent_handler())
        .max_steps(100)
        .build();
    vm.load_source("test", "def spin () () (do (next))").unwrap();
    let err = vm.call("", "spin").unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::StepLimitExceeded { limit: 100 });
    assert!(err.frames.unwrap().starts_with("FRAME spin:"));
    assert_eq!(vm.frames().len(), 1);
}

fn limited(limit: u64, src: &str) -> Machine {
    let mut vm = Machine::builder()
        .print_handler(silent_handler())
        .max_steps(limit)
        .build();
    vm.load_source("test", src).unwrap();
    vm
}

#[test]
fn step_limit_counts_empty_loop_passes() {
    let mut vm = limited(1000, "def spin () () (for () ())");
    let err = vm.call("", "spin").unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::StepLimitExceeded { limit: 1000 });

    let mut vm = limited(1000, "def count () () (1000000 int_for ())");
    let err = vm.call("", "count").unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::StepLimitExceeded { limit: 1000 });
}

#[test]
fn step_budget_is_per_run() {
    let mut vm = limited(10, "def main () () (1 drop 2 drop)");
    for _ in 0..3 {
        vm.call("", "main").unwrap();
        assert!(vm.steps() <= 10);
    }
}

#[test]
fn call_discards_frames_of_failed_run() {
    let mut vm = machine();
    vm.load_source("more", "def bad () () (7 1 0 div)\ndef take (x) () (drop)")
        .unwrap();
    vm.call("", "bad").unwrap_err();
    assert_eq!(vm.frames().len(), 1);

    let err = vm.call("", "take").unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::NoCaller {
            def: "take".into(),
            count: 1
        }
    );
    vm.call("", "main").unwrap();
    assert!(vm.frames().is_empty());
}

#[test]
fn unknown_instruction_is_fatal() {
    let mut vm = machine();
    vm.load_source("more", "def bad () () (frob)").unwrap();
    let err = vm.call("", "bad").unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::UnknownInstruction {
            name: "frob".into()
        }
    );
}

#[test]
fn missing_operand_names_the_instruction() {
    let mut vm = machine();
    vm.load_source("more", "def bad () () (T if)").unwrap();
    let err = vm.call("", "bad").unwrap_err();
    assert_eq!(err.kind, RuntimeErrorKind::MissingOperand);
    assert_eq!(err.instruction.as_deref(), Some("if"));
}

#[test]
fn frame_dump_format() {
    let out = buffer_handler();
    let mut vm = Machine::builder().print_handler(out.clone()).build();
    vm.load_source(
        "test",
        "module demo\ndef main () () (1 var_set x 2 \"s\" p_frame drop drop)",
    )
    .unwrap();
    vm.call("demo", "main").unwrap();
    assert_eq!(
        out.get_output(),
        "FRAME demo.main:\n  STACK (2): 2 \"s\"\n  VARS (1): x=1\n  BLOCKS (1):\n    basic (drop drop)\n"
    );
}

#[test]
fn loop_blocks_show_their_state() {
    let out = buffer_handler();
    let mut vm = Machine::builder().print_handler(out.clone()).build();
    vm.load_source("test", "def main () () (2 int_for (p_blocks drop))")
        .unwrap();
    vm.call("", "main").unwrap();
    assert_eq!(
        out.get_output(),
        "BLOCKS (2):\n  basic ()\n  int_for 0/2 (drop)\n\
         BLOCKS (2):\n  basic ()\n  int_for 1/2 (drop)\n"
    );
}

#[test]
fn dump_modules_lists_defs_and_scope() {
    let mut vm = machine();
    vm.load_source("more", "module m\nfrom lib ((helper -> h))\ndef f (a) () (a)")
        .unwrap();
    let dump = vm.dump_modules();
    assert!(dump.contains("MODULE :\n  DEF main () -> (): ()\n"), "{dump}");
    assert!(
        dump.contains("MODULE m:\n  DEF f (a) -> (): (a)\n    h = lib.helper\n"),
        "{dump}"
    );
}
