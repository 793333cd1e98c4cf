//! End-to-end programs: load source, run a def, check printed output.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use knot_vm::{buffer_handler, Machine, RuntimeError, RuntimeErrorKind};
use pretty_assertions::assert_eq;

/// Load `src`, run `main` in the default module and return its output.
fn run(src: &str) -> String {
    let out = buffer_handler();
    let mut vm = Machine::builder()
        .print_handler(out.clone())
        .max_steps(100_000)
        .build();
    vm.load_source("test", src).expect("program loads");
    if let Err(err) = vm.call("", "main") {
        panic!("program failed: {err}");
    }
    assert!(vm.frames().is_empty());
    out.get_output()
}

/// Run `body` as the code of `main` and return the error it raises.
fn fail(body: &str) -> RuntimeError {
    let mut vm = Machine::builder()
        .print_handler(knot_vm::silent_handler())
        .max_steps(100_000)
        .build();
    vm.load_source("test", &format!("def main () () ({body})"))
        .expect("program loads");
    vm.call("", "main").expect_err("program should fail")
}

#[test]
fn add_and_print() {
    assert_eq!(run("def main () () (2 3 add p)"), "5\n");
}

#[test]
fn indented_program() {
    let src = "
def main () ():
    1 var_set x
    T ifelse:
        var_get x 10 add p
    :
        var_get x p
";
    assert_eq!(run(src), "11\n");
}

#[test]
fn alias_call_matches_longcall() {
    let src = "
module other
def helper (x) (y) (call scale)
def scale (x) (y) (10 mul)

module main
from other ((helper -> h))
def via_alias () () (4 call h p)
def via_long () () (4 longcall other helper p)
def via_ref () () (4 ref h fun_call p)
def main () () (call via_alias call via_long call via_ref)
";
    let out = buffer_handler();
    let mut vm = Machine::builder().print_handler(out.clone()).build();
    vm.load_source("test", src).unwrap();
    vm.call("main", "main").unwrap();
    assert_eq!(out.get_output(), "40\n40\n40\n");
}

#[test]
fn bare_import_and_unresolved_name() {
    let src = "
module lib
def answer () (n) (42)
module app
from lib (answer)
def main () () (call answer p)
def broken () () (call missing)
";
    let out = buffer_handler();
    let mut vm = Machine::builder().print_handler(out.clone()).build();
    vm.load_source("test", src).unwrap();
    vm.call("app", "main").unwrap();
    assert_eq!(out.get_output(), "42\n");

    let err = vm.call("app", "broken").unwrap_err();
    assert_eq!(
        err.kind,
        RuntimeErrorKind::UndefinedDef {
            module: "app".into(),
            name: "missing".into()
        }
    );
    assert_eq!(err.instruction.as_deref(), Some("call"));
}

#[test]
fn rev_is_persistent() {
    let src = "def main () () (list (1 2 3) dup rev dup rev p p p)";
    assert_eq!(run(src), "(1 2 3)\n(3 2 1)\n(1 2 3)\n");
}

#[test]
fn list_ops() {
    let src = "
def main () () (
    nil 3 push 2 push 1 push
    dup p
    dup list_len p
    dup head p
    dup tail p
    pop p p
)";
    assert_eq!(run(src), "(1 2 3)\n3\n1\n(2 3)\n1\n(2 3)\n");
}

#[test]
fn flat_and_rev_flat() {
    let src = "
def main () () (
    list (1 2 3) flat dup 0 arr_iget p dup 2 arr_iget p arr_len p
    list (1 2 3) rev_flat dup 0 arr_iget p 2 arr_iget p
)";
    assert_eq!(run(src), "1\n3\n3\n3\n1\n");
}

#[test]
fn queue_keeps_push_order() {
    let src = "
def main () () (
    queue 1 queue_push 2 queue_push 3 queue_push queue_tolist p
    list (1 2) dup list_toqueue 3 queue_push queue_tolist p p
)";
    assert_eq!(run(src), "(1 2 3)\n(1 2 3)\n(1 2)\n");
}

#[test]
fn empty_loops_run_zero_times() {
    assert_eq!(run("def main () () (7 0 int_for (p) p)"), "7\n");
    assert_eq!(run("def main () () (7 nil list_for (p) p)"), "7\n");
    assert_eq!(run("def main () () (7 0 int_for () p)"), "7\n");
}

#[test]
fn counted_and_list_loops() {
    assert_eq!(run("def main () () (3 int_for (p))"), "0\n1\n2\n");
    assert_eq!(
        run("def main () () (list (a b c) list_for (p))"),
        "a\nb\nc\n"
    );
}

#[test]
fn next_skips_rest_of_pass() {
    assert_eq!(
        run("def main () () (4 int_for (dup 2 eq if (drop next) p))"),
        "0\n1\n3\n"
    );
    assert_eq!(
        run("def main () () (list (1 2 3) list_for (dup 2 eq if (drop next) p))"),
        "1\n3\n"
    );
}

#[test]
fn do_restarts_on_next() {
    let src = "
def main () () (
    0 var_set n
    do (var_get n 1 add dup var_set n 3 lt if (next))
    var_get n p
)";
    assert_eq!(run(src), "3\n");
}

#[test]
fn for_runs_latch_between_passes() {
    let src = "
def main () () (
    0 var_set n
    for (var_get n 1 add var_set n) (var_get n 3 lt while var_get n p)
    ' done p
)";
    assert_eq!(run(src), "0\n1\n2\ndone\n");
}

#[test]
fn break_leaves_only_innermost_loop() {
    let src = "
def main () () (
    2 int_for (
        var_set o
        3 int_for (dup 1 eq if (drop break) var_get o p p)
    )
)";
    assert_eq!(run(src), "0\n0\n1\n0\n");
}

#[test]
fn short_circuit() {
    let src = "def main () () (T and (F) p F and (T) p T or (F) p F or (T) p)";
    assert_eq!(run(src), "F\nF\nT\nT\n");
}

#[test]
fn ret_returns_early() {
    let src = "
def early () (r) (1 ret 2)
def main () () (call early p)
";
    assert_eq!(run(src), "1\n");
}

#[test]
fn vars_bind_deepest_first() {
    let src = "def main () () (1 2 3 vars (a b c) var_get a p var_get c p)";
    assert_eq!(run(src), "1\n3\n");
}

#[test]
fn apply_makes_latest_value_first_argument() {
    let src = "
def minus (a b) (c) (sub)
def main () () (
    ref minus 10 apply 3 apply
    dup fun_args p
    dup fun_name p
    fun_call p
)";
    assert_eq!(run(src), "(3 10)\nminus\n-7\n");
}

#[test]
fn apply_updates_closure_in_place() {
    let src = "
def id (a) (b) ()
def main () () (ref id dup 5 apply drop fun_call p)
";
    assert_eq!(run(src), "5\n");
}

#[test]
fn dict_round_trip() {
    let src = "
def main () () (
    dict 5 ' a set
    dup ' a get p
    dup ' a has p
    dup dict_n_keys p
    ' a del
    dup ' a has p
    dict_n_keys p
)";
    assert_eq!(run(src), "5\nT\n1\nF\n0\n");

    let err = fail("dict 5 ' a set ' a del ' a del");
    assert_eq!(err.kind, RuntimeErrorKind::KeyNotFound { key: "a".into() });
    assert_eq!(err.instruction.as_deref(), Some("del"));
}

#[test]
fn dict_slots_visit_every_key_once() {
    // Sum the values by walking raw slots.
    let src = "
def main () () (
    dict 1 ' a set 2 ' b set 3 ' c set var_set d
    0 var_set sum
    var_get d dict_len int_for (
        var_set i
        var_get d var_get i dict_ihas if (
            var_get d var_get i dict_iget_val var_get sum add var_set sum
        )
    )
    var_get sum p
)";
    assert_eq!(run(src), "6\n");
}

#[test]
fn structs() {
    let src = "
def main () () (
    obj (x y) 5 obj_set x
    dup obj_get x p
    dup obj_len p
    dup 1 obj_iget_key p
    dup 0 obj_iget_val p
    obj_get y p
)";
    assert_eq!(run(src), "5\n2\ny\n5\nnull\n");
    assert_eq!(
        fail("obj (x) 1 obj_set z").kind,
        RuntimeErrorKind::KeyNotFound { key: "z".into() }
    );
}

#[test]
fn arrays() {
    let src = "def main () () (0 3 arr 9 1 arr_iset dup p arr_len p)";
    assert_eq!(run(src), "[0 9 0]\n3\n");
}

#[test]
fn strings() {
    let src = "
def main () () (
    \"ab\" \"cd\" str_join dup p dup str_len p 0 str_getbyte p
    \"abc\" 65 0 str_setbyte p
    \"hi\\n\" str_p
    42 int_tostr str_p \"\\n\" str_p
    ' foo sym_tostr 70 0 str_setbyte p ' foo p
    \"bar\" str_tosym p
    \"x\" dup str_clone str_eq p
)";
    assert_eq!(
        run(src),
        "\"abcd\"\n4\n97\n\"Abc\"\nhi\n42\n\"Foo\"\nfoo\nbar\nT\n"
    );
}

#[test]
fn type_queries() {
    let src = "
def main () () (
    nil typeof p 1 typeof p list (1) typeof p queue typeof p
    nil is_list p nil is_cell p 1 is_int p ' x is_sym p
)";
    assert_eq!(run(src), "list\nint\nlist\nqueue\nT\nF\nT\nT\n");
}

#[test]
fn stack_shuffles() {
    let src = "def main () () (1 2 swap p p 1 2 over p p p 1 2 tuck p p p 1 2 nip p)";
    assert_eq!(run(src), "1\n2\n1\n2\n1\n2\n1\n2\n2\n");
}

#[test]
fn ignore_skips_next_element() {
    assert_eq!(
        run("def main () () (ignore \"a note\" ignore (1 p) 2 p)"),
        "2\n"
    );
}

#[test]
fn runtime_faults() {
    let cases: &[(&str, RuntimeErrorKind)] = &[
        ("1 0 div", RuntimeErrorKind::DivisionByZero),
        ("1 0 mod", RuntimeErrorKind::ModuloByZero),
        (
            "9223372036854775807 1 add",
            RuntimeErrorKind::IntegerOverflow { operation: "add" },
        ),
        ("F assert", RuntimeErrorKind::AssertionFailed),
        ("' boom error", RuntimeErrorKind::Raised { value: "boom".into() }),
        ("break", RuntimeErrorKind::OutsideLoop),
        ("F while", RuntimeErrorKind::OutsideLoop),
        (
            "1 T add",
            RuntimeErrorKind::TypeMismatch {
                expected: "int",
                got: "T".into(),
            },
        ),
        (
            "var_get nope",
            RuntimeErrorKind::UndefinedVariable { name: "nope".into() },
        ),
        (
            "0 2 arr 5 arr_iget",
            RuntimeErrorKind::IndexOutOfBounds { index: 5, len: 2 },
        ),
        (
            "\"a\" 300 0 str_setbyte",
            RuntimeErrorKind::ByteOutOfRange { value: 300 },
        ),
        ("0 -1 arr", RuntimeErrorKind::NegativeLength { len: -1 }),
        (
            "0 9223372036854775807 arr",
            RuntimeErrorKind::AllocationFailed {
                len: 9_223_372_036_854_775_807,
            },
        ),
        (
            "drop",
            RuntimeErrorKind::StackUnderflow {
                needed: 1,
                depth: 0,
            },
        ),
        ("dict 0 dict_iget_key", RuntimeErrorKind::EmptySlot { index: 0 }),
        (
            "nil head",
            RuntimeErrorKind::TypeMismatch {
                expected: "cell",
                got: "()".into(),
            },
        ),
    ];
    for (body, kind) in cases {
        assert_eq!(&fail(body).kind, kind, "body: {body}");
    }
}

#[test]
fn errors_carry_instruction_and_frames() {
    let err = fail("1 var_set x 1 0 div");
    assert_eq!(err.instruction.as_deref(), Some("div"));
    let frames = err.frames.as_deref().unwrap();
    assert!(frames.starts_with("FRAME main:\n"), "{frames}");
    assert!(frames.contains("VARS (1): x=1"), "{frames}");
    assert!(err.to_string().starts_with("div: division by zero\nFRAME main:"));
}

#[test]
fn return_count_is_enforced_at_return() {
    let err = fail("1");
    assert_eq!(
        err.kind,
        RuntimeErrorKind::ReturnMismatch {
            def: "main".into(),
            expected: 0,
            got: 1
        }
    );
}

#[test]
fn recursion_uses_frames_not_host_stack() {
    let src = "
def down (n) () (dup 0 eq if (drop ret) 1 sub call down)
def main () () (10000 call down ' ok p)
";
    let out = buffer_handler();
    let mut vm = Machine::builder().print_handler(out.clone()).build();
    vm.load_source("test", src).unwrap();
    vm.call("", "main").unwrap();
    assert_eq!(out.get_output(), "ok\n");
}
