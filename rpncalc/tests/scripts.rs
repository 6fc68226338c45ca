use rpncalc::{Outcome, ScriptConsole, Shell};

fn run_script(path: &str) -> (Shell<ScriptConsole<Vec<u8>>>, String) {
    let console = ScriptConsole::from_path(path, Vec::new()).expect("script should load");
    let mut shell = Shell::new(console);
    shell.run().expect("script should run");
    let description = shell.calculator().describe();
    (shell, description)
}

#[test]
fn hypotenuse() {
    let (shell, description) = run_script("tests/scripts/hypotenuse.rpn");
    assert_eq!("√(a × a + b × b) =", description);
    assert_eq!(Outcome::Value(5.0), shell.display());
    let output = String::from_utf8(shell.into_console().into_output()).unwrap();
    assert_eq!(
        "√(a × a + b × b) =\nerror\n√(a × a + b × b) =\n5\n",
        output
    );
}

#[test]
fn memory_forgotten_on_clear() {
    let (shell, description) = run_script("tests/scripts/memory.rpn");
    assert_eq!("M × 4.0 =", description);
    assert_eq!(Outcome::Value(12.0), shell.display());
    assert_eq!(Some(3.0), shell.calculator().variable("M"));
    let output = String::from_utf8(shell.into_console().into_output()).unwrap();
    assert_eq!("1.0 + 2.0 =\n3\n\nerror\nM × 4.0 =\n12\n", output);
}

#[test]
fn missing_script() {
    assert!(ScriptConsole::from_path("tests/scripts/does-not-exist.rpn", Vec::new()).is_err());
}
