//! Integration tests for REPL functionality

#[cfg(feature = "cli")]
mod repl_integration_tests {
    use phrase_trie::repl::{Command, CommandResult, ReplState};
    use tempfile::TempDir;

    fn run(state: &mut ReplState, line: &str) -> String {
        match Command::parse(line).unwrap().execute(state).unwrap() {
            CommandResult::Continue(output) => output,
            CommandResult::Silent => String::new(),
            CommandResult::Exit => panic!("unexpected exit on '{}'", line),
        }
    }

    fn session() -> ReplState {
        let mut state = ReplState::new();
        run(&mut state, "define devices fan ; kitchen light");
        run(&mut state, "define main turn on <device:devices> ; turn off <device:devices>");
        state
    }

    #[test]
    fn test_suggest_through_commands() {
        let mut state = session();
        let texts: Vec<String> = state
            .suggest(&["turn".to_string(), "o".to_string()])
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(texts, vec!["ff <device>", "n <device>"]);

        run(&mut state, "lookahead 2");
        let texts: Vec<String> = state
            .suggest(&["turn".to_string(), "on".to_string()])
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(texts, vec![" fan", " kitchen light"]);
    }

    #[test]
    fn test_scope_switching() {
        let mut state = session();
        assert_eq!(state.current_scope().unwrap(), "main");

        run(&mut state, "scope devices");
        assert_eq!(state.current_scope().unwrap(), "devices");
        assert!(Command::parse("scope nowhere")
            .unwrap()
            .execute(&mut state)
            .is_err());
        assert_eq!(state.current_scope().unwrap(), "devices");
    }

    #[test]
    fn test_unknown_context_is_an_error() {
        let mut state = session();
        let result = Command::parse("add main dim <light:lights>")
            .unwrap()
            .execute(&mut state);
        assert!(result.is_err());
        assert_eq!(state.dictionary.scope("main").unwrap().patterns().len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.bin");

        let mut state = session();
        run(&mut state, &format!("save {}", path.display()));

        let mut fresh = ReplState::new();
        let output = run(&mut fresh, &format!("load {}", path.display()));
        assert!(output.contains("Loaded"));
        assert_eq!(fresh.dictionary.len(), 2);
        assert_eq!(fresh.grammar_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_exit() {
        let mut state = ReplState::new();
        assert!(matches!(
            Command::parse("quit").unwrap().execute(&mut state).unwrap(),
            CommandResult::Exit
        ));
    }
}
