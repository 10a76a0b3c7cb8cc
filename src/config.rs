//! Configuration for the board front-end.

/// Settings shared by the GUI and the engine bridge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Engine command line split into program and arguments.
    pub engine_command: Vec<String>,
    /// Plies passed to the engine with `go depth`.
    pub search_depth: u32,
}

impl Config {
    /// Builds a config from a raw engine command line. The line is split on
    /// whitespace so interpreter-plus-script commands spawn correctly.
    pub fn new(engine: &str, search_depth: u32) -> Self {
        let mut engine_command = split_command_line(engine);
        if engine_command.is_empty() {
            engine_command = Self::default().engine_command;
        }
        Self {
            engine_command,
            search_depth,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_command: vec!["stockfish".to_string()],
            search_depth: 5,
        }
    }
}

fn split_command_line(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_interpreter_and_script() {
        let config = Config::new("python patfish.py", 5);
        assert_eq!(config.engine_command, vec!["python", "patfish.py"]);
        assert_eq!(config.search_depth, 5);
    }

    #[test]
    fn blank_command_falls_back_to_default() {
        let config = Config::new("   ", 8);
        assert_eq!(config.engine_command, Config::default().engine_command);
        assert_eq!(config.search_depth, 8);
    }
}
