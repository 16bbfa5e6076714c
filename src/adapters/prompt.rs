use crate::domain::ports::Confirmer;
use std::io::{self, BufRead, Write};

/// Prompts on stdout and reads one line from stdin. End of input is an empty answer.
#[derive(Debug, Clone, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn ask(&self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    }
}
